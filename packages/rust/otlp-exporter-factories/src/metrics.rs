//! Factories for OTLP metric exporters.
//!
//! Temporality is left at the exporter default (cumulative).

use opentelemetry_http::HttpClient;
use opentelemetry_otlp::{MetricExporter, WithExportConfig, WithHttpConfig, WithTonicConfig};
use tonic::transport::Channel;

use crate::binding::{bind_grpc, bind_http};
use crate::config::ConfigReader;
use crate::error::BuildError;
use crate::provider::Provider;
use crate::signal::Signal;

/// An OTLP/gRPC metric exporter riding the channel produced by `channel`.
pub fn grpc_metric_exporter<P>(channel: P) -> impl Provider<MetricExporter, Error = BuildError>
where
    P: Provider<Channel>,
{
    bind_grpc(Signal::Metrics, channel, |channel: Channel| {
        MetricExporter::builder()
            .with_tonic()
            .with_channel(channel)
            .build()
    })
}

/// An OTLP/HTTP metric exporter sending to `endpoint` through the client produced by `client`.
pub fn http_metric_exporter<R, P, C>(
    endpoint: R,
    client: P,
) -> impl Provider<MetricExporter, Error = BuildError>
where
    R: ConfigReader<String>,
    P: Provider<C>,
    C: HttpClient + 'static,
{
    bind_http(Signal::Metrics, endpoint, client, |endpoint: String, client: C| {
        MetricExporter::builder()
            .with_http()
            .with_endpoint(endpoint)
            .with_http_client(client)
            .build()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::BuildContext;
    use crate::error::ContextError;
    use crate::provider::value;
    use crate::test_support::MockHttpClient;
    use serial_test::serial;
    use tonic::transport::Endpoint;

    #[tokio::test]
    async fn test_grpc_metric_exporter_with_existing_channel() {
        let channel = Endpoint::from_static("http://127.0.0.1:4317").connect_lazy();
        let factory = grpc_metric_exporter(value(channel));
        assert!(factory.provide(&BuildContext::new()).await.is_ok());
    }

    #[tokio::test]
    async fn test_grpc_metric_exporter_channel_failure_aborts() {
        let factory = grpc_metric_exporter(|_cx: BuildContext| async {
            Err::<Channel, _>(std::io::Error::other("dial refused"))
        });
        let err = factory.provide(&BuildContext::new()).await.unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.abort().unwrap().cause().to_string(), "dial refused");
    }

    #[tokio::test]
    #[serial]
    async fn test_http_metric_exporter_with_custom_client() {
        let factory = http_metric_exporter(
            value("http://collector.local:4318/v1/metrics".to_string()),
            value(MockHttpClient::default()),
        );
        assert!(factory.provide(&BuildContext::new()).await.is_ok());
    }

    #[tokio::test]
    async fn test_http_metric_exporter_with_cancelled_context() {
        let factory = http_metric_exporter(
            value("http://collector.local:4318/v1/metrics".to_string()),
            value(MockHttpClient::default()),
        );
        let cx = BuildContext::new();
        cx.cancel();
        let err = factory.provide(&cx).await.unwrap_err();
        let abort = err.abort().unwrap();
        assert_eq!(
            abort.cause().downcast_ref::<ContextError>(),
            Some(&ContextError::Cancelled)
        );
    }
}
