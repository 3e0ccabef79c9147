//! Factories for OTLP log exporters.

use opentelemetry_http::HttpClient;
use opentelemetry_otlp::{LogExporter, WithExportConfig, WithHttpConfig, WithTonicConfig};
use tonic::transport::Channel;

use crate::binding::{bind_grpc, bind_http};
use crate::config::ConfigReader;
use crate::error::BuildError;
use crate::provider::Provider;
use crate::signal::Signal;

/// An OTLP/gRPC log exporter riding the channel produced by `channel`.
pub fn grpc_log_exporter<P>(channel: P) -> impl Provider<LogExporter, Error = BuildError>
where
    P: Provider<Channel>,
{
    bind_grpc(Signal::Logs, channel, |channel: Channel| {
        LogExporter::builder()
            .with_tonic()
            .with_channel(channel)
            .build()
    })
}

/// An OTLP/HTTP log exporter sending to `endpoint` through the client produced by `client`.
pub fn http_log_exporter<R, P, C>(endpoint: R, client: P) -> impl Provider<LogExporter, Error = BuildError>
where
    R: ConfigReader<String>,
    P: Provider<C>,
    C: HttpClient + 'static,
{
    bind_http(Signal::Logs, endpoint, client, |endpoint: String, client: C| {
        LogExporter::builder()
            .with_http()
            .with_endpoint(endpoint)
            .with_http_client(client)
            .build()
    })
}
