//! Factories for OTLP trace exporters.
//!
//! # Examples
//!
//! ```no_run
//! use otlp_exporter_factories::{
//!     http_span_exporter, otlp_endpoint, reqwest_client, BuildContext, Provider, Signal,
//!     Transport,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let factory = http_span_exporter(
//!     otlp_endpoint(Transport::Http, Signal::Traces),
//!     reqwest_client(),
//! );
//!
//! let exporter = factory.provide(&BuildContext::new()).await?;
//! # drop(exporter);
//! # Ok(())
//! # }
//! ```

use opentelemetry_http::HttpClient;
use opentelemetry_otlp::{SpanExporter, WithExportConfig, WithHttpConfig, WithTonicConfig};
use tonic::transport::Channel;

use crate::binding::{bind_grpc, bind_http};
use crate::config::ConfigReader;
use crate::error::BuildError;
use crate::provider::Provider;
use crate::signal::Signal;

/// An OTLP/gRPC span exporter riding the channel produced by `channel`.
pub fn grpc_span_exporter<P>(channel: P) -> impl Provider<SpanExporter, Error = BuildError>
where
    P: Provider<Channel>,
{
    bind_grpc(Signal::Traces, channel, |channel: Channel| {
        SpanExporter::builder()
            .with_tonic()
            .with_channel(channel)
            .build()
    })
}

/// An OTLP/HTTP span exporter sending to `endpoint` through the client produced by `client`.
pub fn http_span_exporter<R, P, C>(
    endpoint: R,
    client: P,
) -> impl Provider<SpanExporter, Error = BuildError>
where
    R: ConfigReader<String>,
    P: Provider<C>,
    C: HttpClient + 'static,
{
    bind_http(Signal::Traces, endpoint, client, |endpoint: String, client: C| {
        SpanExporter::builder()
            .with_http()
            .with_endpoint(endpoint)
            .with_http_client(client)
            .build()
    })
}
