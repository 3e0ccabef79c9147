//! Ready-made transport producers for the exporter factories.
//!
//! The factories accept any [`Provider`] of a channel or HTTP client; these cover the common
//! cases. Wrap them in [`shared`](crate::shared) to reuse one connection for all signals:
//!
//! ```no_run
//! use otlp_exporter_factories::{
//!     grpc_channel, grpc_log_exporter, grpc_span_exporter, otlp_endpoint, shared, Signal,
//!     Transport,
//! };
//!
//! let channel = shared(grpc_channel(otlp_endpoint(Transport::Grpc, Signal::Traces)));
//! let spans = grpc_span_exporter(channel.clone());
//! let logs = grpc_log_exporter(channel);
//! ```

use std::fmt;
use std::time::Duration;

use futures::future::BoxFuture;
use tonic::transport::{Channel, Endpoint};

use crate::config::{read_or_abort, ConfigReader};
use crate::context::BuildContext;
use crate::error::TransportError;
use crate::provider::Provider;

/// Produces a [`tonic`] channel to the endpoint named by a configuration reader.
pub struct GrpcChannel<R> {
    endpoint: R,
    connect_timeout: Option<Duration>,
    lazy: bool,
}

/// A channel producer that connects eagerly on each resolution.
pub fn grpc_channel<R>(endpoint: R) -> GrpcChannel<R>
where
    R: ConfigReader<String>,
{
    GrpcChannel {
        endpoint,
        connect_timeout: None,
        lazy: false,
    }
}

impl<R> GrpcChannel<R> {
    /// Bounds the time spent establishing the connection.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Defers connecting until the first export instead of dialing during resolution.
    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }
}

impl<R> fmt::Debug for GrpcChannel<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrpcChannel")
            .field("connect_timeout", &self.connect_timeout)
            .field("lazy", &self.lazy)
            .finish_non_exhaustive()
    }
}

impl<R> Provider<Channel> for GrpcChannel<R>
where
    R: ConfigReader<String>,
{
    type Error = TransportError;

    fn provide<'a>(&'a self, cx: &'a BuildContext) -> BoxFuture<'a, Result<Channel, TransportError>> {
        Box::pin(async move {
            let endpoint = read_or_abort(cx, "grpc endpoint", &self.endpoint).await?;
            let mut builder = Endpoint::from_shared(endpoint.clone())
                .map_err(|source| TransportError::InvalidEndpoint { endpoint, source })?;
            if let Some(timeout) = self.connect_timeout {
                builder = builder.connect_timeout(timeout);
            }

            if self.lazy {
                return Ok(builder.connect_lazy());
            }

            tracing::debug!(uri = %builder.uri(), "connecting gRPC channel");
            tokio::select! {
                biased;
                reason = cx.done() => Err(reason.into()),
                result = builder.connect() => result.map_err(TransportError::Connect),
            }
        })
    }
}

/// Produces a [`reqwest::Client`], which the OTLP/HTTP exporters accept as their HTTP client.
#[derive(Debug, Clone, Default)]
pub struct ReqwestClient {
    timeout: Option<Duration>,
}

/// An HTTP client producer with reqwest's defaults.
pub fn reqwest_client() -> ReqwestClient {
    ReqwestClient::default()
}

impl ReqwestClient {
    /// Total timeout applied to every request the client sends.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Provider<reqwest::Client> for ReqwestClient {
    type Error = TransportError;

    fn provide<'a>(
        &'a self,
        _cx: &'a BuildContext,
    ) -> BoxFuture<'a, Result<reqwest::Client, TransportError>> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let result = builder.build().map_err(TransportError::from);
        Box::pin(async move { result })
    }
}
