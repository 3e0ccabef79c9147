//! # otlp-exporter-factories
//!
//! `otlp-exporter-factories` produces OpenTelemetry OTLP exporters for traces, metrics and
//! logs, over gRPC and HTTP, as *deferred providers*: values that describe how to build an
//! exporter and do so only when resolved with a [`BuildContext`].
//!
//! ## Main Components
//!
//! - [`Provider`] and [`ConfigReader`]: "given a context, produce a value" abstractions. Any
//!   async closure `Fn(BuildContext) -> Result<T, E>` qualifies.
//! - [`resolve_or_abort`] / [`read_or_abort`]: resolve a dependency, turning its failure into
//!   an unrecoverable [`Abort`] that factories pass up with `?`.
//! - The six factories: [`grpc_span_exporter`], [`http_span_exporter`],
//!   [`grpc_metric_exporter`], [`http_metric_exporter`], [`grpc_log_exporter`],
//!   [`http_log_exporter`].
//! - [`transport`]: ready-made channel and HTTP client providers, and [`shared`] to reuse one
//!   connection across signals.
//! - [`bootstrap`]: the top-level catch that classifies failures.
//!
//! ## Example
//!
//! ```rust,no_run
//! use otlp_exporter_factories::bootstrap::materialize;
//! use otlp_exporter_factories::{
//!     grpc_channel, grpc_metric_exporter, grpc_span_exporter, otlp_endpoint, shared,
//!     BuildContext, Signal, Transport,
//! };
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // One channel for both signals, dialed on first use.
//!     let channel = shared(grpc_channel(otlp_endpoint(Transport::Grpc, Signal::Traces)));
//!
//!     let spans = grpc_span_exporter(channel.clone());
//!     let metrics = grpc_metric_exporter(channel);
//!
//!     let cx = BuildContext::new().with_timeout(Duration::from_secs(10));
//!     let span_exporter = materialize("spans", &cx, &spans).await?;
//!     let metric_exporter = materialize("metrics", &cx, &metrics).await?;
//!     # drop((span_exporter, metric_exporter));
//!     Ok(())
//! }
//! ```
//!
//! ## Errors
//!
//! Resolving a factory fails with [`BuildError`]:
//! - [`BuildError::Aborted`] when a dependency could not be resolved. The build should stop.
//! - [`BuildError::Context`] when the context was cancelled or timed out before construction.
//! - [`BuildError::Construct`] when the OTLP exporter rejected its inputs. May be retried.
//!
//! Providers are not memoized: each resolution runs the dependency providers again unless
//! they are wrapped in [`shared`].

pub mod binding;
pub mod bootstrap;
pub mod config;
pub mod constants;
mod context;
mod error;
mod logs;
mod metrics;
mod provider;
mod signal;
mod traces;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use binding::{bind_grpc, bind_http, GrpcBinding, HttpBinding};
pub use config::{env_var, otlp_endpoint, read_or_abort, ConfigReader, EnvVar, OtlpEndpoint};
pub use context::BuildContext;
pub use error::{Abort, BoxError, BuildError, ConfigError, ContextError, TransportError};
pub use logs::{grpc_log_exporter, http_log_exporter};
pub use metrics::{grpc_metric_exporter, http_metric_exporter};
pub use provider::{resolve_or_abort, shared, value, Provider, Shared, Value};
pub use signal::{Signal, Transport};
pub use traces::{grpc_span_exporter, http_span_exporter};
pub use transport::{grpc_channel, reqwest_client, GrpcChannel, ReqwestClient};
