//! Binding of transport dependencies to an exporter constructor.
//!
//! [`bind_grpc`] and [`bind_http`] are what the signal factories are made of. They are
//! public so other constructors (a custom exporter, or a fake in tests) can be bound with
//! exactly the same resolution order, abort policy and context handling.
//!
//! Resolution of a binding:
//! 1. dependencies are resolved with [`resolve_or_abort`] / [`read_or_abort`]; a failure is
//!    returned as [`BuildError::Aborted`]
//! 2. the context is checked; a done context is returned as [`BuildError::Context`] and the
//!    constructor is not called
//! 3. the constructor runs; its failure is returned as [`BuildError::Construct`]

use std::fmt;
use std::marker::PhantomData;

use futures::future::BoxFuture;

use crate::config::{read_or_abort, ConfigReader};
use crate::context::BuildContext;
use crate::error::{BoxError, BuildError};
use crate::provider::{resolve_or_abort, Provider};
use crate::signal::{Signal, Transport};

/// Dependency names reported in [`Abort`](crate::Abort)s.
pub mod dependencies {
    pub const GRPC_CHANNEL: &str = "grpc channel";
    pub const HTTP_ENDPOINT: &str = "http endpoint";
    pub const HTTP_CLIENT: &str = "http client";
}

/// An exporter bound to a channel producer. Created by [`bind_grpc`].
pub struct GrpcBinding<P, F, Ch> {
    signal: Signal,
    channel: P,
    construct: F,
    _channel: PhantomData<fn() -> Ch>,
}

/// Binds `construct` to the channel produced by `channel`.
///
/// Nothing is resolved until the returned provider is.
pub fn bind_grpc<Ch, Ex, X, P, F>(signal: Signal, channel: P, construct: F) -> GrpcBinding<P, F, Ch>
where
    P: Provider<Ch>,
    F: Fn(Ch) -> Result<Ex, X> + Send + Sync,
    X: Into<BoxError>,
{
    GrpcBinding {
        signal,
        channel,
        construct,
        _channel: PhantomData,
    }
}

impl<P, F, Ch> GrpcBinding<P, F, Ch> {
    pub fn signal(&self) -> Signal {
        self.signal
    }
}

impl<P, F, Ch> fmt::Debug for GrpcBinding<P, F, Ch> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrpcBinding")
            .field("signal", &self.signal)
            .finish_non_exhaustive()
    }
}

impl<P, F, Ch, Ex, X> Provider<Ex> for GrpcBinding<P, F, Ch>
where
    P: Provider<Ch>,
    F: Fn(Ch) -> Result<Ex, X> + Send + Sync,
    X: Into<BoxError>,
    Ch: Send + 'static,
    Ex: Send + 'static,
{
    type Error = BuildError;

    fn provide<'a>(&'a self, cx: &'a BuildContext) -> BoxFuture<'a, Result<Ex, BuildError>> {
        Box::pin(async move {
            tracing::debug!(signal = %self.signal, transport = %Transport::Grpc, "resolving exporter dependencies");
            let channel = resolve_or_abort(cx, dependencies::GRPC_CHANNEL, &self.channel).await?;
            construct(self.signal, Transport::Grpc, cx, || (self.construct)(channel))
        })
    }
}

/// An exporter bound to an endpoint reader and an HTTP client producer. Created by [`bind_http`].
pub struct HttpBinding<R, P, F, C> {
    signal: Signal,
    endpoint: R,
    client: P,
    construct: F,
    _client: PhantomData<fn() -> C>,
}

/// Binds `construct` to the endpoint read by `endpoint` and the client produced by `client`.
///
/// The endpoint is resolved first. Nothing is resolved until the returned provider is.
pub fn bind_http<C, Ex, X, R, P, F>(
    signal: Signal,
    endpoint: R,
    client: P,
    construct: F,
) -> HttpBinding<R, P, F, C>
where
    R: ConfigReader<String>,
    P: Provider<C>,
    F: Fn(String, C) -> Result<Ex, X> + Send + Sync,
    X: Into<BoxError>,
{
    HttpBinding {
        signal,
        endpoint,
        client,
        construct,
        _client: PhantomData,
    }
}

impl<R, P, F, C> HttpBinding<R, P, F, C> {
    pub fn signal(&self) -> Signal {
        self.signal
    }
}

impl<R, P, F, C> fmt::Debug for HttpBinding<R, P, F, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpBinding")
            .field("signal", &self.signal)
            .finish_non_exhaustive()
    }
}

impl<R, P, F, C, Ex, X> Provider<Ex> for HttpBinding<R, P, F, C>
where
    R: ConfigReader<String>,
    P: Provider<C>,
    F: Fn(String, C) -> Result<Ex, X> + Send + Sync,
    X: Into<BoxError>,
    C: Send + 'static,
    Ex: Send + 'static,
{
    type Error = BuildError;

    fn provide<'a>(&'a self, cx: &'a BuildContext) -> BoxFuture<'a, Result<Ex, BuildError>> {
        Box::pin(async move {
            tracing::debug!(signal = %self.signal, transport = %Transport::Http, "resolving exporter dependencies");
            let endpoint = read_or_abort(cx, dependencies::HTTP_ENDPOINT, &self.endpoint).await?;
            let client = resolve_or_abort(cx, dependencies::HTTP_CLIENT, &self.client).await?;
            tracing::debug!(signal = %self.signal, endpoint = %endpoint, "binding OTLP/HTTP exporter");
            construct(self.signal, Transport::Http, cx, || (self.construct)(endpoint, client))
        })
    }
}

fn construct<Ex, X>(
    signal: Signal,
    transport: Transport,
    cx: &BuildContext,
    f: impl FnOnce() -> Result<Ex, X>,
) -> Result<Ex, BuildError>
where
    X: Into<BoxError>,
{
    if let Err(e) = cx.check() {
        tracing::warn!(%signal, %transport, error = %e, "context done before constructing exporter");
        return Err(e.into());
    }
    match f() {
        Ok(exporter) => {
            tracing::debug!(%signal, %transport, "constructed OTLP exporter");
            Ok(exporter)
        }
        Err(e) => {
            let e = e.into();
            tracing::warn!(%signal, %transport, error = %e, "OTLP exporter construction failed");
            Err(BuildError::Construct(e))
        }
    }
}
