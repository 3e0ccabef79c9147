//! Top-level materialization of deferred providers.
//!
//! Factories never handle an [`Abort`]; they pass it up with `?`. This is where it ends: at
//! application start each registered provider is materialized here, and the result is
//! classified into a structured [`BootstrapError`].
//!
//! ```no_run
//! use otlp_exporter_factories::bootstrap::materialize;
//! use otlp_exporter_factories::{
//!     grpc_channel, grpc_span_exporter, otlp_endpoint, BuildContext, Signal, Transport,
//! };
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cx = BuildContext::new().with_timeout(Duration::from_secs(10));
//! let factory = grpc_span_exporter(grpc_channel(otlp_endpoint(Transport::Grpc, Signal::Traces)));
//! let exporter = materialize("span-exporter", &cx, &factory).await?;
//! # drop(exporter);
//! # Ok(())
//! # }
//! ```

use std::error::Error as _;

use thiserror::Error;

use crate::context::BuildContext;
use crate::error::{Abort, BoxError, BuildError, TransportError};
use crate::provider::Provider;

/// Structured outcome of a failed materialization.
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// A dependency of the component could not be resolved. Not worth retrying.
    #[error("component {component} aborted: {source}")]
    Fatal {
        component: String,
        #[source]
        source: Abort,
    },

    /// The component itself failed to build. The caller may retry.
    #[error("component {component} failed: {source}")]
    Failed {
        component: String,
        #[source]
        source: BoxError,
    },
}

impl BootstrapError {
    pub fn component(&self) -> &str {
        match self {
            BootstrapError::Fatal { component, .. } | BootstrapError::Failed { component, .. } => {
                component
            }
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, BootstrapError::Fatal { .. })
    }
}

/// Resolves `provider` for the named component and classifies any failure.
pub async fn materialize<T, P>(
    component: &str,
    cx: &BuildContext,
    provider: &P,
) -> Result<T, BootstrapError>
where
    P: Provider<T> + ?Sized,
{
    match provider.provide(cx).await {
        Ok(value) => {
            tracing::debug!(component, "component materialized");
            Ok(value)
        }
        Err(e) => {
            let err = classify(component, e.into());
            if err.is_fatal() {
                tracing::error!(component, error = %err, "component aborted");
            } else {
                tracing::warn!(component, error = %err, "component failed");
            }
            Err(err)
        }
    }
}

fn classify(component: &str, error: BoxError) -> BootstrapError {
    let component = component.to_string();
    match take_abort(error) {
        Ok(source) => BootstrapError::Fatal { component, source },
        Err(source) => BootstrapError::Failed { component, source },
    }
}

/// Extracts the [`Abort`] carried by `error`, directly or anywhere in its source chain.
fn take_abort(error: BoxError) -> Result<Abort, BoxError> {
    let error = match error.downcast::<Abort>() {
        Ok(abort) => return Ok(*abort),
        Err(error) => error,
    };
    let error = match error.downcast::<BuildError>() {
        Ok(build) => match *build {
            BuildError::Aborted(abort) => return Ok(abort),
            other => Box::new(other) as BoxError,
        },
        Err(error) => error,
    };
    let error = match error.downcast::<TransportError>() {
        Ok(transport) => match *transport {
            TransportError::Aborted(abort) => return Ok(abort),
            other => Box::new(other) as BoxError,
        },
        Err(error) => error,
    };

    // Errors from caller-defined providers may wrap an abort we cannot take by value.
    let dependency = {
        let mut source = error.source();
        let mut found = None;
        while let Some(inner) = source {
            if let Some(abort) = inner.downcast_ref::<Abort>() {
                found = Some(abort.dependency());
                break;
            }
            source = inner.source();
        }
        found
    };
    match dependency {
        Some(dependency) => Ok(Abort::new(dependency, error)),
        None => Err(error),
    }
}
