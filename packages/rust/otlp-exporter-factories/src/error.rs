//! Error types shared by producers, configuration readers and exporter bindings.

use thiserror::Error;

/// Type-erased error returned by dependency producers and exporter constructors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Reasons a [`BuildContext`](crate::BuildContext) stops a build.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    #[error("build context was cancelled")]
    Cancelled,

    #[error("build context deadline exceeded")]
    DeadlineExceeded,
}

/// Unrecoverable failure to resolve a dependency.
///
/// Returned by [`resolve_or_abort`](crate::resolve_or_abort) and
/// [`read_or_abort`](crate::read_or_abort). Factories propagate it with `?` without
/// inspecting it; only the top level of a build (see [`crate::bootstrap`]) handles it.
#[derive(Error, Debug)]
#[error("aborted while resolving {dependency}: {cause}")]
pub struct Abort {
    dependency: &'static str,
    #[source]
    cause: BoxError,
}

impl Abort {
    pub fn new(dependency: &'static str, cause: impl Into<BoxError>) -> Self {
        Self {
            dependency,
            cause: cause.into(),
        }
    }

    /// Name of the dependency that failed to resolve.
    pub fn dependency(&self) -> &'static str {
        self.dependency
    }

    /// The producer's (or the context's) original error.
    pub fn cause(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.cause.as_ref()
    }

    pub fn into_cause(self) -> BoxError {
        self.cause
    }
}

/// Errors returned by the exporter producers.
///
/// Cancellation is reported differently depending on when it is observed. A context that
/// is already done when a dependency is about to be resolved yields [`BuildError::Aborted`]
/// (fatal). A context that becomes done after the dependencies resolved but before the
/// constructor runs yields [`BuildError::Context`], which a caller may retry with a fresh
/// context.
#[derive(Error, Debug)]
pub enum BuildError {
    /// A dependency failed; the enclosing build must not continue.
    #[error(transparent)]
    Aborted(#[from] Abort),

    /// The context was done before the exporter constructor ran. Not fatal.
    #[error("exporter not constructed: {0}")]
    Context(#[from] ContextError),

    /// The OTLP exporter constructor rejected its inputs. May be retried.
    #[error("failed to construct exporter: {0}")]
    Construct(#[source] BoxError),
}

impl BuildError {
    /// Whether this error came through the unrecoverable abort channel.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BuildError::Aborted(_))
    }

    pub fn abort(&self) -> Option<&Abort> {
        match self {
            BuildError::Aborted(abort) => Some(abort),
            _ => None,
        }
    }
}

/// Errors returned by the built-in configuration readers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingEnvVar(String),

    #[error("environment variable {0} is not valid unicode")]
    InvalidEnvVar(String),
}

/// Errors returned by the built-in transport producers.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("invalid gRPC endpoint {endpoint:?}: {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: tonic::transport::Error,
    },

    #[error("failed to connect gRPC channel: {0}")]
    Connect(#[source] tonic::transport::Error),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error(transparent)]
    Aborted(#[from] Abort),
}
