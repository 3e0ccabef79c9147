//! Configuration readers: pending reads of a typed configuration value.
//!
//! A [`ConfigReader<V>`] has the same shape as a [`Provider`](crate::Provider) and the same
//! abort policy through [`read_or_abort`]. Readers provided here:
//! - [`value`](crate::value): a fixed value
//! - [`env_var`]: a process environment variable
//! - [`otlp_endpoint`]: the standard OTLP endpoint lookup for a signal and transport
//!
//! # Environment Variables
//!
//! [`otlp_endpoint`] consults, in order:
//! - `OTEL_EXPORTER_OTLP_{TRACES,METRICS,LOGS}_ENDPOINT`: used as-is
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: base URL; the HTTP transport appends `/v1/<signal>`
//! - the transport default (`http://localhost:4317` for gRPC, `http://localhost:4318` for HTTP)

use std::convert::Infallible;
use std::env::{self, VarError};
use std::future::Future;

use futures::future::BoxFuture;

use crate::constants::{defaults, env_vars};
use crate::context::BuildContext;
use crate::error::{Abort, BoxError, ConfigError};
use crate::provider::Value;
use crate::signal::{Signal, Transport};

/// A configuration value of type `V`, read on demand from a [`BuildContext`].
pub trait ConfigReader<V>: Send + Sync {
    type Error: Into<BoxError>;

    fn read<'a>(&'a self, cx: &'a BuildContext) -> BoxFuture<'a, Result<V, Self::Error>>;
}

impl<V, F, Fut, E> ConfigReader<V> for F
where
    F: Fn(BuildContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<V, E>> + Send + 'static,
    E: Into<BoxError>,
    V: Send + 'static,
{
    type Error = E;

    fn read<'a>(&'a self, cx: &'a BuildContext) -> BoxFuture<'a, Result<V, E>> {
        Box::pin((self)(cx.clone()))
    }
}

/// Reads `reader`, turning any failure into an [`Abort`].
///
/// Same policy as [`resolve_or_abort`](crate::resolve_or_abort).
pub async fn read_or_abort<V, R>(
    cx: &BuildContext,
    setting: &'static str,
    reader: &R,
) -> Result<V, Abort>
where
    R: ConfigReader<V> + ?Sized,
{
    if let Err(e) = cx.check() {
        tracing::warn!(setting, error = %e, "context done before reading setting");
        return Err(Abort::new(setting, e));
    }
    match reader.read(cx).await {
        Ok(value) => Ok(value),
        Err(e) => {
            let abort = Abort::new(setting, e);
            tracing::warn!(setting, error = %abort.cause(), "setting could not be read");
            Err(abort)
        }
    }
}

impl<V> ConfigReader<V> for Value<V>
where
    V: Clone + Send + Sync + 'static,
{
    type Error = Infallible;

    fn read<'a>(&'a self, _cx: &'a BuildContext) -> BoxFuture<'a, Result<V, Infallible>> {
        let value = self.get().clone();
        Box::pin(async move { Ok(value) })
    }
}

/// Reads an environment variable at resolution time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVar {
    name: String,
}

/// A reader for the environment variable `name`.
pub fn env_var(name: impl Into<String>) -> EnvVar {
    EnvVar { name: name.into() }
}

impl EnvVar {
    pub fn name(&self) -> &str {
        &self.name
    }

    fn lookup(&self) -> Result<String, ConfigError> {
        match env::var(&self.name) {
            Ok(value) => Ok(value),
            Err(VarError::NotPresent) => Err(ConfigError::MissingEnvVar(self.name.clone())),
            Err(VarError::NotUnicode(_)) => Err(ConfigError::InvalidEnvVar(self.name.clone())),
        }
    }
}

impl ConfigReader<String> for EnvVar {
    type Error = ConfigError;

    fn read<'a>(&'a self, _cx: &'a BuildContext) -> BoxFuture<'a, Result<String, ConfigError>> {
        let result = self.lookup();
        Box::pin(async move { result })
    }
}

/// Resolves the collector endpoint for one signal over one transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtlpEndpoint {
    transport: Transport,
    signal: Signal,
}

/// A reader for the OTLP collector endpoint, following the standard variable precedence.
pub fn otlp_endpoint(transport: Transport, signal: Signal) -> OtlpEndpoint {
    OtlpEndpoint { transport, signal }
}

impl OtlpEndpoint {
    fn resolve(&self) -> Result<String, ConfigError> {
        if let Some(endpoint) = non_empty_var(self.signal.endpoint_env_var())? {
            return Ok(endpoint);
        }

        let base = match non_empty_var(env_vars::ENDPOINT)? {
            Some(base) => base,
            None => match self.transport {
                Transport::Grpc => defaults::GRPC_ENDPOINT.to_string(),
                Transport::Http => defaults::HTTP_ENDPOINT.to_string(),
            },
        };

        Ok(match self.transport {
            Transport::Grpc => base,
            Transport::Http => format!("{}{}", base.trim_end_matches('/'), self.signal.http_path()),
        })
    }
}

impl ConfigReader<String> for OtlpEndpoint {
    type Error = ConfigError;

    fn read<'a>(&'a self, _cx: &'a BuildContext) -> BoxFuture<'a, Result<String, ConfigError>> {
        let result = self.resolve();
        Box::pin(async move { result })
    }
}

fn non_empty_var(name: &str) -> Result<Option<String>, ConfigError> {
    match env::var(name) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value.trim().to_string())),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(ConfigError::InvalidEnvVar(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContextError;
    use crate::provider::value;
    use serial_test::serial;

    fn clear_endpoint_vars() {
        for name in [
            env_vars::ENDPOINT,
            env_vars::TRACES_ENDPOINT,
            env_vars::METRICS_ENDPOINT,
            env_vars::LOGS_ENDPOINT,
        ] {
            env::remove_var(name);
        }
    }

    #[tokio::test]
    async fn test_value_reader() {
        let cx = BuildContext::new();
        let endpoint: String = read_or_abort(&cx, "endpoint", &value("http://a:4318".to_string()))
            .await
            .unwrap();
        assert_eq!(endpoint, "http://a:4318");
    }

    #[tokio::test]
    async fn test_closure_reader() {
        let reader = |_cx: BuildContext| async { Ok::<_, ConfigError>("from-closure".to_string()) };
        let cx = BuildContext::new();
        assert_eq!(reader.read(&cx).await.unwrap(), "from-closure");
    }

    #[tokio::test]
    async fn test_read_or_abort_on_cancelled_context() {
        let cx = BuildContext::new();
        cx.cancel();
        let abort = read_or_abort::<String, _>(&cx, "endpoint", &value("x".to_string()))
            .await
            .unwrap_err();
        assert_eq!(abort.dependency(), "endpoint");
        assert_eq!(
            abort.cause().downcast_ref::<ContextError>(),
            Some(&ContextError::Cancelled)
        );
    }

    #[tokio::test]
    #[serial]
    async fn test_env_var_reader() {
        env::set_var("OTLP_FACTORIES_TEST_VAR", "value-1");
        let cx = BuildContext::new();
        let reader = env_var("OTLP_FACTORIES_TEST_VAR");
        assert_eq!(reader.name(), "OTLP_FACTORIES_TEST_VAR");
        assert_eq!(reader.read(&cx).await.unwrap(), "value-1");

        // Read at resolution time, not at construction time.
        env::set_var("OTLP_FACTORIES_TEST_VAR", "value-2");
        assert_eq!(reader.read(&cx).await.unwrap(), "value-2");
        env::remove_var("OTLP_FACTORIES_TEST_VAR");
    }

    #[tokio::test]
    #[serial]
    async fn test_env_var_missing_aborts() {
        env::remove_var("OTLP_FACTORIES_MISSING_VAR");
        let cx = BuildContext::new();
        let abort = read_or_abort(&cx, "endpoint", &env_var("OTLP_FACTORIES_MISSING_VAR"))
            .await
            .unwrap_err();
        assert_eq!(
            abort.cause().downcast_ref::<ConfigError>(),
            Some(&ConfigError::MissingEnvVar(
                "OTLP_FACTORIES_MISSING_VAR".to_string()
            ))
        );
    }

    #[tokio::test]
    #[serial]
    async fn test_otlp_endpoint_defaults() {
        clear_endpoint_vars();
        let cx = BuildContext::new();

        let grpc = otlp_endpoint(Transport::Grpc, Signal::Traces);
        assert_eq!(grpc.read(&cx).await.unwrap(), "http://localhost:4317");

        let http = otlp_endpoint(Transport::Http, Signal::Metrics);
        assert_eq!(
            http.read(&cx).await.unwrap(),
            "http://localhost:4318/v1/metrics"
        );
    }

    #[tokio::test]
    #[serial]
    async fn test_otlp_endpoint_base_variable() {
        clear_endpoint_vars();
        env::set_var(env_vars::ENDPOINT, "http://collector.local:4318/");
        let cx = BuildContext::new();

        let http = otlp_endpoint(Transport::Http, Signal::Logs);
        assert_eq!(
            http.read(&cx).await.unwrap(),
            "http://collector.local:4318/v1/logs"
        );

        let grpc = otlp_endpoint(Transport::Grpc, Signal::Logs);
        assert_eq!(grpc.read(&cx).await.unwrap(), "http://collector.local:4318/");
        clear_endpoint_vars();
    }

    #[tokio::test]
    #[serial]
    async fn test_otlp_endpoint_signal_variable_wins() {
        clear_endpoint_vars();
        env::set_var(env_vars::ENDPOINT, "http://base:4318");
        env::set_var(env_vars::TRACES_ENDPOINT, "http://traces:9999/custom");
        env::set_var(env_vars::METRICS_ENDPOINT, "   ");
        let cx = BuildContext::new();

        let traces = otlp_endpoint(Transport::Http, Signal::Traces);
        assert_eq!(traces.read(&cx).await.unwrap(), "http://traces:9999/custom");

        // Blank values count as unset.
        let metrics = otlp_endpoint(Transport::Http, Signal::Metrics);
        assert_eq!(metrics.read(&cx).await.unwrap(), "http://base:4318/v1/metrics");
        clear_endpoint_vars();
    }

    #[cfg(unix)]
    #[tokio::test]
    #[serial]
    async fn test_non_unicode_values_are_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        clear_endpoint_vars();
        let invalid = OsStr::from_bytes(&[0x66, 0x6f, 0xff]);
        env::set_var("OTLP_FACTORIES_NON_UNICODE_VAR", invalid);
        env::set_var(env_vars::LOGS_ENDPOINT, invalid);
        let cx = BuildContext::new();

        let err = env_var("OTLP_FACTORIES_NON_UNICODE_VAR")
            .read(&cx)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidEnvVar("OTLP_FACTORIES_NON_UNICODE_VAR".to_string())
        );

        let err = otlp_endpoint(Transport::Http, Signal::Logs)
            .read(&cx)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidEnvVar(env_vars::LOGS_ENDPOINT.to_string())
        );

        env::remove_var("OTLP_FACTORIES_NON_UNICODE_VAR");
        clear_endpoint_vars();
    }
}
