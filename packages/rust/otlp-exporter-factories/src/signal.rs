//! Telemetry signals and OTLP transports.

use std::fmt;

use crate::constants::{env_vars, http_paths};

/// One of the three OpenTelemetry signals, each with its own OTLP exporter type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Traces,
    Metrics,
    Logs,
}

impl Signal {
    /// Name of the signal-specific endpoint environment variable.
    pub fn endpoint_env_var(self) -> &'static str {
        match self {
            Signal::Traces => env_vars::TRACES_ENDPOINT,
            Signal::Metrics => env_vars::METRICS_ENDPOINT,
            Signal::Logs => env_vars::LOGS_ENDPOINT,
        }
    }

    /// Path appended to a base OTLP/HTTP endpoint for this signal.
    pub fn http_path(self) -> &'static str {
        match self {
            Signal::Traces => http_paths::TRACES,
            Signal::Metrics => http_paths::METRICS,
            Signal::Logs => http_paths::LOGS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Signal::Traces => "traces",
            Signal::Metrics => "metrics",
            Signal::Logs => "logs",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport an OTLP exporter sends over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    Grpc,
    Http,
}

impl Transport {
    pub fn as_str(self) -> &'static str {
        match self {
            Transport::Grpc => "grpc",
            Transport::Http => "http",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
