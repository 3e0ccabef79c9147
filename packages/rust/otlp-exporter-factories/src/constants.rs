//! Constants for the otlp-exporter-factories package.
//!
//! This file centralizes the environment variable names and default values used by the
//! configuration readers, so every reader resolves endpoints the same way.

/// Environment variable names for configuration.
pub mod env_vars {
    /// Base endpoint shared by all signals.
    pub const ENDPOINT: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

    /// Endpoint for the traces signal, used as-is when set.
    pub const TRACES_ENDPOINT: &str = "OTEL_EXPORTER_OTLP_TRACES_ENDPOINT";

    /// Endpoint for the metrics signal, used as-is when set.
    pub const METRICS_ENDPOINT: &str = "OTEL_EXPORTER_OTLP_METRICS_ENDPOINT";

    /// Endpoint for the logs signal, used as-is when set.
    pub const LOGS_ENDPOINT: &str = "OTEL_EXPORTER_OTLP_LOGS_ENDPOINT";
}

/// Default values for configuration parameters.
pub mod defaults {
    /// Default collector endpoint for OTLP/gRPC.
    pub const GRPC_ENDPOINT: &str = "http://localhost:4317";

    /// Default collector endpoint for OTLP/HTTP, without the signal path.
    pub const HTTP_ENDPOINT: &str = "http://localhost:4318";
}

/// Per-signal URL paths appended to a base OTLP/HTTP endpoint.
pub mod http_paths {
    pub const TRACES: &str = "/v1/traces";
    pub const METRICS: &str = "/v1/metrics";
    pub const LOGS: &str = "/v1/logs";
}
