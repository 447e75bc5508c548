/// URL for accessing the PostgreSQL database (should contain a schema name in the path)
pub const DB_URL: &str = "DATABASE_URL";
/// Log level configuration for the application. Uses the same directive syntax as
/// [tracing_subscriber::EnvFilter]
pub const LOG_LEVEL: &str = "LOG_LEVEL";
/// Port the HTTP API listens on. Defaults to 8080 when unset
pub const SERVER_PORT: &str = "SERVER_PORT";

/// Username every API request must present in the `username` header
pub const API_USERNAME: &str = "API_USERNAME";
/// Password every API request must present in the `password` header
pub const API_PASSWORD: &str = "API_PASSWORD";

/// OpenTelemetry span export URL. Should be http://localhost:4317 by default, as the service should
/// have an OpenTelemetry collector sidecar which directs metrics to the correct place
pub const OTEL_SPAN_EXPORT_URL: &str = "OTEL_SPAN_EXPORT_URL";
/// OpenTelemetry metrics export URL. Should be http://localhost:4317 by default, as the service should
/// have an OpenTelemetry collector sidecar which directs metrics to the correct place
pub const OTEL_METRIC_EXPORT_URL: &str = "OTEL_METRIC_EXPORT_URL";
