/// URL for accessing the PostgreSQL database (should contain a schema name in the path)
pub const DB_URL: &str = "DATABASE_URL";
/// Log level configuration for the application. Accepts tracing-subscriber env-filter directives.
pub const LOG_LEVEL: &str = "LOG_LEVEL";
/// Address and port the HTTP server binds to. Defaults to 0.0.0.0:8080 when unset.
pub const LISTEN_ADDR: &str = "LISTEN_ADDR";

/// OpenTelemetry span export URL. Should be http://localhost:4317 by default, as the service should
/// have an OpenTelemetry collector sidecar which directs metrics to the correct place
pub const OTEL_SPAN_EXPORT_URL: &str = "OTEL_SPAN_EXPORT_URL";
/// OpenTelemetry metrics export URL. Should be http://localhost:4317 by default, as the service should
/// have an OpenTelemetry collector sidecar which directs metrics to the correct place
pub const OTEL_METRIC_EXPORT_URL: &str = "OTEL_METRIC_EXPORT_URL";

/// OAuth2 client ID registered with the identity provider
pub const IDP_CLIENT_ID: &str = "IDP_CLIENT_ID";
/// OAuth2 client secret paired with [IDP_CLIENT_ID]
pub const IDP_CLIENT_SECRET: &str = "IDP_CLIENT_SECRET";
/// Token endpoint used for the authorization-code exchange
pub const IDP_TOKEN_ENDPOINT: &str = "IDP_TOKEN_ENDPOINT";
/// Userinfo endpoint queried with a freshly issued access token
pub const IDP_USER_INFO_ENDPOINT: &str = "IDP_USER_INFO_ENDPOINT";
/// Global sign-out endpoint used to revoke an access token on logout
pub const IDP_SIGN_OUT_ENDPOINT: &str = "IDP_SIGN_OUT_ENDPOINT";
/// URL the identity provider publishes its JSON Web Key Set at
pub const IDP_JWKS_URL: &str = "IDP_JWKS_URL";
/// Redirect URI the frontend used during login, echoed back during the code exchange
pub const IDP_REDIRECT_URI: &str = "IDP_REDIRECT_URI";
