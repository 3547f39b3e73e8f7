use axum::extract::State;
use axum::Router;
use dotenv::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::persistence::idp_driven_ports::IdpConfig;
use crate::token_verifier::TokenVerifier;

mod api;
mod app_env;
mod domain;
mod dto;
mod external_connections;
#[cfg(all(test, feature = "integration_test"))]
mod integration_test;
mod logging;
mod persistence;
mod routing_utils;
mod token_verifier;

/// Application state shared by every request handler. Constructed once at startup
/// and passed by reference so no handler depends on ambient global state.
pub struct SharedData {
    pub ext_cxn: persistence::ExternalConnectivity,
    pub idp_config: Arc<IdpConfig>,
    pub token_verifier: TokenVerifier,
}

pub type AppState = State<Arc<SharedData>>;

#[tokio::main]
async fn main() {
    dotenv().ok();

    let env_filter = logging::init_env_filter();
    let otel_exporters = match (
        env::var(app_env::OTEL_SPAN_EXPORT_URL),
        env::var(app_env::OTEL_METRIC_EXPORT_URL),
    ) {
        (Ok(span_url), Ok(metric_url)) => Some(logging::init_exporters(&span_url, &metric_url)),
        _ => None,
    };
    logging::setup_logging_and_tracing(env_filter, otel_exporters);

    let db_url = env::var(app_env::DB_URL).expect("DATABASE_URL must be set");
    let db_pool = PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(2))
        .connect(&db_url)
        .await
        .expect("could not connect to the database");

    let idp_config = Arc::new(IdpConfig::from_env().expect("identity provider config incomplete"));
    let token_verifier = TokenVerifier::new(idp_config.jwks_url.clone());

    let shared_data = Arc::new(SharedData {
        ext_cxn: persistence::ExternalConnectivity::new(db_pool),
        idp_config,
        token_verifier,
    });

    let router = Router::new()
        .nest("/auth", api::auth::auth_routes())
        .merge(api::task::task_routes())
        .merge(api::swagger_main::build_documentation())
        .with_state(Arc::clone(&shared_data));
    let router = logging::attach_tracing_http(router);

    let listen_addr =
        env::var(app_env::LISTEN_ADDR).unwrap_or_else(|_| String::from("0.0.0.0:8080"));
    info!("Starting server on {listen_addr}.");

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .expect("could not bind the server port");
    axum::serve(listener, router)
        .await
        .expect("server startup failed");
}
