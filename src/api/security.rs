use crate::external_connections::ExternalConnectivity;
use crate::routing_utils::basic_error;
use crate::token_verifier::TokenError;
use crate::SharedData;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::Response;
use std::sync::Arc;
use tracing::{error, info};

/// Extractor for endpoints that require a signed-in user. Verifies the request's bearer
/// token before the handler runs and rejects the request with a 401 otherwise.
#[cfg_attr(test, derive(Debug))]
pub struct Authenticated {
    /// The username claim from the verified token
    pub username: String,
    /// The raw bearer token, for endpoints that forward it to the identity provider
    pub token: String,
}

fn not_authenticated() -> Response {
    basic_error(
        StatusCode::UNAUTHORIZED,
        "not_authenticated",
        "This endpoint requires a bearer token.",
    )
}

#[axum::async_trait]
impl FromRequestParts<Arc<SharedData>> for Authenticated {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<SharedData>,
    ) -> Result<Self, Self::Rejection> {
        let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) else {
            return Err(not_authenticated());
        };
        let Ok(header_text) = auth_header.to_str() else {
            return Err(not_authenticated());
        };
        let Some(token) = header_text.strip_prefix("Bearer ") else {
            return Err(not_authenticated());
        };

        let claims = state
            .token_verifier
            .verify(token, state.ext_cxn.http_client())
            .await
            .map_err(|verify_err| match verify_err {
                TokenError::KeySetUnavailable(cause) => {
                    error!("Could not retrieve the identity provider's key set: {cause:#}");
                    basic_error(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal_error",
                        "Could not access data to complete your request",
                    )
                }
                rejection => {
                    info!("Rejected a bearer token: {rejection}");
                    basic_error(
                        StatusCode::UNAUTHORIZED,
                        "invalid_token",
                        "The provided bearer token could not be verified.",
                    )
                }
            })?;

        Ok(Authenticated {
            username: claims.username,
            token: token.to_owned(),
        })
    }
}
