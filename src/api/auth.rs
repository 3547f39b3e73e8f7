use crate::api::security::Authenticated;
use crate::domain::auth::driven_ports::IdentityGateway;
use crate::domain::auth::driving_ports::{AuthPort, SignInError, SignOutError};
use crate::domain::user::driving_ports::UserPort;
use crate::domain::user::UserResolveErr;
use crate::dto::auth::{MessageResponse, SignInRequest, SignInResponse};
use crate::dto::err_resps::{BasicError400, BasicError401, BasicError404, BasicError500};
use crate::dto::user::UserResponse;
use crate::external_connections::{ExternalConnectivity, Transactable};
use crate::routing_utils::{basic_error, GenericErrorResponse, Json, ValidationErrorResponse};
use crate::{domain, dto, persistence, AppState, SharedData};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::ErrorResponse;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;
use validator::Validate;

/// Adds the sign-in, profile, and logout endpoints. Meant to be nested under "/auth".
pub fn auth_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/signin",
            post(
                |State(app_state): AppState,
                 Json(request): Json<dto::auth::SignInRequest>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let auth_service = domain::auth::AuthService {};
                    let idp = persistence::idp_driven_ports::HttpIdentityGateway::new(Arc::clone(
                        &app_state.idp_config,
                    ));

                    sign_in(request, &mut ext_cxn, &auth_service, &idp).await
                },
            ),
        )
        .route(
            "/me",
            get(
                |State(app_state): AppState, authenticated: Authenticated| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let user_service = domain::user::UserService {};

                    current_user(authenticated, &mut ext_cxn, &user_service).await
                },
            ),
        )
        .route(
            "/logout",
            get(
                |State(app_state): AppState, authenticated: Authenticated| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let auth_service = domain::auth::AuthService {};
                    let idp = persistence::idp_driven_ports::HttpIdentityGateway::new(Arc::clone(
                        &app_state.idp_config,
                    ));

                    sign_out(authenticated, &mut ext_cxn, &auth_service, &idp).await
                },
            ),
        )
}

/// Registers this module's endpoints with the OpenAPI docs
#[derive(OpenApi)]
#[openapi(
    paths(sign_in, current_user, sign_out),
    tags(
        (name = "auth", description = "Sign-in, sign-out, and profile endpoints")
    )
)]
pub struct AuthApi;

/// Exchanges an authorization code for an access token
#[utoipa::path(
    post,
    path = "/auth/signin",
    tag = "auth",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Sign-in succeeded", body = SignInResponse),
        (status = 400, description = "Invalid request body, or the user's attributes could not be retrieved", body = BasicError400),
        (status = 401, description = "The identity provider rejected the authorization code", body = BasicError401),
        (status = 500, description = "Sign-in failed unexpectedly", body = BasicError500),
    )
)]
async fn sign_in(
    request: dto::auth::SignInRequest,
    ext_cxn: &mut (impl ExternalConnectivity + Transactable),
    auth_service: &impl AuthPort,
    idp: &impl IdentityGateway,
) -> Result<Json<dto::auth::SignInResponse>, ErrorResponse> {
    info!("Sign-in attempt with an authorization code.");
    request.validate().map_err(ValidationErrorResponse::from)?;

    let user_reader = persistence::db_user_driven_ports::DbReadUsers {};
    let user_writer = persistence::db_user_driven_ports::DbWriteUsers {};

    let issued_token = auth_service
        .sign_in(&request.code, &mut *ext_cxn, idp, &user_reader, &user_writer)
        .await
        .map_err(|sign_in_err| -> ErrorResponse {
            match sign_in_err {
                SignInError::BadCode => basic_error(
                    StatusCode::UNAUTHORIZED,
                    "invalid_code",
                    "Invalid authorization code. Please try again.",
                )
                .into(),
                SignInError::AttributesUnavailable => basic_error(
                    StatusCode::BAD_REQUEST,
                    "attributes_unavailable",
                    "Failed to retrieve user information.",
                )
                .into(),
                SignInError::PortError(cause) => {
                    GenericErrorResponse(cause.context("signing in")).into()
                }
            }
        })?;

    Ok(Json(dto::auth::SignInResponse {
        token: issued_token.into(),
        message: "Login successful.".to_owned(),
    }))
}

/// Fetches the signed-in user's profile
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "The signed-in user's profile", body = UserResponse),
        (status = 401, description = "No valid bearer token accompanied the request", body = BasicError401),
        (status = 404, description = "No user matches the token's username", body = BasicError404),
        (status = 500, description = "Profile lookup failed unexpectedly", body = BasicError500),
    ),
    security(("bearer_token" = []))
)]
async fn current_user(
    authenticated: Authenticated,
    ext_cxn: &mut impl ExternalConnectivity,
    user_service: &impl UserPort,
) -> Result<Json<dto::user::UserResponse>, ErrorResponse> {
    info!("Profile lookup for the signed-in user.");
    let user_reader = persistence::db_user_driven_ports::DbReadUsers {};

    let user = user_service
        .user_by_username(&authenticated.username, &mut *ext_cxn, &user_reader)
        .await
        .map_err(|resolve_err| -> ErrorResponse {
            match resolve_err {
                UserResolveErr::NotFound(_) => {
                    basic_error(StatusCode::NOT_FOUND, "not_found", "User not found.").into()
                }
                UserResolveErr::PortError(cause) => {
                    GenericErrorResponse(cause.context("looking up the signed-in user's profile"))
                        .into()
                }
            }
        })?;

    Ok(Json(user.into()))
}

/// Revokes the presented access token at the identity provider
#[utoipa::path(
    get,
    path = "/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "The token was revoked", body = MessageResponse),
        (status = 400, description = "The identity provider refused the revocation", body = BasicError400),
        (status = 401, description = "No valid bearer token accompanied the request", body = BasicError401),
        (status = 500, description = "The identity provider could not be reached", body = BasicError500),
    ),
    security(("bearer_token" = []))
)]
async fn sign_out(
    authenticated: Authenticated,
    ext_cxn: &mut impl ExternalConnectivity,
    auth_service: &impl AuthPort,
    idp: &impl IdentityGateway,
) -> Result<Json<dto::auth::MessageResponse>, ErrorResponse> {
    info!("Signing out the current user.");

    let sign_out_result = auth_service
        .sign_out(&authenticated.token, &mut *ext_cxn, idp)
        .await;
    match sign_out_result {
        Ok(()) => Ok(Json(dto::auth::MessageResponse {
            message: "Logout successful.".to_owned(),
        })),
        Err(SignOutError::Refused) => Err(basic_error(
            StatusCode::BAD_REQUEST,
            "logout_failed",
            "Failed to log out. Please try again.",
        )
        .into()),
        Err(SignOutError::Comms(cause)) => {
            Err(GenericErrorResponse(cause.context("signing out")).into())
        }
    }
}
