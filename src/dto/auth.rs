use crate::domain;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// DTO carrying the authorization code a frontend received from the identity provider
#[derive(Deserialize, Validate, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct SignInRequest {
    #[validate(length(min = 1))]
    #[schema(example = "SplxlOBeZQQYbYS6WxSbIA")]
    pub code: String,
}

/// DTO for an access token issued at sign-in
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct TokenDto {
    pub token: String,
    /// Seconds until the token expires
    #[schema(example = 3600)]
    pub expires_in: i64,
}

impl From<domain::auth::IssuedToken> for TokenDto {
    fn from(value: domain::auth::IssuedToken) -> Self {
        TokenDto {
            token: value.token,
            expires_in: value.expires_in,
        }
    }
}

/// DTO for a successful sign-in
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct SignInResponse {
    pub token: TokenDto,
    #[schema(example = "Login successful.")]
    pub message: String,
}

/// DTO for endpoints that only report a human-readable outcome
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct MessageResponse {
    #[schema(example = "Logout successful.")]
    pub message: String,
}
