use crate::domain;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// DTO for the signed-in user's profile
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, PartialEq, Eq, Debug))]
pub struct UserResponse {
    #[schema(example = "1a9f5bc8-0e3d-4bfa-9adf-3f2c2e78bb0a")]
    pub id: String,
    #[schema(example = "John")]
    pub given_name: String,
    #[schema(example = "Doe")]
    pub family_name: String,
    #[schema(example = "jdoe")]
    pub username: String,
    #[schema(example = "jdoe@example.com")]
    pub email: String,
}

impl From<domain::user::User> for UserResponse {
    fn from(value: domain::user::User) -> Self {
        UserResponse {
            id: value.id,
            given_name: value.given_name,
            family_name: value.family_name,
            username: value.username,
            email: value.email,
        }
    }
}
