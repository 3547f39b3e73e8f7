use crate::external_connections::ExternalConnectivity;
use anyhow::Context;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// A user provisioned from the identity provider on first sign-in. The ID is the
/// subject claim the provider issued, not something this service generates.
#[derive(PartialEq, Eq, Debug)]
#[cfg_attr(test, derive(Clone))]
pub struct User {
    pub id: String,
    pub given_name: String,
    pub family_name: String,
    pub username: String,
    pub email: String,
    pub updated_at: DateTime<Utc>,
}

#[cfg_attr(test, derive(Clone))]
pub struct CreateUser {
    pub id: String,
    pub given_name: String,
    pub family_name: String,
    pub username: String,
    pub email: String,
}

pub mod driven_ports {
    use super::*;

    #[derive(Debug, Error)]
    pub enum CreateUserError {
        /// The storage layer's uniqueness constraints rejected the write. With
        /// concurrent first sign-ins this is the losing writer's signal that the
        /// user row already exists.
        #[error("a user with the same username or email already exists")]
        AlreadyExists,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    pub trait UserReader: Sync {
        async fn by_id(
            &self,
            id: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<User>, anyhow::Error>;
        async fn by_username(
            &self,
            username: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<User>, anyhow::Error>;
        async fn by_email(
            &self,
            email: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<User>, anyhow::Error>;
    }

    pub trait UserWriter: Sync {
        async fn create(
            &self,
            user: &CreateUser,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<User, CreateUserError>;
    }
}

#[derive(Debug, Error)]
pub enum UserResolveErr {
    #[error("user {0} does not exist")]
    NotFound(String),

    #[error(transparent)]
    PortError(#[from] anyhow::Error),
}

/// Resolves a verified username (from a bearer token) to the matching user row.
/// Every protected operation starts here to pin down the acting user.
pub(super) async fn resolve_user(
    username: &str,
    ext_cxn: &mut impl ExternalConnectivity,
    user_read: &impl driven_ports::UserReader,
) -> Result<User, UserResolveErr> {
    let maybe_user = user_read
        .by_username(username, ext_cxn)
        .await
        .context("resolving the acting user")?;

    match maybe_user {
        Some(user) => Ok(user),
        None => Err(UserResolveErr::NotFound(username.to_owned())),
    }
}

pub mod driving_ports {
    use super::*;

    pub trait UserPort {
        /// Fetches the profile of the user matching the given verified username
        async fn user_by_username(
            &self,
            username: &str,
            ext_cxn: &mut impl ExternalConnectivity,
            user_read: &impl driven_ports::UserReader,
        ) -> Result<User, UserResolveErr>;
    }
}

pub struct UserService {}

impl driving_ports::UserPort for UserService {
    async fn user_by_username(
        &self,
        username: &str,
        ext_cxn: &mut impl ExternalConnectivity,
        user_read: &impl driven_ports::UserReader,
    ) -> Result<User, UserResolveErr> {
        resolve_user(username, &mut *ext_cxn, user_read).await
    }
}
