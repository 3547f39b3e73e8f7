use crate::domain;
use crate::domain::user::{CreateUser, User};
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error};
use chrono::{DateTime, Utc};
use sqlx::error::ErrorKind;
use sqlx::query_as;

pub struct DbReadUsers {}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    given_name: String,
    family_name: String,
    username: String,
    email: String,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(value: UserRow) -> Self {
        User {
            id: value.id,
            given_name: value.given_name,
            family_name: value.family_name,
            username: value.username,
            email: value.email,
            updated_at: value.updated_at,
        }
    }
}

impl domain::user::driven_ports::UserReader for DbReadUsers {
    async fn by_id(
        &self,
        id: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<User>, Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        let user = query_as::<_, UserRow>("SELECT u.* FROM users u WHERE u.id = $1")
            .bind(id)
            .fetch_optional(cxn_handle.borrow_connection())
            .await
            .context("Fetching a user by id")?;

        Ok(user.map(User::from))
    }

    async fn by_username(
        &self,
        username: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<User>, Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        let user = query_as::<_, UserRow>("SELECT u.* FROM users u WHERE u.username = $1")
            .bind(username)
            .fetch_optional(cxn_handle.borrow_connection())
            .await
            .context("Fetching a user by username")?;

        Ok(user.map(User::from))
    }

    async fn by_email(
        &self,
        email: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<User>, Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        let user = query_as::<_, UserRow>("SELECT u.* FROM users u WHERE u.email = $1")
            .bind(email)
            .fetch_optional(cxn_handle.borrow_connection())
            .await
            .context("Fetching a user by email")?;

        Ok(user.map(User::from))
    }
}

pub struct DbWriteUsers {}

impl domain::user::driven_ports::UserWriter for DbWriteUsers {
    async fn create(
        &self,
        user: &CreateUser,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<User, domain::user::driven_ports::CreateUserError> {
        let mut cxn_handle = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        let insert_result = query_as::<_, UserRow>(
            "INSERT INTO users(id, given_name, family_name, username, email, updated_at) \
             VALUES ($1, $2, $3, $4, $5, now()) \
             RETURNING *",
        )
        .bind(&user.id)
        .bind(&user.given_name)
        .bind(&user.family_name)
        .bind(&user.username)
        .bind(&user.email)
        .fetch_one(cxn_handle.borrow_connection())
        .await;

        match insert_result {
            Ok(created_row) => Ok(User::from(created_row)),
            Err(sqlx_err) => {
                let is_unique_violation = sqlx_err
                    .as_database_error()
                    .is_some_and(|db_err| db_err.kind() == ErrorKind::UniqueViolation);
                if is_unique_violation {
                    Err(domain::user::driven_ports::CreateUserError::AlreadyExists)
                } else {
                    Err(domain::user::driven_ports::CreateUserError::PortError(
                        Error::from(sqlx_err).context("Inserting new user"),
                    ))
                }
            }
        }
    }
}
