use crate::domain::auth::driven_ports::IdentityGateway;
use crate::domain::user;
use crate::domain::user::driven_ports::{CreateUserError, UserReader, UserWriter};
use crate::external_connections::{ExternalConnectivity, Transactable, TransactionHandle};
use anyhow::Context;
use tracing::info;

/// Profile attributes the identity provider reports for an authenticated user
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(test, derive(Clone))]
pub struct UserAttributes {
    pub sub: String,
    pub given_name: String,
    pub family_name: String,
    pub username: String,
    pub email: String,
}

/// An access token minted by the identity provider in exchange for an authorization code
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
}

/// Result of asking the identity provider to revoke a token
#[derive(Debug)]
pub enum RevokeOutcome {
    Revoked,
    /// The provider answered but declined the revocation
    Denied,
    /// The provider could not be reached at all
    TransportFailure(anyhow::Error),
}

pub mod driven_ports {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum CodeExchangeError {
        /// The provider answered and refused the code
        #[error("the identity provider rejected the authorization code")]
        Rejected,
        #[error(transparent)]
        Comms(#[from] anyhow::Error),
    }

    #[derive(Debug, Error)]
    pub enum AttributeLookupError {
        /// The provider answered but would not produce attributes for the token
        #[error("the identity provider rejected the access token")]
        Rejected,
        #[error(transparent)]
        Comms(#[from] anyhow::Error),
    }

    /// Outbound connection to the OAuth identity provider
    pub trait IdentityGateway: Sync {
        async fn exchange_code(
            &self,
            code: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<IssuedToken, CodeExchangeError>;

        async fn user_attributes(
            &self,
            access_token: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<UserAttributes, AttributeLookupError>;

        async fn revoke_token(
            &self,
            access_token: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> RevokeOutcome;
    }
}

pub mod driving_ports {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum SignInError {
        #[error("the authorization code was not accepted")]
        BadCode,
        #[error("could not retrieve the signed-in user's attributes")]
        AttributesUnavailable,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    #[derive(Debug, Error)]
    pub enum SignOutError {
        #[error("the identity provider refused to revoke the token")]
        Refused,
        #[error(transparent)]
        Comms(#[from] anyhow::Error),
    }


    pub trait AuthPort {
        /// Exchanges an authorization code for an access token, provisioning a local
        /// user row for first-time sign-ins
        async fn sign_in(
            &self,
            code: &str,
            ext_cxn: &mut (impl ExternalConnectivity + Transactable),
            idp: &impl driven_ports::IdentityGateway,
            user_read: &impl UserReader,
            user_write: &impl UserWriter,
        ) -> Result<IssuedToken, SignInError>;

        /// Revokes the given access token at the identity provider
        async fn sign_out(
            &self,
            access_token: &str,
            ext_cxn: &mut impl ExternalConnectivity,
            idp: &impl driven_ports::IdentityGateway,
        ) -> Result<(), SignOutError>;
    }
}

pub struct AuthService {}

impl driving_ports::AuthPort for AuthService {
    async fn sign_in(
        &self,
        code: &str,
        ext_cxn: &mut (impl ExternalConnectivity + Transactable),
        idp: &impl IdentityGateway,
        user_read: &impl UserReader,
        user_write: &impl UserWriter,
    ) -> Result<IssuedToken, driving_ports::SignInError> {
        let issued_token = idp
            .exchange_code(code, &mut *ext_cxn)
            .await
            .map_err(|err| match err {
                driven_ports::CodeExchangeError::Rejected => driving_ports::SignInError::BadCode,
                driven_ports::CodeExchangeError::Comms(comms_err) => {
                    driving_ports::SignInError::PortError(
                        comms_err.context("exchanging an authorization code"),
                    )
                }
            })?;

        let attributes = idp
            .user_attributes(&issued_token.token, &mut *ext_cxn)
            .await
            .map_err(|err| match err {
                driven_ports::AttributeLookupError::Rejected => {
                    driving_ports::SignInError::AttributesUnavailable
                }
                driven_ports::AttributeLookupError::Comms(comms_err) => {
                    driving_ports::SignInError::PortError(
                        comms_err.context("looking up the signed-in user's attributes"),
                    )
                }
            })?;

        let mut provision_tx = ext_cxn
            .start_transaction()
            .await
            .context("starting the user provisioning transaction")?;
        ensure_user_provisioned(&attributes, &mut provision_tx, user_read, user_write).await?;
        provision_tx
            .commit()
            .await
            .context("committing the user provisioning transaction")?;

        Ok(issued_token)
    }

    async fn sign_out(
        &self,
        access_token: &str,
        ext_cxn: &mut impl ExternalConnectivity,
        idp: &impl IdentityGateway,
    ) -> Result<(), driving_ports::SignOutError> {
        match idp.revoke_token(access_token, &mut *ext_cxn).await {
            RevokeOutcome::Revoked => Ok(()),
            RevokeOutcome::Denied => Err(driving_ports::SignOutError::Refused),
            RevokeOutcome::TransportFailure(err) => Err(driving_ports::SignOutError::Comms(
                err.context("revoking an access token"),
            )),
        }
    }
}

/// Creates a local user row matching the provider's attributes if one doesn't exist yet.
/// A uniqueness rejection from the writer means a concurrent sign-in provisioned the
/// row first, which is just as good as writing it ourselves.
async fn ensure_user_provisioned(
    attributes: &UserAttributes,
    ext_cxn: &mut impl ExternalConnectivity,
    user_read: &impl UserReader,
    user_write: &impl UserWriter,
) -> Result<(), anyhow::Error> {
    let matched_by_username = user_read
        .by_username(&attributes.username, &mut *ext_cxn)
        .await
        .context("checking for an existing user by username at sign-in")?;
    if matched_by_username.is_some() {
        return Ok(());
    }
    let matched_by_email = user_read
        .by_email(&attributes.email, &mut *ext_cxn)
        .await
        .context("checking for an existing user by email at sign-in")?;
    if matched_by_email.is_some() {
        return Ok(());
    }

    let create_request = user::CreateUser {
        id: attributes.sub.clone(),
        given_name: attributes.given_name.clone(),
        family_name: attributes.family_name.clone(),
        username: attributes.username.clone(),
        email: attributes.email.clone(),
    };
    match user_write.create(&create_request, &mut *ext_cxn).await {
        Ok(created) => {
            info!("Provisioned user {} on first sign-in.", created.id);
            Ok(())
        }
        Err(CreateUserError::AlreadyExists) => Ok(()),
        Err(CreateUserError::PortError(err)) => {
            Err(err.context("provisioning a user at sign-in"))
        }
    }
}
