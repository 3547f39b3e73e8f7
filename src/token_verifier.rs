use anyhow::Context;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use std::str::FromStr;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Failure modes for bearer token verification. Everything except
/// [TokenError::KeySetUnavailable] is the caller's fault and maps to a 401.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("the presented token was malformed: {0}")]
    Malformed(String),
    #[error("no published signing key matches the presented token")]
    NoMatchingKey,
    #[error("the token's signature did not match the signing key")]
    BadSignature,
    #[error("the token is expired or not yet valid")]
    Expired,
    #[error("could not retrieve the identity provider's key set")]
    KeySetUnavailable(#[source] anyhow::Error),
}

/// The verified claims extracted from a bearer token
#[derive(Deserialize, Debug, Clone)]
pub struct TokenClaims {
    pub sub: String,
    pub username: String,
}

/// Verifies bearer tokens against the identity provider's published JSON Web Key Set.
///
/// The key set is fetched lazily on the first verification and cached for the life of
/// the process. When a token arrives bearing a key ID the cache doesn't know, the set
/// is fetched once more before the token is rejected, which covers provider-side key
/// rotation without a cache expiry knob.
pub struct TokenVerifier {
    jwks_url: String,
    cached_keys: RwLock<Option<JwkSet>>,
}

impl TokenVerifier {
    pub fn new(jwks_url: String) -> Self {
        TokenVerifier {
            jwks_url,
            cached_keys: RwLock::new(None),
        }
    }

    /// Constructs a verifier with a pre-populated key set so tests never perform
    /// a key fetch over the network
    #[cfg(test)]
    pub fn with_key_set(jwks_url: String, keys: JwkSet) -> Self {
        TokenVerifier {
            jwks_url,
            cached_keys: RwLock::new(Some(keys)),
        }
    }

    /// Verifies the signature and temporal claims of the given bearer token, returning
    /// its claim set on success.
    pub async fn verify(
        &self,
        token: &str,
        http_client: &ClientWithMiddleware,
    ) -> Result<TokenClaims, TokenError> {
        let header = decode_header(token).map_err(|err| TokenError::Malformed(err.to_string()))?;
        let Some(ref kid) = header.kid else {
            return Err(TokenError::Malformed(
                "token header carries no key ID".to_owned(),
            ));
        };

        let signing_key = self.key_with_id(kid, http_client).await?;
        let decoding_key = DecodingKey::from_jwk(&signing_key)
            .map_err(|err| TokenError::Malformed(err.to_string()))?;

        // The matched key's declared algorithm wins over the one the token names for
        // itself; the header only decides when the provider publishes no algorithm
        let algorithm = match signing_key.common.key_algorithm {
            Some(declared_alg) => Algorithm::from_str(&declared_alg.to_string())
                .map_err(|err| TokenError::Malformed(err.to_string()))?,
            None => header.alg,
        };
        let mut validation = Validation::new(algorithm);
        validation.validate_aud = false;
        validation.validate_nbf = true;

        let token_data = decode::<TokenClaims>(token, &decoding_key, &validation).map_err(
            |err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature
                | jsonwebtoken::errors::ErrorKind::ImmatureSignature => TokenError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed(err.to_string()),
            },
        )?;

        Ok(token_data.claims)
    }

    /// Looks up a signing key by key ID, fetching the key set if it isn't cached yet
    /// or the ID is unknown to the cached set
    async fn key_with_id(
        &self,
        kid: &str,
        http_client: &ClientWithMiddleware,
    ) -> Result<Jwk, TokenError> {
        {
            let cached = self.cached_keys.read().await;
            if let Some(ref key_set) = *cached {
                if let Some(key) = key_set.find(kid) {
                    return Ok(key.clone());
                }
            }
        }

        let mut cached = self.cached_keys.write().await;
        // Another request may have refreshed the set while we waited on the write lock
        if let Some(ref key_set) = *cached {
            if let Some(key) = key_set.find(kid) {
                return Ok(key.clone());
            }
        }

        debug!("Key ID {kid} not cached, fetching the key set.");
        let fresh_keys = fetch_key_set(&self.jwks_url, http_client)
            .await
            .map_err(TokenError::KeySetUnavailable)?;
        info!("Retrieved {} signing keys.", fresh_keys.keys.len());

        let matched_key = fresh_keys.find(kid).cloned();
        *cached = Some(fresh_keys);

        matched_key.ok_or(TokenError::NoMatchingKey)
    }
}

/// Retrieves the identity provider's full key set
async fn fetch_key_set(
    jwks_url: &str,
    http_client: &ClientWithMiddleware,
) -> Result<JwkSet, anyhow::Error> {
    let response = http_client
        .get(jwks_url)
        .send()
        .await
        .context("requesting the identity provider's key set")?;
    let key_set: JwkSet = response
        .json()
        .await
        .context("parsing the identity provider's key set")?;

    Ok(key_set)
}
