//! Bearer credential verification.
//!
//! Callers present `Authorization: Bearer <jwt>`. The token is an HS256 JWT whose
//! `sub` is the caller's user id and whose `role` is one of the [`Role`] values.
//! Verification yields a [`CallerIdentity`] that is trusted for one request.
//! Accounts still in the `pending` role are not verified users and are rejected
//! here, before any authorization rule sees them.
//!
//! # Example
//!
//! ```rust,ignore
//! let authenticator = JwtAuthenticator::from_config(&config);
//! let token = authenticator.issue(&CallerIdentity::new("u1", Role::Member), Duration::hours(1))?;
//! let caller = authenticator.verify(&token).await?;
//! assert_eq!(caller.id, "u1");
//! ```

use crate::caller::{CallerIdentity, Role};
use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::*;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use service::config::Config;

/// Resolves a presented bearer token to the caller it belongs to.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn verify(&self, bearer_token: &str) -> Result<CallerIdentity, Error>;
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CallerClaims {
    pub(crate) sub: String,
    pub(crate) role: Role,
    pub(crate) exp: u64,
}

pub struct JwtAuthenticator {
    signing_key: Option<SecretString>,
}

impl JwtAuthenticator {
    pub fn new(signing_key: SecretString) -> Self {
        Self {
            signing_key: Some(signing_key),
        }
    }

    /// Build from config. With no signing key configured every token is rejected.
    pub fn from_config(config: &Config) -> Self {
        let signing_key = config.jwt_signing_key().map(SecretString::new);
        if signing_key.is_none() {
            warn!("No JWT signing key configured, all bearer tokens will be rejected");
        }
        Self { signing_key }
    }

    /// Mint a token for `caller` that expires after `ttl`.
    pub fn issue(&self, caller: &CallerIdentity, ttl: Duration) -> Result<String, Error> {
        let signing_key = self.signing_key.as_ref().ok_or_else(|| Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
        })?;

        let claims = CallerClaims {
            sub: caller.id.clone(),
            role: caller.role,
            exp: (Utc::now() + ttl).timestamp().max(0) as u64,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(signing_key.expose_secret().as_bytes()),
        )
        .map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                "Failed to encode bearer token".to_string(),
            )),
        })
    }
}

#[async_trait]
impl Authenticator for JwtAuthenticator {
    async fn verify(&self, bearer_token: &str) -> Result<CallerIdentity, Error> {
        let Some(signing_key) = self.signing_key.as_ref() else {
            return Err(Error::unauthenticated());
        };

        let token_data = decode::<CallerClaims>(
            bearer_token,
            &DecodingKey::from_secret(signing_key.expose_secret().as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| {
            debug!("Rejected bearer token: {e}");
            Error::from(e)
        })?;

        let claims = token_data.claims;
        if claims.sub.is_empty() {
            debug!("Rejected bearer token with empty subject");
            return Err(Error::unauthenticated());
        }

        if claims.role == Role::Pending {
            debug!("Rejected bearer token for pending account {}", claims.sub);
            return Err(Error::unauthenticated());
        }

        Ok(CallerIdentity::new(claims.sub, claims.role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RequestErrorKind;

    fn authenticator(secret: &str) -> JwtAuthenticator {
        JwtAuthenticator::new(SecretString::new(secret.to_string()))
    }

    fn assert_unauthenticated(err: &Error) {
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Request(
                RequestErrorKind::Unauthenticated
            ))
        );
    }

    #[tokio::test]
    async fn issued_token_verifies_to_same_caller() {
        let auth = authenticator("secret");
        let caller = CallerIdentity::new("u1", Role::Member);

        let token = auth.issue(&caller, Duration::hours(1)).unwrap();
        let verified = auth.verify(&token).await.unwrap();

        assert_eq!(verified, caller);
    }

    #[tokio::test]
    async fn admin_role_survives_round_trip() {
        let auth = authenticator("secret");
        let caller = CallerIdentity::new("admin1", Role::Admin);

        let token = auth.issue(&caller, Duration::minutes(5)).unwrap();

        assert!(auth.verify(&token).await.unwrap().is_admin());
    }

    #[tokio::test]
    async fn token_signed_with_other_key_is_rejected() {
        let token = authenticator("one")
            .issue(&CallerIdentity::new("u1", Role::Admin), Duration::hours(1))
            .unwrap();

        let err = authenticator("two").verify(&token).await.unwrap_err();

        assert_unauthenticated(&err);
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let auth = authenticator("secret");
        let token = auth
            .issue(&CallerIdentity::new("u1", Role::Member), Duration::hours(-2))
            .unwrap();

        let err = auth.verify(&token).await.unwrap_err();

        assert_unauthenticated(&err);
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let err = authenticator("secret")
            .verify("not-a-jwt")
            .await
            .unwrap_err();
        assert_unauthenticated(&err);
    }

    #[tokio::test]
    async fn empty_subject_is_rejected() {
        let auth = authenticator("secret");
        let token = auth
            .issue(&CallerIdentity::new("", Role::Admin), Duration::hours(1))
            .unwrap();

        let err = auth.verify(&token).await.unwrap_err();

        assert_unauthenticated(&err);
    }

    #[tokio::test]
    async fn pending_account_is_rejected() {
        let auth = authenticator("secret");
        let token = auth
            .issue(&CallerIdentity::new("p1", Role::Pending), Duration::hours(1))
            .unwrap();

        let err = auth.verify(&token).await.unwrap_err();

        assert_unauthenticated(&err);
    }

    #[tokio::test]
    async fn missing_signing_key_rejects_everything() {
        let auth = JwtAuthenticator { signing_key: None };

        let err = auth.verify("anything").await.unwrap_err();
        assert_unauthenticated(&err);

        let err = auth
            .issue(&CallerIdentity::new("u1", Role::Member), Duration::hours(1))
            .unwrap_err();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Config)
        );
    }
}
