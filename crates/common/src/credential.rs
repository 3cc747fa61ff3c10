//! Bearer credentials: issuing at login, verifying on every request.

use std::collections::HashSet;
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::owner::OwnerId;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("no credential supplied")]
    Missing,
    #[error("invalid credential: {0}")]
    Invalid(String),
    #[error("credential expired")]
    Expired,
    #[error("failed to sign credential: {0}")]
    Signing(String),
    #[error("credential secret cannot be empty")]
    EmptySecret,
}

/// Anything that can turn a bearer string into a verified owner.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, credential: &str) -> Result<OwnerId, CredentialError>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub id: OwnerId,
    pub iat: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

/// Signs and verifies HS256 credentials with the process-wide secret.
#[derive(Clone)]
pub struct JwtAuthority {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Option<Duration>,
}

impl fmt::Debug for JwtAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtAuthority")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl JwtAuthority {
    pub fn new(secret: &str, ttl: Option<Duration>) -> Result<Self, CredentialError> {
        if secret.is_empty() {
            return Err(CredentialError::EmptySecret);
        }

        // exp is only checked when the token carries one
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims = HashSet::new();
        validation.leeway = 0;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        })
    }

    pub fn issue(&self, owner: OwnerId) -> Result<String, CredentialError> {
        self.issue_at(owner, unix_now())
    }

    fn issue_at(&self, owner: OwnerId, issued_at: u64) -> Result<String, CredentialError> {
        let claims = Claims {
            id: owner,
            iat: issued_at,
            exp: self.ttl.map(|ttl| issued_at + ttl.as_secs()),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| CredentialError::Signing(e.to_string()))
    }
}

impl CredentialVerifier for JwtAuthority {
    fn verify(&self, credential: &str) -> Result<OwnerId, CredentialError> {
        let token = credential
            .strip_prefix(BEARER_PREFIX)
            .unwrap_or(credential)
            .trim();
        if token.is_empty() {
            return Err(CredentialError::Missing);
        }

        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims.id)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => CredentialError::Expired,
                _ => CredentialError::Invalid(e.to_string()),
            })
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
