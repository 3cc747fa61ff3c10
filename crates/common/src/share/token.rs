use std::fmt::{self, Display};

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Symbols a share token is drawn from.
pub const SHARE_TOKEN_ALPHABET: &[u8; 36] = b"qwertyuiopasdfghjklzxcvbnm1234567890";
pub const SHARE_TOKEN_LEN: usize = 20;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ShareTokenError {
    #[error("share token must be 20 characters, got {0}")]
    Length(usize),
    #[error("share token contains an invalid character: {0:?}")]
    Alphabet(char),
}

/// Opaque public identifier for one owner's shared collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareToken(String);

impl ShareToken {
    /// Draw a fresh token uniformly over [`SHARE_TOKEN_ALPHABET`].
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let token = (0..SHARE_TOKEN_LEN)
            .map(|_| SHARE_TOKEN_ALPHABET[rng.random_range(0..SHARE_TOKEN_ALPHABET.len())] as char)
            .collect();
        Self(token)
    }

    /// Accept a token from an untrusted source, checking shape only.
    pub fn parse(raw: &str) -> Result<Self, ShareTokenError> {
        let len = raw.chars().count();
        if len != SHARE_TOKEN_LEN {
            return Err(ShareTokenError::Length(len));
        }
        if let Some(bad) = raw
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit()))
        {
            return Err(ShareTokenError::Alphabet(bad));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ShareToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ShareToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
