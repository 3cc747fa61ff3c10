//! Owner identities and account credential rules.

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a registered account that holds content.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct OwnerId(Uuid);

impl OwnerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OwnerId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for OwnerId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<OwnerId> for Uuid {
    fn from(val: OwnerId) -> Self {
        val.0
    }
}

impl std::ops::Deref for OwnerId {
    type Target = Uuid;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromStr for OwnerId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 20;
pub const PASSWORD_MIN_LEN: usize = 8;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum CredentialPolicyError {
    #[error("Please enter a valid username")]
    UsernameTooShort,
    #[error("Username is too long")]
    UsernameTooLong,
    #[error("password is too short")]
    PasswordTooShort,
    #[error("password should contain atleast one uppercase character")]
    PasswordMissingUppercase,
    #[error("password should contain atleast one lower case character")]
    PasswordMissingLowercase,
    #[error("password should contain atleast one numeric character")]
    PasswordMissingDigit,
    #[error("password should contain atleast one special character")]
    PasswordMissingSpecial,
}

/// Check a signup username against the length bounds.
pub fn validate_username(username: &str) -> Result<(), CredentialPolicyError> {
    let len = username.chars().count();
    if len < USERNAME_MIN_LEN {
        return Err(CredentialPolicyError::UsernameTooShort);
    }
    if len > USERNAME_MAX_LEN {
        return Err(CredentialPolicyError::UsernameTooLong);
    }
    Ok(())
}

/// Check a signup password: minimum length plus one character from each of
/// upper case, lower case, digit and "special" (anything else, `_` included).
pub fn validate_password(password: &str) -> Result<(), CredentialPolicyError> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(CredentialPolicyError::PasswordTooShort);
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(CredentialPolicyError::PasswordMissingUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(CredentialPolicyError::PasswordMissingLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(CredentialPolicyError::PasswordMissingDigit);
    }
    if !password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        return Err(CredentialPolicyError::PasswordMissingSpecial);
    }
    Ok(())
}
