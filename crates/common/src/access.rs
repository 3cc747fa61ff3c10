//! Access resolution.
//!
//! Every content request carries up to two proofs of identity: a share token
//! naming someone's published collection, and a bearer credential naming the
//! caller. [`resolve_access`] folds them into one [`EffectiveAccess`]: whose
//! data the request operates on, who (if anyone) is actually acting, and
//! whether that actor may change anything.

use crate::content::Attribution;
use crate::credential::{CredentialError, CredentialVerifier};
use crate::owner::OwnerId;
use crate::share::{ShareLinkProvider, ShareToken};

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("share token does not resolve to a shared collection")]
    InvalidShareLink,
    #[error("invalid credential: {0}")]
    InvalidCredential(CredentialError),
    #[error("no share token or credential supplied")]
    AuthorizationRequired,
    #[error("content is shared view-only")]
    ViewOnly,
    #[error("share link lookup failed: {0}")]
    Lookup(String),
}

/// The identity a single request acts under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveAccess {
    scope_owner_id: OwnerId,
    authenticated_id: Option<OwnerId>,
    is_share_link_access: bool,
    can_edit: bool,
}

impl EffectiveAccess {
    /// An owner acting on their own collection.
    pub fn owner(owner: OwnerId) -> Self {
        Self {
            scope_owner_id: owner,
            authenticated_id: Some(owner),
            is_share_link_access: false,
            can_edit: true,
        }
    }

    /// Owner whose data every query must be scoped to.
    pub fn scope_owner_id(&self) -> OwnerId {
        self.scope_owner_id
    }

    pub fn authenticated_id(&self) -> Option<OwnerId> {
        self.authenticated_id
    }

    pub fn is_share_link_access(&self) -> bool {
        self.is_share_link_access
    }

    pub fn can_edit(&self) -> bool {
        self.can_edit
    }

    /// Who to record as the author of a create or update.
    pub fn attribution(&self) -> Attribution {
        Attribution::from_authenticated(self.authenticated_id)
    }

    /// Gate for every mutating operation.
    pub fn ensure_can_edit(&self) -> Result<(), AccessError> {
        if self.can_edit {
            Ok(())
        } else {
            Err(AccessError::ViewOnly)
        }
    }
}

/// Resolve a request's share token and bearer credential into an
/// [`EffectiveAccess`].
///
/// The credential is checked first: a bad credential fails the request even
/// when a valid share token is also present. A share token that is malformed,
/// unknown, or belongs to an owner who has since stopped sharing is rejected
/// with [`AccessError::InvalidShareLink`]. A view-only link is not rejected
/// here; it yields `can_edit == false` and mutations are refused later through
/// [`EffectiveAccess::ensure_can_edit`].
pub async fn resolve_access<P, V>(
    links: &P,
    verifier: &V,
    share_token: Option<&str>,
    credential: Option<&str>,
) -> Result<EffectiveAccess, AccessError>
where
    P: ShareLinkProvider,
    V: CredentialVerifier + ?Sized,
{
    let authenticated_id = match credential {
        Some(credential) => Some(
            verifier
                .verify(credential)
                .map_err(AccessError::InvalidCredential)?,
        ),
        None => None,
    };

    let share_token = match share_token {
        Some(raw) => Some(ShareToken::parse(raw).map_err(|e| {
            tracing::debug!(error = %e, "malformed share token");
            AccessError::InvalidShareLink
        })?),
        None => None,
    };

    let Some(token) = share_token else {
        return authenticated_id
            .map(EffectiveAccess::owner)
            .ok_or(AccessError::AuthorizationRequired);
    };

    let link = links
        .resolve(&token)
        .await
        .map_err(|e| AccessError::Lookup(e.to_string()))?
        .ok_or(AccessError::InvalidShareLink)?;
    if !link.flags.sharing_enabled {
        return Err(AccessError::InvalidShareLink);
    }

    let can_edit =
        authenticated_id == Some(link.owner_id) || link.flags.allows_public_edit();

    Ok(EffectiveAccess {
        scope_owner_id: link.owner_id,
        authenticated_id,
        is_share_link_access: true,
        can_edit,
    })
}
