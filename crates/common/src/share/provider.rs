use std::fmt::{Debug, Display};

use async_trait::async_trait;

use super::token::ShareToken;
use crate::owner::OwnerId;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ShareLinkError<T> {
    #[error("unhandled share link provider error: {0}")]
    Provider(#[from] T),
    /// A concurrent writer won the race to create this owner's link,
    ///  or the generated token collided with another owner's
    #[error("share link conflict")]
    Conflict,
}

/// An owner's publish settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SharingFlags {
    pub sharing_enabled: bool,
    pub public_edit_allowed: bool,
}

impl SharingFlags {
    /// Edits through a share link need both flags.
    pub fn allows_public_edit(&self) -> bool {
        self.sharing_enabled && self.public_edit_allowed
    }
}

/// A share token looked up to the owner behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedShareLink {
    pub owner_id: OwnerId,
    pub flags: SharingFlags,
}

#[async_trait]
pub trait ShareLinkProvider: Send + Sync + Debug + Clone + 'static {
    type Error: Display + Debug + Send + Sync;

    /// Look up the owner behind a share token
    ///
    /// # Returns
    /// * `Ok(Some(link))` - The token exists
    /// * `Ok(None)` - No link carries this token
    async fn resolve(
        &self,
        token: &ShareToken,
    ) -> Result<Option<ResolvedShareLink>, ShareLinkError<Self::Error>>;

    /// The owner's current token, if they have one
    async fn link_for_owner(
        &self,
        owner: OwnerId,
    ) -> Result<Option<ShareToken>, ShareLinkError<Self::Error>>;

    /// The owner's publish settings, `None` if the owner is unknown
    async fn sharing_flags(
        &self,
        owner: OwnerId,
    ) -> Result<Option<SharingFlags>, ShareLinkError<Self::Error>>;

    /// Persist a link for the owner and mark their sharing enabled,
    ///  as one atomic step.
    ///
    /// Should fail with the following errors to be considered
    ///  correct:
    /// * `Err(ShareLinkError::Conflict)` - The owner already has a link, or
    ///   the token is already taken
    async fn create_link(
        &self,
        owner: OwnerId,
        token: &ShareToken,
    ) -> Result<(), ShareLinkError<Self::Error>>;

    /// Remove the owner's link and reset their sharing flag, as one
    ///  atomic step. Returns whether a link existed.
    async fn delete_link(&self, owner: OwnerId) -> Result<bool, ShareLinkError<Self::Error>>;

    /// Whether visitors holding the owner's share link may mutate content
    async fn check_edit_permission(
        &self,
        owner: OwnerId,
    ) -> Result<bool, ShareLinkError<Self::Error>> {
        Ok(self
            .sharing_flags(owner)
            .await?
            .map(|flags| flags.allows_public_edit())
            .unwrap_or(false))
    }

    /// Publish the owner's collection. Idempotent: an existing token is
    ///  returned unchanged.
    async fn enable_sharing(
        &self,
        owner: OwnerId,
    ) -> Result<ShareToken, ShareLinkError<Self::Error>> {
        if let Some(existing) = self.link_for_owner(owner).await? {
            return Ok(existing);
        }

        let token = ShareToken::generate();
        match self.create_link(owner, &token).await {
            Ok(()) => {
                tracing::info!(%owner, "share link created");
                Ok(token)
            }
            Err(ShareLinkError::Conflict) => {
                // lost a race with a concurrent enable; take the winner's token
                tracing::warn!(%owner, "share link conflict, retrying lookup");
                if let Some(existing) = self.link_for_owner(owner).await? {
                    return Ok(existing);
                }

                // no link for this owner, so the token collided with another owner's
                let token = ShareToken::generate();
                self.create_link(owner, &token).await?;
                tracing::info!(%owner, "share link created after token collision");
                Ok(token)
            }
            Err(e) => Err(e),
        }
    }

    /// Withdraw the owner's share link, if any.
    async fn disable_sharing(&self, owner: OwnerId) -> Result<(), ShareLinkError<Self::Error>> {
        if self.delete_link(owner).await? {
            tracing::info!(%owner, "share link removed");
        }
        Ok(())
    }
}
