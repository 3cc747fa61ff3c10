use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::provider::{ResolvedShareLink, ShareLinkError, ShareLinkProvider, SharingFlags};
use super::token::ShareToken;
use crate::owner::OwnerId;

/// In-memory share link provider using HashMaps
#[derive(Debug, Clone)]
pub struct MemoryShareLinkProvider {
    inner: Arc<RwLock<MemoryShareLinkProviderInner>>,
}

#[derive(Debug, Default)]
struct MemoryShareLinkProviderInner {
    owners: HashMap<OwnerId, SharingFlags>,
    /// token -> owner
    links: HashMap<ShareToken, OwnerId>,
    /// owner -> token
    by_owner: HashMap<OwnerId, ShareToken>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryShareLinkProviderError {
    #[error("memory provider error: {0}")]
    Internal(String),
    #[error("unknown owner: {0}")]
    UnknownOwner(OwnerId),
}

type Result<T> = std::result::Result<T, ShareLinkError<MemoryShareLinkProviderError>>;

fn poisoned<E: std::fmt::Display>(e: E) -> ShareLinkError<MemoryShareLinkProviderError> {
    ShareLinkError::Provider(MemoryShareLinkProviderError::Internal(format!(
        "failed to acquire lock: {}",
        e
    )))
}

impl MemoryShareLinkProvider {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryShareLinkProviderInner::default())),
        }
    }

    /// Register an owner with sharing off.
    pub fn add_owner(&self, owner: OwnerId) -> Result<()> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        inner.owners.entry(owner).or_default();
        Ok(())
    }

    /// Set the owner's public edit flag. Only takes effect while sharing is
    ///  enabled; returns whether it did.
    pub fn set_public_edit(&self, owner: OwnerId, allowed: bool) -> Result<bool> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        match inner.owners.get_mut(&owner) {
            Some(flags) if flags.sharing_enabled => {
                flags.public_edit_allowed = allowed;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn link_count(&self) -> Result<usize> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.links.len())
    }
}

impl Default for MemoryShareLinkProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ShareLinkProvider for MemoryShareLinkProvider {
    type Error = MemoryShareLinkProviderError;

    async fn resolve(&self, token: &ShareToken) -> Result<Option<ResolvedShareLink>> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.links.get(token).map(|owner| ResolvedShareLink {
            owner_id: *owner,
            flags: inner.owners.get(owner).copied().unwrap_or_default(),
        }))
    }

    async fn link_for_owner(&self, owner: OwnerId) -> Result<Option<ShareToken>> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.by_owner.get(&owner).cloned())
    }

    async fn sharing_flags(&self, owner: OwnerId) -> Result<Option<SharingFlags>> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.owners.get(&owner).copied())
    }

    async fn create_link(&self, owner: OwnerId, token: &ShareToken) -> Result<()> {
        let mut inner = self.inner.write().map_err(poisoned)?;

        if !inner.owners.contains_key(&owner) {
            return Err(ShareLinkError::Provider(
                MemoryShareLinkProviderError::UnknownOwner(owner),
            ));
        }
        if inner.by_owner.contains_key(&owner) || inner.links.contains_key(token) {
            return Err(ShareLinkError::Conflict);
        }

        inner.links.insert(token.clone(), owner);
        inner.by_owner.insert(owner, token.clone());
        if let Some(flags) = inner.owners.get_mut(&owner) {
            flags.sharing_enabled = true;
        }
        Ok(())
    }

    async fn delete_link(&self, owner: OwnerId) -> Result<bool> {
        let mut inner = self.inner.write().map_err(poisoned)?;

        let existed = match inner.by_owner.remove(&owner) {
            Some(token) => {
                inner.links.remove(&token);
                true
            }
            None => false,
        };
        if let Some(flags) = inner.owners.get_mut(&owner) {
            flags.sharing_enabled = false;
        }
        Ok(existed)
    }
}
