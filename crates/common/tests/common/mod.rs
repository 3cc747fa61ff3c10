//! Shared test utilities for access and share link integration tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use common::access::{resolve_access, AccessError, EffectiveAccess};
use common::credential::JwtAuthority;
use common::owner::OwnerId;
use common::share::{
    MemoryShareLinkProvider, MemoryShareLinkProviderError, ResolvedShareLink, ShareLinkError,
    ShareLinkProvider, ShareToken, SharingFlags,
};

pub const TEST_SECRET: &str = "integration-test-secret";

pub struct TestEnv {
    pub links: MemoryShareLinkProvider,
    pub authority: JwtAuthority,
    pub alice: OwnerId,
    pub bob: OwnerId,
}

impl TestEnv {
    pub fn credential(&self, owner: OwnerId) -> String {
        self.authority.issue(owner).unwrap()
    }

    pub async fn resolve(
        &self,
        share_token: Option<&str>,
        credential: Option<&str>,
    ) -> std::result::Result<EffectiveAccess, AccessError> {
        resolve_access(&self.links, &self.authority, share_token, credential).await
    }
}

/// Two registered owners, neither sharing yet.
pub fn setup_test_env() -> TestEnv {
    let links = MemoryShareLinkProvider::new();
    let alice = OwnerId::new();
    let bob = OwnerId::new();
    links.add_owner(alice).unwrap();
    links.add_owner(bob).unwrap();

    TestEnv {
        links,
        authority: JwtAuthority::new(TEST_SECRET, None).unwrap(),
        alice,
        bob,
    }
}

/// Wraps a memory provider and simulates losing the create race: the first
/// `conflicts` calls to `create_link` fail with `Conflict`. When `winner` is
/// set, a competing writer's link is stored before the conflict is reported.
#[derive(Debug, Clone)]
pub struct RacingProvider {
    pub inner: MemoryShareLinkProvider,
    pub winner: Option<ShareToken>,
    conflicts: Arc<AtomicUsize>,
}

impl RacingProvider {
    pub fn new(inner: MemoryShareLinkProvider, winner: Option<ShareToken>, conflicts: usize) -> Self {
        Self {
            inner,
            winner,
            conflicts: Arc::new(AtomicUsize::new(conflicts)),
        }
    }
}

type Result<T> = std::result::Result<T, ShareLinkError<MemoryShareLinkProviderError>>;

#[async_trait]
impl ShareLinkProvider for RacingProvider {
    type Error = MemoryShareLinkProviderError;

    async fn resolve(&self, token: &ShareToken) -> Result<Option<ResolvedShareLink>> {
        self.inner.resolve(token).await
    }

    async fn link_for_owner(&self, owner: OwnerId) -> Result<Option<ShareToken>> {
        self.inner.link_for_owner(owner).await
    }

    async fn sharing_flags(&self, owner: OwnerId) -> Result<Option<SharingFlags>> {
        self.inner.sharing_flags(owner).await
    }

    async fn create_link(&self, owner: OwnerId, token: &ShareToken) -> Result<()> {
        let remaining = self.conflicts.load(Ordering::SeqCst);
        if remaining > 0 {
            self.conflicts.store(remaining - 1, Ordering::SeqCst);
            if let Some(winner) = &self.winner {
                self.inner.create_link(owner, winner).await?;
            }
            return Err(ShareLinkError::Conflict);
        }
        self.inner.create_link(owner, token).await
    }

    async fn delete_link(&self, owner: OwnerId) -> Result<bool> {
        self.inner.delete_link(owner).await
    }
}
