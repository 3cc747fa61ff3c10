//! Integration tests for enabling, disabling and resolving share links

mod common;

use ::common::share::{ShareLinkError, ShareLinkProvider, ShareToken, SHARE_TOKEN_LEN};

#[tokio::test]
async fn test_enable_sharing_is_idempotent() {
    let env = common::setup_test_env();

    let first = env.links.enable_sharing(env.alice).await.unwrap();
    let second = env.links.enable_sharing(env.alice).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.as_str().len(), SHARE_TOKEN_LEN);
    assert_eq!(env.links.link_count().unwrap(), 1);

    let flags = env.links.sharing_flags(env.alice).await.unwrap().unwrap();
    assert!(flags.sharing_enabled);
    assert!(!flags.public_edit_allowed);
}

#[tokio::test]
async fn test_owners_get_distinct_tokens() {
    let env = common::setup_test_env();

    let alice = env.links.enable_sharing(env.alice).await.unwrap();
    let bob = env.links.enable_sharing(env.bob).await.unwrap();
    assert_ne!(alice, bob);

    let resolved = env.links.resolve(&bob).await.unwrap().unwrap();
    assert_eq!(resolved.owner_id, env.bob);
}

#[tokio::test]
async fn test_disable_sharing_resets_flag() {
    let env = common::setup_test_env();

    let token = env.links.enable_sharing(env.alice).await.unwrap();
    assert!(env.links.set_public_edit(env.alice, true).unwrap());
    assert!(env.links.check_edit_permission(env.alice).await.unwrap());

    env.links.disable_sharing(env.alice).await.unwrap();
    assert_eq!(env.links.resolve(&token).await.unwrap(), None);
    assert_eq!(env.links.link_count().unwrap(), 0);

    let flags = env.links.sharing_flags(env.alice).await.unwrap().unwrap();
    assert!(!flags.sharing_enabled);
    assert!(!env.links.check_edit_permission(env.alice).await.unwrap());

    // disabling twice is harmless
    env.links.disable_sharing(env.alice).await.unwrap();
}

#[tokio::test]
async fn test_reenabling_issues_a_fresh_token() {
    let env = common::setup_test_env();

    let first = env.links.enable_sharing(env.alice).await.unwrap();
    env.links.disable_sharing(env.alice).await.unwrap();
    let second = env.links.enable_sharing(env.alice).await.unwrap();

    assert_ne!(first, second);
    assert_eq!(env.links.resolve(&first).await.unwrap(), None);
}

#[tokio::test]
async fn test_check_edit_permission_for_unknown_owner() {
    let env = common::setup_test_env();
    let stranger = ::common::owner::OwnerId::new();
    assert!(!env.links.check_edit_permission(stranger).await.unwrap());
}

#[tokio::test]
async fn test_lost_race_returns_winners_token() {
    let env = common::setup_test_env();
    let winner = ShareToken::generate();
    let provider = common::RacingProvider::new(env.links.clone(), Some(winner.clone()), 1);

    let token = provider.enable_sharing(env.alice).await.unwrap();
    assert_eq!(token, winner);
    assert_eq!(env.links.link_count().unwrap(), 1);
}

#[tokio::test]
async fn test_token_collision_draws_a_new_token() {
    let env = common::setup_test_env();
    let provider = common::RacingProvider::new(env.links.clone(), None, 1);

    let token = provider.enable_sharing(env.alice).await.unwrap();
    assert_eq!(env.links.link_count().unwrap(), 1);
    let resolved = env.links.resolve(&token).await.unwrap().unwrap();
    assert_eq!(resolved.owner_id, env.alice);
    assert!(resolved.flags.sharing_enabled);
}

#[tokio::test]
async fn test_unrecoverable_conflict_is_reported() {
    let env = common::setup_test_env();
    let provider = common::RacingProvider::new(env.links.clone(), None, 2);

    let result = provider.enable_sharing(env.alice).await;
    assert_eq!(result, Err(ShareLinkError::Conflict));
    assert_eq!(env.links.link_count().unwrap(), 0);
}
