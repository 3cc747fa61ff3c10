//! Integration tests for access resolution

mod common;

use ::common::access::AccessError;
use ::common::content::Attribution;
use ::common::credential::{CredentialError, JwtAuthority};
use ::common::share::ShareLinkProvider;

#[tokio::test]
async fn test_owner_self_access() {
    let env = common::setup_test_env();
    let credential = env.credential(env.alice);

    let access = env.resolve(None, Some(&credential)).await.unwrap();
    assert_eq!(access.scope_owner_id(), env.alice);
    assert_eq!(access.authenticated_id(), Some(env.alice));
    assert!(!access.is_share_link_access());
    assert!(access.can_edit());
    assert_eq!(access.attribution(), Attribution::ByOwner(env.alice));
}

#[tokio::test]
async fn test_bearer_prefix_is_accepted() {
    let env = common::setup_test_env();
    let credential = format!("Bearer {}", env.credential(env.bob));

    let access = env.resolve(None, Some(&credential)).await.unwrap();
    assert_eq!(access.scope_owner_id(), env.bob);
}

#[tokio::test]
async fn test_anonymous_share_link_access() {
    let env = common::setup_test_env();
    let token = env.links.enable_sharing(env.alice).await.unwrap();

    let access = env.resolve(Some(token.as_str()), None).await.unwrap();
    assert_eq!(access.scope_owner_id(), env.alice);
    assert_eq!(access.authenticated_id(), None);
    assert!(access.is_share_link_access());
    assert_eq!(access.attribution(), Attribution::Anonymous);
}

#[tokio::test]
async fn test_combined_access_scopes_to_link_owner() {
    let env = common::setup_test_env();
    let token = env.links.enable_sharing(env.alice).await.unwrap();
    let bob_credential = env.credential(env.bob);

    let access = env
        .resolve(Some(token.as_str()), Some(&bob_credential))
        .await
        .unwrap();
    assert_eq!(access.scope_owner_id(), env.alice);
    assert_eq!(access.authenticated_id(), Some(env.bob));
    assert!(access.is_share_link_access());
    assert_eq!(access.attribution(), Attribution::ByOwner(env.bob));
}

#[tokio::test]
async fn test_no_identity_requires_authorization() {
    let env = common::setup_test_env();
    assert_eq!(
        env.resolve(None, None).await,
        Err(AccessError::AuthorizationRequired)
    );
}

#[tokio::test]
async fn test_invalid_credential_wins_over_valid_share_token() {
    let env = common::setup_test_env();
    let token = env.links.enable_sharing(env.alice).await.unwrap();

    let forged = JwtAuthority::new("some-other-secret", None)
        .unwrap()
        .issue(env.bob)
        .unwrap();

    let result = env.resolve(Some(token.as_str()), Some(&forged)).await;
    assert!(matches!(
        result,
        Err(AccessError::InvalidCredential(CredentialError::Invalid(_)))
    ));

    let result = env.resolve(None, Some("garbage")).await;
    assert!(matches!(result, Err(AccessError::InvalidCredential(_))));
}

#[tokio::test]
async fn test_unknown_or_mutated_share_token() {
    let env = common::setup_test_env();
    let token = env.links.enable_sharing(env.alice).await.unwrap();

    let mutated = format!("{}x", token);
    assert_eq!(
        env.resolve(Some(&mutated), None).await,
        Err(AccessError::InvalidShareLink)
    );
    assert_eq!(
        env.resolve(Some("abcdefghij0123456789"), None).await,
        Err(AccessError::InvalidShareLink)
    );

    // a bad share token is still rejected when the credential is fine
    let credential = env.credential(env.bob);
    assert_eq!(
        env.resolve(Some(&mutated), Some(&credential)).await,
        Err(AccessError::InvalidShareLink)
    );
}

#[tokio::test]
async fn test_disabled_sharing_invalidates_token() {
    let env = common::setup_test_env();
    let token = env.links.enable_sharing(env.alice).await.unwrap();
    env.links.disable_sharing(env.alice).await.unwrap();

    assert_eq!(
        env.resolve(Some(token.as_str()), None).await,
        Err(AccessError::InvalidShareLink)
    );
}

#[tokio::test]
async fn test_view_only_link_resolves_but_cannot_edit() {
    let env = common::setup_test_env();
    let token = env.links.enable_sharing(env.alice).await.unwrap();

    let anonymous = env.resolve(Some(token.as_str()), None).await.unwrap();
    assert!(!anonymous.can_edit());
    assert_eq!(anonymous.ensure_can_edit(), Err(AccessError::ViewOnly));

    let bob_credential = env.credential(env.bob);
    let bob = env
        .resolve(Some(token.as_str()), Some(&bob_credential))
        .await
        .unwrap();
    assert_eq!(bob.ensure_can_edit(), Err(AccessError::ViewOnly));

    // the link owner can always edit through their own link
    let alice_credential = env.credential(env.alice);
    let alice = env
        .resolve(Some(token.as_str()), Some(&alice_credential))
        .await
        .unwrap();
    assert!(alice.ensure_can_edit().is_ok());
}

#[tokio::test]
async fn test_public_edit_link_allows_mutation() {
    let env = common::setup_test_env();
    let token = env.links.enable_sharing(env.alice).await.unwrap();
    assert!(env.links.set_public_edit(env.alice, true).unwrap());

    let anonymous = env.resolve(Some(token.as_str()), None).await.unwrap();
    assert!(anonymous.ensure_can_edit().is_ok());
    assert_eq!(anonymous.attribution(), Attribution::Anonymous);
}
