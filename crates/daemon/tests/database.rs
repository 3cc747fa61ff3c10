use common::access::{resolve_access, AccessError};
use common::content::{Attribution, ContentType};
use common::credential::JwtAuthority;
use common::share::{ShareLinkProvider, ShareToken};

use brainshare_daemon::database::models::{ContentItem, ContentPatch, NewContent, Owner};
use brainshare_daemon::Database;

async fn on_disk_database(dir: &tempfile::TempDir) -> Database {
    let url = url::Url::parse(&format!("sqlite://{}", dir.path().join("db.sqlite").display()))
        .unwrap();
    Database::connect(&url).await.unwrap()
}

async fn owner(db: &Database, username: &str) -> Owner {
    Owner::create(username, "not-a-real-hash", db).await.unwrap()
}

fn link(title: &str) -> NewContent {
    NewContent {
        content_type: ContentType::Links,
        link: format!("https://example.com/{title}"),
        title: title.to_string(),
        tags: vec!["a".to_string()],
        media_key: None,
    }
}

#[tokio::test]
async fn test_share_links_persist_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let token = {
        let db = on_disk_database(&dir).await;
        let alice = owner(&db, "alice").await;
        db.enable_sharing(alice.owner_id()).await.unwrap()
    };

    let db = on_disk_database(&dir).await;
    let resolved = db.resolve(&token).await.unwrap().unwrap();
    assert!(resolved.flags.sharing_enabled);
    assert!(!resolved.flags.public_edit_allowed);

    let alice = Owner::by_username("alice", &db).await.unwrap().unwrap();
    assert_eq!(resolved.owner_id, alice.owner_id());
    assert!(alice.sharing_enabled);
}

#[tokio::test]
async fn test_second_link_for_owner_conflicts() {
    let dir = tempfile::tempdir().unwrap();
    let db = on_disk_database(&dir).await;
    let alice = owner(&db, "alice").await;

    let first = db.enable_sharing(alice.owner_id()).await.unwrap();
    let err = db
        .create_link(alice.owner_id(), &ShareToken::generate())
        .await
        .unwrap_err();
    assert!(matches!(err, common::share::ShareLinkError::Conflict));

    // the original link is untouched
    assert_eq!(db.link_for_owner(alice.owner_id()).await.unwrap(), Some(first));
}

#[tokio::test]
async fn test_disable_resets_flags() {
    let dir = tempfile::tempdir().unwrap();
    let db = on_disk_database(&dir).await;
    let alice = owner(&db, "alice").await;

    let token = db.enable_sharing(alice.owner_id()).await.unwrap();
    assert!(Owner::set_public_edit(alice.owner_id(), true, &db)
        .await
        .unwrap());
    assert!(db.check_edit_permission(alice.owner_id()).await.unwrap());

    db.disable_sharing(alice.owner_id()).await.unwrap();
    assert!(db.resolve(&token).await.unwrap().is_none());
    assert!(!db.check_edit_permission(alice.owner_id()).await.unwrap());

    // edit can only be toggled while shared
    assert!(!Owner::set_public_edit(alice.owner_id(), true, &db)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_resolve_access_against_database() {
    let dir = tempfile::tempdir().unwrap();
    let db = on_disk_database(&dir).await;
    let authority = JwtAuthority::new("database-test-secret", None).unwrap();
    let alice = owner(&db, "alice").await;
    let bob = owner(&db, "bob").await;
    let token = db.enable_sharing(alice.owner_id()).await.unwrap();

    let bob_credential = authority.issue(bob.owner_id()).unwrap();
    let access = resolve_access(&db, &authority, Some(token.as_str()), Some(&bob_credential))
        .await
        .unwrap();
    assert_eq!(access.scope_owner_id(), alice.owner_id());
    assert_eq!(access.authenticated_id(), Some(bob.owner_id()));
    assert!(!access.can_edit());

    Owner::set_public_edit(alice.owner_id(), true, &db)
        .await
        .unwrap();
    let access = resolve_access(&db, &authority, Some(token.as_str()), None)
        .await
        .unwrap();
    assert!(access.can_edit());
    assert_eq!(access.attribution(), Attribution::Anonymous);

    db.disable_sharing(alice.owner_id()).await.unwrap();
    assert_eq!(
        resolve_access(&db, &authority, Some(token.as_str()), None).await,
        Err(AccessError::InvalidShareLink)
    );
}

#[tokio::test]
async fn test_content_is_scoped_to_owner() {
    let dir = tempfile::tempdir().unwrap();
    let db = on_disk_database(&dir).await;
    let alice = owner(&db, "alice").await;
    let bob = owner(&db, "bob").await;

    let first = ContentItem::create(
        alice.owner_id(),
        &link("one"),
        Attribution::ByOwner(alice.owner_id()),
        &db,
    )
    .await
    .unwrap();
    ContentItem::create(alice.owner_id(), &link("two"), Attribution::Anonymous, &db)
        .await
        .unwrap();

    let titles: Vec<String> = ContentItem::list(alice.owner_id(), &db)
        .await
        .unwrap()
        .into_iter()
        .map(|item| item.title)
        .collect();
    assert_eq!(titles, ["one", "two"]);
    assert!(ContentItem::list(bob.owner_id(), &db)
        .await
        .unwrap()
        .is_empty());

    // bob can neither see, update nor delete alice's item
    assert!(ContentItem::get(first.id, bob.owner_id(), &db)
        .await
        .unwrap()
        .is_none());
    let patch = ContentPatch {
        title: Some("stolen".to_string()),
        ..Default::default()
    };
    assert!(ContentItem::update(
        first.id,
        bob.owner_id(),
        &patch,
        Attribution::ByOwner(bob.owner_id()),
        &db
    )
    .await
    .unwrap()
    .is_none());
    assert!(ContentItem::delete(first.id, bob.owner_id(), &db)
        .await
        .unwrap()
        .is_none());

    let updated = ContentItem::update(
        first.id,
        alice.owner_id(),
        &patch,
        Attribution::Anonymous,
        &db,
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.title, "stolen");
    assert_eq!(updated.updated_by, Some(Attribution::Anonymous));
    assert_eq!(updated.tags, vec!["a".to_string()]);
}

#[tokio::test]
async fn test_duplicate_username_is_unique_violation() {
    let dir = tempfile::tempdir().unwrap();
    let db = on_disk_database(&dir).await;
    owner(&db, "alice").await;

    let err = Owner::create("alice", "hash", &db).await.unwrap_err();
    match err {
        sqlx::Error::Database(db_err) => assert!(db_err.is_unique_violation()),
        other => panic!("expected a unique violation, got {other:?}"),
    }
}
