use serde::Serialize;
use sqlx::{FromRow, SqliteConnection};
use time::OffsetDateTime;
use uuid::Uuid;

use common::content::{Attribution, ContentType};
use common::owner::OwnerId;

use crate::database::types::DUuid;
use crate::database::Database;

/// Separator for tag titles folded into one column by `group_concat`
const TAG_SEPARATOR: char = '\u{1f}';

const SELECT_CONTENT: &str = r#"
    SELECT
        c.id, c.owner_id, o.username AS owner_username, c.link, c.content_type,
        c.title, c.media_key, c.added_by, c.updated_by, c.created_at, c.updated_at,
        (
            SELECT group_concat(t.title, char(31))
            FROM content_tags ct
            JOIN tags t ON t.id = ct.tag_id
            WHERE ct.content_id = c.id
        ) AS tags
    FROM content c
    JOIN owners o ON o.id = c.owner_id
"#;

/// A stored link, note or upload, as returned to clients
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: Uuid,
    pub owner_id: OwnerId,
    pub owner_username: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub link: String,
    pub title: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_key: Option<String>,
    pub added_by: Attribution,
    /// `None` until the first update
    pub updated_by: Option<Attribution>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, FromRow)]
struct ContentRow {
    id: DUuid,
    owner_id: DUuid,
    owner_username: String,
    link: String,
    content_type: String,
    title: String,
    media_key: Option<String>,
    added_by: String,
    updated_by: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    tags: Option<String>,
}

impl TryFrom<ContentRow> for ContentItem {
    type Error = sqlx::Error;

    fn try_from(row: ContentRow) -> Result<Self, Self::Error> {
        let added_by = row
            .added_by
            .parse::<Attribution>()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        let updated_by = row
            .updated_by
            .map(|by| by.parse::<Attribution>())
            .transpose()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        let mut tags: Vec<String> = row
            .tags
            .map(|joined| joined.split(TAG_SEPARATOR).map(str::to_string).collect())
            .unwrap_or_default();
        tags.sort();

        Ok(ContentItem {
            id: row.id.into(),
            owner_id: row.owner_id.into(),
            owner_username: row.owner_username,
            content_type: ContentType::from_name(&row.content_type),
            link: row.link,
            title: row.title,
            tags,
            media_key: row.media_key,
            added_by,
            updated_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewContent {
    pub content_type: ContentType,
    pub link: String,
    pub title: String,
    pub tags: Vec<String>,
    pub media_key: Option<String>,
}

/// Fields to overwrite on update; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct ContentPatch {
    pub content_type: Option<ContentType>,
    pub link: Option<String>,
    pub title: Option<String>,
    /// Replaces the whole tag set when present
    pub tags: Option<Vec<String>>,
    pub media_key: Option<String>,
}

/// What is left to clean up after a row is gone
#[derive(Debug, Clone)]
pub struct DeletedContent {
    pub media_key: Option<String>,
}

impl ContentItem {
    /// Create a content item in the owner's collection
    pub async fn create(
        owner: OwnerId,
        new: &NewContent,
        added_by: Attribution,
        db: &Database,
    ) -> Result<ContentItem, sqlx::Error> {
        let id = DUuid::new();
        let mut tx = db.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO content (
                id, owner_id, link, content_type, title, media_key, added_by
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(id)
        .bind(DUuid::from(owner))
        .bind(&new.link)
        .bind(new.content_type.as_str())
        .bind(&new.title)
        .bind(&new.media_key)
        .bind(added_by.to_string())
        .execute(&mut *tx)
        .await?;

        attach_tags(&mut tx, id, &new.tags).await?;
        tx.commit().await?;

        Self::get(*id, owner, db)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Get one item, only if it belongs to `owner`
    pub async fn get(
        id: Uuid,
        owner: OwnerId,
        db: &Database,
    ) -> Result<Option<ContentItem>, sqlx::Error> {
        let sql = format!("{} WHERE c.id = ?1 AND c.owner_id = ?2", SELECT_CONTENT);
        sqlx::query_as::<_, ContentRow>(&sql)
            .bind(DUuid::from(id))
            .bind(DUuid::from(owner))
            .fetch_optional(&**db)
            .await?
            .map(ContentItem::try_from)
            .transpose()
    }

    /// List the owner's whole collection, oldest first
    pub async fn list(owner: OwnerId, db: &Database) -> Result<Vec<ContentItem>, sqlx::Error> {
        let sql = format!(
            "{} WHERE c.owner_id = ?1 ORDER BY c.created_at ASC, c.rowid ASC",
            SELECT_CONTENT
        );
        sqlx::query_as::<_, ContentRow>(&sql)
            .bind(DUuid::from(owner))
            .fetch_all(&**db)
            .await?
            .into_iter()
            .map(ContentItem::try_from)
            .collect()
    }

    /// Apply a patch to one of the owner's items. Returns `None` when no
    ///  row matched, which covers both a missing id and another owner's item.
    pub async fn update(
        id: Uuid,
        owner: OwnerId,
        patch: &ContentPatch,
        updated_by: Attribution,
        db: &Database,
    ) -> Result<Option<ContentItem>, sqlx::Error> {
        let content_id = DUuid::from(id);
        let mut tx = db.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE content
            SET content_type = COALESCE(?1, content_type),
                link = COALESCE(?2, link),
                title = COALESCE(?3, title),
                media_key = COALESCE(?4, media_key),
                updated_by = ?5,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?6 AND owner_id = ?7
            "#,
        )
        .bind(patch.content_type.as_ref().map(|kind| kind.as_str().to_string()))
        .bind(&patch.link)
        .bind(&patch.title)
        .bind(&patch.media_key)
        .bind(updated_by.to_string())
        .bind(content_id)
        .bind(DUuid::from(owner))
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        if let Some(tags) = &patch.tags {
            sqlx::query("DELETE FROM content_tags WHERE content_id = ?1")
                .bind(content_id)
                .execute(&mut *tx)
                .await?;
            attach_tags(&mut tx, content_id, tags).await?;
        }
        tx.commit().await?;

        Self::get(id, owner, db).await
    }

    /// Delete one of the owner's items. `None` means nothing matched.
    pub async fn delete(
        id: Uuid,
        owner: OwnerId,
        db: &Database,
    ) -> Result<Option<DeletedContent>, sqlx::Error> {
        let deleted: Option<(Option<String>,)> = sqlx::query_as(
            r#"
            DELETE FROM content
            WHERE id = ?1 AND owner_id = ?2
            RETURNING media_key
            "#,
        )
        .bind(DUuid::from(id))
        .bind(DUuid::from(owner))
        .fetch_optional(&**db)
        .await?;

        Ok(deleted.map(|(media_key,)| DeletedContent { media_key }))
    }
}

/// Trim, drop empties and de-duplicate incoming tag titles.
pub(crate) fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tags: Vec<String> = tags
        .into_iter()
        .map(|tag| tag.as_ref().trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect();
    tags.sort();
    tags.dedup();
    tags
}

async fn attach_tags(
    conn: &mut SqliteConnection,
    content_id: DUuid,
    tags: &[String],
) -> Result<(), sqlx::Error> {
    for title in normalize_tags(tags) {
        sqlx::query("INSERT INTO tags (id, title) VALUES (?1, ?2) ON CONFLICT(title) DO NOTHING")
            .bind(DUuid::new())
            .bind(&title)
            .execute(&mut *conn)
            .await?;

        let (tag_id,): (DUuid,) = sqlx::query_as("SELECT id FROM tags WHERE title = ?1")
            .bind(&title)
            .fetch_one(&mut *conn)
            .await?;

        sqlx::query("INSERT OR IGNORE INTO content_tags (content_id, tag_id) VALUES (?1, ?2)")
            .bind(content_id)
            .bind(tag_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}
