use sqlx::FromRow;
use time::OffsetDateTime;

use common::owner::OwnerId;

use crate::database::types::DUuid;
use crate::database::Database;

/// A registered account
#[derive(Debug, Clone, FromRow)]
pub struct Owner {
    pub id: DUuid,
    pub username: String,
    pub password_hash: String,
    pub sharing_enabled: bool,
    pub public_edit_allowed: bool,
    pub created_at: OffsetDateTime,
}

impl Owner {
    pub fn owner_id(&self) -> OwnerId {
        self.id.into()
    }

    /// Register a new owner. Fails with a unique violation if the username
    ///  is taken.
    pub async fn create(
        username: &str,
        password_hash: &str,
        db: &Database,
    ) -> Result<Owner, sqlx::Error> {
        let id = DUuid::new();

        sqlx::query(
            r#"
            INSERT INTO owners (id, username, password_hash)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(id)
        .bind(username)
        .bind(password_hash)
        .execute(&**db)
        .await?;

        Self::get(id.into(), db)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn get(owner: OwnerId, db: &Database) -> Result<Option<Owner>, sqlx::Error> {
        sqlx::query_as::<_, Owner>(
            r#"
            SELECT id, username, password_hash, sharing_enabled, public_edit_allowed, created_at
            FROM owners
            WHERE id = ?1
            "#,
        )
        .bind(DUuid::from(owner))
        .fetch_optional(&**db)
        .await
    }

    pub async fn by_username(username: &str, db: &Database) -> Result<Option<Owner>, sqlx::Error> {
        sqlx::query_as::<_, Owner>(
            r#"
            SELECT id, username, password_hash, sharing_enabled, public_edit_allowed, created_at
            FROM owners
            WHERE username = ?1
            "#,
        )
        .bind(username)
        .fetch_optional(&**db)
        .await
    }

    /// Set whether share link visitors may edit. Only applies while the
    ///  owner is sharing; returns whether a row was updated.
    pub async fn set_public_edit(
        owner: OwnerId,
        allowed: bool,
        db: &Database,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE owners
            SET public_edit_allowed = ?1
            WHERE id = ?2 AND sharing_enabled = 1
            "#,
        )
        .bind(allowed)
        .bind(DUuid::from(owner))
        .execute(&**db)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
