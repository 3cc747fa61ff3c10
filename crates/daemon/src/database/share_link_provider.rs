use async_trait::async_trait;
use sqlx::FromRow;

use common::owner::OwnerId;
use common::share::{
    ResolvedShareLink, ShareLinkError, ShareLinkProvider, ShareToken, SharingFlags,
};

use super::types::DUuid;
use super::{is_unique_violation, Database};

type Result<T> = std::result::Result<T, ShareLinkError<sqlx::Error>>;

#[derive(Debug, FromRow)]
struct LinkRow {
    owner_id: DUuid,
    sharing_enabled: bool,
    public_edit_allowed: bool,
}

#[derive(Debug, FromRow)]
struct FlagsRow {
    sharing_enabled: bool,
    public_edit_allowed: bool,
}

impl From<FlagsRow> for SharingFlags {
    fn from(row: FlagsRow) -> Self {
        SharingFlags {
            sharing_enabled: row.sharing_enabled,
            public_edit_allowed: row.public_edit_allowed,
        }
    }
}

#[async_trait]
impl ShareLinkProvider for Database {
    type Error = sqlx::Error;

    async fn resolve(&self, token: &ShareToken) -> Result<Option<ResolvedShareLink>> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT l.owner_id, o.sharing_enabled, o.public_edit_allowed
            FROM share_links l
            JOIN owners o ON o.id = l.owner_id
            WHERE l.token = ?1
            "#,
        )
        .bind(token.as_str())
        .fetch_optional(&**self)
        .await?;

        Ok(row.map(|row| ResolvedShareLink {
            owner_id: row.owner_id.into(),
            flags: SharingFlags {
                sharing_enabled: row.sharing_enabled,
                public_edit_allowed: row.public_edit_allowed,
            },
        }))
    }

    async fn link_for_owner(&self, owner: OwnerId) -> Result<Option<ShareToken>> {
        let token: Option<(String,)> =
            sqlx::query_as("SELECT token FROM share_links WHERE owner_id = ?1")
                .bind(DUuid::from(owner))
                .fetch_optional(&**self)
                .await?;

        token
            .map(|(token,)| {
                ShareToken::parse(&token).map_err(|e| sqlx::Error::Decode(Box::new(e)))
            })
            .transpose()
            .map_err(ShareLinkError::Provider)
    }

    async fn sharing_flags(&self, owner: OwnerId) -> Result<Option<SharingFlags>> {
        let row = sqlx::query_as::<_, FlagsRow>(
            "SELECT sharing_enabled, public_edit_allowed FROM owners WHERE id = ?1",
        )
        .bind(DUuid::from(owner))
        .fetch_optional(&**self)
        .await?;

        Ok(row.map(SharingFlags::from))
    }

    async fn create_link(&self, owner: OwnerId, token: &ShareToken) -> Result<()> {
        let owner_id = DUuid::from(owner);
        let mut tx = self.begin().await?;

        let inserted = sqlx::query("INSERT INTO share_links (token, owner_id) VALUES (?1, ?2)")
            .bind(token.as_str())
            .bind(owner_id)
            .execute(&mut *tx)
            .await;
        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => return Err(ShareLinkError::Conflict),
            Err(e) => return Err(e.into()),
        }

        let updated = sqlx::query("UPDATE owners SET sharing_enabled = 1 WHERE id = ?1")
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;
        if updated.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound.into());
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_link(&self, owner: OwnerId) -> Result<bool> {
        let owner_id = DUuid::from(owner);
        let mut tx = self.begin().await?;

        let deleted = sqlx::query("DELETE FROM share_links WHERE owner_id = ?1")
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE owners SET sharing_enabled = 0 WHERE id = ?1")
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(deleted.rows_affected() > 0)
    }
}
