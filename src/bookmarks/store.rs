use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use libsql::Connection;
use uuid::Uuid;

use super::model::{Bookmark, ListFilter, NewBookmark};

pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Persistence collaborator for bookmarks.
#[async_trait]
pub trait BookmarkStore: Send + Sync {
    /// Persists a new record and returns it with its assigned id.
    async fn create(&self, attrs: NewBookmark) -> Result<Bookmark>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Bookmark>>;

    async fn delete_one(&self, bookmark: &Bookmark) -> Result<()>;

    /// Writes every mutable field of `bookmark` back and returns the stored record.
    async fn save(&self, bookmark: &Bookmark) -> Result<Bookmark>;

    async fn list_by_owner(&self, owner: &str, filter: &ListFilter) -> Result<Vec<Bookmark>>;
}

/// libsql-backed [`BookmarkStore`].
pub struct Bookmarks<'a> {
    conn: &'a Connection,
}

const COLUMNS: &str = "id, title, url, tags, is_favorite, owner, created_at, updated_at";

impl<'a> Bookmarks<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn row_to_bookmark(&self, row: &libsql::Row) -> Result<Bookmark> {
        let tags: String = row.get(3)?;
        let tags: Vec<String> =
            serde_json::from_str(&tags).with_context(|| format!("invalid tags column: {}", tags))?;
        let is_favorite: i64 = row.get(4)?;

        Ok(Bookmark {
            id: row.get(0)?,
            title: row.get(1)?,
            url: row.get(2)?,
            tags,
            is_favorite: is_favorite != 0,
            owner: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}

#[async_trait]
impl<'a> BookmarkStore for Bookmarks<'a> {
    async fn create(&self, attrs: NewBookmark) -> Result<Bookmark> {
        let query = format!(
            r#"
            INSERT INTO bookmarks ({COLUMNS})
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {COLUMNS}
        "#
        );

        let id = Uuid::new_v4().to_string();
        let now = now_timestamp();
        let tags = serde_json::to_string(&attrs.tags)?;

        let mut rows = self
            .conn
            .query(
                &query,
                libsql::params![
                    id,
                    attrs.title,
                    attrs.url,
                    tags,
                    attrs.is_favorite as i64,
                    attrs.owner,
                    now.clone(),
                    now
                ],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(self.row_to_bookmark(&row)?)
        } else {
            anyhow::bail!("Failed to create bookmark")
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Bookmark>> {
        let query = format!("SELECT {COLUMNS} FROM bookmarks WHERE id = ?");

        let mut rows = self.conn.query(&query, libsql::params![id]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(self.row_to_bookmark(&row)?))
        } else {
            Ok(None)
        }
    }

    async fn delete_one(&self, bookmark: &Bookmark) -> Result<()> {
        self.conn
            .execute("DELETE FROM bookmarks WHERE id = ?", libsql::params![bookmark.id.as_str()])
            .await?;
        Ok(())
    }

    async fn save(&self, bookmark: &Bookmark) -> Result<Bookmark> {
        let query = format!(
            r#"
            UPDATE bookmarks
            SET title = ?, url = ?, tags = ?, is_favorite = ?, updated_at = ?
            WHERE id = ?
            RETURNING {COLUMNS}
        "#
        );

        let tags = serde_json::to_string(&bookmark.tags)?;
        let mut rows = self
            .conn
            .query(
                &query,
                libsql::params![
                    bookmark.title.as_str(),
                    bookmark.url.as_str(),
                    tags,
                    bookmark.is_favorite as i64,
                    now_timestamp(),
                    bookmark.id.as_str()
                ],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(self.row_to_bookmark(&row)?)
        } else {
            anyhow::bail!("bookmark {} no longer exists", bookmark.id)
        }
    }

    async fn list_by_owner(&self, owner: &str, filter: &ListFilter) -> Result<Vec<Bookmark>> {
        let mut clauses = vec!["owner = ?"];
        let mut params: Vec<libsql::Value> = vec![owner.to_string().into()];

        if let Some(tag) = &filter.tag {
            clauses.push("EXISTS (SELECT 1 FROM json_each(bookmarks.tags) WHERE json_each.value = ?)");
            params.push(tag.clone().into());
        }
        if let Some(favorite) = filter.favorite {
            clauses.push("is_favorite = ?");
            params.push((favorite as i64).into());
        }
        params.push(filter.limit.into());
        params.push(filter.offset.into());

        let query = format!(
            r#"
            SELECT {COLUMNS}
            FROM bookmarks
            WHERE {}
            ORDER BY created_at DESC, rowid DESC
            LIMIT ? OFFSET ?
        "#,
            clauses.join(" AND ")
        );

        let mut rows = self.conn.query(&query, params).await?;
        let mut bookmarks = Vec::new();
        while let Some(row) = rows.next().await? {
            bookmarks.push(self.row_to_bookmark(&row)?);
        }

        Ok(bookmarks)
    }
}
