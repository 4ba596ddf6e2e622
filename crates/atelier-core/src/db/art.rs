//! Original artworks shown in the gallery

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Database, parse_form_bool};
use crate::{Error, Result};

const ART_COLUMNS: &str = "id, img_url, thumb_url, title, medium, width, height, year, \
                           description, sold, created_at, ordering";

/// A gallery artwork
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Art {
    pub id: String,
    pub img_url: String,
    pub thumb_url: String,
    pub title: String,
    pub medium: String,
    pub width: i64,
    pub height: i64,
    pub year: String,
    pub description: String,
    pub sold: bool,
    pub created_at: DateTime<Utc>,
    pub ordering: f64,
}

/// Fields supplied when creating an artwork
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewArt {
    pub img_url: String,
    pub thumb_url: String,
    pub title: String,
    pub medium: String,
    pub width: i64,
    pub height: i64,
    pub year: String,
    pub description: String,
    pub sold: bool,
    pub ordering: f64,
}

/// Partial update; `None` leaves the column unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordering: Option<f64>,
}

impl ArtPatch {
    /// Build a single-field patch from a column name and raw form value.
    /// Only known columns are accepted.
    pub fn from_field(field: &str, value: &str) -> Result<Self> {
        let mut patch = Self::default();
        let number_error = || Error::InvalidField(format!("{} expects a number, got {:?}", field, value));

        match field {
            "title" => patch.title = Some(value.to_string()),
            "img_url" => patch.img_url = Some(value.to_string()),
            "thumb_url" => patch.thumb_url = Some(value.to_string()),
            "medium" => patch.medium = Some(value.to_string()),
            "year" => patch.year = Some(value.to_string()),
            "description" => patch.description = Some(value.to_string()),
            "width" => patch.width = Some(value.trim().parse().map_err(|_| number_error())?),
            "height" => patch.height = Some(value.trim().parse().map_err(|_| number_error())?),
            "ordering" => patch.ordering = Some(value.trim().parse().map_err(|_| number_error())?),
            "sold" => patch.sold = Some(parse_form_bool(value)),
            other => return Err(Error::InvalidField(other.to_string())),
        }

        Ok(patch)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

pub(super) fn create_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS arts (
            id TEXT PRIMARY KEY,
            img_url TEXT NOT NULL,
            thumb_url TEXT NOT NULL,
            title TEXT NOT NULL,
            medium TEXT NOT NULL,
            width INTEGER NOT NULL,
            height INTEGER NOT NULL,
            year TEXT NOT NULL,
            description TEXT NOT NULL,
            sold BOOLEAN NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            ordering REAL NOT NULL DEFAULT 0
        )",
        [],
    )?;
    Ok(())
}

fn art_from_row(row: &Row<'_>) -> rusqlite::Result<Art> {
    Ok(Art {
        id: row.get(0)?,
        img_url: row.get(1)?,
        thumb_url: row.get(2)?,
        title: row.get(3)?,
        medium: row.get(4)?,
        width: row.get(5)?,
        height: row.get(6)?,
        year: row.get(7)?,
        description: row.get(8)?,
        sold: row.get(9)?,
        created_at: row.get(10)?,
        ordering: row.get(11)?,
    })
}

fn query_arts(conn: &Connection, limit: i64, offset: i64) -> Result<Vec<Art>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM arts ORDER BY ordering DESC, title ASC LIMIT ?1 OFFSET ?2",
        ART_COLUMNS
    ))?;
    let arts = stmt
        .query_map(params![limit, offset], art_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(arts)
}

fn update_art(conn: &Connection, id: &str, patch: &ArtPatch) -> Result<()> {
    let affected = conn.execute(
        "UPDATE arts
         SET title = COALESCE(?1, title),
             img_url = COALESCE(?2, img_url),
             thumb_url = COALESCE(?3, thumb_url),
             medium = COALESCE(?4, medium),
             width = COALESCE(?5, width),
             height = COALESCE(?6, height),
             year = COALESCE(?7, year),
             description = COALESCE(?8, description),
             sold = COALESCE(?9, sold),
             ordering = COALESCE(?10, ordering)
         WHERE id = ?11",
        params![
            patch.title,
            patch.img_url,
            patch.thumb_url,
            patch.medium,
            patch.width,
            patch.height,
            patch.year,
            patch.description,
            patch.sold,
            patch.ordering,
            id,
        ],
    )?;

    if affected == 0 {
        return Err(Error::NotFound(format!("art {}", id)));
    }
    Ok(())
}

impl Database {
    /// Insert a new artwork with a fresh id
    pub async fn add_art(&self, new: NewArt) -> Result<Art> {
        self.call(move |conn| {
            let art = Art {
                id: uuid::Uuid::new_v4().to_string(),
                img_url: new.img_url,
                thumb_url: new.thumb_url,
                title: new.title,
                medium: new.medium,
                width: new.width,
                height: new.height,
                year: new.year,
                description: new.description,
                sold: new.sold,
                created_at: Utc::now(),
                ordering: new.ordering,
            };

            conn.execute(
                &format!(
                    "INSERT INTO arts ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                    ART_COLUMNS
                ),
                params![
                    art.id,
                    art.img_url,
                    art.thumb_url,
                    art.title,
                    art.medium,
                    art.width,
                    art.height,
                    art.year,
                    art.description,
                    art.sold,
                    art.created_at,
                    art.ordering,
                ],
            )?;

            info!("Added art {} ({})", art.id, art.title);
            Ok(art)
        })
        .await
    }

    /// Delete an artwork, returning whether it existed
    pub async fn delete_art(&self, id: &str) -> Result<bool> {
        let id = id.to_string();
        self.call(move |conn| {
            let affected = conn.execute("DELETE FROM arts WHERE id = ?1", params![id])?;
            Ok(affected > 0)
        })
        .await
    }

    /// All artworks in display order
    pub async fn list_arts(&self) -> Result<Vec<Art>> {
        self.call(|conn| query_arts(conn, -1, 0)).await
    }

    /// One page of artworks in display order
    pub async fn list_arts_paged(&self, limit: i64, offset: i64) -> Result<Vec<Art>> {
        self.call(move |conn| query_arts(conn, limit, offset)).await
    }

    pub async fn get_art(&self, id: &str) -> Result<Option<Art>> {
        let id = id.to_string();
        self.call(move |conn| {
            let art = conn
                .query_row(
                    &format!("SELECT {} FROM arts WHERE id = ?1", ART_COLUMNS),
                    params![id],
                    art_from_row,
                )
                .optional()?;
            Ok(art)
        })
        .await
    }

    /// Apply a partial update. Unknown ids are reported as not found.
    pub async fn update_art(&self, id: &str, patch: ArtPatch) -> Result<()> {
        let id = id.to_string();
        self.call(move |conn| update_art(conn, &id, &patch)).await
    }

    /// Update one column by name from a raw form value
    pub async fn update_art_field(&self, id: &str, field: &str, value: &str) -> Result<()> {
        let patch = ArtPatch::from_field(field, value)?;
        self.update_art(id, patch).await
    }

    /// Renumber `ordering` so the current display order maps to N..1
    pub async fn reset_art_ordering(&self) -> Result<Vec<Art>> {
        self.call(|conn| {
            let tx = conn.unchecked_transaction()?;
            let mut arts = query_arts(&tx, -1, 0)?;
            let count = arts.len();

            for (i, art) in arts.iter_mut().enumerate() {
                art.ordering = (count - i) as f64;
                debug!("Resetting art {} to ordering {}", art.id, art.ordering);
                tx.execute(
                    "UPDATE arts SET ordering = ?1 WHERE id = ?2",
                    params![art.ordering, art.id],
                )?;
            }

            tx.commit()?;
            info!("Reset ordering for {} artworks", count);
            Ok(arts)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_art(title: &str, ordering: f64) -> NewArt {
        NewArt {
            img_url: format!("{}.jpg", title),
            thumb_url: format!("{}_thumb.jpg", title),
            title: title.to_string(),
            width: 70,
            height: 50,
            ordering,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_add_and_get() {
        let db = Database::in_memory().unwrap();
        let art = db.add_art(new_art("Nexus", 1.0)).await.unwrap();

        let loaded = db.get_art(&art.id).await.unwrap().unwrap();
        assert_eq!(loaded.title, "Nexus");
        assert_eq!(loaded.width, 70);
        assert!(!loaded.sold);
        assert!(db.get_art("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_display_order_and_paging() {
        let db = Database::in_memory().unwrap();
        db.add_art(new_art("B", 1.0)).await.unwrap();
        db.add_art(new_art("A", 1.0)).await.unwrap();
        db.add_art(new_art("C", 5.0)).await.unwrap();

        let titles: Vec<_> = db.list_arts().await.unwrap().into_iter().map(|a| a.title).collect();
        assert_eq!(titles, ["C", "A", "B"]);

        let page: Vec<_> = db
            .list_arts_paged(2, 2)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.title)
            .collect();
        assert_eq!(page, ["B"]);
    }

    #[tokio::test]
    async fn test_patch_only_touches_present_fields() {
        let db = Database::in_memory().unwrap();
        let art = db.add_art(new_art("Mare", 1.0)).await.unwrap();

        let patch = ArtPatch {
            sold: Some(true),
            description: Some("Acrylic".to_string()),
            ..Default::default()
        };
        db.update_art(&art.id, patch).await.unwrap();

        let loaded = db.get_art(&art.id).await.unwrap().unwrap();
        assert!(loaded.sold);
        assert_eq!(loaded.description, "Acrylic");
        assert_eq!(loaded.title, "Mare");
    }

    #[tokio::test]
    async fn test_update_missing_art() {
        let db = Database::in_memory().unwrap();
        let result = db.update_art("missing", ArtPatch::default()).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_field() {
        let db = Database::in_memory().unwrap();
        let art = db.add_art(new_art("Totum", 1.0)).await.unwrap();

        db.update_art_field(&art.id, "sold", "on").await.unwrap();
        db.update_art_field(&art.id, "width", "92").await.unwrap();

        let loaded = db.get_art(&art.id).await.unwrap().unwrap();
        assert!(loaded.sold);
        assert_eq!(loaded.width, 92);
    }

    #[tokio::test]
    async fn test_update_field_rejects_unknown_column() {
        let db = Database::in_memory().unwrap();
        let art = db.add_art(new_art("Totum", 1.0)).await.unwrap();

        let result = db.update_art_field(&art.id, "id = 'x'; --", "1").await;
        assert!(matches!(result, Err(Error::InvalidField(_))));

        let result = db.update_art_field(&art.id, "height", "tall").await;
        assert!(matches!(result, Err(Error::InvalidField(_))));
    }

    #[tokio::test]
    async fn test_delete() {
        let db = Database::in_memory().unwrap();
        let art = db.add_art(new_art("Fallout", 1.0)).await.unwrap();

        assert!(db.delete_art(&art.id).await.unwrap());
        assert!(!db.delete_art(&art.id).await.unwrap());
        assert!(db.get_art(&art.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reset_ordering_preserves_display_order() {
        let db = Database::in_memory().unwrap();
        db.add_art(new_art("B", 0.5)).await.unwrap();
        db.add_art(new_art("A", 0.5)).await.unwrap();
        db.add_art(new_art("C", 42.0)).await.unwrap();

        let before: Vec<_> = db.list_arts().await.unwrap().into_iter().map(|a| a.title).collect();
        db.reset_art_ordering().await.unwrap();
        let after = db.list_arts().await.unwrap();

        let titles: Vec<_> = after.iter().map(|a| a.title.clone()).collect();
        assert_eq!(titles, before);
        let orderings: Vec<_> = after.iter().map(|a| a.ordering).collect();
        assert_eq!(orderings, [3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(ArtPatch::default().is_empty());
        assert!(!ArtPatch::from_field("title", "x").unwrap().is_empty());
    }
}
