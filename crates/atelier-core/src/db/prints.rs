//! Prints sold through the store

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::Database;
use crate::{Error, Result};

const PRINT_COLUMNS: &str = "id, img_url, thumb_url, title, medium, width, height, year, \
                             description, price, quantity_left, created_at, ordering, show_in_store";

/// A purchasable print
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Print {
    pub id: String,
    pub img_url: String,
    pub thumb_url: String,
    pub title: String,
    pub medium: String,
    pub width: i64,
    pub height: i64,
    pub year: String,
    pub description: String,
    pub price: f64,
    pub quantity_left: i64,
    pub created_at: DateTime<Utc>,
    pub ordering: f64,
    pub show_in_store: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NewPrint {
    pub img_url: String,
    pub thumb_url: String,
    pub title: String,
    pub medium: String,
    pub width: i64,
    pub height: i64,
    pub year: String,
    pub description: String,
    pub price: f64,
    pub quantity_left: i64,
    pub ordering: f64,
    pub show_in_store: bool,
}

impl Default for NewPrint {
    fn default() -> Self {
        Self {
            img_url: String::new(),
            thumb_url: String::new(),
            title: String::new(),
            medium: String::new(),
            width: 0,
            height: 0,
            year: String::new(),
            description: String::new(),
            price: 0.0,
            quantity_left: 0,
            ordering: 0.0,
            show_in_store: true,
        }
    }
}

/// Partial update; `None` leaves the column unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintPatch {
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
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_left: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordering: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_in_store: Option<bool>,
}

pub(super) fn create_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS prints (
            id TEXT PRIMARY KEY,
            img_url TEXT NOT NULL,
            thumb_url TEXT NOT NULL,
            title TEXT NOT NULL,
            medium TEXT NOT NULL,
            width INTEGER NOT NULL,
            height INTEGER NOT NULL,
            year TEXT NOT NULL,
            description TEXT NOT NULL,
            price REAL NOT NULL,
            quantity_left INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            ordering REAL NOT NULL DEFAULT 0,
            show_in_store BOOLEAN NOT NULL DEFAULT 1
        )",
        [],
    )?;
    Ok(())
}

fn print_from_row(row: &Row<'_>) -> rusqlite::Result<Print> {
    Ok(Print {
        id: row.get(0)?,
        img_url: row.get(1)?,
        thumb_url: row.get(2)?,
        title: row.get(3)?,
        medium: row.get(4)?,
        width: row.get(5)?,
        height: row.get(6)?,
        year: row.get(7)?,
        description: row.get(8)?,
        price: row.get(9)?,
        quantity_left: row.get(10)?,
        created_at: row.get(11)?,
        ordering: row.get(12)?,
        show_in_store: row.get(13)?,
    })
}

fn query_prints(conn: &Connection, store_only: bool, limit: i64, offset: i64) -> Result<Vec<Print>> {
    let filter = if store_only { "WHERE show_in_store = 1" } else { "" };
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM prints {} ORDER BY ordering DESC, title ASC LIMIT ?1 OFFSET ?2",
        PRINT_COLUMNS, filter
    ))?;
    let prints = stmt
        .query_map(params![limit, offset], print_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(prints)
}

impl Database {
    pub async fn add_print(&self, new: NewPrint) -> Result<Print> {
        self.call(move |conn| {
            let print = Print {
                id: uuid::Uuid::new_v4().to_string(),
                img_url: new.img_url,
                thumb_url: new.thumb_url,
                title: new.title,
                medium: new.medium,
                width: new.width,
                height: new.height,
                year: new.year,
                description: new.description,
                price: new.price,
                quantity_left: new.quantity_left,
                created_at: Utc::now(),
                ordering: new.ordering,
                show_in_store: new.show_in_store,
            };

            conn.execute(
                &format!(
                    "INSERT INTO prints ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                    PRINT_COLUMNS
                ),
                params![
                    print.id,
                    print.img_url,
                    print.thumb_url,
                    print.title,
                    print.medium,
                    print.width,
                    print.height,
                    print.year,
                    print.description,
                    print.price,
                    print.quantity_left,
                    print.created_at,
                    print.ordering,
                    print.show_in_store,
                ],
            )?;

            info!("Added print {} ({})", print.id, print.title);
            Ok(print)
        })
        .await
    }

    pub async fn delete_print(&self, id: &str) -> Result<bool> {
        let id = id.to_string();
        self.call(move |conn| {
            let affected = conn.execute("DELETE FROM prints WHERE id = ?1", params![id])?;
            Ok(affected > 0)
        })
        .await
    }

    /// Every print, including hidden ones
    pub async fn list_prints(&self) -> Result<Vec<Print>> {
        self.call(|conn| query_prints(conn, false, -1, 0)).await
    }

    /// Prints visible in the store
    pub async fn list_store_prints(&self) -> Result<Vec<Print>> {
        self.call(|conn| query_prints(conn, true, -1, 0)).await
    }

    pub async fn list_store_prints_paged(&self, limit: i64, offset: i64) -> Result<Vec<Print>> {
        self.call(move |conn| query_prints(conn, true, limit, offset)).await
    }

    pub async fn get_print(&self, id: &str) -> Result<Option<Print>> {
        let id = id.to_string();
        self.call(move |conn| {
            let print = conn
                .query_row(
                    &format!("SELECT {} FROM prints WHERE id = ?1", PRINT_COLUMNS),
                    params![id],
                    print_from_row,
                )
                .optional()?;
            Ok(print)
        })
        .await
    }

    pub async fn update_print(&self, id: &str, patch: PrintPatch) -> Result<()> {
        let id = id.to_string();
        self.call(move |conn| {
            let affected = conn.execute(
                "UPDATE prints
                 SET title = COALESCE(?1, title),
                     img_url = COALESCE(?2, img_url),
                     thumb_url = COALESCE(?3, thumb_url),
                     medium = COALESCE(?4, medium),
                     width = COALESCE(?5, width),
                     height = COALESCE(?6, height),
                     year = COALESCE(?7, year),
                     description = COALESCE(?8, description),
                     price = COALESCE(?9, price),
                     quantity_left = COALESCE(?10, quantity_left),
                     ordering = COALESCE(?11, ordering),
                     show_in_store = COALESCE(?12, show_in_store)
                 WHERE id = ?13",
                params![
                    patch.title,
                    patch.img_url,
                    patch.thumb_url,
                    patch.medium,
                    patch.width,
                    patch.height,
                    patch.year,
                    patch.description,
                    patch.price,
                    patch.quantity_left,
                    patch.ordering,
                    patch.show_in_store,
                    id,
                ],
            )?;

            if affected == 0 {
                return Err(Error::NotFound(format!("print {}", id)));
            }
            Ok(())
        })
        .await
    }
}
