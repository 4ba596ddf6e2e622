//! Editable page text. Every edit appends a version; readers see the newest.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::Database;
use crate::Result;

/// Seed content per reference id, inserted only when the id has no rows
pub const DEFAULT_TEXTS: &[(&str, &str)] = &[
    ("home_title", "Home"),
    ("gallery_title", "Gallery"),
    ("buy_art_title", "Buy art"),
    (
        "buy_art_text",
        "The gallery shows my original paintings, both available and sold. \
         If you are interested in buying an original, send me an email and \
         I will tell you more about the piece.",
    ),
    ("about_me_title", "About me"),
    (
        "about_me_text",
        "I have been drawing for as long as I can remember. These days I paint \
         realism in acrylics, looking for the large moments hidden in everyday life.",
    ),
    ("prints_title", "Prints"),
    (
        "prints_text",
        "Selected paintings are available as prints. Add the ones you like to \
         the cart and I will get in touch about payment and delivery.",
    ),
];

/// One version of a piece of page text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredText {
    pub uuid: String,
    pub reference_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

pub(super) fn create_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS stored_texts (
            uuid TEXT PRIMARY KEY,
            reference_id TEXT NOT NULL,
            content TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_stored_texts_reference ON stored_texts(reference_id)",
        [],
    )?;
    Ok(())
}

pub(super) fn ensure_defaults(conn: &Connection) -> Result<()> {
    for (reference_id, content) in DEFAULT_TEXTS {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM stored_texts WHERE reference_id = ?1",
            params![reference_id],
            |row| row.get(0),
        )?;

        if count == 0 {
            insert_text(conn, reference_id, content)?;
            debug!("Seeded stored text {}", reference_id);
        }
    }
    Ok(())
}

fn insert_text(conn: &Connection, reference_id: &str, content: &str) -> Result<StoredText> {
    let text = StoredText {
        uuid: uuid::Uuid::new_v4().to_string(),
        reference_id: reference_id.to_string(),
        content: content.to_string(),
        created_at: Utc::now(),
    };
    conn.execute(
        "INSERT INTO stored_texts (uuid, reference_id, content, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![text.uuid, text.reference_id, text.content, text.created_at],
    )?;
    Ok(text)
}

fn text_from_row(row: &Row<'_>) -> rusqlite::Result<StoredText> {
    Ok(StoredText {
        uuid: row.get(0)?,
        reference_id: row.get(1)?,
        content: row.get(2)?,
        created_at: row.get(3)?,
    })
}

impl Database {
    /// Append a new version of `reference_id`
    pub async fn add_stored_text(&self, reference_id: &str, content: &str) -> Result<StoredText> {
        let reference_id = reference_id.to_string();
        let content = content.to_string();
        self.call(move |conn| {
            let text = insert_text(conn, &reference_id, &content)?;
            info!("Stored new version of text {}", text.reference_id);
            Ok(text)
        })
        .await
    }

    /// Every version of every text, newest first
    pub async fn list_stored_texts(&self) -> Result<Vec<StoredText>> {
        self.call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT uuid, reference_id, content, created_at FROM stored_texts
                 ORDER BY created_at DESC, rowid DESC",
            )?;
            let texts = stmt
                .query_map([], text_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(texts)
        })
        .await
    }

    /// The newest version of each reference id, sorted by id
    pub async fn latest_texts(&self) -> Result<Vec<StoredText>> {
        self.call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT uuid, reference_id, content, created_at FROM stored_texts AS s
                 WHERE s.rowid = (
                     SELECT rowid FROM stored_texts
                     WHERE reference_id = s.reference_id
                     ORDER BY created_at DESC, rowid DESC
                     LIMIT 1
                 )
                 ORDER BY reference_id ASC",
            )?;
            let texts = stmt
                .query_map([], text_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(texts)
        })
        .await
    }

    /// Versions of one reference id, newest first
    pub async fn stored_text_history(&self, reference_id: &str) -> Result<Vec<StoredText>> {
        let reference_id = reference_id.to_string();
        self.call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT uuid, reference_id, content, created_at FROM stored_texts
                 WHERE reference_id = ?1
                 ORDER BY created_at DESC, rowid DESC",
            )?;
            let texts = stmt
                .query_map(params![reference_id], text_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(texts)
        })
        .await
    }

    /// Current content of `reference_id`
    pub async fn get_stored_text(&self, reference_id: &str) -> Result<Option<String>> {
        let reference_id = reference_id.to_string();
        self.call(move |conn| {
            let content = conn
                .query_row(
                    "SELECT content FROM stored_texts
                     WHERE reference_id = ?1
                     ORDER BY created_at DESC, rowid DESC
                     LIMIT 1",
                    params![reference_id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(content)
        })
        .await
    }
}
