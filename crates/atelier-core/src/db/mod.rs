//! SQLite catalog for artworks, prints, orders and page text
//!
//! A single connection is shared behind a mutex, so all persistent
//! access is serialized. Async callers go through [`Database::call`],
//! which runs the closure on tokio's blocking pool.

mod art;
mod orders;
mod prints;
mod texts;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::{Error, Result};

pub use art::{Art, ArtPatch, NewArt};
pub use orders::{Order, OrderRow, OrderStatus};
pub use prints::{NewPrint, Print, PrintPatch};
pub use texts::{DEFAULT_TEXTS, StoredText};

/// Shared handle to the site database
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl Database {
    /// Open (or create) the database file at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Opening database at: {}", path.display());

        let conn = Connection::open(path)?;
        init(&conn)?;

        info!("Database initialized at {}", path.display());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path.to_path_buf()),
        })
    }

    /// Create an in-memory database (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        init(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        })
    }

    /// Path of the backing file, `None` for in-memory databases
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run `f` against the connection on the blocking pool
    pub async fn call<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| Error::Other("database connection mutex poisoned".to_string()))?;
            f(&conn)
        })
        .await?
    }
}

/// Pragmas, schema and default rows
fn init(conn: &Connection) -> Result<()> {
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    debug!("SQLite journal mode: {}", mode);
    conn.busy_timeout(Duration::from_millis(5000))?;

    art::create_table(conn)?;
    prints::create_table(conn)?;
    orders::create_table(conn)?;
    texts::create_table(conn)?;
    texts::ensure_defaults(conn)?;

    Ok(())
}

/// Parse the checkbox-style booleans HTML forms send
pub fn parse_form_bool(value: &str) -> bool {
    matches!(value, "true" | "1" | "on")
}
