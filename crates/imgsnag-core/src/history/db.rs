//! Connection and schema.

use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Percent-encode a path for use in a sqlite:// URI.
fn path_to_sqlite_uri(path: &Path) -> String {
    let s = path.to_string_lossy();
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' => out.push_str("%25"),
            ' ' => out.push_str("%20"),
            '#' => out.push_str("%23"),
            '?' => out.push_str("%3F"),
            '&' => out.push_str("%26"),
            c => out.push(c),
        }
    }
    format!("sqlite://{}?mode=rwc", out)
}

/// Handle to the outcome history database.
///
/// Stored under the XDG state directory: `~/.local/state/imgsnag/history.db`.
#[derive(Clone)]
pub struct HistoryDb {
    pub(crate) pool: Pool<Sqlite>,
}

impl HistoryDb {
    /// Open (or create) the default history database and run migrations.
    pub async fn open_default() -> Result<Self> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("imgsnag")?;
        let db_path = xdg_dirs
            .place_state_file("history.db")
            .context("create state directory")?;
        Self::open_at(db_path).await
    }

    /// Open (or create) the database at a specific path. Creates parent dirs if needed.
    pub async fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect(&path_to_sqlite_uri(path))
            .await
            .with_context(|| format!("open history db {}", path.display()))?;
        let db = HistoryDb { pool };
        db.migrate().await?;
        Ok(db)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS batches (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                base_name TEXT NOT NULL,
                subfolder TEXT NOT NULL,
                requested INTEGER NOT NULL,
                created_at INTEGER NOT NULL,
                finished_at INTEGER
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS jobs (
                batch_id INTEGER NOT NULL REFERENCES batches(id),
                ordinal INTEGER NOT NULL,
                reference TEXT NOT NULL,
                target_path TEXT NOT NULL,
                write_id INTEGER,
                outcome TEXT NOT NULL,
                recorded_at INTEGER NOT NULL,
                PRIMARY KEY (batch_id, ordinal)
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Current time as Unix seconds.
pub(crate) fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

#[cfg(test)]
/// Open an in-memory database for tests.
pub(crate) async fn open_memory() -> Result<HistoryDb> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    let db = HistoryDb { pool };
    db.migrate().await?;
    Ok(db)
}
