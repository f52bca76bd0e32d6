use std::fs;
use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;
use tracing::debug;

use crate::errors::{StorageContext, StoreError, StoreResult};

/// How long a write waits on a lock held by another process before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open (creating if needed) the SQLite file at `path`. The parent directory is
/// created first so a fresh install works without any manual setup.
pub fn open_database(path: &Path) -> StoreResult<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StoreError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let conn = Connection::open(path).storage("open SQLite database")?;
    conn.busy_timeout(BUSY_TIMEOUT)
        .storage("configure busy timeout")?;
    debug!(path = %path.display(), "opened report database");
    Ok(conn)
}

/// Create the `relatorios` table when it does not exist yet. Running this
/// against a populated database is a no-op, and the column names match the
/// files written by earlier releases of the tool.
pub fn ensure_schema(conn: &Connection) -> StoreResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS relatorios (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nome TEXT,
            local TEXT,
            data TEXT,
            dados_json TEXT
        )",
        [],
    )
    .storage("create relatorios table")?;

    Ok(())
}
