use std::path::Path;

use chrono::{Local, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use super::connection::{ensure_schema, open_database};
use super::payload::{decode_payload, encode_payload};
use crate::errors::{StorageContext, StoreResult};
use crate::models::{ReportSummary, SizingResult};

/// Layout of the `data` column. Minute precision, and it sorts
/// chronologically as plain text.
pub const SAVED_AT_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Stamp of a listed row. A missing or garbled `data` value falls back to the
/// epoch so the row stays reachable, sorted after every dated report.
fn parse_saved_at(id: i64, raw: Option<&str>) -> NaiveDateTime {
    let parsed = raw.and_then(|raw| NaiveDateTime::parse_from_str(raw, SAVED_AT_FORMAT).ok());
    parsed.unwrap_or_else(|| {
        warn!(id, stamp = ?raw, "report has an unreadable save stamp");
        NaiveDateTime::default()
    })
}

/// Source of save timestamps. Tests swap in a fixed clock.
pub type Clock = fn() -> NaiveDateTime;

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Append-only store for generated reports. The store owns its SQLite
/// connection; callers only ever receive copies of the stored data.
pub struct ReportStore {
    conn: Connection,
    clock: Clock,
}

impl ReportStore {
    /// Open the database file at `path`. Call [`ReportStore::initialize`] once
    /// before the first read or write.
    pub fn open(path: &Path) -> StoreResult<Self> {
        Ok(Self::from_connection(open_database(path)?))
    }

    /// Private in-memory database, gone when the store is dropped.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory().storage("open in-memory database")?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            clock: local_now,
        }
    }

    /// Replace the clock used to stamp new records.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Make sure the backing table exists. Safe to call any number of times.
    pub fn initialize(&self) -> StoreResult<()> {
        ensure_schema(&self.conn)
    }

    /// Append a new report and return its id. The insert runs inside a
    /// transaction, so a failure leaves no half-written row behind.
    pub fn save(&mut self, name: &str, location: &str, result: &SizingResult) -> StoreResult<i64> {
        let payload = encode_payload(result)?;
        let saved_at = (self.clock)().format(SAVED_AT_FORMAT).to_string();

        let tx = self.conn.transaction().storage("begin report insert")?;
        tx.execute(
            "INSERT INTO relatorios (nome, local, data, dados_json) VALUES (?1, ?2, ?3, ?4)",
            params![name, location, saved_at, payload],
        )
        .storage("insert report")?;
        let id = tx.last_insert_rowid();
        tx.commit().storage("commit report insert")?;

        info!(id, name, %saved_at, "saved report");
        Ok(id)
    }

    /// Every stored report, newest first. Reports saved within the same minute
    /// keep their insertion order (higher id first).
    pub fn list(&self) -> StoreResult<Vec<ReportSummary>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, nome, local, data
                 FROM relatorios
                 ORDER BY data DESC, id DESC",
            )
            .storage("prepare report list query")?;

        let mut reports = stmt
            .query_map([], |row| {
                let id: i64 = row.get(0)?;
                let raw: Option<String> = row.get(3)?;
                Ok(ReportSummary {
                    id,
                    name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    location: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    saved_at: parse_saved_at(id, raw.as_deref()),
                })
            })
            .storage("load reports")?
            .collect::<Result<Vec<_>, _>>()
            .storage("collect reports")?;
        // Text order misplaces rows whose stamp did not parse.
        reports.sort_by(|a, b| b.saved_at.cmp(&a.saved_at).then(b.id.cmp(&a.id)));

        debug!(count = reports.len(), "listed reports");
        Ok(reports)
    }

    /// Full result for `id`, or `None` when no such report exists.
    pub fn load_by_id(&self, id: i64) -> StoreResult<Option<SizingResult>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT dados_json FROM relatorios WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()
            .storage("load report")?;

        match payload {
            Some(json) => decode_payload(&json).map(Some),
            None => {
                debug!(id, "report not found");
                Ok(None)
            }
        }
    }

    pub fn count(&self) -> StoreResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM relatorios", [], |row| row.get(0))
            .storage("count reports")?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}
