//! SQLite-backed record store

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row, TransactionBehavior};

use crate::logic::threat::ThreatLabel;
use super::types::{FlowRecord, LabeledRecord, NewFlow, RecordId};
use super::{RecordStore, StoreError};

const TABLE: &str = "packets";

/// Rows the classifier can use: both ports stored as integers in u16 range.
/// `typeof` also rules out NULL.
const WELL_FORMED: &str = "typeof(src_port) = 'integer' AND typeof(dst_port) = 'integer'
     AND src_port BETWEEN 0 AND 65535 AND dst_port BETWEEN 0 AND 65535";

/// Schema the capture process creates
const CREATE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS packets (
    timestamp TEXT,
    src_ip TEXT,
    dst_ip TEXT,
    src_port INTEGER,
    dst_port INTEGER,
    protocol TEXT
);
"#;

/// Database wrapper
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

/// Row as read, before port range checks
struct RawFlow {
    id: i64,
    timestamp: String,
    src_ip: String,
    dst_ip: String,
    src_port: i64,
    dst_port: i64,
    protocol: String,
}

impl SqliteStore {
    /// Open an existing capture database. Does not create the file.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_WRITE)?;
        Self::from_connection(conn)
    }

    /// Create the database (and the packets table) if needed
    pub fn create(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(CREATE_SQL)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(CREATE_SQL)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        ensure_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Capture-side insert. Returns the new record id.
    pub fn insert(&self, flow: &NewFlow) -> Result<RecordId, StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO packets (timestamp, src_ip, dst_ip, src_port, dst_port, protocol)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                flow.timestamp,
                flow.src_ip,
                flow.dst_ip,
                flow.src_port,
                flow.dst_port,
                flow.protocol,
            ],
        )?;
        Ok(RecordId(conn.last_insert_rowid()))
    }

    /// Current label of one record
    pub fn label_of(&self, id: RecordId) -> Result<Option<ThreatLabel>, StoreError> {
        let conn = self.conn.lock();
        let value: Option<Option<String>> = conn
            .query_row(
                "SELECT classification FROM packets WHERE rowid = ?1",
                params![id.0],
                |row| row.get(0),
            )
            .optional()?;

        match value.flatten() {
            None => Ok(None),
            Some(s) => s
                .parse()
                .map(Some)
                .map_err(|_| StoreError::UnknownLabel { id, value: s }),
        }
    }
}

/// Verify the packets table exists and append the classification column
fn ensure_schema(conn: &Connection) -> Result<(), StoreError> {
    let exists: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![TABLE],
            |row| row.get(0),
        )
        .optional()?;
    if exists.is_none() {
        return Err(StoreError::MissingTable(TABLE));
    }

    let mut stmt = conn.prepare("PRAGMA table_info(packets)")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;

    if !columns.iter().any(|c| c == "classification") {
        conn.execute("ALTER TABLE packets ADD COLUMN classification TEXT", [])?;
        log::info!("Added classification column to '{}'", TABLE);
    }

    Ok(())
}

/// Text view of a column regardless of storage class
fn text_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) | ValueRef::Blob(t) => String::from_utf8_lossy(t).into_owned(),
    })
}

fn read_raw(row: &Row<'_>) -> rusqlite::Result<RawFlow> {
    Ok(RawFlow {
        id: row.get(0)?,
        timestamp: text_column(row, 1)?,
        src_ip: text_column(row, 2)?,
        dst_ip: text_column(row, 3)?,
        src_port: row.get(4)?,
        dst_port: row.get(5)?,
        protocol: text_column(row, 6)?,
    })
}

impl TryFrom<RawFlow> for FlowRecord {
    type Error = StoreError;

    fn try_from(raw: RawFlow) -> Result<Self, Self::Error> {
        let id = RecordId(raw.id);
        let port = |value: i64, field: &str| {
            u16::try_from(value).map_err(|_| StoreError::InvalidRecord {
                id,
                reason: format!("{} {} out of range", field, value),
            })
        };

        Ok(FlowRecord {
            id,
            src_port: port(raw.src_port, "src_port")?,
            dst_port: port(raw.dst_port, "dst_port")?,
            timestamp: raw.timestamp,
            src_ip: raw.src_ip,
            dst_ip: raw.dst_ip,
            protocol: raw.protocol,
        })
    }
}

impl RecordStore for SqliteStore {
    fn fetch_unlabeled(&self, limit: usize) -> Result<Vec<FlowRecord>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let conn = self.conn.lock();
        let skipped: i64 = conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM packets WHERE classification IS NULL AND NOT ({})",
                WELL_FORMED
            ),
            [],
            |row| row.get(0),
        )?;
        if skipped > 0 {
            log::warn!("Skipping {} unlabeled records with missing or invalid ports", skipped);
        }

        let mut stmt = conn.prepare(&format!(
            "SELECT rowid, timestamp, src_ip, dst_ip, src_port, dst_port, protocol
             FROM packets
             WHERE classification IS NULL AND {}
             ORDER BY rowid ASC
             LIMIT ?1",
            WELL_FORMED
        ))?;
        let raws = stmt
            .query_map(params![limit], read_raw)?
            .collect::<Result<Vec<_>, _>>()?;

        raws.into_iter().map(FlowRecord::try_from).collect()
    }

    fn fetch_labeled(&self) -> Result<Vec<LabeledRecord>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT rowid, classification
             FROM packets
             WHERE classification IS NOT NULL
             ORDER BY rowid ASC",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, value)| {
                let id = RecordId(id);
                value
                    .parse()
                    .map(|label| LabeledRecord { id, label })
                    .map_err(|_| StoreError::UnknownLabel { id, value })
            })
            .collect()
    }

    fn persist(&self, labels: &[(RecordId, ThreatLabel)]) -> Result<(), StoreError> {
        if labels.is_empty() {
            return Ok(());
        }

        let mut conn = self.conn.lock();
        // IMMEDIATE takes the write lock up front: one writer across processes.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        {
            let mut stmt = tx.prepare(
                "UPDATE packets SET classification = ?1
                 WHERE rowid = ?2 AND classification IS NULL",
            )?;
            for (id, label) in labels {
                let changed = stmt.execute(params![label.as_str(), id.0])?;
                if changed != 1 {
                    // tx drops here and rolls back
                    return Err(StoreError::Conflict { id: *id });
                }
            }
        }
        tx.commit()?;

        log::debug!("Persisted {} labels", labels.len());
        Ok(())
    }

    fn count_unlabeled(&self) -> Result<usize, StoreError> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM packets WHERE classification IS NULL AND {}", WELL_FORMED),
            [],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as usize)
    }
}
