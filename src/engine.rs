//! The narrow slice of an ISAM storage engine this crate reads through.
//!
//! A [`Backend`] attaches a database file and hands back a [`Session`]. The
//! session lists tables and columns and opens tables read-only as
//! [`TableCursor`]s. All calls block; nothing here is async.
//!
//! A freshly opened cursor sits before the first record. Each successful
//! [`TableCursor::move_next`] positions it on the next record, and `false`
//! means the end of the table was reached.
use std::fmt;
use std::path::Path;

use crate::config::EngineConfig;

/// Engine-assigned column identifier, stable for an attached database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnId(pub u32);

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Storage-level column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Bit,
    UnsignedByte,
    Short,
    Long,
    Currency,
    IeeeSingle,
    IeeeDouble,
    DateTime,
    Binary,
    Text,
    LongBinary,
    LongText,
    UnsignedLong,
    LongLong,
    Guid,
    UnsignedShort,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub id: ColumnId,
    pub column_type: ColumnType,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, id: u32, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            id: ColumnId(id),
            column_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("database file not found: {0}")]
    FileNotFound(String),
    #[error("not a valid database: {0}")]
    InvalidDatabase(String),
    #[error("table not found: {0}")]
    TableNotFound(String),
    #[error("read access denied: {0}")]
    AccessDenied(String),
    #[error("column {0} not found")]
    ColumnNotFound(ColumnId),
    #[error("cursor is not positioned on a record")]
    NoCurrentRecord,
    #[error("{0}")]
    Other(String),
}

pub trait Backend {
    type Session: Session;

    /// Initialise an engine instance, attach `path` read-only and open it.
    fn attach(&self, path: &Path, config: &EngineConfig) -> Result<Self::Session, EngineError>;
}

pub trait Session {
    fn table_names(&self) -> Result<Vec<String>, EngineError>;

    fn table_columns(&self, table: &str) -> Result<Vec<ColumnInfo>, EngineError>;

    fn open_table_read_only(
        &mut self,
        table: &str,
    ) -> Result<Box<dyn TableCursor + '_>, EngineError>;

    /// Close the database, detach it and terminate the engine instance.
    fn detach(&mut self) -> Result<(), EngineError>;
}

pub trait TableCursor {
    /// Record count as reported by the engine's index statistics. May be
    /// stale; callers should not rely on it for loop bounds.
    fn approximate_record_count(&mut self) -> Result<u64, EngineError>;

    fn move_next(&mut self) -> Result<bool, EngineError>;

    /// Raw bytes of `column` on the current record, `None` when unset.
    fn retrieve_column(&mut self, column: ColumnId) -> Result<Option<Vec<u8>>, EngineError>;

    fn close(&mut self) -> Result<(), EngineError>;
}
