//! In-memory engine implementing the [`engine`](crate::engine) traits.
//!
//! Useful for hosts that already hold table contents (exports, fixtures) and
//! for tests. Every attach, open, close and detach is written to a shared
//! [`Journal`] so resource release can be checked after the fact.
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::config::EngineConfig;
use crate::engine::{Backend, ColumnId, ColumnInfo, ColumnType, EngineError, Session, TableCursor};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Attached { path: PathBuf, instance: String },
    TableOpened(String),
    TableClosed(String),
    Detached,
}

#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Event>>>);

impl Journal {
    fn push(&self, event: Event) {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of tables currently open (opened minus closed).
    pub fn open_tables(&self) -> usize {
        self.events().iter().fold(0usize, |n, e| match e {
            Event::TableOpened(_) => n + 1,
            Event::TableClosed(_) => n.saturating_sub(1),
            _ => n,
        })
    }

    pub fn is_detached(&self) -> bool {
        self.events().iter().any(|e| *e == Event::Detached)
    }
}

type Record = HashMap<ColumnId, Vec<u8>>;

#[derive(Debug, Clone)]
pub struct MemoryTable {
    name: String,
    columns: Vec<ColumnInfo>,
    records: Vec<Record>,
    locked: bool,
    reported_count: Option<u64>,
    count_unavailable: bool,
    fail_at_record: Option<usize>,
}

impl MemoryTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            records: Vec::new(),
            locked: false,
            reported_count: None,
            count_unavailable: false,
            fail_at_record: None,
        }
    }

    pub fn column(mut self, name: impl Into<String>, id: u32, column_type: ColumnType) -> Self {
        self.columns.push(ColumnInfo::new(name, id, column_type));
        self
    }

    /// Append a record. Columns not listed are unset.
    pub fn record<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (u32, V)>,
        V: Into<Vec<u8>>,
    {
        self.records.push(
            values
                .into_iter()
                .map(|(id, v)| (ColumnId(id), v.into()))
                .collect(),
        );
        self
    }

    /// Refuse read-only opens, as a table held by another process would.
    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    /// Override the count returned by `approximate_record_count`.
    pub fn reported_count(mut self, count: u64) -> Self {
        self.reported_count = Some(count);
        self
    }

    /// Make `approximate_record_count` fail, as it does when index statistics
    /// are missing.
    pub fn count_unavailable(mut self) -> Self {
        self.count_unavailable = true;
        self
    }

    /// Make `move_next` fail when it would land on record `index`.
    pub fn fail_at_record(mut self, index: usize) -> Self {
        self.fail_at_record = Some(index);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct MemoryDatabase {
    tables: Vec<MemoryTable>,
    page_size: u32,
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self {
            tables: Vec::new(),
            page_size: EngineConfig::default().page_size,
        }
    }

    pub fn with_table(mut self, table: MemoryTable) -> Self {
        self.tables.push(table);
        self
    }

    /// Page size the database was "created" with; attaching with a different
    /// configured page size fails like a real engine would.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Open a session directly, bypassing the backend and its checks.
    pub fn into_session(self) -> MemorySession {
        MemorySession {
            database: self,
            journal: Journal::default(),
            detached: false,
        }
    }
}

/// Serves [`MemoryDatabase`]s registered under file paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    databases: HashMap<PathBuf, MemoryDatabase>,
    journal: Journal,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_database(mut self, path: impl Into<PathBuf>, database: MemoryDatabase) -> Self {
        self.databases.insert(path.into(), database);
        self
    }

    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }
}

impl Backend for MemoryBackend {
    type Session = MemorySession;

    fn attach(&self, path: &Path, config: &EngineConfig) -> Result<MemorySession, EngineError> {
        let database = self
            .databases
            .get(path)
            .ok_or_else(|| EngineError::FileNotFound(path.display().to_string()))?;
        if database.page_size != config.page_size {
            return Err(EngineError::InvalidDatabase(format!(
                "page size {} does not match configured {}",
                database.page_size, config.page_size
            )));
        }
        self.journal.push(Event::Attached {
            path: path.to_path_buf(),
            instance: config.instance_name.clone(),
        });
        Ok(MemorySession {
            database: database.clone(),
            journal: self.journal.clone(),
            detached: false,
        })
    }
}

#[derive(Debug)]
pub struct MemorySession {
    database: MemoryDatabase,
    journal: Journal,
    detached: bool,
}

impl MemorySession {
    fn find(&self, table: &str) -> Result<&MemoryTable, EngineError> {
        self.database
            .tables
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(table))
            .ok_or_else(|| EngineError::TableNotFound(table.to_string()))
    }

    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }
}

impl Session for MemorySession {
    fn table_names(&self) -> Result<Vec<String>, EngineError> {
        Ok(self.database.tables.iter().map(|t| t.name.clone()).collect())
    }

    fn table_columns(&self, table: &str) -> Result<Vec<ColumnInfo>, EngineError> {
        Ok(self.find(table)?.columns.clone())
    }

    fn open_table_read_only(
        &mut self,
        table: &str,
    ) -> Result<Box<dyn TableCursor + '_>, EngineError> {
        let t = self.find(table)?;
        if t.locked {
            return Err(EngineError::AccessDenied(t.name.clone()));
        }
        self.journal.push(Event::TableOpened(t.name.clone()));
        Ok(Box::new(MemoryCursor {
            table: t,
            journal: self.journal.clone(),
            position: None,
            closed: false,
        }))
    }

    fn detach(&mut self) -> Result<(), EngineError> {
        if !self.detached {
            self.detached = true;
            self.journal.push(Event::Detached);
        }
        Ok(())
    }
}

struct MemoryCursor<'a> {
    table: &'a MemoryTable,
    journal: Journal,
    /// `None` before the first `move_next`.
    position: Option<usize>,
    closed: bool,
}

impl MemoryCursor<'_> {
    fn current(&self) -> Result<&Record, EngineError> {
        self.position
            .and_then(|i| self.table.records.get(i))
            .ok_or(EngineError::NoCurrentRecord)
    }
}

impl TableCursor for MemoryCursor<'_> {
    fn approximate_record_count(&mut self) -> Result<u64, EngineError> {
        if self.table.count_unavailable {
            return Err(EngineError::Other("index statistics unavailable".into()));
        }
        Ok(self
            .table
            .reported_count
            .unwrap_or(self.table.records.len() as u64))
    }

    fn move_next(&mut self) -> Result<bool, EngineError> {
        let next = self.position.map_or(0, |i| i + 1);
        if self.table.fail_at_record == Some(next) {
            return Err(EngineError::Other(format!(
                "page read failed at record {next}"
            )));
        }
        if next >= self.table.records.len() {
            self.position = Some(self.table.records.len());
            return Ok(false);
        }
        self.position = Some(next);
        Ok(true)
    }

    fn retrieve_column(&mut self, column: ColumnId) -> Result<Option<Vec<u8>>, EngineError> {
        if !self.table.columns.iter().any(|c| c.id == column) {
            return Err(EngineError::ColumnNotFound(column));
        }
        Ok(self.current()?.get(&column).cloned())
    }

    fn close(&mut self) -> Result<(), EngineError> {
        if !self.closed {
            self.closed = true;
            self.journal.push(Event::TableClosed(self.table.name.clone()));
        }
        Ok(())
    }
}
