//! Forward, single-pass table scan.
//!
//! Every record in the table is returned, in the engine's cursor order. The
//! engine's approximate record count is only a capacity hint; the loop runs
//! until the cursor reports the end of the table.
use std::collections::VecDeque;

use log::{debug, info, warn};

use crate::attribute::AttributeSelection;
use crate::catalog::Catalog;
use crate::config::DecodeOptions;
use crate::engine::{EngineError, Session, TableCursor};
use crate::error::{EseError, Operation, Result};
use crate::registry;
use crate::row::{ResultSequence, RowDecoder};

/// Upper bound on rows preallocated from the engine's estimate.
const MAX_PREALLOCATED_ROWS: u64 = 64 * 1024;

/// An open table that is closed when dropped, whatever the exit path.
struct OpenTable<'a> {
    name: String,
    cursor: Box<dyn TableCursor + 'a>,
    closed: bool,
}

impl<'a> OpenTable<'a> {
    fn new(name: &str, cursor: Box<dyn TableCursor + 'a>) -> Self {
        Self {
            name: name.to_string(),
            cursor,
            closed: false,
        }
    }

    fn close(&mut self) -> Result<(), EngineError> {
        self.closed = true;
        self.cursor.close()
    }

    fn engine_error(&self, operation: Operation) -> impl FnOnce(EngineError) -> EseError + '_ {
        move |source| EseError::Engine {
            operation,
            table: self.name.clone(),
            source,
        }
    }
}

impl Drop for OpenTable<'_> {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(e) = self.cursor.close() {
                warn!("closing table {} failed: {}", self.name, e);
            }
        }
    }
}

/// Scan `table`, decoding `selection` for each record.
///
/// A table that is missing or refuses a read-only open yields an empty
/// sequence. An attribute whose column the table lacks fails with
/// [`EseError::SchemaMismatch`] before any record is read.
pub fn scan_table<S: Session + ?Sized>(
    session: &mut S,
    catalog: &Catalog,
    table: &str,
    selection: AttributeSelection,
    options: &DecodeOptions,
) -> Result<ResultSequence> {
    registry::decodable(selection)?;

    if catalog.table(table).is_none() {
        warn!("table {} is not in the catalog; returning no rows", table);
        return Ok(VecDeque::new());
    }
    let decoder = RowDecoder::bind(catalog, table, selection, options.clone())?;
    debug!(
        "scan {}: bound {} columns",
        table,
        decoder.columns().len()
    );

    let cursor = match session.open_table_read_only(table) {
        Ok(c) => c,
        Err(e) => {
            warn!("table {} unavailable ({}); returning no rows", table, e);
            return Ok(VecDeque::new());
        }
    };
    let mut open = OpenTable::new(table, cursor);

    let estimate = match open.cursor.approximate_record_count() {
        Ok(n) => Some(n),
        Err(e) => {
            debug!("scan {}: no record count ({}); not preallocating", table, e);
            None
        }
    };
    let capacity = estimate.unwrap_or(0).min(MAX_PREALLOCATED_ROWS) as usize;
    let mut rows = VecDeque::with_capacity(capacity);

    loop {
        let more = open
            .cursor
            .move_next()
            .map_err(open.engine_error(Operation::MoveNext))?;
        if !more {
            break;
        }
        let row = decoder
            .decode_row(open.cursor.as_mut())
            .map_err(open.engine_error(Operation::RetrieveColumn))?;
        rows.push_back(row);
    }

    open.close()
        .map_err(open.engine_error(Operation::CloseTable))?;

    if let Some(estimate) = estimate.filter(|n| *n != rows.len() as u64) {
        debug!(
            "scan {}: engine estimated {} records, read {}",
            table,
            estimate,
            rows.len()
        );
    }
    info!("scan {}: {} rows", table, rows.len());
    Ok(rows)
}
