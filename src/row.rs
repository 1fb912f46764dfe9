//! Decoded rows and the per-row decoder.
//!
//! A [`RowDecoder`] is bound to one table before scanning starts: binding
//! resolves every requested attribute to a column id, so schema mismatches are
//! reported before the first record is read. Decoding a row then only touches
//! the cursor.
use std::collections::VecDeque;
use std::fmt;

use log::warn;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::attribute::{Attribute, AttributeSelection};
use crate::catalog::Catalog;
use crate::config::DecodeOptions;
use crate::decode::{DecodeError, DecodeRule, decode};
use crate::engine::{ColumnId, EngineError, TableCursor};
use crate::error::{EseError, Result};
use crate::registry;

/// Value of one attribute in one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    /// The column exists but this record has no value for it.
    Null,
    /// Raw bytes were present but did not fit the attribute's decode rule.
    Error(DecodeError),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, FieldValue::Error(_))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Null => Ok(()),
            FieldValue::Error(e) => write!(f, "#error: {e}"),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::Null => serializer.serialize_none(),
            FieldValue::Error(_) => serializer.serialize_str(&self.to_string()),
        }
    }
}

/// One decoded record: attribute display names to values, in registry
/// declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    fields: Vec<(Attribute, FieldValue)>,
}

impl Row {
    pub fn push(&mut self, attribute: Attribute, value: FieldValue) {
        self.fields.push((attribute, value));
    }

    /// Look a value up by display name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(a, _)| a.display_name().eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    pub fn attribute(&self, attribute: Attribute) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(a, _)| *a == attribute)
            .map(|(_, v)| v)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_text)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(a, _)| a.display_name())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.fields.iter().map(|(a, v)| (a.display_name(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Rows in cursor order, oldest first.
pub type ResultSequence = VecDeque<Row>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundColumn {
    pub attribute: Attribute,
    pub column: ColumnId,
    pub rule: DecodeRule,
}

#[derive(Debug, Clone)]
pub struct RowDecoder {
    columns: Vec<BoundColumn>,
    options: DecodeOptions,
}

impl RowDecoder {
    /// Resolve `selection` against `table` in `catalog`.
    pub fn bind(
        catalog: &Catalog,
        table: &str,
        selection: AttributeSelection,
        options: DecodeOptions,
    ) -> Result<Self> {
        let columns = registry::decodable(selection)?
            .into_iter()
            .map(|(entry, rule)| -> Result<BoundColumn> {
                let info = catalog.lookup(table, entry.column).map_err(|_| {
                    EseError::SchemaMismatch {
                        table: table.to_string(),
                        attribute: entry.attribute,
                        column: entry.column,
                    }
                })?;
                Ok(BoundColumn {
                    attribute: entry.attribute,
                    column: info.id,
                    rule,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { columns, options })
    }

    pub fn columns(&self) -> &[BoundColumn] {
        &self.columns
    }

    /// Decode the record the cursor is positioned on. Decode failures stay
    /// inside the row; only engine failures abort.
    pub fn decode_row(&self, cursor: &mut dyn TableCursor) -> Result<Row, EngineError> {
        let mut row = Row {
            fields: Vec::with_capacity(self.columns.len()),
        };
        for bound in &self.columns {
            let value = match cursor.retrieve_column(bound.column)? {
                None => FieldValue::Null,
                Some(bytes) => match decode(bound.rule, &bytes, &self.options) {
                    Ok(Some(text)) => FieldValue::Text(text),
                    Ok(None) => FieldValue::Null,
                    Err(e) => {
                        warn!("{}: cannot decode {} bytes: {}", bound.attribute, bytes.len(), e);
                        FieldValue::Error(e)
                    }
                },
            };
            row.push(bound.attribute, value);
        }
        Ok(row)
    }
}
