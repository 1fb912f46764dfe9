//! Schema catalog: every table and column the engine reports, keyed
//! case-insensitively. Built once when a database is opened and never
//! mutated afterwards.
use std::collections::BTreeMap;

use log::debug;

use crate::engine::{ColumnInfo, EngineError, Session};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("listing schema failed: {0}")]
    Engine(#[from] EngineError),
    #[error("duplicate table name {0}")]
    DuplicateTable(String),
    #[error("duplicate column {column} in table {table}")]
    DuplicateColumn { table: String, column: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("table {0} not in catalog")]
    TableNotFound(String),
    #[error("column {column} not in table {table}")]
    ColumnNotFound { table: String, column: String },
}

#[derive(Debug, Clone, Default)]
pub struct TableSchema {
    pub name: String,
    columns: BTreeMap<String, ColumnInfo>,
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.get(&fold(name))
    }

    pub fn columns(&self) -> impl Iterator<Item = &ColumnInfo> {
        self.columns.values()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: BTreeMap<String, TableSchema>,
}

fn fold(name: &str) -> String {
    name.to_ascii_lowercase()
}

impl Catalog {
    /// Enumerate every table and each table's columns from `session`.
    pub fn load<S: Session + ?Sized>(session: &S) -> Result<Self, CatalogError> {
        let mut catalog = Catalog::default();
        for table in session.table_names()? {
            let mut schema = TableSchema {
                name: table.clone(),
                columns: BTreeMap::new(),
            };
            for column in session.table_columns(&table)? {
                let key = fold(&column.name);
                if schema.columns.contains_key(&key) {
                    return Err(CatalogError::DuplicateColumn {
                        table,
                        column: column.name,
                    });
                }
                schema.columns.insert(key, column);
            }
            debug!("catalog: table {} has {} columns", table, schema.len());
            if catalog.tables.insert(fold(&table), schema).is_some() {
                return Err(CatalogError::DuplicateTable(table));
            }
        }
        debug!("catalog: loaded {} tables", catalog.tables.len());
        Ok(catalog)
    }

    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(&fold(name))
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.values().map(|t| t.name.as_str())
    }

    pub fn lookup(&self, table: &str, column: &str) -> Result<&ColumnInfo, LookupError> {
        let schema = self
            .table(table)
            .ok_or_else(|| LookupError::TableNotFound(table.to_string()))?;
        schema
            .column(column)
            .ok_or_else(|| LookupError::ColumnNotFound {
                table: table.to_string(),
                column: column.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ColumnId, ColumnType};
    use crate::memory::{MemoryDatabase, MemoryTable};

    fn session() -> crate::memory::MemorySession {
        let db = MemoryDatabase::new()
            .with_table(
                MemoryTable::new("datatable")
                    .column("DNT_col", 1, ColumnType::Long)
                    .column("ATTr589970", 2, ColumnType::LongBinary),
            )
            .with_table(MemoryTable::new("MSysObjects").column("Name", 1, ColumnType::Text));
        db.into_session()
    }

    #[test]
    fn lookups_ignore_case() {
        let catalog = Catalog::load(&session()).unwrap();
        let col = catalog.lookup("DataTable", "attr589970").unwrap();
        assert_eq!(col.id, ColumnId(2));
        assert_eq!(col.name, "ATTr589970");
        assert_eq!(catalog.table("DATATABLE").unwrap().name, "datatable");
        assert_eq!(catalog.table_names().count(), 2);
    }

    #[test]
    fn misses_name_table_or_column() {
        let catalog = Catalog::load(&session()).unwrap();
        assert_eq!(
            catalog.lookup("link_table", "x"),
            Err(LookupError::TableNotFound("link_table".to_string()))
        );
        assert!(matches!(
            catalog.lookup("datatable", "ATTm590045"),
            Err(LookupError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn duplicate_names_fail_the_load() {
        let db = MemoryDatabase::new()
            .with_table(MemoryTable::new("t").column("A", 1, ColumnType::Long))
            .with_table(MemoryTable::new("T").column("B", 1, ColumnType::Long));
        assert_eq!(
            Catalog::load(&db.into_session()).unwrap_err(),
            CatalogError::DuplicateTable("T".to_string())
        );

        let db = MemoryDatabase::new().with_table(
            MemoryTable::new("t")
                .column("Col", 1, ColumnType::Long)
                .column("COL", 2, ColumnType::Long),
        );
        assert!(matches!(
            Catalog::load(&db.into_session()),
            Err(CatalogError::DuplicateColumn { .. })
        ));
    }
}
