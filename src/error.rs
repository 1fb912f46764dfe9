use std::fmt;
use std::path::PathBuf;

use crate::attribute::Attribute;
use crate::catalog::CatalogError;
use crate::engine::EngineError;

/// Engine call an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Attach,
    LoadCatalog,
    OpenTable,
    MoveNext,
    RetrieveColumn,
    CloseTable,
    Detach,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::Attach => "attach",
            Operation::LoadCatalog => "load-catalog",
            Operation::OpenTable => "open-table",
            Operation::MoveNext => "move-next",
            Operation::RetrieveColumn => "retrieve-column",
            Operation::CloseTable => "close-table",
            Operation::Detach => "detach",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EseError {
    #[error("{operation} {}: {source}", .path.display())]
    Open {
        operation: Operation,
        path: PathBuf,
        #[source]
        source: EngineError,
    },
    #[error("{operation} {}: {source}", .path.display())]
    Teardown {
        operation: Operation,
        path: PathBuf,
        #[source]
        source: EngineError,
    },
    #[error("load-catalog: {0}")]
    Catalog(#[from] CatalogError),
    #[error("schema mismatch: table {table} has no column {column} for attribute {attribute}")]
    SchemaMismatch {
        table: String,
        attribute: Attribute,
        column: &'static str,
    },
    #[error("attribute {0} has no decode rule and cannot be requested")]
    UndecodableAttribute(Attribute),
    #[error("no attributes requested")]
    EmptySelection,
    #[error("{operation} on table {table}: {source}")]
    Engine {
        operation: Operation,
        table: String,
        #[source]
        source: EngineError,
    },
}

impl EseError {
    /// The engine call this error came from, when there was one.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            EseError::Open { operation, .. }
            | EseError::Teardown { operation, .. }
            | EseError::Engine { operation, .. } => Some(*operation),
            EseError::Catalog(_) => Some(Operation::LoadCatalog),
            _ => None,
        }
    }
}

pub type Result<T, E = EseError> = std::result::Result<T, E>;
