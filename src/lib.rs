pub mod attribute;
pub mod catalog;
pub mod config;
pub mod database;
pub mod decode;
pub mod engine;
pub mod error;
pub mod export;
pub mod memory;
pub mod registry;
pub mod row;
pub mod scan;
pub mod sid;

pub mod prelude {
    pub use crate::attribute::{Attribute, AttributeSelection};
    pub use crate::config::{DecodeOptions, EngineConfig, TimestampZone};
    pub use crate::database::EseDatabase;
    pub use crate::engine::{Backend, Session, TableCursor};
    pub use crate::error::{EseError, Operation};
    pub use crate::row::{FieldValue, ResultSequence, Row};
}
