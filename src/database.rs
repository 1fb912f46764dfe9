//! Entry point: an attached directory database with its schema catalog.
//!
//! Typical usage:
//!
//! ```no_run
//! use ntds_ese::prelude::*;
//! # fn run<B: Backend>(backend: &B) -> ntds_ese::error::Result<()> {
//! let mut db = EseDatabase::open(backend, "/evidence/ntds.dit")?;
//! let rows = db.retrieve_translated_attributes(
//!     "datatable",
//!     Attribute::ObjectSid | Attribute::SamAccountName | Attribute::UserAccountControl,
//! )?;
//! for row in &rows {
//!     println!("{:?}", row.text("sAMAccountName"));
//! }
//! # Ok(())
//! # }
//! ```
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::attribute::AttributeSelection;
use crate::catalog::Catalog;
use crate::config::{DecodeOptions, EngineConfig};
use crate::engine::{Backend, Session};
use crate::error::{EseError, Operation, Result};
use crate::row::ResultSequence;
use crate::scan::scan_table;

/// An attached, read-only database. The engine session is detached when this
/// value is dropped or explicitly [closed](EseDatabase::close).
pub struct EseDatabase<S: Session> {
    path: PathBuf,
    session: S,
    catalog: Catalog,
    options: DecodeOptions,
    detached: bool,
}

impl<S: Session> EseDatabase<S> {
    /// Attach `path` with default engine and decode settings.
    pub fn open<B>(backend: &B, path: impl AsRef<Path>) -> Result<Self>
    where
        B: Backend<Session = S>,
    {
        Self::open_with(
            backend,
            path,
            &EngineConfig::default(),
            DecodeOptions::default(),
        )
    }

    pub fn open_with<B>(
        backend: &B,
        path: impl AsRef<Path>,
        config: &EngineConfig,
        options: DecodeOptions,
    ) -> Result<Self>
    where
        B: Backend<Session = S>,
    {
        let path = path.as_ref();
        let session = backend.attach(path, config).map_err(|source| EseError::Open {
            operation: Operation::Attach,
            path: path.to_path_buf(),
            source,
        })?;
        info!(
            "attached {} (log dir {})",
            path.display(),
            config.log_dir_for(path).display()
        );
        let mut db = Self {
            path: path.to_path_buf(),
            session,
            catalog: Catalog::default(),
            options,
            detached: false,
        };
        // on failure `db` is dropped here, which detaches the session
        db.catalog = Catalog::load(&db.session)?;
        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Decode `attributes` for every record of `table`.
    ///
    /// Returns an empty sequence when the table does not exist or cannot be
    /// opened for reading.
    pub fn retrieve_translated_attributes(
        &mut self,
        table: &str,
        attributes: AttributeSelection,
    ) -> Result<ResultSequence> {
        scan_table(
            &mut self.session,
            &self.catalog,
            table,
            attributes,
            &self.options,
        )
    }

    /// Detach now and report any teardown failure.
    pub fn close(mut self) -> Result<()> {
        self.detached = true;
        self.session.detach().map_err(|source| EseError::Teardown {
            operation: Operation::Detach,
            path: self.path.clone(),
            source,
        })?;
        info!("detached {}", self.path.display());
        Ok(())
    }
}

impl<S: Session> Drop for EseDatabase<S> {
    fn drop(&mut self) {
        if self.detached {
            return;
        }
        self.detached = true;
        match self.session.detach() {
            Ok(()) => info!("detached {}", self.path.display()),
            Err(e) => warn!("detaching {} failed: {}", self.path.display(), e),
        }
    }
}
