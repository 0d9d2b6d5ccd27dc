//! Scoped access to a workbook file
//!
//! A session loads a snapshot of the whole workbook on open. Edits stay in
//! memory until [`WorkbookSession::commit`] writes the changed cells back; a
//! session dropped without committing leaves the file untouched.

use super::importer::ExcelImporter;
use super::updater::ExcelUpdater;
use super::workbook::Workbook;
use crate::error::ModexResult;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct WorkbookSession {
    path: PathBuf,
    workbook: Workbook,
}

impl WorkbookSession {
    pub fn open<P: AsRef<Path>>(path: P) -> ModexResult<Self> {
        let path = path.as_ref().to_path_buf();
        debug!("Opening workbook {}", path.display());
        let workbook = ExcelImporter::new(&path).import()?;
        Ok(Self { path, workbook })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    pub fn workbook_mut(&mut self) -> &mut Workbook {
        &mut self.workbook
    }

    /// Whether any cell was actually changed since the session opened
    pub fn is_modified(&self) -> bool {
        self.workbook.is_modified()
    }

    /// Write the changed cells back to the file and close the session.
    /// Returns the number of cells written; without changes the file is
    /// left as it is.
    pub fn commit(mut self) -> ModexResult<usize> {
        let written = ExcelUpdater::new(&self.workbook).apply(&self.path)?;
        debug!("Committed {} cells to {}", written, self.path.display());
        self.workbook.clear_pending();
        Ok(written)
    }
}

impl Drop for WorkbookSession {
    fn drop(&mut self) {
        if self.workbook.is_modified() {
            warn!(
                "Discarding uncommitted changes to {}",
                self.path.display()
            );
        }
    }
}
