//! Excel updater - pending cell edits → the .xlsx file, in place
//!
//! The file is opened with umya-spreadsheet and only the edited cells are
//! touched, so styles, number formats, formulas elsewhere and defined names
//! (including their sheet scope) survive the write.

use super::workbook::Workbook;
use crate::error::{ModexError, ModexResult};
use crate::model::CellValue;
use std::path::Path;
use tracing::debug;

pub struct ExcelUpdater<'a> {
    workbook: &'a Workbook,
}

impl<'a> ExcelUpdater<'a> {
    pub fn new(workbook: &'a Workbook) -> Self {
        Self { workbook }
    }

    /// Apply every pending edit to the file at `path`. Returns the number of
    /// cells written. The file is not touched when there is nothing to write.
    pub fn apply(&self, path: &Path) -> ModexResult<usize> {
        if !self.workbook.is_modified() {
            debug!("No pending edits for {}", path.display());
            return Ok(0);
        }

        let mut book = umya_spreadsheet::reader::xlsx::read(path)
            .map_err(|e| ModexError::Spreadsheet(format!("{}: {}", path.display(), e)))?;

        let mut written = 0;
        for sheet in self.workbook.sheets.iter().filter(|s| s.is_modified()) {
            let target = book.get_sheet_by_name_mut(&sheet.name).ok_or_else(|| {
                ModexError::UnresolvedReference(format!("worksheet `{}`", sheet.name))
            })?;
            for (at, value) in sheet.pending() {
                // umya addresses cells as 1-based (column, row)
                let cell = target.get_cell_mut((at.col + 1, at.row + 1));
                match value {
                    CellValue::Empty => {
                        cell.set_blank();
                    }
                    CellValue::Bool(b) => {
                        cell.set_value_bool(b);
                    }
                    CellValue::Number(n) => {
                        cell.set_value_number(n);
                    }
                    CellValue::Text(s) => {
                        cell.set_value_string(s);
                    }
                }
                debug!("Wrote {}!{}", sheet.name, at);
                written += 1;
            }
        }

        umya_spreadsheet::writer::xlsx::write(&book, path)
            .map_err(|e| ModexError::Spreadsheet(format!("{}: {}", path.display(), e)))?;
        Ok(written)
    }
}
