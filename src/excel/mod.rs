//! Spreadsheet boundary
//!
//! - Import: .xlsx → [`Workbook`] snapshot (calamine)
//! - Update: pending cell edits → .xlsx, in place (umya-spreadsheet)
//! - [`WorkbookSession`]: open, edit in memory, commit

mod importer;
mod session;
mod updater;
mod workbook;

pub use importer::ExcelImporter;
pub use session::WorkbookSession;
pub use updater::ExcelUpdater;
pub use workbook::{Cell, DefinedName, Workbook, Worksheet};
