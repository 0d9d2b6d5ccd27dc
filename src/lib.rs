//! ModEx - SedaroML ⇄ Excel exchange
//!
//! This library converts a workbook's defined names into a SedaroML JSON
//! document and reconciles edited values from that document back into the
//! workbook.
//!
//! # Features
//!
//! - Defined names classified as scalar, vector or matrix blocks
//! - Full and diff-based reconciliation into the workbook
//! - Block-level diffs between two documents
//! - Scoped workbook sessions (commit or discard)
//!
//! # Example
//!
//! ```no_run
//! use modex::convert::{excel_to_sedaroml, sedaroml_to_excel};
//! use std::path::Path;
//!
//! let document = excel_to_sedaroml(Path::new("model.xlsx"), Path::new("model.xlsx.json"))?;
//! println!("Blocks: {}", document.blocks.len());
//!
//! // ... edit model.xlsx.json ...
//! let written = sedaroml_to_excel(Path::new("model.xlsx.json"), Path::new("model.xlsx"))?;
//! println!("Names written: {}", written);
//! # Ok::<(), modex::error::ModexError>(())
//! ```

pub mod cli;
pub mod convert;
pub mod error;
pub mod excel;
pub mod logging;
pub mod model;
pub mod reference;

// Re-export commonly used types
pub use error::{ModexError, ModexResult};
pub use model::{Block, BlockValue, CellValue, Document, ModelDiff};
