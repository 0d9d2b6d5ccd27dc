//! Conversion between workbooks and SedaroML documents
//!
//! - [`classifier`]: defined name → scalar / vector / matrix block
//! - [`builder`]: workbook → document (extraction)
//! - [`reconciler`]: document (+ optional diff) → workbook

pub mod builder;
pub mod classifier;
pub mod reconciler;

pub use builder::{build_document, excel_to_sedaroml};
pub use classifier::{classify, Classification, ClassifiedName};
pub use reconciler::{reconcile, reconcile_diff, reconcile_diff_to_excel, sedaroml_to_excel};
