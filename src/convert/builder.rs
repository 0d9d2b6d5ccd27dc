//! Model builder - workbook defined names → SedaroML document

use super::classifier::{classify_or_warn, register};
use crate::error::ModexResult;
use crate::excel::{Workbook, WorkbookSession};
use crate::model::{write_document, Document};
use std::path::Path;
use tracing::{debug, info};

/// Build a fresh document from every defined name in the workbook, capturing
/// each range's current value
pub fn build_document(workbook: &Workbook) -> ModexResult<Document> {
    let mut document = Document::new();

    for defined in &workbook.defined_names {
        let Some(classified) = classify_or_warn(&defined.name, &defined.refers_to) else {
            continue;
        };
        let sheet = workbook.sheet(&classified.reference.sheet)?;
        let value = sheet.read_range(&classified.reference.range, classified.shape);
        debug!(
            "Captured `{}` ({:?}) from {}",
            defined.name, classified.shape, classified.reference.address
        );
        register(&mut document, classified, value);
    }

    Ok(document)
}

/// Read the defined names of `input_filename` and write them as a SedaroML
/// document to `output_filename`
pub fn excel_to_sedaroml(input_filename: &Path, output_filename: &Path) -> ModexResult<Document> {
    let session = WorkbookSession::open(input_filename)?;
    let document = build_document(session.workbook())?;
    write_document(output_filename, &document)?;
    info!(
        "Wrote {} blocks from {} to {}",
        document.blocks.len(),
        input_filename.display(),
        output_filename.display()
    );
    Ok(document)
}
