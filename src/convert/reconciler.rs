//! Reconciler - SedaroML document values → workbook cells
//!
//! Blocks are never added or removed here; reconciliation only overwrites
//! the cells behind defined names that the document already knows about.

use crate::error::{ModexError, ModexResult};
use crate::excel::{Workbook, WorkbookSession};
use crate::model::{read_document, Category, DiffPayload, Document, NameBlock};
use crate::reference::{parse_target, Target};
use std::path::Path;
use tracing::{debug, info};

/// Write one defined name's stored value back to its range
pub fn write_name(document: &Document, name: &NameBlock, workbook: &mut Workbook) -> ModexResult<()> {
    let sheet_block = document.sheet_of(name)?;
    let reference = match parse_target(&name.refers_to)? {
        Target::Bounded(reference) => reference,
        Target::Unbounded => {
            return Err(ModexError::reference(
                &name.refers_to,
                "unbounded ranges cannot be written",
            ))
        }
    };

    debug!("Writing Name {} {:?}", name.refers_to, name.value);
    workbook
        .sheet_mut(&sheet_block.name)?
        .write_range(&reference.range, &name.value)
}

/// Write every scalar, vector and matrix name in the document. Returns the
/// number of names written.
pub fn reconcile(document: &Document, workbook: &mut Workbook) -> ModexResult<usize> {
    let mut written = 0;
    for category in Category::NAMES {
        let Some(ids) = document.index.get(category.as_str()) else {
            continue;
        };
        for id in ids {
            let block = document.block(id)?;
            let name = block.as_name().ok_or_else(|| {
                ModexError::UnresolvedReference(format!(
                    "block `{}` is indexed as {} but is a {}",
                    id,
                    category.as_str(),
                    block.type_name()
                ))
            })?;
            write_name(document, name, workbook)?;
            written += 1;
        }
    }
    Ok(written)
}

/// Write only the blocks listed in the diff, looked up in the baseline
/// document. Sheets and `root` are skipped. Returns the number of names
/// written.
pub fn reconcile_diff(
    document: &Document,
    diff: &DiffPayload,
    workbook: &mut Workbook,
) -> ModexResult<usize> {
    let mut written = 0;
    for id in &diff.updated_blocks {
        if id == "root" && !document.contains(id) {
            debug!("Skipping root fields");
            continue;
        }
        let block = document.block(id)?;
        match block.as_name() {
            Some(name) => {
                write_name(document, name, workbook)?;
                written += 1;
            }
            None => debug!("Skipping {} block `{}`", block.type_name(), id),
        }
    }
    Ok(written)
}

/// Write every named value of the document at `input_filename` into the
/// workbook at `output_filename`
pub fn sedaroml_to_excel(input_filename: &Path, output_filename: &Path) -> ModexResult<usize> {
    debug!("Opening json model {}", input_filename.display());
    let document = read_document(input_filename)?;

    let mut session = WorkbookSession::open(output_filename)?;
    debug!("Reconciling...");
    let written = reconcile(&document, session.workbook_mut())?;
    let cells = session.commit()?;

    info!(
        "Reconciled {} names into {} ({} cells changed)",
        written,
        output_filename.display(),
        cells
    );
    Ok(written)
}

/// Write the blocks named in `diff_str` from the document at
/// `input_filename` into the workbook at `output_filename`
pub fn reconcile_diff_to_excel(
    input_filename: &Path,
    diff_str: &str,
    output_filename: &Path,
) -> ModexResult<usize> {
    debug!("Opening json model {}", input_filename.display());
    let document = read_document(input_filename)?;

    debug!("Deserializing model diff");
    let diff = DiffPayload::parse(diff_str)?;

    let mut session = WorkbookSession::open(output_filename)?;
    debug!("Reconciling...");
    let written = reconcile_diff(&document, &diff, session.workbook_mut())?;
    let cells = session.commit()?;

    info!(
        "Reconciled {} of {} updated blocks into {} ({} cells changed)",
        written,
        diff.updated_blocks.len(),
        output_filename.display(),
        cells
    );
    Ok(written)
}
