//! Defined-name classification
//!
//! Decides whether a defined name is a scalar, vector or matrix and turns it
//! into a SedaroML block.

use crate::model::{Block, BlockValue, Document, NameBlock, SheetBlock};
use crate::reference::{parse_target, RangeShape, SheetReference, Target};
use tracing::warn;

/// A defined name that maps onto a bounded cell range
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedName {
    pub name: String,
    pub reference: SheetReference,
    pub shape: RangeShape,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Supported(ClassifiedName),
    /// Whole-row or whole-column target
    Unbounded,
    /// Constants, formulas, `#REF!` and anything else that is not a cell range
    Unsupported(String),
}

/// Classify a defined name by its target address
pub fn classify(name: &str, refers_to: &str) -> Classification {
    match parse_target(refers_to) {
        Ok(Target::Bounded(reference)) => Classification::Supported(ClassifiedName {
            name: name.to_string(),
            shape: reference.range.shape(),
            reference,
        }),
        Ok(Target::Unbounded) => Classification::Unbounded,
        Err(e) => Classification::Unsupported(e.to_string()),
    }
}

/// Like [`classify`], logging a warning for every name that is skipped
pub fn classify_or_warn(name: &str, refers_to: &str) -> Option<ClassifiedName> {
    match classify(name, refers_to) {
        Classification::Supported(classified) => Some(classified),
        Classification::Unbounded => {
            warn!(
                "Defined names for infinite column or row ranges are not supported. Skipping `{} {}`...",
                name, refers_to
            );
            None
        }
        Classification::Unsupported(reason) => {
            warn!(
                "Defined name does not refer to a cell range ({}). Skipping `{} {}`...",
                reason, name, refers_to
            );
            None
        }
    }
}

impl ClassifiedName {
    /// Block for this name holding `value`; the block type follows the shape
    pub fn into_block(self, value: BlockValue) -> Block {
        let name = NameBlock {
            id: self.name.clone(),
            name: self.name,
            sheet: self.reference.sheet,
            refers_to: self.reference.address,
            value,
        };
        Block::named(self.shape, name)
    }
}

/// Add a classified name to the document, registering its sheet on first
/// use. Returns `false` if the name's id is already taken.
pub fn register(document: &mut Document, classified: ClassifiedName, value: BlockValue) -> bool {
    let sheet_id = classified.reference.sheet.clone();
    if !document.contains(&sheet_id) {
        document.insert_block(Block::Sheet(SheetBlock {
            id: sheet_id.clone(),
            name: sheet_id,
        }));
    }

    let name = classified.name.clone();
    if document.insert_block(classified.into_block(value)) {
        true
    } else {
        warn!("Block id `{}` is already in use. Skipping defined name...", name);
        false
    }
}
