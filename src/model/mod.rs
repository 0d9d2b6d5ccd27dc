//! SedaroML document model
//!
//! A document is a flat `blocks` map keyed by block id plus an `index` map
//! listing block ids per category. Both maps keep insertion order so that
//! extraction output is stable across runs.

mod block;
mod diff;

pub use block::{Block, BlockValue, CellValue, NameBlock, SheetBlock};
pub use diff::{BlockDiff, DiffPayload, ModelDiff, ValueDiff};

use crate::error::{ModexError, ModexResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Attributes stored outside of any block
pub type RootFields = IndexMap<String, Value>;

/// Index categories, in the order they appear in a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Sheet,
    Name,
    ScalarName,
    VectorName,
    MatrixName,
    Range,
    ScalarRange,
    VectorRange,
    MatrixRange,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Sheet,
        Category::Name,
        Category::ScalarName,
        Category::VectorName,
        Category::MatrixName,
        Category::Range,
        Category::ScalarRange,
        Category::VectorRange,
        Category::MatrixRange,
    ];

    /// Name categories that map to writable cells
    pub const NAMES: [Category; 3] = [
        Category::ScalarName,
        Category::VectorName,
        Category::MatrixName,
    ];

    pub const RANGES: [Category; 3] = [
        Category::ScalarRange,
        Category::VectorRange,
        Category::MatrixRange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Sheet => "Sheet",
            Category::Name => "Name",
            Category::ScalarName => "ScalarName",
            Category::VectorName => "VectorName",
            Category::MatrixName => "MatrixName",
            Category::Range => "Range",
            Category::ScalarRange => "ScalarRange",
            Category::VectorRange => "VectorRange",
            Category::MatrixRange => "MatrixRange",
        }
    }

    /// Category a block is indexed under
    pub fn of(block: &Block) -> Category {
        match block {
            Block::Sheet(_) => Category::Sheet,
            Block::ScalarName(_) => Category::ScalarName,
            Block::VectorName(_) => Category::VectorName,
            Block::MatrixName(_) => Category::MatrixName,
        }
    }
}

/// A SedaroML document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDocument")]
pub struct Document {
    pub blocks: IndexMap<String, Block>,
    pub index: IndexMap<String, Vec<String>>,
    #[serde(flatten)]
    pub root: RootFields,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document with every category declared. `Name` and `Range`
    /// alias their three concrete kinds; the `*Range` kinds stay empty.
    pub fn new() -> Self {
        let mut index = IndexMap::new();
        for category in Category::ALL {
            let members = match category {
                Category::Name => Category::NAMES.iter().map(|c| c.as_str().to_string()).collect(),
                Category::Range => Category::RANGES.iter().map(|c| c.as_str().to_string()).collect(),
                _ => Vec::new(),
            };
            index.insert(category.as_str().to_string(), members);
        }
        Self {
            blocks: IndexMap::new(),
            index,
            root: RootFields::new(),
        }
    }

    pub fn contains(&self, block_id: &str) -> bool {
        self.blocks.contains_key(block_id)
    }

    /// Insert a block and append its id to its category. Returns `false`
    /// and leaves the document untouched if the id is already taken.
    pub fn insert_block(&mut self, block: Block) -> bool {
        let id = block.id().to_string();
        if self.blocks.contains_key(&id) {
            return false;
        }
        let category = Category::of(&block);
        self.blocks.insert(id.clone(), block);
        self.index
            .entry(category.as_str().to_string())
            .or_default()
            .push(id);
        true
    }

    pub fn block(&self, block_id: &str) -> ModexResult<&Block> {
        self.blocks
            .get(block_id)
            .ok_or_else(|| ModexError::UnresolvedReference(format!("block `{}`", block_id)))
    }

    /// Ids listed under a category, with meta-categories (`Name`, `Range`)
    /// expanded recursively into the ids of their member categories
    pub fn block_ids_of_type(&self, category: &str) -> ModexResult<Vec<String>> {
        let mut visited = Vec::new();
        self.collect_ids(category, &mut visited)
    }

    fn collect_ids(&self, category: &str, visited: &mut Vec<String>) -> ModexResult<Vec<String>> {
        let members = self.index.get(category).ok_or_else(|| {
            ModexError::UnresolvedReference(format!("block type `{}`", category))
        })?;
        if visited.iter().any(|seen| seen == category) {
            return Ok(Vec::new());
        }
        visited.push(category.to_string());

        let mut result = Vec::new();
        for id_or_type in members {
            if self.blocks.contains_key(id_or_type) {
                result.push(id_or_type.clone());
            } else {
                result.extend(self.collect_ids(id_or_type, visited)?);
            }
        }
        Ok(result)
    }

    /// Resolve the `Sheet` block a defined name belongs to
    pub fn sheet_of(&self, name: &NameBlock) -> ModexResult<&SheetBlock> {
        let block = self.blocks.get(&name.sheet).ok_or_else(|| {
            ModexError::UnresolvedReference(format!(
                "sheet `{}` of block `{}`",
                name.sheet, name.id
            ))
        })?;
        block.as_sheet().ok_or_else(|| {
            ModexError::UnresolvedReference(format!(
                "block `{}` referenced as sheet by `{}` is a {}",
                name.sheet,
                name.id,
                block.type_name()
            ))
        })
    }

    pub fn to_pretty_string(&self) -> ModexResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// On-disk layout before typed blocks are resolved. Blocks without a `type`
/// (such as an empty `root` entry) are folded into the root fields.
#[derive(Deserialize)]
struct RawDocument {
    #[serde(default)]
    blocks: IndexMap<String, Value>,
    #[serde(default)]
    index: IndexMap<String, Vec<String>>,
    #[serde(flatten)]
    root: RootFields,
}

impl TryFrom<RawDocument> for Document {
    type Error = serde_json::Error;

    fn try_from(raw: RawDocument) -> Result<Self, Self::Error> {
        let mut blocks = IndexMap::new();
        let mut root = raw.root;
        for (id, value) in raw.blocks {
            let typed = value.as_object().is_some_and(|obj| obj.contains_key("type"));
            if typed {
                blocks.insert(id, serde_json::from_value(value)?);
            } else if let Value::Object(fields) = value {
                root.extend(fields);
            }
        }
        Ok(Document {
            blocks,
            index: raw.index,
            root,
        })
    }
}

/// Read a SedaroML document from a JSON file
pub fn read_document(path: &Path) -> ModexResult<Document> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Write a SedaroML document as indented JSON, replacing the file
pub fn write_document(path: &Path, document: &Document) -> ModexResult<()> {
    fs::write(path, document.to_pretty_string()?)?;
    Ok(())
}
