//! Block-level differences between two SedaroML documents

use super::{Block, Document, RootFields};
use crate::error::{ModexError, ModexResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueDiff {
    pub old_value: Value,
    pub new_value: Value,
}

/// Field-level changes inside one block (or the document root)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockDiff {
    pub added_fields: IndexMap<String, Value>,
    pub removed_fields: IndexMap<String, Value>,
    pub updated_fields: IndexMap<String, ValueDiff>,
}

impl BlockDiff {
    fn between(old: &Map<String, Value>, new: &Map<String, Value>) -> Self {
        let mut diff = BlockDiff::default();
        for (key, new_value) in new {
            match old.get(key) {
                Some(old_value) if old_value != new_value => {
                    diff.updated_fields.insert(
                        key.clone(),
                        ValueDiff {
                            old_value: old_value.clone(),
                            new_value: new_value.clone(),
                        },
                    );
                }
                Some(_) => {}
                None => {
                    diff.added_fields.insert(key.clone(), new_value.clone());
                }
            }
        }
        for (key, old_value) in old {
            if !new.contains_key(key) {
                diff.removed_fields.insert(key.clone(), old_value.clone());
            }
        }
        diff
    }

    pub fn is_empty(&self) -> bool {
        self.added_fields.is_empty() && self.removed_fields.is_empty() && self.updated_fields.is_empty()
    }
}

/// Differences between two documents, keyed by block id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDiff {
    pub added_blocks: IndexMap<String, Block>,
    pub removed_blocks: IndexMap<String, Block>,
    pub updated_blocks: IndexMap<String, BlockDiff>,
    pub root: BlockDiff,
}

impl ModelDiff {
    pub fn is_empty(&self) -> bool {
        self.added_blocks.is_empty()
            && self.removed_blocks.is_empty()
            && self.updated_blocks.is_empty()
            && self.root.is_empty()
    }
}

fn fields(block: &Block) -> ModexResult<Map<String, Value>> {
    match serde_json::to_value(block)? {
        Value::Object(map) => Ok(map),
        other => Err(ModexError::InvalidDiff(format!(
            "block `{}` serialized to {}",
            block.id(),
            other
        ))),
    }
}

fn root_fields(root: &RootFields) -> Map<String, Value> {
    root.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}

impl Document {
    /// Compute what changed going from `self` to `new`
    pub fn diff(&self, new: &Document) -> ModexResult<ModelDiff> {
        let mut diff = ModelDiff::default();

        for (id, new_block) in &new.blocks {
            match self.blocks.get(id) {
                Some(old_block) => {
                    let block_diff = BlockDiff::between(&fields(old_block)?, &fields(new_block)?);
                    if !block_diff.is_empty() {
                        diff.updated_blocks.insert(id.clone(), block_diff);
                    }
                }
                None => {
                    diff.added_blocks.insert(id.clone(), new_block.clone());
                }
            }
        }
        for (id, old_block) in &self.blocks {
            if !new.blocks.contains_key(id) {
                diff.removed_blocks.insert(id.clone(), old_block.clone());
            }
        }
        diff.root = BlockDiff::between(&root_fields(&self.root), &root_fields(&new.root));

        Ok(diff)
    }
}

/// Partial-update payload accepted by diff reconciliation.
///
/// `updated_blocks` is either a list of ids or the id-keyed map written by
/// [`ModelDiff`]; any other keys in the payload are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffPayload {
    pub updated_blocks: Vec<String>,
}

#[derive(Deserialize)]
struct RawPayload {
    updated_blocks: UpdatedBlocks,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UpdatedBlocks {
    Ids(Vec<String>),
    Detailed(IndexMap<String, Value>),
}

impl DiffPayload {
    pub fn parse(diff_str: &str) -> ModexResult<Self> {
        let raw: RawPayload = serde_json::from_str(diff_str)
            .map_err(|e| ModexError::InvalidDiff(e.to_string()))?;
        let updated_blocks = match raw.updated_blocks {
            UpdatedBlocks::Ids(ids) => ids,
            UpdatedBlocks::Detailed(map) => map.into_keys().collect(),
        };
        Ok(Self { updated_blocks })
    }
}

impl From<&ModelDiff> for DiffPayload {
    fn from(diff: &ModelDiff) -> Self {
        Self {
            updated_blocks: diff.updated_blocks.keys().cloned().collect(),
        }
    }
}
