//! SedaroML block types and the cell values they carry

use crate::reference::RangeShape;
use serde::{Deserialize, Serialize, Serializer};

/// A single spreadsheet cell value at the workbook boundary
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Empty => serializer.serialize_none(),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
            // Whole numbers are written without a fractional part
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                serializer.serialize_i64(*n as i64)
            }
            CellValue::Number(n) => serializer.serialize_f64(*n),
            CellValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

/// The captured value of a named range, shaped like the range itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockValue {
    Scalar(CellValue),
    Vector(Vec<CellValue>),
    Matrix(Vec<Vec<CellValue>>),
}

impl BlockValue {
    pub fn shape(&self) -> RangeShape {
        match self {
            BlockValue::Scalar(_) => RangeShape::Scalar,
            BlockValue::Vector(_) => RangeShape::Vector,
            BlockValue::Matrix(_) => RangeShape::Matrix,
        }
    }
}

/// Block record for a worksheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetBlock {
    pub id: String,
    pub name: String,
}

/// Block record for a defined name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameBlock {
    pub id: String,
    pub name: String,
    /// Id of the owning `Sheet` block
    pub sheet: String,
    /// Range address as defined in the workbook, e.g. `Sheet1!$B$2`
    pub refers_to: String,
    pub value: BlockValue,
}

/// A SedaroML block, tagged by its `type` field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Block {
    Sheet(SheetBlock),
    ScalarName(NameBlock),
    VectorName(NameBlock),
    MatrixName(NameBlock),
}

impl Block {
    pub fn id(&self) -> &str {
        match self {
            Block::Sheet(sheet) => &sheet.id,
            Block::ScalarName(name) | Block::VectorName(name) | Block::MatrixName(name) => &name.id,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Block::Sheet(_) => "Sheet",
            Block::ScalarName(_) => "ScalarName",
            Block::VectorName(_) => "VectorName",
            Block::MatrixName(_) => "MatrixName",
        }
    }

    /// The defined-name record, for the three writable name kinds
    pub fn as_name(&self) -> Option<&NameBlock> {
        match self {
            Block::ScalarName(name) | Block::VectorName(name) | Block::MatrixName(name) => Some(name),
            Block::Sheet(_) => None,
        }
    }

    pub fn as_sheet(&self) -> Option<&SheetBlock> {
        match self {
            Block::Sheet(sheet) => Some(sheet),
            _ => None,
        }
    }

    /// Wrap a name record in the variant matching its range shape
    pub fn named(shape: RangeShape, name: NameBlock) -> Self {
        match shape {
            RangeShape::Scalar => Block::ScalarName(name),
            RangeShape::Vector => Block::VectorName(name),
            RangeShape::Matrix => Block::MatrixName(name),
        }
    }
}
