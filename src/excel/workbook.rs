//! In-memory workbook: sheets as sparse cell grids plus defined names

use crate::error::{ModexError, ModexResult};
use crate::model::{BlockValue, CellValue};
use crate::reference::{CellRef, RangeRef, RangeShape};
use std::collections::{BTreeMap, BTreeSet};

/// A cell's cached value and, when it holds one, its formula (without `=`)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub formula: Option<String>,
}

/// A workbook-level defined name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinedName {
    pub name: String,
    /// Target as stored in the workbook, e.g. `Sheet1!$B$2`
    pub refers_to: String,
}

impl DefinedName {
    pub fn new(name: impl Into<String>, refers_to: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            refers_to: refers_to.into(),
        }
    }
}

/// A sheet snapshot. Cells changed through [`Worksheet::set_value`] are
/// remembered as pending edits until the session commits them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Worksheet {
    pub name: String,
    cells: BTreeMap<CellRef, Cell>,
    pending: BTreeSet<CellRef>,
}

impl Worksheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
            pending: BTreeSet::new(),
        }
    }

    pub fn cell(&self, at: CellRef) -> Option<&Cell> {
        self.cells.get(&at)
    }

    pub fn value(&self, at: CellRef) -> CellValue {
        self.cells
            .get(&at)
            .map(|cell| cell.value.clone())
            .unwrap_or_default()
    }

    /// Record a value as read from the file
    pub fn load_value(&mut self, at: CellRef, value: CellValue) {
        if !value.is_empty() {
            self.cells.insert(at, Cell { value, formula: None });
        }
    }

    /// Overwrite a cell's value, dropping any formula it held. Returns
    /// `false` (and records no edit) when the cell already holds exactly
    /// this value.
    pub fn set_value(&mut self, at: CellRef, value: CellValue) -> bool {
        let unchanged = match self.cells.get(&at) {
            Some(cell) => cell.formula.is_none() && cell.value == value,
            None => value.is_empty(),
        };
        if unchanged {
            return false;
        }

        if value.is_empty() {
            self.cells.remove(&at);
        } else {
            self.cells.insert(at, Cell { value, formula: None });
        }
        self.pending.insert(at);
        true
    }

    pub fn set_formula(&mut self, at: CellRef, formula: impl Into<String>, cached: CellValue) {
        self.cells.insert(
            at,
            Cell {
                value: cached,
                formula: Some(formula.into()),
            },
        );
    }

    /// Occupied cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (&CellRef, &Cell)> {
        self.cells.iter()
    }

    /// Cells changed since the sheet was loaded, with their new values
    pub fn pending(&self) -> impl Iterator<Item = (CellRef, CellValue)> + '_ {
        self.pending.iter().map(|at| (*at, self.value(*at)))
    }

    pub fn is_modified(&self) -> bool {
        !self.pending.is_empty()
    }

    pub(crate) fn clear_pending(&mut self) {
        self.pending.clear();
    }

    /// Read a range as a value of the given shape
    pub fn read_range(&self, range: &RangeRef, shape: RangeShape) -> BlockValue {
        match shape {
            RangeShape::Scalar => BlockValue::Scalar(self.value(range.start())),
            RangeShape::Vector => {
                BlockValue::Vector(range.cells().into_iter().map(|at| self.value(at)).collect())
            }
            RangeShape::Matrix => BlockValue::Matrix(
                range
                    .rows()
                    .into_iter()
                    .map(|row| row.into_iter().map(|at| self.value(at)).collect())
                    .collect(),
            ),
        }
    }

    /// Write a value into a range. A scalar fills every cell of the range,
    /// a vector must have one entry per cell, and a matrix must match the
    /// range's rows and columns.
    pub fn write_range(&mut self, range: &RangeRef, value: &BlockValue) -> ModexResult<()> {
        let mismatch = |reason: String| ModexError::ShapeMismatch {
            range: range.to_string(),
            reason,
        };

        match value {
            BlockValue::Scalar(cell) => {
                for at in range.cells() {
                    self.set_value(at, cell.clone());
                }
            }
            BlockValue::Vector(cells) => {
                let targets = range.cells();
                if targets.len() != cells.len() {
                    return Err(mismatch(format!(
                        "{} values for {} cells",
                        cells.len(),
                        targets.len()
                    )));
                }
                for (at, cell) in targets.into_iter().zip(cells) {
                    self.set_value(at, cell.clone());
                }
            }
            BlockValue::Matrix(rows) => {
                let (height, width) = range.dimensions();
                if rows.len() != height || rows.iter().any(|row| row.len() != width) {
                    return Err(mismatch(format!(
                        "expected {} rows of {} values",
                        height, width
                    )));
                }
                for (targets, cells) in range.rows().into_iter().zip(rows) {
                    for (at, cell) in targets.into_iter().zip(cells) {
                        self.set_value(at, cell.clone());
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<Worksheet>,
    pub defined_names: Vec<DefinedName>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet (or return the existing one with that name)
    pub fn add_sheet(&mut self, name: &str) -> &mut Worksheet {
        let idx = match self.sheets.iter().position(|s| s.name == name) {
            Some(idx) => idx,
            None => {
                self.sheets.push(Worksheet::new(name));
                self.sheets.len() - 1
            }
        };
        &mut self.sheets[idx]
    }

    pub fn define_name(&mut self, name: &str, refers_to: &str) {
        self.defined_names.push(DefinedName::new(name, refers_to));
    }

    /// Whether any sheet holds edits that have not been written to disk
    pub fn is_modified(&self) -> bool {
        self.sheets.iter().any(Worksheet::is_modified)
    }

    pub(crate) fn clear_pending(&mut self) {
        for sheet in &mut self.sheets {
            sheet.clear_pending();
        }
    }

    pub fn sheet(&self, name: &str) -> ModexResult<&Worksheet> {
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| ModexError::UnresolvedReference(format!("worksheet `{}`", name)))
    }

    pub fn sheet_mut(&mut self, name: &str) -> ModexResult<&mut Worksheet> {
        self.sheets
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| ModexError::UnresolvedReference(format!("worksheet `{}`", name)))
    }
}
