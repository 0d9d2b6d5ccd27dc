//! Excel importer - .xlsx → in-memory [`Workbook`]

use super::workbook::{DefinedName, Workbook, Worksheet};
use crate::error::ModexResult;
use crate::model::CellValue;
use crate::reference::CellRef;
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads sheets, cached values, formulas and defined names from an .xlsx file
pub struct ExcelImporter {
    path: PathBuf,
}

impl ExcelImporter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn import(&self) -> ModexResult<Workbook> {
        let mut source: Xlsx<_> = open_workbook(&self.path)?;
        let mut workbook = Workbook::new();

        workbook.defined_names = source
            .defined_names()
            .iter()
            .map(|(name, refers_to)| DefinedName::new(name.as_str(), refers_to.as_str()))
            .collect();

        for sheet_name in source.sheet_names() {
            let values = source.worksheet_range(&sheet_name)?;
            let formulas = source.worksheet_formula(&sheet_name)?;

            let mut sheet = Worksheet::new(sheet_name.as_str());
            Self::load_values(&mut sheet, &values);
            Self::load_formulas(&mut sheet, &formulas);
            debug!(
                "Loaded sheet `{}` ({} occupied cells)",
                sheet_name,
                sheet.cells().count()
            );
            workbook.sheets.push(sheet);
        }

        Ok(workbook)
    }

    fn load_values(sheet: &mut Worksheet, range: &Range<Data>) {
        let Some((row0, col0)) = range.start() else {
            return;
        };
        for (row, col, data) in range.used_cells() {
            let at = CellRef::new(row0 + row as u32, col0 + col as u32);
            sheet.load_value(at, Self::convert_cell(data));
        }
    }

    fn load_formulas(sheet: &mut Worksheet, range: &Range<String>) {
        let Some((row0, col0)) = range.start() else {
            return;
        };
        for (row, col, formula) in range.used_cells() {
            if formula.is_empty() {
                continue;
            }
            let at = CellRef::new(row0 + row as u32, col0 + col as u32);
            let cached = sheet.value(at);
            // calamine strips the leading `=`
            let formula = formula.strip_prefix('=').unwrap_or(formula);
            sheet.set_formula(at, formula, cached);
        }
    }

    /// Map calamine's cell typing onto [`CellValue`]
    pub fn convert_cell(data: &Data) -> CellValue {
        match data {
            Data::Empty => CellValue::Empty,
            Data::Bool(b) => CellValue::Bool(*b),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::String(s) => CellValue::Text(s.clone()),
            // Dates keep their serial number so they write back unchanged
            Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(e) => CellValue::Text(e.to_string()),
        }
    }
}
