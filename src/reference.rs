//! A1-style reference parsing for defined-name targets
//!
//! Defined names point at `Sheet!Range` addresses such as `Sheet1!$B$2`,
//! `'Q1 Budget'!$A$1:$D$1` or `Sheet1!$A:$A`. This module splits those into a
//! sheet name and a bounded cell range, or reports them as unbounded.

use crate::error::{ModexError, ModexResult};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Largest row index Excel addresses (1-based 1_048_576)
pub const MAX_ROWS: u32 = 1_048_576;
/// Largest column index Excel addresses (1-based 16_384, `XFD`)
pub const MAX_COLS: u32 = 16_384;

/// One side of an A1 range: optional column letters, optional row digits
static ENDPOINT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\$?([A-Za-z]{1,3})?\$?([0-9]{1,7})?$").expect("endpoint pattern compiles")
});

/// Zero-based cell coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}${}", column_index_to_letter(self.col), self.row + 1)
    }
}

/// Structural shape of a named range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeShape {
    /// A single cell (no `:` in the address)
    Scalar,
    /// A single row or a single column
    Vector,
    /// Several rows and several columns
    Matrix,
}

/// A bounded cell range, normalized so `start` is the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeRef {
    Cell(CellRef),
    Area { start: CellRef, end: CellRef },
}

impl RangeRef {
    fn area(a: CellRef, b: CellRef) -> Self {
        RangeRef::Area {
            start: CellRef::new(a.row.min(b.row), a.col.min(b.col)),
            end: CellRef::new(a.row.max(b.row), a.col.max(b.col)),
        }
    }

    /// Classify the range. `A1:A1` is written with a colon, so it counts as a
    /// one-element vector rather than a scalar.
    pub fn shape(&self) -> RangeShape {
        match self {
            RangeRef::Cell(_) => RangeShape::Scalar,
            RangeRef::Area { start, end } => {
                if start.col == end.col || start.row == end.row {
                    RangeShape::Vector
                } else {
                    RangeShape::Matrix
                }
            }
        }
    }

    pub fn start(&self) -> CellRef {
        match self {
            RangeRef::Cell(cell) => *cell,
            RangeRef::Area { start, .. } => *start,
        }
    }

    pub fn end(&self) -> CellRef {
        match self {
            RangeRef::Cell(cell) => *cell,
            RangeRef::Area { end, .. } => *end,
        }
    }

    /// (rows, columns) spanned by the range
    pub fn dimensions(&self) -> (usize, usize) {
        let (start, end) = (self.start(), self.end());
        (
            (end.row - start.row + 1) as usize,
            (end.col - start.col + 1) as usize,
        )
    }

    /// Cells of a vector range in reading order (left to right for a row,
    /// top to bottom for a column)
    pub fn cells(&self) -> Vec<CellRef> {
        let (start, end) = (self.start(), self.end());
        let mut cells = Vec::new();
        for row in start.row..=end.row {
            for col in start.col..=end.col {
                cells.push(CellRef::new(row, col));
            }
        }
        cells
    }

    /// Cells grouped by row, for matrix reads and writes
    pub fn rows(&self) -> Vec<Vec<CellRef>> {
        let (start, end) = (self.start(), self.end());
        (start.row..=end.row)
            .map(|row| {
                (start.col..=end.col)
                    .map(|col| CellRef::new(row, col))
                    .collect()
            })
            .collect()
    }
}

impl fmt::Display for RangeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeRef::Cell(cell) => write!(f, "{}", cell),
            RangeRef::Area { start, end } => write!(f, "{}:{}", start, end),
        }
    }
}

/// A defined-name target resolved to a sheet and a bounded range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetReference {
    /// Unquoted sheet name
    pub sheet: String,
    pub range: RangeRef,
    /// The target as written, without a leading `=`
    pub address: String,
}

/// Outcome of parsing a defined-name target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Bounded(SheetReference),
    /// Whole-column or whole-row ranges (`$A:$A`, `$1:$1`)
    Unbounded,
}

/// One side of a `:` range, with either part possibly missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Endpoint {
    col: Option<u32>,
    row: Option<u32>,
}

impl Endpoint {
    fn cell(&self) -> Option<CellRef> {
        match (self.row, self.col) {
            (Some(row), Some(col)) => Some(CellRef::new(row, col)),
            _ => None,
        }
    }
}

/// Parse a defined-name target such as `=Sheet1!$B$2`
pub fn parse_target(refers_to: &str) -> ModexResult<Target> {
    let address = refers_to.trim().trim_start_matches('=').trim();
    let (sheet, range_part) = split_sheet(address)?;

    let endpoints: Vec<&str> = range_part.split(':').collect();
    match endpoints.as_slice() {
        [single] => {
            let endpoint = parse_endpoint(address, single)?;
            let cell = endpoint
                .cell()
                .ok_or_else(|| ModexError::reference(address, "expected a cell address"))?;
            Ok(Target::Bounded(SheetReference {
                sheet,
                range: RangeRef::Cell(cell),
                address: address.to_string(),
            }))
        }
        [first, second] => {
            let first = parse_endpoint(address, first)?;
            let second = parse_endpoint(address, second)?;
            match (first.cell(), second.cell()) {
                (Some(a), Some(b)) => Ok(Target::Bounded(SheetReference {
                    sheet,
                    range: RangeRef::area(a, b),
                    address: address.to_string(),
                })),
                _ => Ok(Target::Unbounded),
            }
        }
        _ => Err(ModexError::reference(address, "too many `:` separators")),
    }
}

/// Split `Sheet!Range` into the unquoted sheet name and the range text
fn split_sheet(address: &str) -> ModexResult<(String, &str)> {
    if let Some(quoted) = address.strip_prefix('\'') {
        // 'It''s here'!A1
        let mut sheet = String::new();
        let mut chars = quoted.char_indices().peekable();
        while let Some((idx, ch)) = chars.next() {
            if ch != '\'' {
                sheet.push(ch);
                continue;
            }
            if let Some((_, '\'')) = chars.peek() {
                sheet.push('\'');
                chars.next();
                continue;
            }
            let rest = &quoted[idx + 1..];
            let range = rest
                .strip_prefix('!')
                .ok_or_else(|| ModexError::reference(address, "expected `!` after sheet name"))?;
            if sheet.is_empty() {
                return Err(ModexError::reference(address, "empty sheet name"));
            }
            return Ok((sheet, range));
        }
        return Err(ModexError::reference(address, "unterminated sheet name quote"));
    }

    match address.rsplit_once('!') {
        Some((sheet, range)) if !sheet.is_empty() => Ok((sheet.to_string(), range)),
        Some(_) => Err(ModexError::reference(address, "empty sheet name")),
        None => Err(ModexError::reference(address, "missing sheet name")),
    }
}

fn parse_endpoint(address: &str, text: &str) -> ModexResult<Endpoint> {
    let caps = ENDPOINT_PATTERN
        .captures(text.trim())
        .ok_or_else(|| ModexError::reference(address, format!("`{}` is not a cell address", text)))?;

    let col = match caps.get(1) {
        Some(letters) => {
            let col = column_letter_to_index(letters.as_str())
                .ok_or_else(|| ModexError::reference(address, "invalid column"))?;
            if col >= MAX_COLS {
                return Err(ModexError::reference(address, "column out of bounds"));
            }
            Some(col)
        }
        None => None,
    };
    let row = match caps.get(2) {
        Some(digits) => {
            let row: u32 = digits
                .as_str()
                .parse()
                .map_err(|_| ModexError::reference(address, "invalid row"))?;
            if row == 0 || row > MAX_ROWS {
                return Err(ModexError::reference(address, "row out of bounds"));
            }
            Some(row - 1)
        }
        None => None,
    };

    if col.is_none() && row.is_none() {
        return Err(ModexError::reference(address, "empty cell address"));
    }
    Ok(Endpoint { col, row })
}

/// Convert a zero-based column index to letters (0→A, 25→Z, 26→AA)
pub fn column_index_to_letter(index: u32) -> String {
    let mut result = String::new();
    let mut idx = index;

    loop {
        let remainder = idx % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }

    result
}

/// Convert column letters to a zero-based index (A→0, AA→26)
pub fn column_letter_to_index(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    let mut index: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = (ch.to_ascii_uppercase() as u8 - b'A') as u32 + 1;
        index = index.checked_mul(26)?.checked_add(digit)?;
    }
    Some(index - 1)
}
