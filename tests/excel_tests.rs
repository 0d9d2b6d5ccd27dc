//! Excel ⇄ SedaroML tests against real .xlsx files
//!
//! Fixtures are written with rust_xlsxwriter and read back through the same
//! calamine path the CLI uses.

use calamine::{open_workbook, Data, Reader, Xlsx};
use modex::convert::{excel_to_sedaroml, reconcile_diff_to_excel, sedaroml_to_excel};
use modex::excel::WorkbookSession;
use modex::model::{read_document, write_document, Block, BlockValue, CellValue};
use modex::ModexError;
use pretty_assertions::assert_eq;
use rust_xlsxwriter::{Format, Formula, Workbook};
use serde_json::json;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ═══════════════════════════════════════════════════════════════════════════
// FIXTURES
// ═══════════════════════════════════════════════════════════════════════════

/// Sheet1: Total (B2 = 42), Header (A1:D1), Grid (A4:B5), Whole (A:A),
/// an unnamed date in F6
/// Q1 Budget: Rates (B1:B3), Label (A1)
fn write_fixture(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("model.xlsx");
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name("Sheet1").unwrap();
    for col in 0..4u16 {
        sheet.write_number(0, col, (col + 1) as f64).unwrap();
    }
    sheet.write_number(1, 1, 42.0).unwrap();
    sheet.write_string(3, 0, "north").unwrap();
    sheet.write_boolean(3, 1, true).unwrap();
    sheet.write_number(4, 0, 1.5).unwrap();
    sheet
        .write_formula(6, 0, Formula::new("=SUM(A1:D1)").set_result("10"))
        .unwrap();
    sheet.write_string(9, 9, "bystander").unwrap();
    let date = Format::new().set_num_format("yyyy-mm-dd");
    sheet.write_number_with_format(5, 5, 45306.0, &date).unwrap();

    let budget = workbook.add_worksheet();
    budget.set_name("Q1 Budget").unwrap();
    budget.write_string(0, 0, "rates").unwrap();
    budget.write_number(0, 1, 0.1).unwrap();
    budget.write_number(1, 1, 0.2).unwrap();
    budget.write_number(2, 1, 0.3).unwrap();

    workbook.define_name("Total", "=Sheet1!$B$2").unwrap();
    workbook.define_name("Header", "=Sheet1!$A$1:$D$1").unwrap();
    workbook.define_name("Grid", "=Sheet1!$A$4:$B$5").unwrap();
    workbook.define_name("Whole", "=Sheet1!$A:$A").unwrap();
    workbook.define_name("Rates", "='Q1 Budget'!$B$1:$B$3").unwrap();
    workbook.define_name("Label", "='Q1 Budget'!$A$1").unwrap();

    workbook.save(&path).unwrap();
    path
}

fn cell(path: &Path, sheet: &str, row: u32, col: u32) -> Data {
    let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
    let range = workbook.worksheet_range(sheet).unwrap();
    range.get_value((row, col)).cloned().unwrap_or(Data::Empty)
}

fn set_scalar(path: &Path, id: &str, value: CellValue) {
    let mut document = read_document(path).unwrap();
    if let Some(Block::ScalarName(name)) = document.blocks.get_mut(id) {
        name.value = BlockValue::Scalar(value);
    }
    write_document(path, &document).unwrap();
}

fn owning_sheet(block: &Block) -> String {
    block.as_name().expect("name block").sheet.clone()
}

fn name_value(block: &Block) -> &BlockValue {
    &block.as_name().expect("name block").value
}

// ═══════════════════════════════════════════════════════════════════════════
// EXTRACTION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_extract_scalar_block_layout() {
    let dir = TempDir::new().unwrap();
    let workbook = write_fixture(&dir);
    let output = dir.path().join("model.json");

    excel_to_sedaroml(&workbook, &output).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(
        json["blocks"]["Total"],
        json!({
            "id": "Total",
            "type": "ScalarName",
            "name": "Total",
            "sheet": "Sheet1",
            "refers_to": "Sheet1!$B$2",
            "value": 42
        })
    );
    assert_eq!(
        json["blocks"]["Sheet1"],
        json!({"id": "Sheet1", "type": "Sheet", "name": "Sheet1"})
    );
}

#[test]
fn test_extract_classifies_all_shapes() {
    let dir = TempDir::new().unwrap();
    let workbook = write_fixture(&dir);
    let output = dir.path().join("model.json");

    let document = excel_to_sedaroml(&workbook, &output).unwrap();

    let mut scalars = document.index["ScalarName"].clone();
    scalars.sort();
    assert_eq!(scalars, vec!["Label", "Total"]);
    let mut vectors = document.index["VectorName"].clone();
    vectors.sort();
    assert_eq!(vectors, vec!["Header", "Rates"]);
    assert_eq!(document.index["MatrixName"], vec!["Grid"]);

    let mut sheets = document.index["Sheet"].clone();
    sheets.sort();
    assert_eq!(sheets, vec!["Q1 Budget", "Sheet1"]);
}

#[test]
fn test_extract_captures_typed_values() {
    let dir = TempDir::new().unwrap();
    let workbook = write_fixture(&dir);
    let document = excel_to_sedaroml(&workbook, &dir.path().join("m.json")).unwrap();

    assert_eq!(
        name_value(&document.blocks["Header"]),
        &BlockValue::Vector(vec![1.0.into(), 2.0.into(), 3.0.into(), 4.0.into()])
    );
    assert_eq!(
        name_value(&document.blocks["Grid"]),
        &BlockValue::Matrix(vec![
            vec!["north".into(), true.into()],
            vec![1.5.into(), CellValue::Empty],
        ])
    );
    assert_eq!(
        name_value(&document.blocks["Rates"]),
        &BlockValue::Vector(vec![0.1.into(), 0.2.into(), 0.3.into()])
    );
}

#[test]
fn test_extract_skips_unbounded_names() {
    let dir = TempDir::new().unwrap();
    let workbook = write_fixture(&dir);
    let document = excel_to_sedaroml(&workbook, &dir.path().join("m.json")).unwrap();

    assert!(!document.contains("Whole"));
    assert_eq!(
        document.block_ids_of_type("Name").unwrap().len(),
        5,
        "every bounded name should be present"
    );
}

#[test]
fn test_extract_truncates_existing_output() {
    let dir = TempDir::new().unwrap();
    let workbook = write_fixture(&dir);
    let output = dir.path().join("m.json");
    std::fs::write(&output, "x".repeat(100_000)).unwrap();

    excel_to_sedaroml(&workbook, &output).unwrap();
    assert!(read_document(&output).is_ok());
}

// ═══════════════════════════════════════════════════════════════════════════
// RECONCILIATION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_identity_round_trip() {
    let dir = TempDir::new().unwrap();
    let workbook = write_fixture(&dir);
    let first = dir.path().join("first.json");
    let second = dir.path().join("second.json");

    let before = excel_to_sedaroml(&workbook, &first).unwrap();
    assert_eq!(sedaroml_to_excel(&first, &workbook).unwrap(), 5);
    let after = excel_to_sedaroml(&workbook, &second).unwrap();

    assert!(before.diff(&after).unwrap().is_empty());
    assert_eq!(
        cell(&workbook, "Sheet1", 9, 9),
        Data::String("bystander".to_string())
    );
}

#[test]
fn test_full_reconcile_writes_edited_values() {
    let dir = TempDir::new().unwrap();
    let workbook = write_fixture(&dir);
    let model = dir.path().join("model.json");

    let mut document = excel_to_sedaroml(&workbook, &model).unwrap();
    if let Some(Block::VectorName(rates)) = document.blocks.get_mut("Rates") {
        rates.value = BlockValue::Vector(vec![0.5.into(), 0.6.into(), 0.7.into()]);
    }
    write_document(&model, &document).unwrap();

    sedaroml_to_excel(&model, &workbook).unwrap();

    assert_eq!(cell(&workbook, "Q1 Budget", 0, 1), Data::Float(0.5));
    assert_eq!(cell(&workbook, "Q1 Budget", 2, 1), Data::Float(0.7));
}

#[test]
fn test_reconcile_preserves_formulas_and_names() {
    let dir = TempDir::new().unwrap();
    let workbook = write_fixture(&dir);
    let model = dir.path().join("model.json");

    excel_to_sedaroml(&workbook, &model).unwrap();
    set_scalar(&model, "Total", 7.0.into());
    sedaroml_to_excel(&model, &workbook).unwrap();
    assert_eq!(cell(&workbook, "Sheet1", 1, 1), Data::Float(7.0));

    let mut reopened: Xlsx<_> = open_workbook(&workbook).unwrap();
    let formulas = reopened.worksheet_formula("Sheet1").unwrap();
    assert_eq!(
        formulas.get_value((6, 0)).map(String::as_str),
        Some("SUM(A1:D1)")
    );
    let names: Vec<&str> = reopened
        .defined_names()
        .iter()
        .map(|(name, _)| name.as_str())
        .collect();
    assert!(names.contains(&"Total"));
    assert!(names.contains(&"Whole"));
}

#[test]
fn test_reconcile_keeps_untouched_cell_formats() {
    let dir = TempDir::new().unwrap();
    let workbook = write_fixture(&dir);
    let model = dir.path().join("model.json");
    assert!(matches!(cell(&workbook, "Sheet1", 5, 5), Data::DateTime(_)));

    excel_to_sedaroml(&workbook, &model).unwrap();
    set_scalar(&model, "Total", 7.0.into());
    reconcile_diff_to_excel(&model, r#"{"updated_blocks":["Total"]}"#, &workbook).unwrap();

    assert_eq!(cell(&workbook, "Sheet1", 1, 1), Data::Float(7.0));
    assert!(matches!(cell(&workbook, "Sheet1", 5, 5), Data::DateTime(_)));
}

#[test]
fn test_unchanged_values_leave_file_byte_identical() {
    let dir = TempDir::new().unwrap();
    let workbook = write_fixture(&dir);
    let model = dir.path().join("model.json");
    excel_to_sedaroml(&workbook, &model).unwrap();
    let original = std::fs::read(&workbook).unwrap();

    assert_eq!(
        reconcile_diff_to_excel(&model, r#"{"updated_blocks":[]}"#, &workbook).unwrap(),
        0
    );
    assert_eq!(std::fs::read(&workbook).unwrap(), original);

    assert_eq!(sedaroml_to_excel(&model, &workbook).unwrap(), 5);
    assert_eq!(std::fs::read(&workbook).unwrap(), original);
}

#[test]
fn test_reconcile_keeps_sheet_scoped_names() {
    let dir = TempDir::new().unwrap();
    let workbook = dir.path().join("scoped.xlsx");
    let mut xlsx = Workbook::new();
    xlsx.add_worksheet().set_name("Inputs").unwrap();
    xlsx.add_worksheet().set_name("Outputs").unwrap();
    xlsx.worksheet_from_name("Inputs")
        .unwrap()
        .write_number(0, 0, 0.1)
        .unwrap();
    xlsx.worksheet_from_name("Outputs")
        .unwrap()
        .write_number(0, 0, 0.2)
        .unwrap();
    xlsx.define_name("Inputs!Rate", "=Inputs!$A$1").unwrap();
    xlsx.define_name("Outputs!Rate", "=Outputs!$A$1").unwrap();
    xlsx.save(&workbook).unwrap();

    let model = dir.path().join("scoped.json");
    excel_to_sedaroml(&workbook, &model).unwrap();
    set_scalar(&model, "Rate", 0.5.into());
    sedaroml_to_excel(&model, &workbook).unwrap();

    let mut reopened: Xlsx<_> = open_workbook(&workbook).unwrap();
    let mut targets: Vec<String> = reopened
        .defined_names()
        .iter()
        .filter(|(name, _)| name == "Rate")
        .map(|(_, refers_to)| refers_to.clone())
        .collect();
    targets.sort();
    assert_eq!(targets, vec!["Inputs!$A$1", "Outputs!$A$1"]);

    // Only the first `Rate` is extracted; its cell carries the edit
    let document = read_document(&model).unwrap();
    let owner = &owning_sheet(&document.blocks["Rate"]);
    assert_eq!(cell(&workbook, owner, 0, 0), Data::Float(0.5));
}

#[test]
fn test_diff_reconcile_writes_only_listed_blocks() {
    let dir = TempDir::new().unwrap();
    let workbook = write_fixture(&dir);
    let model = dir.path().join("model.json");

    let mut document = excel_to_sedaroml(&workbook, &model).unwrap();
    if let Some(Block::ScalarName(total)) = document.blocks.get_mut("Total") {
        total.value = BlockValue::Scalar(99.0.into());
    }
    if let Some(Block::VectorName(row)) = document.blocks.get_mut("Header") {
        row.value = BlockValue::Vector(vec![0.0.into(); 4]);
    }
    write_document(&model, &document).unwrap();

    let written =
        reconcile_diff_to_excel(&model, r#"{"updated_blocks":["Total"]}"#, &workbook).unwrap();

    assert_eq!(written, 1);
    assert_eq!(cell(&workbook, "Sheet1", 1, 1), Data::Float(99.0));
    assert_eq!(cell(&workbook, "Sheet1", 0, 0), Data::Float(1.0));
}

#[test]
fn test_diff_reconcile_accepts_model_diff_output() {
    let dir = TempDir::new().unwrap();
    let workbook = write_fixture(&dir);
    let model = dir.path().join("model.json");

    let before = excel_to_sedaroml(&workbook, &model).unwrap();
    let mut after = before.clone();
    if let Some(Block::ScalarName(label)) = after.blocks.get_mut("Label") {
        label.value = BlockValue::Scalar("updated".into());
    }
    write_document(&model, &after).unwrap();

    let diff = serde_json::to_string(&before.diff(&after).unwrap()).unwrap();
    reconcile_diff_to_excel(&model, &diff, &workbook).unwrap();

    assert_eq!(
        cell(&workbook, "Q1 Budget", 0, 0),
        Data::String("updated".to_string())
    );
}

#[test]
fn test_failed_reconcile_leaves_file_untouched() {
    let dir = TempDir::new().unwrap();
    let workbook = write_fixture(&dir);
    let model = dir.path().join("model.json");
    excel_to_sedaroml(&workbook, &model).unwrap();
    let original = std::fs::read(&workbook).unwrap();

    let result = reconcile_diff_to_excel(&model, r#"{"updated_blocks":["Missing"]}"#, &workbook);
    assert!(matches!(result, Err(ModexError::UnresolvedReference(_))));

    let result = reconcile_diff_to_excel(&model, "{not json", &workbook);
    assert!(matches!(result, Err(ModexError::InvalidDiff(_))));

    assert_eq!(std::fs::read(&workbook).unwrap(), original);
}

// ═══════════════════════════════════════════════════════════════════════════
// SESSION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_session_loads_sheets_in_order() {
    let dir = TempDir::new().unwrap();
    let workbook = write_fixture(&dir);

    let session = WorkbookSession::open(&workbook).unwrap();
    let names: Vec<&str> = session
        .workbook()
        .sheets
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(names, vec!["Sheet1", "Q1 Budget"]);
    assert_eq!(session.workbook().defined_names.len(), 6);
    assert!(!session.is_modified());
}

#[test]
fn test_open_missing_workbook_fails() {
    let dir = TempDir::new().unwrap();
    assert!(WorkbookSession::open(dir.path().join("missing.xlsx")).is_err());
}
