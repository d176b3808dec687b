//! Tests for writing workbooks to disk and reading them back.

use sheetgen_core::{CellValue, Color, HorizontalAlignment, Style, Workbook};
use sheetgen_xlsx::{XlsxReader, XlsxWriter};

fn temp_path(dir: &tempfile::TempDir) -> std::path::PathBuf {
    dir.path().join("libro.xlsx")
}

#[test]
fn test_multiple_sheets_keep_order_and_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_path(&dir);

    let mut wb = Workbook::empty();
    for name in ["Empleados", "Ventas", "Resumen"] {
        let idx = wb.add_worksheet_with_name(name).unwrap();
        let ws = wb.worksheet_mut(idx).unwrap();
        ws.set_cell_value("A1", name).unwrap();
    }
    XlsxWriter::write_file(&wb, &path).unwrap();

    let back = XlsxReader::read_file(&path).expect("Failed to read workbook");
    assert_eq!(back.sheet_names(), vec!["Empleados", "Ventas", "Resumen"]);
    for (i, name) in ["Empleados", "Ventas", "Resumen"].iter().enumerate() {
        let sheet = back.worksheet(i).expect("No worksheet");
        match &sheet.cell_at(0, 0).expect("A1 should exist").value {
            CellValue::String(s) => assert_eq!(s.as_str(), *name),
            other => panic!("Expected String, got {other:?}"),
        }
    }
}

#[test]
fn test_number_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_path(&dir);

    let mut wb = Workbook::empty();
    wb.add_worksheet_with_name("Hoja1").unwrap();
    let ws = wb.worksheet_mut(0).unwrap();
    ws.set_cell_value("A1", 42.0).unwrap();
    ws.set_cell_value("A2", 3.14159).unwrap();
    ws.set_cell_value("A3", -100.0).unwrap();
    ws.set_cell_value("A4", 12345678901_i64).unwrap();
    XlsxWriter::write_file(&wb, &path).unwrap();

    let back = XlsxReader::read_file(&path).unwrap();
    let sheet = back.worksheet(0).unwrap();
    let expected = [42.0, 3.14159, -100.0, 12345678901.0];
    for (row, want) in expected.iter().enumerate() {
        match &sheet.cell_at(row as u32, 0).expect("cell should exist").value {
            CellValue::Number(n) => assert!((n - want).abs() < 1e-9, "Expected {want}, got {n}"),
            other => panic!("Expected Number, got {other:?}"),
        }
    }
}

#[test]
fn test_formatting_survives_rewrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_path(&dir);

    let currency = Style::new()
        .font_name("Arial")
        .font_size(10.0)
        .font_color(Color::rgb(0x1F, 0x4E, 0x78))
        .number_format("#,##0.00")
        .horizontal_alignment(HorizontalAlignment::Right);

    let mut wb = Workbook::empty();
    wb.add_worksheet_with_name("Ventas").unwrap();
    let ws = wb.worksheet_mut(0).unwrap();
    ws.set_cell_value("B2", "1500.5").unwrap();
    ws.set_cell_style("B2", &currency).unwrap();
    ws.set_column_width(1, 18.0);
    XlsxWriter::write_file(&wb, &path).unwrap();

    // Read, touch another cell, write again: existing formatting stays.
    let mut again = XlsxReader::read_file(&path).unwrap();
    again
        .worksheet_mut(0)
        .unwrap()
        .set_cell_value("C3", "nuevo")
        .unwrap();
    XlsxWriter::write_file(&again, &path).unwrap();

    let back = XlsxReader::read_file(&path).unwrap();
    let sheet = back.worksheet(0).unwrap();
    assert_eq!(sheet.cell_style("B2").unwrap(), Some(&currency));
    assert_eq!(sheet.get_value("C3").unwrap(), CellValue::string("nuevo"));
    assert_eq!(sheet.column_width(1), 18.0);
}

#[test]
fn test_reading_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(XlsxReader::read_file(dir.path().join("nope.xlsx")).is_err());
}
