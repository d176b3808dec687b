//! End-to-end tests for the direct writer (source -> convert -> read back)

use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use sheetgen::prelude::*;
use sheetgen::{CellValue, Color, Stage};
use sheetgen_core::{FillStyle, HorizontalAlignment};

fn write_source(dir: &Path, xml: &str) -> PathBuf {
    let path = dir.join("fuente.xml");
    std::fs::write(&path, xml).unwrap();
    path
}

const STYLED: &str = r##"<workbooks>
    <styles>
        <style id="titulo">
            <font>Calibri</font>
            <size>14</size>
            <bold>true</bold>
            <color>#FFFFFF</color>
            <background>4472C4</background>
            <alignment>center</alignment>
        </style>
        <style id="negrita"><bold>TRUE</bold></style>
    </styles>
    <workbook name="Resumen">
        <cell row="1" column="A" text="Informe" style="titulo"/>
        <cell row="2" column="A" text="Total" style="negrita"/>
        <cell row="2" column="B" value="1500" style="desconocido"/>
        <cell row="3" column="B" text="0.25" format="0.00%"/>
        <cell row="4" column="B" text="2500.50" format="#,##0.00"/>
    </workbook>
</workbooks>"##;

#[test]
fn test_declared_style_fields_and_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), STYLED);
    let output = dir.path().join("salida.xlsx");

    let report = convert(&input, &output, Strategy::Direct).unwrap();
    assert_eq!(report.mode, OutputMode::Created);
    assert_eq!(report.strategy, Strategy::Direct);

    let wb = XlsxReader::read_file(&output).unwrap();
    let ws = wb.worksheet(0).unwrap();

    let title = ws.cell_style("A1").unwrap().unwrap();
    assert_eq!(title.font.name, "Calibri");
    assert_eq!(title.font.size, 14.0);
    assert!(title.font.bold);
    assert_eq!(title.font.color, Color::rgb(0xFF, 0xFF, 0xFF));
    assert_eq!(title.fill, FillStyle::solid(Color::rgb(0x44, 0x72, 0xC4)));
    assert_eq!(title.alignment.horizontal, HorizontalAlignment::Center);

    let bold = ws.cell_style("A2").unwrap().unwrap();
    assert_eq!(bold.font.name, "Arial");
    assert_eq!(bold.font.size, 10.0);
    assert!(bold.font.bold);
    assert_eq!(bold.font.color, Color::BLACK);
    assert_eq!(bold.fill, FillStyle::None);
    assert_eq!(bold.alignment.horizontal, HorizontalAlignment::General);
}

#[test]
fn test_unknown_style_leaves_cell_unformatted() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), STYLED);
    let output = dir.path().join("salida.xlsx");

    let report = convert(&input, &output, Strategy::Direct).unwrap();
    assert_eq!(
        report.warnings,
        vec![Warning::UnknownStyleReference {
            sheet: "Resumen".into(),
            cell: "B2".into(),
            style: "desconocido".into(),
        }]
    );

    let wb = XlsxReader::read_file(&output).unwrap();
    let ws = wb.worksheet(0).unwrap();
    let style = ws.cell_style("B2").unwrap().cloned().unwrap_or_default();
    assert!(style.is_default());
    assert_eq!(ws.get_value("B2").unwrap(), CellValue::string("1500"));
}

#[test]
fn test_number_format_survives() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), STYLED);
    let output = dir.path().join("salida.xlsx");
    convert(&input, &output, Strategy::Direct).unwrap();

    let wb = XlsxReader::read_file(&output).unwrap();
    let style = wb.worksheet(0).unwrap().cell_style("B3").unwrap().unwrap();
    assert_eq!(style.number_format.code(), Some("0.00%"));

    let thousands = wb.worksheet(0).unwrap().cell_style("B4").unwrap().unwrap();
    assert_eq!(thousands.number_format.code(), Some("#,##0.00"));
}

#[test]
fn test_every_declared_cell_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(
        dir.path(),
        r#"<workbooks>
            <workbook name="Uno">
                <cell row="1" column="A" text="a"/>
                <cell row="1" column="B" value="42"/>
                <cell row="10" column="AA" text="lejos"/>
            </workbook>
            <workbook name="Dos">
                <cell row="3" column="c" text="x &amp; y"/>
                <cell row="4" column="D"/>
            </workbook>
            <workbook>
                <cell row="1" column="A" text="sin nombre"/>
            </workbook>
        </workbooks>"#,
    );
    let output = dir.path().join("salida.xlsx");
    let report = convert(&input, &output, Strategy::Direct).unwrap();
    assert_eq!(report.cells_written(), 6);

    let wb = XlsxReader::read_file(&output).unwrap();
    assert_eq!(wb.sheet_names(), vec!["Uno", "Dos", "Hoja1"]);

    let uno = wb.worksheet(0).unwrap();
    assert_eq!(uno.get_value("A1").unwrap(), CellValue::string("a"));
    assert_eq!(uno.get_value("B1").unwrap(), CellValue::string("42"));
    assert_eq!(uno.get_value("AA10").unwrap(), CellValue::string("lejos"));

    let dos = wb.worksheet(1).unwrap();
    assert_eq!(dos.get_value("C3").unwrap(), CellValue::string("x & y"));
    assert_eq!(dos.get_value("D4").unwrap(), CellValue::string(""));

    let hoja = wb.worksheet(2).unwrap();
    assert_eq!(hoja.get_value("A1").unwrap(), CellValue::string("sin nombre"));
}

#[test]
fn test_auto_width_and_fixed_override() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(
        dir.path(),
        r#"<workbooks>
            <columns>
                <column name="B" width="-1"/>
                <column name="E" width="12"/>
                <column name="F" width="ancho"/>
            </columns>
            <workbook name="Anchos">
                <cell row="1" column="A" text="abc"/>
                <cell row="2" column="A" text="abcdefg"/>
                <cell row="3" column="A" text="ab"/>
                <cell row="1" column="B" text="a"/>
                <cell row="2" column="B" text="ab"/>
                <cell row="3" column="B" text="abc"/>
                <cell row="1" column="C" text="una descripcion bastante mas larga que cincuenta caracteres"/>
                <cell row="1" column="E" text="un texto que excede el ancho fijo"/>
            </workbook>
        </workbooks>"#,
    );
    let output = dir.path().join("salida.xlsx");
    let report = convert(&input, &output, Strategy::Direct).unwrap();
    assert!(matches!(
        report.warnings.as_slice(),
        [Warning::InvalidColumnWidth { .. }]
    ));

    let wb = XlsxReader::read_file(&output).unwrap();
    let ws = wb.worksheet(0).unwrap();
    assert_eq!(ws.column_width(0), 9.0);
    assert_eq!(ws.column_width(1), 5.0);
    assert_eq!(ws.column_width(2), 50.0);
    assert_eq!(ws.column_width(4), 12.0);
}

#[test]
fn test_merge_into_existing_sheet() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("empleados.xlsx");

    let mut existing = Workbook::empty();
    existing.add_worksheet_with_name("Empleados").unwrap();
    existing.add_worksheet_with_name("Otros").unwrap();
    {
        let ws = existing.worksheet_mut(0).unwrap();
        ws.set_cell_value("A1", "Nombre").unwrap();
        ws.set_cell_value("B1", "Puesto").unwrap();
        ws.set_cell_value("A2", "Ana").unwrap();
        ws.set_cell_style("A1", &sheetgen::Style::new().fill_color(Color::rgb(0xDD, 0xEB, 0xF7)))
            .unwrap();
    }
    existing
        .worksheet_mut(1)
        .unwrap()
        .set_cell_value("A1", 7.0)
        .unwrap();
    XlsxWriter::write_file(&existing, &output).unwrap();

    let input = write_source(
        dir.path(),
        r#"<workbooks>
            <styles><style id="b"><bold>true</bold></style></styles>
            <workbook name="Empleados">
                <cell row="2" column="B" text="Analista"/>
                <cell row="3" column="A" text="Luis"/>
                <cell row="1" column="A" text="Nombre" style="b"/>
            </workbook>
        </workbooks>"#,
    );

    let report = convert(&input, &output, Strategy::Direct).unwrap();
    assert_eq!(report.mode, OutputMode::Merged);
    assert!(report.sheets[0].existed);

    let wb = XlsxReader::read_file(&output).unwrap();
    assert_eq!(wb.sheet_names(), vec!["Empleados", "Otros"]);

    let ws = wb.worksheet(0).unwrap();
    assert_eq!(ws.cell_count(), 5);
    assert_eq!(ws.get_value("B1").unwrap(), CellValue::string("Puesto"));
    assert_eq!(ws.get_value("B2").unwrap(), CellValue::string("Analista"));
    assert_eq!(ws.get_value("A3").unwrap(), CellValue::string("Luis"));

    // Restyled cell keeps its existing fill
    let a1 = ws.cell_style("A1").unwrap().unwrap();
    assert!(a1.font.bold);
    assert_eq!(a1.fill, FillStyle::solid(Color::rgb(0xDD, 0xEB, 0xF7)));

    assert_eq!(
        wb.worksheet(1).unwrap().get_value("A1").unwrap().as_number(),
        Some(7.0)
    );
}

#[test]
fn test_malformed_source_persists_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(
        dir.path(),
        r#"<workbooks><workbook name="Roto"><cell row="1" column="A" text="x"></workbook>"#,
    );
    let output = dir.path().join("salida.xlsx");

    let err = convert(&input, &output, Strategy::Direct).unwrap_err();
    assert!(err.is_parse_error());
    assert_eq!(err.stage, Stage::Validate);
    assert!(!output.exists());
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(leftovers.len(), 1);
}

#[test]
fn test_malformed_source_keeps_existing_target() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("salida.xlsx");
    let mut existing = Workbook::empty();
    existing.add_worksheet_with_name("Datos").unwrap();
    XlsxWriter::write_file(&existing, &output).unwrap();
    let before = std::fs::read(&output).unwrap();

    let input = write_source(
        dir.path(),
        r#"<workbooks><workbook name="Datos"><cell row="cero" column="A" text="x"/></workbook></workbooks>"#,
    );
    let err = convert(&input, &output, Strategy::Direct).unwrap_err();
    assert!(err.is_parse_error());
    assert_eq!(std::fs::read(&output).unwrap(), before);
}

#[test]
fn test_run_config_redirects_input_and_output() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_source(
        dir.path(),
        r#"<workbooks><workbook name="Datos"><cell row="1" column="A" text="hola"/></workbook></workbooks>"#,
    );
    let target = dir.path().join("destino.xlsx");
    let config_path = dir.path().join("config.xml");
    std::fs::write(
        &config_path,
        format!(
            "<config><data><dataIn>FILE://{}</dataIn><dataOut>FILE://{}</dataOut></data></config>",
            data.display(),
            target.display()
        ),
    )
    .unwrap();

    let config = RunConfig::read(&config_path).unwrap();
    let (input, output) = config
        .resolve_locations(&config_path, Some(Path::new("ignorado.xlsx")))
        .unwrap();
    assert_eq!(output, target);

    let ctx = RunContext::new();
    let mut assembler = DocumentAssembler::new(Strategy::Direct);
    assembler.run(input.path(), &output, &ctx).unwrap();

    let wb = XlsxReader::read_file(&target).unwrap();
    assert_eq!(
        wb.worksheet(0).unwrap().get_value("A1").unwrap(),
        CellValue::string("hola")
    );
}
