//! Example: Convert a small employee report with both writers

use sheetgen::prelude::*;
use sheetgen::CellValue;

const SOURCE: &str = r##"<workbooks>
    <styles>
        <style id="cabecera">
            <font>Calibri</font>
            <size>12</size>
            <bold>true</bold>
            <color>FFFFFF</color>
            <background>4472C4</background>
            <alignment>center</alignment>
        </style>
    </styles>
    <columns>
        <column name="A" width="-1"/>
        <column name="C" width="14"/>
    </columns>
    <workbook name="Empleados">
        <cell row="1" column="A" text="Nombre" style="cabecera"/>
        <cell row="1" column="B" text="Edad" style="cabecera"/>
        <cell row="1" column="C" text="Salario" style="cabecera"/>
        <cell row="2" column="A" text="Ana Torres"/>
        <cell row="2" column="B" text="34"/>
        <cell row="2" column="C" text="2500.50" format="#,##0.00"/>
    </workbook>
</workbooks>"##;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dir = std::env::temp_dir().join("sheetgen-example");
    std::fs::create_dir_all(&dir)?;
    let input = dir.join("empleados.xml");
    std::fs::write(&input, SOURCE)?;

    for strategy in [Strategy::Direct, Strategy::Batched] {
        let output = dir.join(format!("empleados_{}.xlsx", strategy));
        let report = convert(&input, &output, strategy)?;
        println!(
            "{}: {} cells -> {} ({})",
            strategy,
            report.cells_written(),
            report.output.display(),
            report.mode
        );

        // Direct keeps "34" as text, batched stores a number
        let workbook = XlsxReader::read_file(&output)?;
        if let Some(sheet) = workbook.worksheet(0) {
            match sheet.get_value("B2")? {
                CellValue::Number(n) => println!("  B2 is the number {}", n),
                other => println!("  B2 is the text '{}'", other),
            }
        }
    }

    Ok(())
}
