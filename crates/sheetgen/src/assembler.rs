//! Document assembler
//!
//! Drives one conversion through its stages:
//!
//! ```text
//! Start -> Validated -> StylesLoaded -> SheetsProcessed -> WidthsFinalized -> Persisted
//! ```
//!
//! Any unrecoverable error moves the assembler to `Failed` with the stage
//! that failed. Nothing is written to the output path before `Persisted`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cells::{extract_sheets, SheetSpec};
use crate::columns::ColumnWidths;
use crate::context::RunContext;
use crate::error::{ConvertError, ErrorKind, Result, Stage, Warning, Warnings};
use crate::materialize::{
    BatchedMaterializer, DirectMaterializer, OutputMode, SheetMaterializer, SheetSummary, Strategy,
};
use crate::source::SourceDocument;
use crate::style_table::StyleTable;

/// Where the assembler is in a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Start,
    Validated,
    StylesLoaded,
    SheetsProcessed,
    WidthsFinalized,
    Persisted,
    /// Stopped by an error in the given stage
    Failed(Stage),
}

/// Outcome of a successful conversion
#[derive(Debug, Clone)]
pub struct ConversionReport {
    pub output: PathBuf,
    pub mode: OutputMode,
    pub strategy: Strategy,
    pub sheets: Vec<SheetSummary>,
    pub warnings: Vec<Warning>,
    pub elapsed: Duration,
}

impl ConversionReport {
    /// Total cells written over all sheets
    pub fn cells_written(&self) -> usize {
        self.sheets.iter().map(|s| s.cells_written).sum()
    }
}

/// Parsed source, ready for materializing
struct Prepared {
    sheets: Vec<SheetSpec>,
    styles: StyleTable,
    columns: ColumnWidths,
}

/// Runs conversions with a chosen writer strategy
#[derive(Debug)]
pub struct DocumentAssembler {
    strategy: Strategy,
    state: State,
}

impl DocumentAssembler {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            state: State::Start,
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// State reached by the last run
    pub fn state(&self) -> State {
        self.state
    }

    /// Convert the source document at `input` into the spreadsheet at `output`
    pub fn run(&mut self, input: &Path, output: &Path, ctx: &RunContext) -> Result<ConversionReport> {
        self.state = State::Start;
        tracing::info!(
            run = ctx.run_id(),
            input = %input.display(),
            output = %output.display(),
            strategy = %self.strategy,
            "conversion started"
        );

        match self.run_stages(input, output, ctx) {
            Ok(report) => Ok(report),
            Err(err) => {
                self.state = State::Failed(err.stage);
                tracing::error!(stage = %err.stage, "conversion failed: {}", err.kind);
                Err(err)
            }
        }
    }

    fn run_stages(&mut self, input: &Path, output: &Path, ctx: &RunContext) -> Result<ConversionReport> {
        let mut warnings = Warnings::new();

        let (document, sheets) = validate(input)?;
        self.advance(State::Validated);

        let prepared = load_styles(document, sheets, &mut warnings)?;
        self.advance(State::StylesLoaded);

        let mut materializer = self.open_target(output)?;
        let mode = materializer.mode();
        let mut summaries = Vec::with_capacity(prepared.sheets.len());
        for sheet in &prepared.sheets {
            let summary = materializer
                .materialize(sheet, &prepared.styles, &prepared.columns, &mut warnings)
                .map_err(|kind| ConvertError::new(Stage::ProcessSheets, kind))?;
            summaries.push(summary);
        }
        self.advance(State::SheetsProcessed);

        materializer
            .finalize_widths(&prepared.columns)
            .map_err(|kind| ConvertError::new(Stage::FinalizeWidths, kind))?;
        self.advance(State::WidthsFinalized);

        materializer
            .persist(output)
            .map_err(|kind| ConvertError::new(Stage::Persist, kind))?;
        self.advance(State::Persisted);

        let report = ConversionReport {
            output: output.to_path_buf(),
            mode,
            strategy: self.strategy,
            sheets: summaries,
            warnings: warnings.into_vec(),
            elapsed: ctx.elapsed(),
        };
        tracing::info!(
            output = %report.output.display(),
            mode = %report.mode,
            sheets = report.sheets.len(),
            cells = report.cells_written(),
            warnings = report.warnings.len(),
            "document persisted"
        );
        Ok(report)
    }

    fn open_target(&self, output: &Path) -> Result<Box<dyn SheetMaterializer>> {
        let materializer: Box<dyn SheetMaterializer> = match self.strategy {
            Strategy::Direct => Box::new(
                DirectMaterializer::open_or_create(output)
                    .map_err(|kind| ConvertError::new(Stage::ProcessSheets, kind))?,
            ),
            Strategy::Batched => {
                if output.exists() {
                    tracing::info!(
                        path = %output.display(),
                        "batched writer replaces the existing document"
                    );
                }
                Box::new(BatchedMaterializer::new())
            }
        };
        Ok(materializer)
    }

    fn advance(&mut self, next: State) {
        tracing::debug!(from = ?self.state, to = ?next, "stage complete");
        self.state = next;
    }
}

fn validate(input: &Path) -> Result<(SourceDocument, Vec<SheetSpec>)> {
    let fail = |kind: ErrorKind| ConvertError::new(Stage::Validate, kind);

    if !input.is_file() {
        return Err(fail(ErrorKind::SourceNotFound(input.to_path_buf())));
    }
    let document = SourceDocument::read_file(input)
        .map_err(|_| fail(ErrorKind::SourceNotFound(input.to_path_buf())))?
        .map_err(|e| fail(e.into()))?;
    let sheets = extract_sheets(&document.sheets).map_err(|e| fail(e.into()))?;
    tracing::debug!(
        sheets = sheets.len(),
        styles = document.styles.len(),
        columns = document.columns.len(),
        "source parsed"
    );
    Ok((document, sheets))
}

fn load_styles(
    document: SourceDocument,
    sheets: Vec<SheetSpec>,
    warnings: &mut Warnings,
) -> Result<Prepared> {
    let fail = |e: crate::error::ParseError| ConvertError::new(Stage::LoadStyles, e.into());
    let styles = StyleTable::build(&document.styles, warnings).map_err(fail)?;
    let columns = ColumnWidths::build(&document.columns, warnings);
    tracing::debug!(styles = styles.len(), columns = columns.len(), "styles and widths loaded");
    Ok(Prepared {
        sheets,
        styles,
        columns,
    })
}

/// Convert `input` to `output` with a fresh run context
pub fn convert<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    strategy: Strategy,
) -> Result<ConversionReport> {
    DocumentAssembler::new(strategy).run(input.as_ref(), output.as_ref(), &RunContext::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SOURCE: &str = r#"<workbooks>
        <styles><style id="1"><bold>true</bold></style></styles>
        <workbook name="Datos">
            <cell row="1" column="A" text="Nombre" style="1"/>
            <cell row="2" column="A" text="Ana" style="9"/>
        </workbook>
    </workbooks>"#;

    #[test]
    fn test_successful_run_reaches_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.xml");
        let output = dir.path().join("out.xlsx");
        std::fs::write(&input, SOURCE).unwrap();

        let mut assembler = DocumentAssembler::new(Strategy::Direct);
        let report = assembler.run(&input, &output, &RunContext::new()).unwrap();

        assert_eq!(assembler.state(), State::Persisted);
        assert_eq!(report.mode, OutputMode::Created);
        assert_eq!(report.cells_written(), 2);
        assert_eq!(report.warnings.len(), 1);
        assert!(output.is_file());
    }

    #[test]
    fn test_missing_input_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.xlsx");
        let mut assembler = DocumentAssembler::new(Strategy::Batched);
        let err = assembler
            .run(&dir.path().join("nope.xml"), &output, &RunContext::new())
            .unwrap_err();

        assert_eq!(err.stage, Stage::Validate);
        assert!(matches!(err.kind, ErrorKind::SourceNotFound(_)));
        assert_eq!(assembler.state(), State::Failed(Stage::Validate));
        assert!(!output.exists());
    }

    #[test]
    fn test_bad_style_fails_in_load_styles() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.xml");
        let output = dir.path().join("out.xlsx");
        std::fs::write(
            &input,
            r#"<workbooks><styles><style id="1" size="grande"/></styles>
               <workbook name="S"><cell row="1" column="A" text="x"/></workbook></workbooks>"#,
        )
        .unwrap();

        let mut assembler = DocumentAssembler::new(Strategy::Direct);
        let err = assembler.run(&input, &output, &RunContext::new()).unwrap_err();
        assert_eq!(err.stage, Stage::LoadStyles);
        assert!(err.is_parse_error());
        assert!(!output.exists());
    }
}
