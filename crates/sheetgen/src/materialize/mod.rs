//! Sheet materializers
//!
//! Two interchangeable ways of turning [`SheetSpec`]s into a target
//! document:
//!
//! - [`DirectMaterializer`] writes cells one at a time into an in-memory
//!   workbook and can extend an existing file.
//! - [`BatchedMaterializer`] groups cells by row and streams them in row
//!   order to a constant-memory writer; it always creates a fresh file.

mod batched;
mod direct;

pub use batched::BatchedMaterializer;
pub use direct::DirectMaterializer;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::cells::SheetSpec;
use crate::columns::ColumnWidths;
use crate::error::{ErrorKind, Warnings};
use crate::style_table::StyleTable;

/// Writer strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strategy {
    /// Per-cell writes into an in-memory workbook; supports merging
    #[default]
    Direct,
    /// Row-grouped streaming writes with numeric coercion
    Batched,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Direct => "direct",
            Strategy::Batched => "batched",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "direct" => Ok(Strategy::Direct),
            "batched" => Ok(Strategy::Batched),
            other => Err(format!(
                "unknown strategy '{}', expected 'direct' or 'batched'",
                other
            )),
        }
    }
}

/// Whether the target was created or an existing document was extended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Created,
    Merged,
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputMode::Created => "created",
            OutputMode::Merged => "merged",
        })
    }
}

/// What materializing one sheet did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSummary {
    pub name: String,
    pub cells_written: usize,
    /// The sheet was already present in the target
    pub existed: bool,
}

/// Produces or updates target sheets from declared sheets.
///
/// The assembler calls [`materialize`](Self::materialize) once per sheet,
/// then [`finalize_widths`](Self::finalize_widths) once, then
/// [`persist`](Self::persist).
pub trait SheetMaterializer {
    fn strategy(&self) -> Strategy;

    fn mode(&self) -> OutputMode;

    /// Write every declared cell of `sheet`
    fn materialize(
        &mut self,
        sheet: &SheetSpec,
        styles: &StyleTable,
        columns: &ColumnWidths,
        warnings: &mut Warnings,
    ) -> Result<SheetSummary, ErrorKind>;

    /// Apply fixed and computed column widths after all cells are written
    fn finalize_widths(&mut self, columns: &ColumnWidths) -> Result<(), ErrorKind>;

    /// Write the document to `path`, replacing it atomically
    fn persist(self: Box<Self>, path: &Path) -> Result<(), ErrorKind>;
}

/// Create a temporary file next to `path` for an atomic replace
pub(crate) fn staging_file(path: &Path) -> Result<tempfile::NamedTempFile, ErrorKind> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut builder = tempfile::Builder::new();
    builder.prefix(".sheetgen-").suffix(".xlsx.tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // Same mode as a plain File::create; the umask still applies
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    builder
        .tempfile_in(dir)
        .map_err(|source| persistence_error(path, source))
}

/// Move a fully written temporary file over `path`.
///
/// An existing target keeps its permissions.
pub(crate) fn commit_staging_file(
    staged: tempfile::NamedTempFile,
    path: &Path,
) -> Result<(), ErrorKind> {
    if let Ok(metadata) = std::fs::metadata(path) {
        staged
            .as_file()
            .set_permissions(metadata.permissions())
            .map_err(|source| persistence_error(path, source))?;
    }
    staged
        .persist(path)
        .map(|_| ())
        .map_err(|e| persistence_error(path, e.error))
}

fn persistence_error(path: &Path, source: std::io::Error) -> ErrorKind {
    ErrorKind::Persistence {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parse() {
        assert_eq!("direct".parse::<Strategy>(), Ok(Strategy::Direct));
        assert_eq!("Batched".parse::<Strategy>(), Ok(Strategy::Batched));
        assert!("stream".parse::<Strategy>().is_err());
        assert_eq!(Strategy::default(), Strategy::Direct);
    }

    #[test]
    fn test_staging_file_sits_next_to_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.xlsx");
        let staged = staging_file(&target).unwrap();
        assert_eq!(staged.path().parent(), Some(dir.path()));

        std::fs::write(staged.path(), b"contenido").unwrap();
        commit_staging_file(staged, &target).unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"contenido".to_vec());
    }

    #[test]
    fn test_staging_in_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("no/such/dir/out.xlsx");
        assert!(matches!(
            staging_file(&target),
            Err(ErrorKind::Persistence { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_new_target_gets_default_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("plain.txt");
        std::fs::write(&plain, b"x").unwrap();
        let target = dir.path().join("out.xlsx");

        let staged = staging_file(&target).unwrap();
        commit_staging_file(staged, &target).unwrap();

        let mode = |p: &Path| std::fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&target), mode(&plain));
    }

    #[cfg(unix)]
    #[test]
    fn test_existing_target_keeps_its_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.xlsx");
        std::fs::write(&target, b"antes").unwrap();
        std::fs::set_permissions(&target, std::fs::Permissions::from_mode(0o640)).unwrap();

        let staged = staging_file(&target).unwrap();
        std::fs::write(staged.path(), b"despues").unwrap();
        commit_staging_file(staged, &target).unwrap();

        let mode = std::fs::metadata(&target).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
        assert_eq!(std::fs::read(&target).unwrap(), b"despues".to_vec());
    }
}
