//! Data source locations
//!
//! Locations in a run configuration may carry a `FILE://`, `BASE64://` or
//! `URL://` prefix. They are resolved here, once, so the engine only ever
//! sees local paths.

use std::io::Write;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use tempfile::NamedTempFile;

use crate::error::{ConvertError, ErrorKind, Result, Stage};

const FILE_PREFIX: &str = "FILE://";
const BASE64_PREFIX: &str = "BASE64://";
const URL_PREFIX: &str = "URL://";

/// A location given in a run configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// Path on the local filesystem
    Local(PathBuf),
    /// Document content embedded in the configuration
    Inline(Vec<u8>),
    /// Remote location
    Remote(String),
}

impl DataSource {
    /// Parse a location; no prefix means a local path
    pub fn parse(uri: &str) -> Result<Self> {
        let uri = uri.trim();
        if let Some(path) = strip_prefix_ignore_case(uri, FILE_PREFIX) {
            Ok(DataSource::Local(PathBuf::from(path)))
        } else if let Some(data) = strip_prefix_ignore_case(uri, BASE64_PREFIX) {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(data.trim())
                .map_err(|e| source_error(format!("invalid base64 content: {}", e)))?;
            Ok(DataSource::Inline(bytes))
        } else if let Some(url) = strip_prefix_ignore_case(uri, URL_PREFIX) {
            Ok(DataSource::Remote(url.to_string()))
        } else {
            Ok(DataSource::Local(PathBuf::from(uri)))
        }
    }

    /// Turn the location into a readable local file
    pub fn resolve_input(&self) -> Result<ResolvedInput> {
        match self {
            DataSource::Local(path) => Ok(ResolvedInput {
                path: path.clone(),
                _temp: None,
            }),
            DataSource::Inline(bytes) => {
                let mut temp = NamedTempFile::new()
                    .map_err(|e| source_error(format!("cannot stage inline content: {}", e)))?;
                temp.write_all(bytes)
                    .and_then(|_| temp.flush())
                    .map_err(|e| source_error(format!("cannot stage inline content: {}", e)))?;
                tracing::debug!(bytes = bytes.len(), path = %temp.path().display(), "inline source staged");
                Ok(ResolvedInput {
                    path: temp.path().to_path_buf(),
                    _temp: Some(temp),
                })
            }
            DataSource::Remote(url) => Err(source_error(format!(
                "remote sources are not supported: {}",
                url
            ))),
        }
    }

    /// Output locations must be local paths
    pub fn output_path(&self) -> Result<PathBuf> {
        match self {
            DataSource::Local(path) => Ok(path.clone()),
            DataSource::Inline(_) => Err(source_error(
                "an output location cannot be inline content".to_string(),
            )),
            DataSource::Remote(url) => Err(source_error(format!(
                "remote outputs are not supported: {}",
                url
            ))),
        }
    }
}

/// A readable local input. Inline content lives in a temporary file that is
/// removed when this value is dropped.
#[derive(Debug)]
pub struct ResolvedInput {
    path: PathBuf,
    _temp: Option<NamedTempFile>,
}

impl ResolvedInput {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        s.get(prefix.len()..)
    } else {
        None
    }
}

fn source_error(message: String) -> ConvertError {
    ConvertError::new(Stage::Validate, ErrorKind::Source(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prefixes() {
        assert_eq!(
            DataSource::parse("FILE:///tmp/in.xml").unwrap(),
            DataSource::Local(PathBuf::from("/tmp/in.xml"))
        );
        assert_eq!(
            DataSource::parse("file://rel/in.xml").unwrap(),
            DataSource::Local(PathBuf::from("rel/in.xml"))
        );
        assert_eq!(
            DataSource::parse("datos.xml").unwrap(),
            DataSource::Local(PathBuf::from("datos.xml"))
        );
        assert_eq!(
            DataSource::parse("BASE64://aG9sYQ==").unwrap(),
            DataSource::Inline(b"hola".to_vec())
        );
        assert_eq!(
            DataSource::parse("URL://http://example.com/x.xml").unwrap(),
            DataSource::Remote("http://example.com/x.xml".into())
        );
    }

    #[test]
    fn test_bad_base64_is_source_error() {
        let err = DataSource::parse("BASE64://!!!").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Source(_)));
    }

    #[test]
    fn test_inline_input_is_staged_to_a_file() {
        let source = DataSource::Inline(b"<workbooks/>".to_vec());
        let resolved = source.resolve_input().unwrap();
        assert_eq!(
            std::fs::read(resolved.path()).unwrap(),
            b"<workbooks/>".to_vec()
        );
        let path = resolved.path().to_path_buf();
        drop(resolved);
        assert!(!path.exists());
    }

    #[test]
    fn test_remote_is_rejected() {
        let remote = DataSource::Remote("http://example.com".into());
        assert!(remote.resolve_input().is_err());
        assert!(remote.output_path().is_err());
        assert!(DataSource::Inline(vec![]).output_path().is_err());
    }
}
