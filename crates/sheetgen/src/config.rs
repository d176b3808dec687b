//! Run configuration embedded in a source document
//!
//! A source may carry a `<data>` section naming separate input and output
//! locations and a `<log>` section configuring logging:
//!
//! ```xml
//! <workbooks>
//!   <data><dataIn>FILE://datos.xml</dataIn><dataOut>FILE://salida.xlsx</dataOut></data>
//!   <log><logLevel>DEBUG</logLevel><logFile>FILE://logs/run.log</logFile><logConsole>false</logConsole></log>
//! </workbooks>
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::context::RunContext;
use crate::error::{ConvertError, ErrorKind, ParseError, ParseErrorKind, Result, Stage};
use crate::uri::{DataSource, ResolvedInput};

/// Logging verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse a level name (case-insensitive). `WARNING` and `CRITICAL` are
    /// accepted as `Warn` and `Error`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TRACE" => Some(LogLevel::Trace),
            "DEBUG" => Some(LogLevel::Debug),
            "INFO" => Some(LogLevel::Info),
            "WARN" | "WARNING" => Some(LogLevel::Warn),
            "ERROR" | "CRITICAL" => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// Directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Where file logging goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFile {
    /// `sheetgen_<run id>.log` in the working directory
    Default,
    Path(PathBuf),
}

impl LogFile {
    pub fn path(&self, ctx: &RunContext) -> PathBuf {
        match self {
            LogFile::Default => ctx.default_log_file(),
            LogFile::Path(path) => path.clone(),
        }
    }
}

/// Contents of a `<log>` section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: LogLevel,
    /// Level text that was not recognised; `level` falls back to `Info`
    pub unknown_level: Option<String>,
    pub file: Option<LogFile>,
    pub console: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            unknown_level: None,
            file: None,
            console: true,
        }
    }
}

impl LogConfig {
    /// Console logging is used when no other sink is active
    pub fn console_enabled(&self) -> bool {
        self.console || self.file.is_none()
    }
}

/// Configuration read from a source document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunConfig {
    pub data_in: Option<DataSource>,
    pub data_out: Option<DataSource>,
    pub log: LogConfig,
}

impl RunConfig {
    /// Read the `<data>` and `<log>` sections of a document
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConvertError::new(
                Stage::Validate,
                ErrorKind::SourceNotFound(path.to_path_buf()),
            ));
        }
        let file = File::open(path).map_err(|_| {
            ConvertError::new(Stage::Validate, ErrorKind::SourceNotFound(path.to_path_buf()))
        })?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn parse_str(xml: &str) -> Result<Self> {
        Self::from_reader(xml.as_bytes())
    }

    fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut config = RunConfig::default();
        let mut buf = Vec::new();
        let mut section: Option<Section> = None;
        let mut field: Option<(String, String)> = None;

        loop {
            let position = xml_reader.buffer_position();
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"data" => section = Some(Section::Data),
                    b"log" => section = Some(Section::Log),
                    name if section.is_some() => {
                        field = Some((String::from_utf8_lossy(name).into_owned(), String::new()))
                    }
                    _ => {}
                },
                Ok(Event::Empty(e)) => {
                    // <logFile/> asks for the default log file
                    if section == Some(Section::Log) && e.local_name().as_ref() == b"logFile" {
                        config.log.file = Some(LogFile::Default);
                    }
                }
                Ok(Event::Text(e)) => {
                    if let Some((_, text)) = field.as_mut() {
                        let unescaped = e.unescape().map_err(|err| malformed(position, err))?;
                        text.push_str(&unescaped);
                    }
                }
                Ok(Event::End(e)) => match e.local_name().as_ref() {
                    b"data" | b"log" => section = None,
                    _ => {
                        if let (Some(current), Some((name, text))) = (section, field.take()) {
                            config.apply(current, &name, text.trim())?;
                        }
                    }
                },
                Ok(Event::Eof) => break,
                Err(err) => return Err(malformed(position, err)),
                _ => {}
            }
            buf.clear();
        }

        Ok(config)
    }

    fn apply(&mut self, section: Section, name: &str, text: &str) -> Result<()> {
        match (section, name) {
            (Section::Data, "dataIn") if !text.is_empty() => {
                self.data_in = Some(DataSource::parse(text)?)
            }
            (Section::Data, "dataOut") if !text.is_empty() => {
                self.data_out = Some(DataSource::parse(text)?)
            }
            (Section::Log, "logLevel") => match LogLevel::parse(text) {
                Some(level) => self.log.level = level,
                None => {
                    self.log.level = LogLevel::Info;
                    self.log.unknown_level = Some(text.to_string());
                }
            },
            (Section::Log, "logFile") => {
                let path = strip_file_prefix(text);
                self.log.file = Some(if path.is_empty() {
                    LogFile::Default
                } else {
                    LogFile::Path(PathBuf::from(path))
                });
            }
            (Section::Log, "logConsole") => {
                self.log.console = matches!(
                    text.to_ascii_lowercase().as_str(),
                    "true" | "1" | "yes" | "on"
                );
            }
            // logFormat and logDateFormat are accepted and ignored
            _ => {}
        }
        Ok(())
    }

    /// Resolve the input to read and the output to write.
    ///
    /// Input is `dataIn` when present, otherwise the configuration document
    /// itself. Output is `dataOut` when present, otherwise `fallback_output`.
    pub fn resolve_locations(
        &self,
        config_path: &Path,
        fallback_output: Option<&Path>,
    ) -> Result<(ResolvedInput, PathBuf)> {
        let input = match &self.data_in {
            Some(source) => source.resolve_input()?,
            None => DataSource::Local(config_path.to_path_buf()).resolve_input()?,
        };
        let output = match (&self.data_out, fallback_output) {
            (Some(target), _) => target.output_path()?,
            (None, Some(path)) => path.to_path_buf(),
            (None, None) => {
                return Err(ConvertError::new(
                    Stage::Validate,
                    ErrorKind::Source("no output location given".into()),
                ))
            }
        };
        Ok((input, output))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Data,
    Log,
}

fn strip_file_prefix(text: &str) -> &str {
    match text.get(..7) {
        Some(head) if head.eq_ignore_ascii_case("FILE://") => &text[7..],
        _ => text,
    }
}

fn malformed(position: usize, err: quick_xml::Error) -> ConvertError {
    ConvertError::new(
        Stage::Validate,
        ParseError::new(position, ParseErrorKind::MalformedXml(err.to_string())).into(),
    )
}
