//! Source document reader
//!
//! A single pass over the XML source collects the raw `styles`, `columns`
//! and `workbook` sections. Validation and typing happen in the builders
//! that consume these entries ([`crate::style_table`], [`crate::columns`],
//! [`crate::cells`]).

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{ParseError, ParseErrorKind};

/// One element's attributes (and, for styles, child element text)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entry {
    /// Byte offset of the element in the source
    pub position: usize,
    fields: Vec<(String, String)>,
}

impl Entry {
    pub fn new(position: usize) -> Self {
        Self {
            position,
            fields: Vec::new(),
        }
    }

    /// Add a field; the first occurrence of a key wins on lookup
    pub fn with_field<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.push(key, value);
        self
    }

    pub fn push<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.fields.push((key.into(), value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A `<workbook>` section with its cell entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    pub name: Option<String>,
    pub position: usize,
    pub cells: Vec<Entry>,
}

/// Raw sections of a source document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceDocument {
    pub styles: Vec<Entry>,
    pub columns: Vec<Entry>,
    pub sheets: Vec<RawSheet>,
}

impl SourceDocument {
    /// Read a source document from a file
    pub fn read_file<P: AsRef<Path>>(path: P) -> std::io::Result<Result<Self, ParseError>> {
        let file = File::open(path)?;
        Ok(Self::read(BufReader::new(file)))
    }

    /// Read a source document from a string
    pub fn parse_str(xml: &str) -> Result<Self, ParseError> {
        Self::read(xml.as_bytes())
    }

    /// Read a source document from a buffered reader
    pub fn read<R: BufRead>(reader: R) -> Result<Self, ParseError> {
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut doc = SourceDocument::default();
        let mut buf = Vec::new();
        let mut depth = 0usize;
        let mut in_styles = false;
        let mut in_columns = false;
        let mut style: Option<Entry> = None;
        let mut style_field: Option<(String, String)> = None;
        let mut sheet: Option<RawSheet> = None;

        loop {
            let position = xml_reader.buffer_position();
            let malformed = |e: quick_xml::Error| {
                ParseError::new(position, ParseErrorKind::MalformedXml(e.to_string()))
            };

            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    depth += 1;
                    let name = local_name(&e);
                    if style.is_some() {
                        // Field given as a child element of <style>
                        style_field = Some((name, String::new()));
                    } else {
                        match name.as_str() {
                            "styles" => in_styles = true,
                            "columns" => in_columns = true,
                            "style" if in_styles => style = Some(entry_from(&e, position)?),
                            "column" if in_columns => {
                                doc.columns.push(entry_from(&e, position)?)
                            }
                            "workbook" => sheet = Some(sheet_from(&e, position)?),
                            "cell" => {
                                if let Some(sheet) = sheet.as_mut() {
                                    sheet.cells.push(entry_from(&e, position)?);
                                }
                            }
                            _ => {}
                        }
                    }
                }
                Ok(Event::Empty(e)) if style.is_none() => match local_name(&e).as_str() {
                    "style" if in_styles => doc.styles.push(entry_from(&e, position)?),
                    "column" if in_columns => doc.columns.push(entry_from(&e, position)?),
                    "workbook" => doc.sheets.push(sheet_from(&e, position)?),
                    "cell" => {
                        if let Some(sheet) = sheet.as_mut() {
                            sheet.cells.push(entry_from(&e, position)?);
                        }
                    }
                    _ => {}
                },
                Ok(Event::Text(e)) => {
                    if let Some((_, text)) = style_field.as_mut() {
                        text.push_str(&e.unescape().map_err(malformed)?);
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some((_, text)) = style_field.as_mut() {
                        text.push_str(&String::from_utf8_lossy(&e));
                    }
                }
                Ok(Event::End(e)) => {
                    depth = depth.saturating_sub(1);
                    if let Some((field, text)) = style_field.take() {
                        if let Some(entry) = style.as_mut() {
                            entry.push(field, text.trim());
                        }
                    } else {
                        match e.local_name().as_ref() {
                            b"styles" => in_styles = false,
                            b"columns" => in_columns = false,
                            b"style" => {
                                if let Some(entry) = style.take() {
                                    doc.styles.push(entry);
                                }
                            }
                            b"workbook" => {
                                if let Some(sheet) = sheet.take() {
                                    doc.sheets.push(sheet);
                                }
                            }
                            _ => {}
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(malformed(e)),
                _ => {}
            }
            buf.clear();
        }

        if depth != 0 {
            return Err(ParseError::new(
                xml_reader.buffer_position(),
                ParseErrorKind::MalformedXml("unexpected end of document".into()),
            ));
        }

        Ok(doc)
    }
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn entry_from(e: &BytesStart<'_>, position: usize) -> Result<Entry, ParseError> {
    let mut entry = Entry::new(position);
    for attr in e.attributes() {
        let attr = attr.map_err(|err| {
            ParseError::new(position, ParseErrorKind::MalformedXml(err.to_string()))
        })?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value().map_err(|err| {
            ParseError::new(position, ParseErrorKind::MalformedXml(err.to_string()))
        })?;
        entry.push(key, value.into_owned());
    }
    Ok(entry)
}

fn sheet_from(e: &BytesStart<'_>, position: usize) -> Result<RawSheet, ParseError> {
    let entry = entry_from(e, position)?;
    Ok(RawSheet {
        name: entry.get("name").map(str::to_string),
        position,
        cells: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reads_all_sections() {
        let doc = SourceDocument::parse_str(
            r##"<workbooks>
                <styles>
                    <style id="h"><font>Verdana</font><bold>true</bold><background>#FFEE00</background></style>
                    <style id="n" size="9" alignment="right"/>
                </styles>
                <columns>
                    <column name="A" width="-1"/>
                    <column name="E" width="12"/>
                </columns>
                <workbook name="Empleados">
                    <cell row="1" column="A" text="Nombre" style="h"/>
                    <cell row="2" column="A" value="Ana"/>
                </workbook>
                <workbook>
                    <cell row="1" column="B" text="x"></cell>
                </workbook>
            </workbooks>"##,
        )
        .unwrap();

        assert_eq!(doc.styles.len(), 2);
        assert_eq!(doc.styles[0].get("id"), Some("h"));
        assert_eq!(doc.styles[0].get("font"), Some("Verdana"));
        assert_eq!(doc.styles[0].get("background"), Some("#FFEE00"));
        assert_eq!(doc.styles[1].get("size"), Some("9"));
        assert_eq!(doc.columns.len(), 2);
        assert_eq!(doc.columns[1].get("width"), Some("12"));
        assert_eq!(doc.sheets.len(), 2);
        assert_eq!(doc.sheets[0].name.as_deref(), Some("Empleados"));
        assert_eq!(doc.sheets[0].cells.len(), 2);
        assert_eq!(doc.sheets[0].cells[1].get("value"), Some("Ana"));
        assert_eq!(doc.sheets[1].name, None);
        assert_eq!(doc.sheets[1].cells.len(), 1);
    }

    #[test]
    fn test_cells_outside_workbook_are_ignored() {
        let doc = SourceDocument::parse_str(
            r#"<root><cell row="1" column="A"/><workbook name="S"/></root>"#,
        )
        .unwrap();
        assert_eq!(doc.sheets.len(), 1);
        assert!(doc.sheets[0].cells.is_empty());
    }

    #[test]
    fn test_unclosed_document_is_malformed() {
        let err = SourceDocument::parse_str(r#"<workbooks><workbook name="S">"#).unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::MalformedXml(_)));
    }

    #[test]
    fn test_mismatched_tags_are_malformed() {
        let err = SourceDocument::parse_str(r#"<workbooks><workbook></cell></workbooks>"#)
            .unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::MalformedXml(_)));
    }

    #[test]
    fn test_data_and_log_sections_do_not_disturb_cells() {
        let doc = SourceDocument::parse_str(
            r#"<workbooks>
                <data><dataIn>FILE://in.xml</dataIn></data>
                <log><logLevel>DEBUG</logLevel></log>
                <workbook name="S"><cell row="3" column="C" text="7"/></workbook>
            </workbooks>"#,
        )
        .unwrap();
        assert_eq!(doc.sheets[0].cells[0].get("row"), Some("3"));
    }
}
