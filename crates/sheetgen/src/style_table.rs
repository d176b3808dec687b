//! Style table builder

use std::collections::HashMap;

use sheetgen_core::Color;

use crate::error::{ParseError, ParseErrorKind, Warning, Warnings};
use crate::source::Entry;

/// Horizontal alignment a style may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleAlignment {
    Left,
    Center,
    Right,
    Justify,
}

impl StyleAlignment {
    /// Parse a declared alignment (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Some(StyleAlignment::Left),
            "center" => Some(StyleAlignment::Center),
            "right" => Some(StyleAlignment::Right),
            "justify" => Some(StyleAlignment::Justify),
            _ => None,
        }
    }
}

/// A parsed style entry. Undeclared fields stay `None`; defaults are
/// substituted only when the style is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleDefinition {
    pub id: String,
    pub font_name: Option<String>,
    pub font_size: Option<u32>,
    pub bold: Option<bool>,
    /// Hex digits without a leading `#`
    pub font_color: Option<String>,
    /// Hex digits without a leading `#`; absent means no fill
    pub background: Option<String>,
    pub alignment: Option<StyleAlignment>,
}

impl StyleDefinition {
    /// Build a definition from a raw `<style>` entry.
    ///
    /// Returns `Ok(None)` when the entry has no id.
    pub fn from_entry(entry: &Entry) -> Result<Option<Self>, ParseError> {
        let Some(id) = entry.get("id").map(str::trim).filter(|id| !id.is_empty()) else {
            return Ok(None);
        };
        let fail = |kind| ParseError::new(entry.position, kind);

        let font_size = entry
            .get("size")
            .map(|raw| match raw.trim().parse::<u32>() {
                Ok(size) if size > 0 => Ok(size),
                _ => Err(fail(ParseErrorKind::InvalidSize(raw.to_string()))),
            })
            .transpose()?;

        let font_color = entry
            .get("color")
            .map(|raw| {
                normalize_color(raw)
                    .ok_or_else(|| fail(ParseErrorKind::InvalidColor(raw.to_string())))
            })
            .transpose()?;

        let background = entry
            .get("background")
            .map(|raw| {
                normalize_color(raw)
                    .ok_or_else(|| fail(ParseErrorKind::InvalidColor(raw.to_string())))
            })
            .transpose()?;

        let alignment = entry
            .get("alignment")
            .map(|raw| {
                StyleAlignment::parse(raw)
                    .ok_or_else(|| fail(ParseErrorKind::InvalidAlignment(raw.to_string())))
            })
            .transpose()?;

        Ok(Some(StyleDefinition {
            id: id.to_string(),
            font_name: entry
                .get("font")
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
            font_size,
            bold: entry
                .get("bold")
                .map(|raw| raw.trim().eq_ignore_ascii_case("true")),
            font_color,
            background,
            alignment,
        }))
    }
}

/// Strip a leading `#` and check the remaining hex digits
fn normalize_color(raw: &str) -> Option<String> {
    let hex = raw.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    Color::parse_hex(hex).ok()?;
    Some(hex.to_ascii_uppercase())
}

/// Styles keyed by identifier
#[derive(Debug, Clone, Default)]
pub struct StyleTable {
    styles: HashMap<String, StyleDefinition>,
}

impl StyleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table from raw `<style>` entries. Entries without an id are
    /// skipped with a warning; a later entry with the same id replaces an
    /// earlier one.
    pub fn build(entries: &[Entry], warnings: &mut Warnings) -> Result<Self, ParseError> {
        let mut table = Self::new();
        for entry in entries {
            match StyleDefinition::from_entry(entry)? {
                Some(style) => table.insert(style),
                None => warnings.push(Warning::MissingStyleId {
                    position: entry.position,
                }),
            }
        }
        tracing::debug!(styles = table.len(), "style table built");
        Ok(table)
    }

    pub fn insert(&mut self, style: StyleDefinition) {
        self.styles.insert(style.id.clone(), style);
    }

    pub fn get(&self, id: &str) -> Option<&StyleDefinition> {
        self.styles.get(id)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_child_elements_and_attributes() {
        let entry = Entry::new(0)
            .with_field("id", "head")
            .with_field("size", "14")
            .with_field("font", "Verdana")
            .with_field("bold", "TRUE")
            .with_field("color", "#1f4e78")
            .with_field("alignment", "Center");
        let style = StyleDefinition::from_entry(&entry).unwrap().unwrap();

        assert_eq!(
            style,
            StyleDefinition {
                id: "head".into(),
                font_name: Some("Verdana".into()),
                font_size: Some(14),
                bold: Some(true),
                font_color: Some("1F4E78".into()),
                background: None,
                alignment: Some(StyleAlignment::Center),
            }
        );
    }

    #[test]
    fn test_undeclared_fields_stay_unset() {
        let style = StyleDefinition::from_entry(&Entry::new(0).with_field("id", "plain"))
            .unwrap()
            .unwrap();
        assert_eq!(style.font_name, None);
        assert_eq!(style.font_size, None);
        assert_eq!(style.bold, None);
        assert_eq!(style.background, None);
    }

    #[test]
    fn test_invalid_fields_are_parse_errors() {
        let bad_size = Entry::new(5).with_field("id", "a").with_field("size", "0");
        assert_eq!(
            StyleDefinition::from_entry(&bad_size).unwrap_err(),
            ParseError::new(5, ParseErrorKind::InvalidSize("0".into()))
        );

        let bad_color = Entry::new(0).with_field("id", "a").with_field("background", "red");
        assert!(matches!(
            StyleDefinition::from_entry(&bad_color).unwrap_err().kind,
            ParseErrorKind::InvalidColor(_)
        ));

        let bad_align = Entry::new(0).with_field("id", "a").with_field("alignment", "middle");
        assert!(matches!(
            StyleDefinition::from_entry(&bad_align).unwrap_err().kind,
            ParseErrorKind::InvalidAlignment(_)
        ));
    }

    #[test]
    fn test_missing_id_is_skipped_with_warning() {
        let entries = vec![
            Entry::new(7).with_field("bold", "true"),
            Entry::new(20).with_field("id", "ok"),
        ];
        let mut warnings = Warnings::new();
        let table = StyleTable::build(&entries, &mut warnings).unwrap();

        assert_eq!(table.len(), 1);
        assert!(table.get("ok").is_some());
        assert_eq!(
            warnings.into_vec(),
            vec![Warning::MissingStyleId { position: 7 }]
        );
    }

    #[test]
    fn test_duplicate_id_replaces_earlier() {
        let entries = vec![
            Entry::new(0).with_field("id", "x").with_field("size", "8"),
            Entry::new(1).with_field("id", "x").with_field("size", "20"),
        ];
        let table = StyleTable::build(&entries, &mut Warnings::new()).unwrap();
        assert_eq!(table.get("x").and_then(|s| s.font_size), Some(20));
    }
}
