//! Style applier
//!
//! Resolves a [`StyleDefinition`] to concrete formatting, substituting the
//! defaults for undeclared fields, and renders it either onto a model
//! [`Style`] (direct writer) or a `rust_xlsxwriter` [`Format`] (batched
//! writer).

use rust_xlsxwriter::{Format, FormatAlign};
use sheetgen_core::{
    Alignment, Color, FillStyle, FontStyle, HorizontalAlignment, NumberFormat, Style,
};

use crate::style_table::{StyleAlignment, StyleDefinition};

pub const DEFAULT_FONT_NAME: &str = "Arial";
pub const DEFAULT_FONT_SIZE: u32 = 10;
pub const DEFAULT_FONT_COLOR: &str = "000000";

/// Formatting of a style with defaults substituted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStyle {
    pub font_name: String,
    pub font_size: u32,
    pub bold: bool,
    pub font_color: String,
    /// Fill colour, only when the style declared a background
    pub fill: Option<String>,
    /// Only when the style declared an alignment
    pub alignment: Option<StyleAlignment>,
}

impl ResolvedStyle {
    pub fn resolve(def: &StyleDefinition) -> Self {
        Self {
            font_name: def
                .font_name
                .clone()
                .unwrap_or_else(|| DEFAULT_FONT_NAME.to_string()),
            font_size: def.font_size.unwrap_or(DEFAULT_FONT_SIZE),
            bold: def.bold.unwrap_or(false),
            font_color: def
                .font_color
                .clone()
                .unwrap_or_else(|| DEFAULT_FONT_COLOR.to_string()),
            fill: def.background.clone(),
            alignment: def.alignment,
        }
    }

    /// Overlay onto an existing cell style.
    ///
    /// The font is replaced; fill and alignment are replaced only when
    /// declared, so a cell restyled in an existing document keeps them
    /// otherwise.
    pub fn apply_to(&self, base: &Style) -> Style {
        let mut style = base.clone();
        style.font = FontStyle {
            name: self.font_name.clone(),
            size: f64::from(self.font_size),
            bold: self.bold,
            color: model_color(&self.font_color),
            ..FontStyle::default()
        };
        if let Some(fill) = &self.fill {
            style.fill = FillStyle::solid(model_color(fill));
        }
        if let Some(alignment) = self.alignment {
            style.alignment = Alignment::new().with_horizontal(horizontal(alignment));
        }
        style
    }

    /// Streaming-writer format, with an optional number format
    pub fn to_format(&self, number_format: Option<&str>) -> Format {
        let mut format = Format::new()
            .set_font_name(self.font_name.as_str())
            .set_font_size(f64::from(self.font_size))
            .set_font_color(writer_color(&self.font_color));
        if self.bold {
            format = format.set_bold();
        }
        if let Some(fill) = &self.fill {
            format = format.set_background_color(writer_color(fill));
        }
        if let Some(alignment) = self.alignment {
            format = format.set_align(format_align(alignment));
        }
        if let Some(code) = number_format {
            format = format.set_num_format(code);
        }
        format
    }
}

/// Attach a declared number format to a model style
pub fn apply_number_format(base: &Style, code: &str) -> Style {
    let mut style = base.clone();
    style.number_format = NumberFormat::from_code(code);
    style
}

fn horizontal(alignment: StyleAlignment) -> HorizontalAlignment {
    match alignment {
        StyleAlignment::Left => HorizontalAlignment::Left,
        StyleAlignment::Center => HorizontalAlignment::Center,
        StyleAlignment::Right => HorizontalAlignment::Right,
        StyleAlignment::Justify => HorizontalAlignment::Justify,
    }
}

fn format_align(alignment: StyleAlignment) -> FormatAlign {
    match alignment {
        StyleAlignment::Left => FormatAlign::Left,
        StyleAlignment::Center => FormatAlign::Center,
        StyleAlignment::Right => FormatAlign::Right,
        StyleAlignment::Justify => FormatAlign::Justify,
    }
}

// Hex strings are validated when the style table is built.
fn model_color(hex: &str) -> Color {
    match Color::from_hex(hex) {
        Some(Color::Argb { r, g, b, .. }) => Color::rgb(r, g, b),
        Some(color) => color,
        None => Color::BLACK,
    }
}

fn writer_color(hex: &str) -> rust_xlsxwriter::Color {
    let value = u32::from_str_radix(hex, 16).unwrap_or(0);
    rust_xlsxwriter::Color::RGB(value & 0x00FF_FFFF)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn definition(id: &str) -> StyleDefinition {
        StyleDefinition {
            id: id.into(),
            ..StyleDefinition::default()
        }
    }

    #[test]
    fn test_defaults_for_undeclared_fields() {
        let resolved = ResolvedStyle::resolve(&definition("x"));
        assert_eq!(
            resolved,
            ResolvedStyle {
                font_name: "Arial".into(),
                font_size: 10,
                bold: false,
                font_color: "000000".into(),
                fill: None,
                alignment: None,
            }
        );

        let style = resolved.apply_to(&Style::default());
        assert_eq!(style.font.name, "Arial");
        assert_eq!(style.font.size, 10.0);
        assert_eq!(style.font.color, Color::rgb(0, 0, 0));
        assert!(style.fill.is_none());
        assert_eq!(style.alignment, Alignment::default());
    }

    #[test]
    fn test_declared_fields_are_honoured() {
        let def = StyleDefinition {
            font_name: Some("Verdana".into()),
            font_size: Some(14),
            bold: Some(true),
            font_color: Some("FF0000".into()),
            background: Some("FFFF00".into()),
            alignment: Some(StyleAlignment::Justify),
            ..definition("h")
        };
        let style = ResolvedStyle::resolve(&def).apply_to(&Style::default());

        assert_eq!(style.font.name, "Verdana");
        assert_eq!(style.font.size, 14.0);
        assert!(style.font.bold);
        assert_eq!(style.font.color, Color::rgb(0xFF, 0, 0));
        assert_eq!(style.fill, FillStyle::solid(Color::rgb(0xFF, 0xFF, 0)));
        assert_eq!(style.alignment.horizontal, HorizontalAlignment::Justify);
    }

    #[test]
    fn test_existing_fill_and_alignment_survive_restyle() {
        let base = Style::new()
            .fill_color(Color::rgb(1, 2, 3))
            .horizontal_alignment(HorizontalAlignment::Center)
            .number_format("0.00");
        let style = ResolvedStyle::resolve(&definition("x")).apply_to(&base);

        assert_eq!(style.fill, FillStyle::solid(Color::rgb(1, 2, 3)));
        assert_eq!(style.alignment.horizontal, HorizontalAlignment::Center);
        assert_eq!(style.number_format, NumberFormat::Custom("0.00".into()));
        assert_eq!(style.font.name, "Arial");
    }

    #[test]
    fn test_argb_colours_drop_alpha() {
        assert_eq!(model_color("80112233"), Color::rgb(0x11, 0x22, 0x33));
        assert_eq!(writer_color("80112233"), rust_xlsxwriter::Color::RGB(0x112233));
        assert_eq!(writer_color("1F4E78"), rust_xlsxwriter::Color::RGB(0x1F4E78));
    }

    #[test]
    fn test_number_format_overlay() {
        let style = apply_number_format(&Style::new().bold(true), "#,##0.00");
        assert!(style.font.bold);
        assert_eq!(style.number_format.code(), Some("#,##0.00"));
    }
}
