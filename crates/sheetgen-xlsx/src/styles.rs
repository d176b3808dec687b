//! XLSX styles (styles.xml) read/write helpers

use std::collections::HashMap;
use std::io::{BufReader, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use sheetgen_core::style::{
    Alignment, Color, FillStyle, FontStyle, HorizontalAlignment, NumberFormat, Style,
    VerticalAlignment,
};
use sheetgen_core::Workbook;

// === Writing ===

/// Workbook-wide cellXfs table built from every sheet's style pool
#[derive(Debug)]
pub(crate) struct XlsxStyleTable {
    /// Global, deduplicated styles. Index corresponds to the cellXfs index (xfId).
    styles: Vec<Style>,
    /// Per-worksheet mapping: local worksheet style index -> global xfId.
    sheet_maps: Vec<HashMap<u32, u32>>,
}

#[derive(Debug, Clone, Copy)]
struct ResolvedXfIds {
    font_id: u32,
    fill_id: u32,
    num_fmt_id: u32,
}

impl XlsxStyleTable {
    pub(crate) fn build(workbook: &Workbook) -> Self {
        let mut styles: Vec<Style> = Vec::new();
        let mut style_to_xf: HashMap<Style, u32> = HashMap::new();

        let default = Style::default();
        styles.push(default.clone());
        style_to_xf.insert(default, 0);

        let mut sheet_maps: Vec<HashMap<u32, u32>> = Vec::with_capacity(workbook.sheet_count());

        for sheet in workbook.worksheets() {
            let mut map: HashMap<u32, u32> = HashMap::new();
            map.insert(0, 0);

            for (_row, _col, cell) in sheet.iter_cells() {
                let local_idx = cell.style_index;
                if map.contains_key(&local_idx) {
                    continue;
                }

                let style = sheet
                    .style_by_index(local_idx)
                    .cloned()
                    .unwrap_or_default();

                let xf_id = *style_to_xf.entry(style.clone()).or_insert_with(|| {
                    styles.push(style);
                    (styles.len() - 1) as u32
                });
                map.insert(local_idx, xf_id);
            }

            sheet_maps.push(map);
        }

        Self { styles, sheet_maps }
    }

    pub(crate) fn xf_id_for(&self, sheet_index: usize, local_style_index: u32) -> u32 {
        self.sheet_maps
            .get(sheet_index)
            .and_then(|m| m.get(&local_style_index).copied())
            .unwrap_or(0)
    }

    pub(crate) fn to_styles_xml(&self) -> String {
        let mut font_ids: HashMap<FontStyle, u32> = HashMap::new();
        let mut fonts: Vec<FontStyle> = Vec::new();
        let default_font = FontStyle::default();
        fonts.push(default_font.clone());
        font_ids.insert(default_font, 0);

        // Excel requires the first two fills to be none and gray125
        let mut fill_ids: HashMap<FillStyle, u32> = HashMap::new();
        let mut fills: Vec<FillStyle> = vec![FillStyle::None];
        fill_ids.insert(FillStyle::None, 0);

        let mut numfmt_ids: HashMap<String, u32> = HashMap::new();
        let mut numfmts: Vec<(u32, String)> = Vec::new();
        let mut next_numfmt_id: u32 = 164;

        let mut resolved: Vec<ResolvedXfIds> = Vec::with_capacity(self.styles.len());

        for style in &self.styles {
            let font_id = match font_ids.get(&style.font) {
                Some(&id) => id,
                None => {
                    let id = fonts.len() as u32;
                    fonts.push(style.font.clone());
                    font_ids.insert(style.font.clone(), id);
                    id
                }
            };

            let fill_id = match style.fill {
                FillStyle::None => 0,
                fill => match fill_ids.get(&fill) {
                    Some(&id) => id,
                    None => {
                        // +1 for the gray125 placeholder written after "none"
                        let id = fills.len() as u32 + 1;
                        fills.push(fill);
                        fill_ids.insert(fill, id);
                        id
                    }
                },
            };

            let num_fmt_id = match &style.number_format {
                NumberFormat::General => 0,
                NumberFormat::BuiltIn(id) => *id,
                NumberFormat::Custom(code) => *numfmt_ids.entry(code.clone()).or_insert_with(|| {
                    let id = next_numfmt_id;
                    next_numfmt_id += 1;
                    numfmts.push((id, code.clone()));
                    id
                }),
            };

            resolved.push(ResolvedXfIds {
                font_id,
                fill_id,
                num_fmt_id,
            });
        }

        let mut xml = String::new();
        xml.push_str(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        if !numfmts.is_empty() {
            xml.push_str(&format!("\n  <numFmts count=\"{}\">", numfmts.len()));
            for (id, code) in &numfmts {
                xml.push_str(&format!(
                    "\n    <numFmt numFmtId=\"{}\" formatCode=\"{}\"/>",
                    id,
                    escape_xml_attr(code)
                ));
            }
            xml.push_str("\n  </numFmts>");
        }

        xml.push_str(&format!("\n  <fonts count=\"{}\">", fonts.len()));
        for font in &fonts {
            xml.push_str("\n    ");
            xml.push_str(&write_font(font));
        }
        xml.push_str("\n  </fonts>");

        xml.push_str(&format!("\n  <fills count=\"{}\">", fills.len() + 1));
        xml.push_str("\n    <fill><patternFill patternType=\"none\"/></fill>");
        xml.push_str("\n    <fill><patternFill patternType=\"gray125\"/></fill>");
        for fill in fills.iter().skip(1) {
            xml.push_str("\n    ");
            xml.push_str(&write_fill(fill));
        }
        xml.push_str("\n  </fills>");

        xml.push_str(
            r#"
  <borders count="1">
    <border><left/><right/><top/><bottom/><diagonal/></border>
  </borders>
  <cellStyleXfs count="1">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
  </cellStyleXfs>"#,
        );

        xml.push_str(&format!("\n  <cellXfs count=\"{}\">", self.styles.len()));
        for (style, ids) in self.styles.iter().zip(&resolved) {
            xml.push_str("\n    ");
            xml.push_str(&write_xf(style, *ids));
        }
        xml.push_str("\n  </cellXfs>");

        xml.push_str(
            r#"
  <cellStyles count="1">
    <cellStyle name="Normal" xfId="0" builtinId="0"/>
  </cellStyles>
  <dxfs count="0"/>
  <tableStyles count="0" defaultTableStyle="TableStyleMedium9" defaultPivotStyle="PivotStyleLight16"/>
</styleSheet>"#,
        );
        xml
    }
}

pub(crate) fn escape_xml_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn write_color(tag: &str, color: &Color) -> String {
    match color {
        Color::Auto => format!("<{tag} indexed=\"64\"/>"),
        Color::Rgb { r, g, b } => format!("<{tag} rgb=\"FF{:02X}{:02X}{:02X}\"/>", r, g, b),
        Color::Argb { a, r, g, b } => {
            format!("<{tag} rgb=\"{:02X}{:02X}{:02X}{:02X}\"/>", a, r, g, b)
        }
        Color::Indexed(i) => format!("<{tag} indexed=\"{}\"/>", i),
        Color::Theme { index, tint } => {
            if *tint == 0 {
                format!("<{tag} theme=\"{}\"/>", index)
            } else {
                format!(
                    "<{tag} theme=\"{}\" tint=\"{}\"/>",
                    index,
                    (*tint as f64) / 100.0
                )
            }
        }
    }
}

fn write_font(font: &FontStyle) -> String {
    let mut s = String::from("<font>");
    if font.bold {
        s.push_str("<b/>");
    }
    if font.italic {
        s.push_str("<i/>");
    }
    if font.strikethrough {
        s.push_str("<strike/>");
    }
    if font.underline {
        s.push_str("<u/>");
    }
    s.push_str(&format!("<sz val=\"{}\"/>", font.size));
    if !font.color.is_auto() {
        s.push_str(&write_color("color", &font.color));
    }
    s.push_str(&format!("<name val=\"{}\"/>", escape_xml_attr(&font.name)));
    s.push_str("</font>");
    s
}

fn write_fill(fill: &FillStyle) -> String {
    match fill {
        FillStyle::None => "<fill><patternFill patternType=\"none\"/></fill>".to_string(),
        FillStyle::Solid { color } => format!(
            "<fill><patternFill patternType=\"solid\">{}<bgColor indexed=\"64\"/></patternFill></fill>",
            write_color("fgColor", color)
        ),
    }
}

fn write_alignment(al: &Alignment) -> String {
    let default = Alignment::default();
    if al == &default {
        return String::new();
    }

    let mut s = String::from("<alignment");
    if al.horizontal != default.horizontal {
        s.push_str(&format!(" horizontal=\"{}\"", al.horizontal.as_str()));
    }
    if al.vertical != default.vertical {
        s.push_str(&format!(" vertical=\"{}\"", al.vertical.as_str()));
    }
    if al.wrap_text {
        s.push_str(" wrapText=\"1\"");
    }
    s.push_str("/>");
    s
}

fn write_xf(style: &Style, ids: ResolvedXfIds) -> String {
    let mut attrs = String::new();
    if ids.num_fmt_id != 0 {
        attrs.push_str(" applyNumberFormat=\"1\"");
    }
    if style.font != FontStyle::default() {
        attrs.push_str(" applyFont=\"1\"");
    }
    if !style.fill.is_none() {
        attrs.push_str(" applyFill=\"1\"");
    }
    if style.alignment != Alignment::default() {
        attrs.push_str(" applyAlignment=\"1\"");
    }

    let s = format!(
        "<xf numFmtId=\"{}\" fontId=\"{}\" fillId=\"{}\" borderId=\"0\" xfId=\"0\"{}",
        ids.num_fmt_id, ids.font_id, ids.fill_id, attrs
    );

    let alignment_xml = write_alignment(&style.alignment);
    if alignment_xml.is_empty() {
        format!("{}/>", s)
    } else {
        format!("{}>{}</xf>", s, alignment_xml)
    }
}

// === Reading ===

/// Partially read `<xf>` entry
#[derive(Debug, Default)]
struct PendingXf {
    num_fmt_id: u32,
    font_id: u32,
    fill_id: u32,
    alignment: Alignment,
}

/// Read styles.xml into the cellXfs list, index = xf id
pub(crate) fn read_styles_xml<R: Read>(reader: R) -> XlsxResult<Vec<Style>> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();

    let mut numfmts: HashMap<u32, String> = HashMap::new();
    let mut fonts: Vec<FontStyle> = Vec::new();
    let mut fills: Vec<FillStyle> = Vec::new();
    let mut cell_xfs: Vec<Style> = Vec::new();

    let mut current_font: Option<FontStyle> = None;
    let mut in_fill = false;
    let mut fill_pattern: Option<String> = None;
    let mut fill_fg = Color::Auto;

    let mut in_cell_xfs = false;
    let mut current_xf: Option<PendingXf> = None;

    loop {
        let event = xml_reader.read_event_into(&mut buf);
        // Empty elements are handled like a start immediately followed by an end
        let (e, is_empty) = match event {
            Ok(Event::Start(e)) => (e, false),
            Ok(Event::Empty(e)) => (e, true),
            Ok(Event::End(e)) => {
                match e.name().as_ref() {
                    b"font" => {
                        if let Some(f) = current_font.take() {
                            fonts.push(f);
                        }
                    }
                    b"fill" if in_fill => {
                        fills.push(finalize_fill(fill_pattern.take().as_deref(), fill_fg));
                        in_fill = false;
                    }
                    b"xf" => {
                        if let Some(xf) = current_xf.take() {
                            cell_xfs.push(resolve_style(xf, &numfmts, &fonts, &fills));
                        }
                    }
                    b"cellXfs" => in_cell_xfs = false,
                    _ => {}
                }
                buf.clear();
                continue;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {
                buf.clear();
                continue;
            }
        };

        match e.name().as_ref() {
            b"cellXfs" => in_cell_xfs = !is_empty,
            b"numFmt" => {
                let id = attr_value(&e, b"numFmtId").and_then(|s| s.parse().ok());
                if let (Some(id), Some(code)) = (id, attr_value(&e, b"formatCode")) {
                    numfmts.insert(id, code);
                }
            }
            b"font" if !in_cell_xfs => {
                if is_empty {
                    fonts.push(FontStyle::default());
                } else {
                    current_font = Some(FontStyle::default());
                }
            }
            b"b" | b"i" | b"strike" | b"u" => {
                if let Some(font) = current_font.as_mut() {
                    let on = attr_value(&e, b"val").map_or(true, |v| v != "0" && v != "none");
                    match e.name().as_ref() {
                        b"b" => font.bold = on,
                        b"i" => font.italic = on,
                        b"strike" => font.strikethrough = on,
                        _ => font.underline = on,
                    }
                }
            }
            b"sz" => {
                if let Some(font) = current_font.as_mut() {
                    if let Some(size) = attr_value(&e, b"val").and_then(|v| v.parse().ok()) {
                        font.size = size;
                    }
                }
            }
            b"name" => {
                if let Some(font) = current_font.as_mut() {
                    if let Some(name) = attr_value(&e, b"val") {
                        font.name = name;
                    }
                }
            }
            b"color" => {
                if let Some(font) = current_font.as_mut() {
                    font.color = parse_color_attrs(&e);
                }
            }
            b"fill" => {
                if is_empty {
                    fills.push(FillStyle::None);
                } else {
                    in_fill = true;
                    fill_pattern = None;
                    fill_fg = Color::Auto;
                }
            }
            b"patternFill" if in_fill => {
                fill_pattern = attr_value(&e, b"patternType");
            }
            b"fgColor" if in_fill => {
                fill_fg = parse_color_attrs(&e);
            }
            b"xf" if in_cell_xfs => {
                let id_attr = |key: &[u8]| {
                    attr_value(&e, key)
                        .and_then(|s| s.parse::<u32>().ok())
                        .unwrap_or(0)
                };
                let xf = PendingXf {
                    num_fmt_id: id_attr(b"numFmtId"),
                    font_id: id_attr(b"fontId"),
                    fill_id: id_attr(b"fillId"),
                    alignment: Alignment::default(),
                };
                if is_empty {
                    cell_xfs.push(resolve_style(xf, &numfmts, &fonts, &fills));
                } else {
                    current_xf = Some(xf);
                }
            }
            b"alignment" => {
                if let Some(xf) = current_xf.as_mut() {
                    if let Some(h) =
                        attr_value(&e, b"horizontal").and_then(|v| HorizontalAlignment::from_xlsx(&v))
                    {
                        xf.alignment.horizontal = h;
                    }
                    if let Some(v) =
                        attr_value(&e, b"vertical").and_then(|v| VerticalAlignment::from_xlsx(&v))
                    {
                        xf.alignment.vertical = v;
                    }
                    xf.alignment.wrap_text =
                        matches!(attr_value(&e, b"wrapText").as_deref(), Some("1" | "true"));
                }
            }
            _ => {}
        }
        buf.clear();
    }

    if cell_xfs.is_empty() {
        cell_xfs.push(Style::default());
    }
    Ok(cell_xfs)
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.to_string()))
}

fn resolve_style(
    xf: PendingXf,
    numfmts: &HashMap<u32, String>,
    fonts: &[FontStyle],
    fills: &[FillStyle],
) -> Style {
    Style {
        font: fonts.get(xf.font_id as usize).cloned().unwrap_or_default(),
        fill: fills.get(xf.fill_id as usize).copied().unwrap_or_default(),
        alignment: xf.alignment,
        number_format: if xf.num_fmt_id == 0 {
            NumberFormat::General
        } else if let Some(code) = numfmts.get(&xf.num_fmt_id) {
            NumberFormat::Custom(code.clone())
        } else {
            NumberFormat::BuiltIn(xf.num_fmt_id)
        },
    }
}

fn finalize_fill(pattern: Option<&str>, fg: Color) -> FillStyle {
    match pattern {
        Some("solid") => FillStyle::Solid { color: fg },
        // Other patterns are outside the supported formatting subset
        _ => FillStyle::None,
    }
}

fn parse_color_attrs(e: &BytesStart<'_>) -> Color {
    if let Some(rgb) = attr_value(e, b"rgb") {
        match Color::from_hex(&rgb) {
            Some(Color::Argb { a: 0xFF, r, g, b }) => return Color::Rgb { r, g, b },
            Some(color) => return color,
            None => {}
        }
    }
    if let Some(index) = attr_value(e, b"theme").and_then(|s| s.parse::<u8>().ok()) {
        let tint = attr_value(e, b"tint")
            .and_then(|s| s.parse::<f64>().ok())
            .map(|t| (t * 100.0).round().clamp(-100.0, 100.0) as i8)
            .unwrap_or(0);
        return Color::Theme { index, tint };
    }
    match attr_value(e, b"indexed").and_then(|s| s.parse::<u8>().ok()) {
        Some(64) | None => Color::Auto,
        Some(i) => Color::Indexed(i),
    }
}
