use crate::package::{DOCUMENT_RELATIONSHIPS_NS, Package, relationships};
use folio_export_core::{ExportError, ExportFormat, Grid, ReportExporter, XlsxConfig, XmlBuilder, format_points};
use folio_types::{PopulatedReport, PrintElement, TextAlign, TextStyle};
use std::io::Write;

const SPREADSHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const WORKSHEET_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
const STYLES_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const WORKBOOK_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
const WORKSHEET_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
const STYLES_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml";

// Points per character of the default column width unit.
const POINTS_PER_CHAR: f32 = 5.25;
const MAX_SHEET_NAME: usize = 31;

/// Exports reports as an Excel workbook. Each page becomes a block of grid
/// rows; see [`XlsxConfig`] for the knobs.
#[derive(Debug, Clone, Default)]
pub struct XlsxExporter {
    config: XlsxConfig,
}

struct Sheet {
    name: String,
    elements: Vec<PrintElement>,
}

#[derive(PartialEq)]
struct CellFont {
    name: String,
    size: String,
    bold: bool,
    italic: bool,
}

/// Fonts and cell formats in first-use order. Format 0 is the default cell
/// format, so every used style gets an index of at least 1.
#[derive(Default)]
struct CellStyles {
    fonts: Vec<CellFont>,
    formats: Vec<(usize, TextAlign)>,
}

impl CellStyles {
    fn index(&mut self, style: &TextStyle) -> usize {
        let font = CellFont {
            name: style.font.clone(),
            size: format_points(style.size),
            bold: style.bold,
            italic: style.italic,
        };
        let font_id = match self.fonts.iter().position(|f| *f == font) {
            Some(id) => id + 1,
            None => {
                self.fonts.push(font);
                self.fonts.len()
            }
        };
        let format = (font_id, style.align);
        match self.formats.iter().position(|f| *f == format) {
            Some(i) => i + 1,
            None => {
                self.formats.push(format);
                self.formats.len()
            }
        }
    }
}

impl XlsxExporter {
    pub fn new(config: XlsxConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &XlsxConfig {
        &self.config
    }

    fn sheets(&self, report: &PopulatedReport) -> Vec<Sheet> {
        if self.config.one_page_per_sheet {
            let prefix = self.config.sheet_name.as_deref().unwrap_or("Page");
            let mut sheets: Vec<Sheet> = report
                .pages()
                .iter()
                .enumerate()
                .map(|(i, page)| Sheet {
                    name: page_sheet_name(prefix, i + 1),
                    elements: page.elements().to_vec(),
                })
                .collect();
            if sheets.is_empty() {
                sheets.push(Sheet {
                    name: sheet_name(prefix, 1),
                    elements: Vec::new(),
                });
            }
            return sheets;
        }

        // Pages stacked top to bottom on a single sheet.
        let page_height = report.page_size().height;
        let elements = report
            .pages()
            .iter()
            .enumerate()
            .flat_map(|(i, page)| {
                page.elements().iter().map(move |e| PrintElement {
                    frame: e.frame.offset_y(i as f32 * page_height),
                    ..e.clone()
                })
            })
            .collect();
        let name = self.config.sheet_name.as_deref().unwrap_or(report.name());
        vec![Sheet {
            name: sheet_name(name, 1),
            elements,
        }]
    }

    fn worksheet(&self, sheet: &Sheet, styles: &mut CellStyles) -> Result<XmlBuilder, quick_xml::Error> {
        let grid = Grid::build(&sheet.elements, self.config.collapse_row_span);
        let mut xml = XmlBuilder::new();
        xml.declaration()?;
        xml.open(
            "worksheet",
            &[("xmlns", SPREADSHEET_NS), ("xmlns:r", DOCUMENT_RELATIONSHIPS_NS)],
        )?;

        let widths = grid.column_widths();
        if !widths.is_empty() {
            xml.open("cols", &[])?;
            for (i, width) in widths.iter().enumerate() {
                let index = (i + 1).to_string();
                let chars = format_points(width / POINTS_PER_CHAR);
                xml.empty(
                    "col",
                    &[("min", index.as_str()), ("max", index.as_str()), ("width", chars.as_str()), ("customWidth", "1")],
                )?;
            }
            xml.close("cols")?;
        }

        xml.open("sheetData", &[])?;
        for (row, height) in grid.row_heights().iter().enumerate() {
            let number = (row + 1).to_string();
            let height = format_points(*height);
            xml.open("row", &[("r", number.as_str()), ("ht", height.as_str()), ("customHeight", "1")])?;
            for cell in grid.cells_in_row(row) {
                let reference = cell_reference(cell.row, cell.col);
                let style = styles.index(&cell.element.style).to_string();
                self.write_cell(&mut xml, &reference, &style, &cell.element.text)?;
            }
            xml.close("row")?;
        }
        xml.close("sheetData")?;

        let merges: Vec<String> = grid
            .cells()
            .iter()
            .filter(|c| c.row_span > 1 || c.col_span > 1)
            .map(|c| {
                format!(
                    "{}:{}",
                    cell_reference(c.row, c.col),
                    cell_reference(c.row + c.row_span - 1, c.col + c.col_span - 1)
                )
            })
            .collect();
        if !merges.is_empty() {
            let count = merges.len().to_string();
            xml.open("mergeCells", &[("count", count.as_str())])?;
            for merge in &merges {
                xml.empty("mergeCell", &[("ref", merge.as_str())])?;
            }
            xml.close("mergeCells")?;
        }
        xml.close("worksheet")?;
        Ok(xml)
    }

    fn write_cell(
        &self,
        xml: &mut XmlBuilder,
        reference: &str,
        style: &str,
        text: &str,
    ) -> Result<(), quick_xml::Error> {
        if self.config.detect_cell_type
            && let Some(number) = numeric_value(text)
        {
            xml.open("c", &[("r", reference), ("s", style)])?;
            xml.text_element("v", &[], &number)?;
            return xml.close("c");
        }
        xml.open("c", &[("r", reference), ("s", style), ("t", "inlineStr")])?;
        xml.open("is", &[])?;
        xml.text_element("t", &[("xml:space", "preserve")], text)?;
        xml.close("is")?;
        xml.close("c")
    }

    fn write_package(&self, report: &PopulatedReport) -> Result<Vec<u8>, ExportError> {
        let format = ExportFormat::Xlsx;
        let sheets = self.sheets(report);
        let mut package = Package::new(format);

        let mut overrides = vec![
            ("/xl/workbook.xml".to_string(), WORKBOOK_TYPE),
            ("/xl/styles.xml".to_string(), STYLES_TYPE),
        ];
        overrides.extend((1..=sheets.len()).map(|n| (format!("/xl/worksheets/sheet{}.xml", n), WORKSHEET_TYPE)));
        package.add_content_types(&overrides)?;
        package.add_root_relationship("xl/workbook.xml")?;

        let workbook = workbook(&sheets).map_err(ExportError::xml(format))?;
        package.add_xml("xl/workbook.xml", workbook)?;

        let ids: Vec<String> = (1..=sheets.len() + 1).map(|n| format!("rId{}", n)).collect();
        let targets: Vec<String> = (1..=sheets.len()).map(|n| format!("worksheets/sheet{}.xml", n)).collect();
        let mut entries: Vec<(&str, &str, &str)> = targets
            .iter()
            .zip(&ids)
            .map(|(target, id)| (id.as_str(), WORKSHEET_REL, target.as_str()))
            .collect();
        entries.push((ids[sheets.len()].as_str(), STYLES_REL, "styles.xml"));
        package.add_xml("xl/_rels/workbook.xml.rels", relationships(format, &entries)?)?;

        let mut styles = CellStyles::default();
        let worksheets = sheets
            .iter()
            .map(|sheet| self.worksheet(sheet, &mut styles))
            .collect::<Result<Vec<_>, _>>()
            .map_err(ExportError::xml(format))?;
        package.add_xml("xl/styles.xml", stylesheet(&styles).map_err(ExportError::xml(format))?)?;
        for (i, xml) in worksheets.into_iter().enumerate() {
            package.add_xml(&format!("xl/worksheets/sheet{}.xml", i + 1), xml)?;
        }
        package.finish()
    }
}

fn workbook(sheets: &[Sheet]) -> Result<XmlBuilder, quick_xml::Error> {
    let mut xml = XmlBuilder::new();
    xml.declaration()?;
    xml.open(
        "workbook",
        &[("xmlns", SPREADSHEET_NS), ("xmlns:r", DOCUMENT_RELATIONSHIPS_NS)],
    )?;
    xml.open("sheets", &[])?;
    for (i, sheet) in sheets.iter().enumerate() {
        let id = (i + 1).to_string();
        let rel = format!("rId{}", i + 1);
        xml.empty("sheet", &[("name", sheet.name.as_str()), ("sheetId", id.as_str()), ("r:id", rel.as_str())])?;
    }
    xml.close("sheets")?;
    xml.close("workbook")?;
    Ok(xml)
}

fn write_font(xml: &mut XmlBuilder, font: &CellFont) -> Result<(), quick_xml::Error> {
    xml.open("font", &[])?;
    if font.bold {
        xml.empty("b", &[])?;
    }
    if font.italic {
        xml.empty("i", &[])?;
    }
    xml.empty("sz", &[("val", font.size.as_str())])?;
    xml.empty("name", &[("val", font.name.as_str())])?;
    xml.close("font")
}

fn stylesheet(styles: &CellStyles) -> Result<XmlBuilder, quick_xml::Error> {
    let mut xml = XmlBuilder::new();
    xml.declaration()?;
    xml.open("styleSheet", &[("xmlns", SPREADSHEET_NS)])?;

    let default_font = CellFont {
        name: TextStyle::default().font,
        size: format_points(TextStyle::default().size),
        bold: false,
        italic: false,
    };
    let font_count = (styles.fonts.len() + 1).to_string();
    xml.open("fonts", &[("count", font_count.as_str())])?;
    write_font(&mut xml, &default_font)?;
    for font in &styles.fonts {
        write_font(&mut xml, font)?;
    }
    xml.close("fonts")?;

    xml.open("fills", &[("count", "2")])?;
    for pattern in ["none", "gray125"] {
        xml.open("fill", &[])?;
        xml.empty("patternFill", &[("patternType", pattern)])?;
        xml.close("fill")?;
    }
    xml.close("fills")?;

    xml.open("borders", &[("count", "1")])?;
    xml.open("border", &[])?;
    for side in ["left", "right", "top", "bottom", "diagonal"] {
        xml.empty(side, &[])?;
    }
    xml.close("border")?;
    xml.close("borders")?;

    xml.open("cellStyleXfs", &[("count", "1")])?;
    xml.empty("xf", &[("numFmtId", "0"), ("fontId", "0"), ("fillId", "0"), ("borderId", "0")])?;
    xml.close("cellStyleXfs")?;

    let format_count = (styles.formats.len() + 1).to_string();
    xml.open("cellXfs", &[("count", format_count.as_str())])?;
    xml.empty(
        "xf",
        &[("numFmtId", "0"), ("fontId", "0"), ("fillId", "0"), ("borderId", "0"), ("xfId", "0")],
    )?;
    for (font_id, align) in &styles.formats {
        let font_id = font_id.to_string();
        xml.open(
            "xf",
            &[
                ("numFmtId", "0"),
                ("fontId", font_id.as_str()),
                ("fillId", "0"),
                ("borderId", "0"),
                ("xfId", "0"),
                ("applyFont", "1"),
                ("applyAlignment", "1"),
            ],
        )?;
        xml.empty("alignment", &[("horizontal", align.as_str()), ("vertical", "top")])?;
        xml.close("xf")?;
    }
    xml.close("cellXfs")?;
    xml.close("styleSheet")?;
    Ok(xml)
}

/// `A1`-style reference for a zero-based row and column.
pub(crate) fn cell_reference(row: usize, col: usize) -> String {
    let mut letters = Vec::new();
    let mut n = col + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    format!("{}{}", String::from_utf8_lossy(&letters), row + 1)
}

/// The canonical number text for a numeric-looking cell, if any.
fn numeric_value(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.starts_with('+') || trimmed.ends_with('.') {
        return None;
    }
    if let Ok(int) = trimmed.parse::<i64>() {
        return Some(int.to_string());
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| f.to_string())
}

/// Excel sheet names: at most 31 characters, none of `[]:*?/\`.
fn sheet_name(name: &str, index: usize) -> String {
    let cleaned = clean_sheet_name(name, MAX_SHEET_NAME);
    if cleaned.is_empty() {
        format!("Sheet{}", index)
    } else {
        cleaned
    }
}

/// `"{prefix} {page}"`, with the prefix shortened so the page number
/// always survives the length limit.
fn page_sheet_name(prefix: &str, page: usize) -> String {
    let suffix = format!(" {}", page);
    let prefix = clean_sheet_name(prefix, MAX_SHEET_NAME - suffix.len());
    if prefix.is_empty() {
        format!("Sheet{}", page)
    } else {
        format!("{}{}", prefix, suffix)
    }
}

fn clean_sheet_name(name: &str, max: usize) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(max)
        .collect();
    cleaned.trim().trim_matches('\'').to_string()
}

impl ReportExporter for XlsxExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Xlsx
    }

    fn export_to(&self, report: &PopulatedReport, writer: &mut dyn Write) -> Result<(), ExportError> {
        let bytes = self.write_package(report)?;
        log::debug!("Exported '{}' as XLSX ({} bytes)", report.name(), bytes.len());
        writer.write_all(&bytes).map_err(ExportError::io(ExportFormat::Xlsx))
    }
}
