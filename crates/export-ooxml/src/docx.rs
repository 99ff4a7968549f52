use crate::package::Package;
use folio_export_core::{DocxConfig, ExportError, ExportFormat, Grid, GridCell, ReportExporter, XmlBuilder};
use folio_types::{PopulatedReport, PrintElement, TextAlign};
use std::io::Write;

const WORDPROCESSING_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const DOCUMENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";

fn twips(points: f32) -> String {
    ((points * 20.0).round() as i64).to_string()
}

fn half_points(points: f32) -> String {
    ((points * 2.0).round() as i64).to_string()
}

/// Exports reports as a Word document: one fixed-layout table per page,
/// separated by page breaks.
#[derive(Debug, Clone, Default)]
pub struct DocxExporter {
    config: DocxConfig,
}

impl DocxExporter {
    pub fn new(config: DocxConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DocxConfig {
        &self.config
    }

    fn document(&self, report: &PopulatedReport) -> Result<XmlBuilder, quick_xml::Error> {
        let mut xml = XmlBuilder::new();
        xml.declaration()?;
        xml.open("w:document", &[("xmlns:w", WORDPROCESSING_NS)])?;
        xml.open("w:body", &[])?;

        for (index, page) in report.pages().iter().enumerate() {
            if index > 0 {
                xml.open("w:p", &[])?;
                xml.open("w:r", &[])?;
                xml.empty("w:br", &[("w:type", "page")])?;
                xml.close("w:r")?;
                xml.close("w:p")?;
            }
            let grid = Grid::build(page.elements(), false);
            if grid.column_count() > 0 {
                self.table(&mut xml, &grid)?;
            }
            // Word needs a paragraph after a table.
            xml.empty("w:p", &[])?;
        }

        let size = report.page_size();
        let (left, top) = origin(report);
        let (width, height) = (twips(size.width), twips(size.height));
        let (left, top) = (twips(left), twips(top));
        xml.open("w:sectPr", &[])?;
        xml.empty("w:pgSz", &[("w:w", width.as_str()), ("w:h", height.as_str())])?;
        xml.empty(
            "w:pgMar",
            &[
                ("w:top", top.as_str()),
                ("w:right", "0"),
                ("w:bottom", "0"),
                ("w:left", left.as_str()),
                ("w:header", "0"),
                ("w:footer", "0"),
                ("w:gutter", "0"),
            ],
        )?;
        xml.close("w:sectPr")?;

        xml.close("w:body")?;
        xml.close("w:document")?;
        Ok(xml)
    }

    fn table(&self, xml: &mut XmlBuilder, grid: &Grid<'_>) -> Result<(), quick_xml::Error> {
        let widths = grid.column_widths();
        let total: f32 = widths.iter().sum();
        let total = twips(total);

        xml.open("w:tbl", &[])?;
        xml.open("w:tblPr", &[])?;
        xml.empty("w:tblW", &[("w:w", total.as_str()), ("w:type", "dxa")])?;
        xml.empty("w:tblLayout", &[("w:type", "fixed")])?;
        xml.close("w:tblPr")?;
        xml.open("w:tblGrid", &[])?;
        for width in &widths {
            let width = twips(*width);
            xml.empty("w:gridCol", &[("w:w", width.as_str())])?;
        }
        xml.close("w:tblGrid")?;

        let rule = if self.config.flexible_row_height { "atLeast" } else { "exact" };
        for (row, height) in grid.row_heights().iter().enumerate() {
            let height = twips(*height);
            xml.open("w:tr", &[])?;
            xml.open("w:trPr", &[])?;
            xml.empty("w:trHeight", &[("w:val", height.as_str()), ("w:hRule", rule)])?;
            xml.close("w:trPr")?;

            let mut col = 0;
            while col < grid.column_count() {
                col += match grid.covering(row, col) {
                    Some(cell) if cell.row == row => {
                        cell_start(xml, cell, &widths)?;
                        cell.col_span
                    }
                    // Continuation of a vertical merge from a row above.
                    Some(cell) => {
                        cell_properties(xml, cell, &widths, Some("continue"))?;
                        xml.empty("w:p", &[])?;
                        xml.close("w:tc")?;
                        cell.col_span
                    }
                    None => {
                        let width = twips(widths[col]);
                        xml.open("w:tc", &[])?;
                        xml.open("w:tcPr", &[])?;
                        xml.empty("w:tcW", &[("w:w", width.as_str()), ("w:type", "dxa")])?;
                        xml.close("w:tcPr")?;
                        xml.empty("w:p", &[])?;
                        xml.close("w:tc")?;
                        1
                    }
                };
            }
            xml.close("w:tr")?;
        }
        xml.close("w:tbl")
    }
}

/// Top-left corner of the content: the smallest element offsets in the report.
fn origin(report: &PopulatedReport) -> (f32, f32) {
    let mut elements = report.elements().peekable();
    if elements.peek().is_none() {
        return (0.0, 0.0);
    }
    elements.fold((f32::MAX, f32::MAX), |(x, y), e| (x.min(e.frame.x), y.min(e.frame.y)))
}

/// Opens `<w:tc>` and writes its properties. The caller closes the cell.
fn cell_properties(
    xml: &mut XmlBuilder,
    cell: &GridCell<'_>,
    widths: &[f32],
    merge: Option<&str>,
) -> Result<(), quick_xml::Error> {
    let width: f32 = widths[cell.col..cell.col + cell.col_span].iter().sum();
    let width = twips(width);
    let span = cell.col_span.to_string();
    xml.open("w:tc", &[])?;
    xml.open("w:tcPr", &[])?;
    xml.empty("w:tcW", &[("w:w", width.as_str()), ("w:type", "dxa")])?;
    if cell.col_span > 1 {
        xml.empty("w:gridSpan", &[("w:val", span.as_str())])?;
    }
    match merge {
        Some("continue") => xml.empty("w:vMerge", &[])?,
        Some(value) => xml.empty("w:vMerge", &[("w:val", value)])?,
        None => {}
    }
    xml.close("w:tcPr")
}

fn cell_start(xml: &mut XmlBuilder, cell: &GridCell<'_>, widths: &[f32]) -> Result<(), quick_xml::Error> {
    let merge = (cell.row_span > 1).then_some("restart");
    cell_properties(xml, cell, widths, merge)?;
    paragraphs(xml, cell.element)?;
    xml.close("w:tc")
}

fn paragraphs(xml: &mut XmlBuilder, element: &PrintElement) -> Result<(), quick_xml::Error> {
    let style = &element.style;
    let justification = match style.align {
        TextAlign::Left => "left",
        TextAlign::Center => "center",
        TextAlign::Right => "right",
    };
    let size = half_points(style.size);

    let lines: Vec<&str> = if element.text.is_empty() {
        vec![""]
    } else {
        element.text.lines().collect()
    };
    for line in lines {
        xml.open("w:p", &[])?;
        xml.open("w:pPr", &[])?;
        xml.empty("w:spacing", &[("w:before", "0"), ("w:after", "0")])?;
        xml.empty("w:jc", &[("w:val", justification)])?;
        xml.close("w:pPr")?;
        xml.open("w:r", &[])?;
        xml.open("w:rPr", &[])?;
        xml.empty(
            "w:rFonts",
            &[("w:ascii", style.font.as_str()), ("w:hAnsi", style.font.as_str())],
        )?;
        if style.bold {
            xml.empty("w:b", &[])?;
        }
        if style.italic {
            xml.empty("w:i", &[])?;
        }
        xml.empty("w:sz", &[("w:val", size.as_str())])?;
        xml.close("w:rPr")?;
        xml.text_element("w:t", &[("xml:space", "preserve")], line)?;
        xml.close("w:r")?;
        xml.close("w:p")?;
    }
    Ok(())
}

impl ReportExporter for DocxExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Docx
    }

    fn export_to(&self, report: &PopulatedReport, writer: &mut dyn Write) -> Result<(), ExportError> {
        let format = ExportFormat::Docx;
        let mut package = Package::new(format);
        package.add_content_types(&[("/word/document.xml".to_string(), DOCUMENT_TYPE)])?;
        package.add_root_relationship("word/document.xml")?;
        let document = self.document(report).map_err(ExportError::xml(format))?;
        package.add_xml("word/document.xml", document)?;
        let bytes = package.finish()?;

        log::debug!("Exported '{}' as DOCX ({} bytes)", report.name(), bytes.len());
        writer.write_all(&bytes).map_err(ExportError::io(format))
    }
}
