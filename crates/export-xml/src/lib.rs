//! The XML dump format: a structural listing of a populated report.
//!
//! ```xml
//! <report name="invoice" pageWidth="595" pageHeight="842" pages="1" rows="3">
//!   <page index="1">
//!     <textField key="amount" band="detail" x="20" y="40" width="100" height="14"
//!                font="Helvetica" size="10" bold="false" italic="false" align="left">10</textField>
//!   </page>
//! </report>
//! ```

use folio_export_core::{ExportError, ExportFormat, ExportOutput, ReportExporter, XmlBuilder, format_points};
use folio_types::{PopulatedReport, PrintElement};
use std::io::Write;

#[derive(Debug, Clone, Copy, Default)]
pub struct XmlDumpExporter;

impl XmlDumpExporter {
    pub fn new() -> Self {
        Self
    }

    /// Renders the dump as a string.
    pub fn render(&self, report: &PopulatedReport) -> Result<String, ExportError> {
        let bytes = dump(report).map_err(ExportError::xml(ExportFormat::XmlDump))?;
        String::from_utf8(bytes)
            .map_err(|e| ExportError::failed(ExportFormat::XmlDump, e.to_string()))
    }
}

fn dump(report: &PopulatedReport) -> Result<Vec<u8>, quick_xml::Error> {
    let size = report.page_size();
    let width = format_points(size.width);
    let height = format_points(size.height);
    let pages = report.page_count().to_string();
    let rows = report.row_count().to_string();

    let mut xml = XmlBuilder::indented();
    xml.declaration()?;
    xml.open(
        "report",
        &[
            ("name", report.name()),
            ("pageWidth", width.as_str()),
            ("pageHeight", height.as_str()),
            ("pages", pages.as_str()),
            ("rows", rows.as_str()),
        ],
    )?;
    for (index, page) in report.pages().iter().enumerate() {
        let number = (index + 1).to_string();
        if page.is_empty() {
            xml.empty("page", &[("index", number.as_str())])?;
            continue;
        }
        xml.open("page", &[("index", number.as_str())])?;
        for element in page.elements() {
            write_element(&mut xml, element)?;
        }
        xml.close("page")?;
    }
    xml.close("report")?;
    Ok(xml.finish())
}

fn write_element(xml: &mut XmlBuilder, element: &PrintElement) -> Result<(), quick_xml::Error> {
    let frame = element.frame;
    let (x, y) = (format_points(frame.x), format_points(frame.y));
    let (width, height) = (format_points(frame.width), format_points(frame.height));
    let size = format_points(element.style.size);
    let bold = element.style.bold.to_string();
    let italic = element.style.italic.to_string();

    let mut attributes: Vec<(&str, &str)> = Vec::with_capacity(12);
    if let Some(key) = &element.key {
        attributes.push(("key", key.as_str()));
    }
    attributes.extend([
        ("band", element.band.as_str()),
        ("x", x.as_str()),
        ("y", y.as_str()),
        ("width", width.as_str()),
        ("height", height.as_str()),
        ("font", element.style.font.as_str()),
        ("size", size.as_str()),
        ("bold", bold.as_str()),
        ("italic", italic.as_str()),
        ("align", element.style.align.as_str()),
    ]);
    xml.text_element(element.kind.as_str(), &attributes, &element.text)
}

impl ReportExporter for XmlDumpExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::XmlDump
    }

    fn export_to(&self, report: &PopulatedReport, writer: &mut dyn Write) -> Result<(), ExportError> {
        let bytes = dump(report).map_err(ExportError::xml(ExportFormat::XmlDump))?;
        writer
            .write_all(&bytes)
            .map_err(ExportError::io(ExportFormat::XmlDump))
    }

    fn export(&self, report: &PopulatedReport) -> Result<ExportOutput, ExportError> {
        let text = self.render(report)?;
        log::debug!("Exported '{}' as XML dump ({} bytes)", report.name(), text.len());
        Ok(ExportOutput::Text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_types::{BandKind, ElementKind, PrintPage, Rect, Size, TextStyle};

    fn element(kind: ElementKind, key: Option<&str>, text: &str) -> PrintElement {
        PrintElement {
            kind,
            key: key.map(str::to_string),
            band: BandKind::Detail,
            frame: Rect::new(20.0, 40.5, 100.0, 14.0),
            style: TextStyle::default(),
            text: text.to_string(),
        }
    }

    fn report() -> PopulatedReport {
        PopulatedReport::new(
            "invoice",
            Size::a4(),
            vec![
                PrintPage::new(vec![
                    element(ElementKind::StaticText, None, "Amount"),
                    element(ElementKind::TextField, Some("amount"), "R&D <10>"),
                ]),
                PrintPage::new(Vec::new()),
            ],
            1,
        )
    }

    #[test]
    fn test_dump_structure() {
        let text = XmlDumpExporter.render(&report()).unwrap();
        let doc = roxmltree::Document::parse(&text).unwrap();
        let root = doc.root_element();
        assert_eq!(root.tag_name().name(), "report");
        assert_eq!(root.attribute("name"), Some("invoice"));
        assert_eq!(root.attribute("pageWidth"), Some("595"));
        assert_eq!(root.attribute("rows"), Some("1"));

        let pages: Vec<_> = root.children().filter(|n| n.is_element()).collect();
        assert_eq!(pages.len(), 2);
        let elements: Vec<_> = pages[0].children().filter(|n| n.is_element()).collect();
        assert_eq!(elements[0].tag_name().name(), "staticText");
        assert_eq!(elements[0].attribute("key"), None);
        assert_eq!(elements[1].attribute("key"), Some("amount"));
        assert_eq!(elements[1].attribute("y"), Some("40.5"));
        assert_eq!(elements[1].text(), Some("R&D <10>"));
    }

    #[test]
    fn test_export_returns_text() {
        let output = XmlDumpExporter.export(&report()).unwrap();
        assert!(matches!(output, ExportOutput::Text(ref t) if t.starts_with("<?xml")));

        let mut streamed = Vec::new();
        XmlDumpExporter.export_to(&report(), &mut streamed).unwrap();
        assert_eq!(streamed, output.into_bytes());
    }
}
