use crate::fonts::{approximate_width, base_font, is_symbolic, to_win_ansi};
use folio_export_core::{ExportError, ExportFormat, ExportOutput, ReportExporter};
use folio_types::{PopulatedReport, PrintPage, TextAlign};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, StringFormat, Stream, dictionary};
use std::collections::BTreeMap;
use std::io::{Cursor, Write};

// Baseline offset below the top of a text frame, as a fraction of the font size.
const ASCENT: f32 = 0.8;
const LINE_HEIGHT: f32 = 1.2;

/// Exports reports as PDF using the standard Type1 fonts.
///
/// The same document is produced for [`ExportFormat::Pdf`] and
/// [`ExportFormat::PdfStream`]; they differ only in how [`ReportExporter::export`]
/// hands the bytes back.
#[derive(Debug, Clone, Copy)]
pub struct PdfExporter {
    format: ExportFormat,
}

impl PdfExporter {
    pub fn new() -> Self {
        Self {
            format: ExportFormat::Pdf,
        }
    }

    pub fn streaming() -> Self {
        Self {
            format: ExportFormat::PdfStream,
        }
    }

    fn fail(&self, message: impl Into<String>) -> ExportError {
        ExportError::failed(self.format, message)
    }

    /// Maps every base font used by the report to its resource name (`F1`, `F2`, ...).
    fn font_resources(&self, report: &PopulatedReport) -> Result<BTreeMap<&'static str, String>, ExportError> {
        let mut used = Vec::new();
        for element in report.elements() {
            let base = base_font(&element.style).ok_or_else(|| {
                self.fail(format!(
                    "font '{}' is not one of the standard PDF fonts",
                    element.style.font
                ))
            })?;
            if !used.contains(&base) {
                used.push(base);
            }
        }
        used.sort_unstable();
        Ok(used
            .into_iter()
            .enumerate()
            .map(|(i, base)| (base, format!("F{}", i + 1)))
            .collect())
    }

    fn build_document(&self, report: &PopulatedReport) -> Result<Document, ExportError> {
        let fonts = self.font_resources(report)?;
        let size = report.page_size();

        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();

        let mut font_dict = Dictionary::new();
        for (base, resource) in &fonts {
            let mut font = dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => *base,
            };
            if !is_symbolic(base) {
                font.set("Encoding", "WinAnsiEncoding");
            }
            let font_id = document.add_object(font);
            font_dict.set(resource.as_bytes(), font_id);
        }
        let resources_id = document.add_object(dictionary! { "Font" => font_dict });

        let mut kids = Vec::with_capacity(report.page_count());
        for page in report.pages() {
            let content = page_content(page, &fonts, size.height);
            let encoded = content
                .encode()
                .map_err(|e| self.fail(format!("cannot encode page content: {}", e)))?;
            let content_id = document.add_object(Stream::new(dictionary! {}, encoded));
            let page_id = document.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), size.width.into(), size.height.into()],
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(Object::Reference(page_id));
        }

        let page_count = kids.len() as i64;
        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count,
            }),
        );
        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = document.add_object(dictionary! {
            "Title" => Object::String(to_win_ansi(report.name()), StringFormat::Literal),
            "Producer" => Object::string_literal("folio"),
        });
        document.trailer.set("Root", catalog_id);
        document.trailer.set("Info", info_id);
        Ok(document)
    }
}

impl Default for PdfExporter {
    fn default() -> Self {
        Self::new()
    }
}

fn page_content(page: &PrintPage, fonts: &BTreeMap<&'static str, String>, page_height: f32) -> Content {
    let mut operations = Vec::new();
    for element in page.elements() {
        if element.text.trim().is_empty() {
            continue;
        }
        // Resolved for every element while collecting resources.
        let Some((base, resource)) = base_font(&element.style)
            .and_then(|base| fonts.get(base).map(|resource| (base, resource)))
        else {
            continue;
        };
        let font_size = element.style.size;
        let frame = element.frame;

        for (line_index, line) in element.text.lines().enumerate() {
            let width = approximate_width(line, base, font_size);
            let x = match element.style.align {
                TextAlign::Left => frame.x,
                TextAlign::Center => frame.x + (frame.width - width) / 2.0,
                TextAlign::Right => frame.right() - width,
            };
            let baseline = frame.y + font_size * ASCENT + line_index as f32 * font_size * LINE_HEIGHT;
            let y = page_height - baseline;

            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new(
                "Tf",
                vec![Object::Name(resource.as_bytes().to_vec()), font_size.into()],
            ));
            operations.push(Operation::new("Td", vec![x.into(), y.into()]));
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(to_win_ansi(line), StringFormat::Literal)],
            ));
            operations.push(Operation::new("ET", vec![]));
        }
    }
    Content { operations }
}

impl ReportExporter for PdfExporter {
    fn format(&self) -> ExportFormat {
        self.format
    }

    fn export_to(&self, report: &PopulatedReport, writer: &mut dyn Write) -> Result<(), ExportError> {
        let mut document = self.build_document(report)?;
        let mut target = writer;
        document
            .save_to(&mut target)
            .map_err(|e| self.fail(format!("cannot write document: {}", e)))?;
        log::debug!("Exported '{}' as PDF ({} pages)", report.name(), report.page_count());
        Ok(())
    }

    fn export(&self, report: &PopulatedReport) -> Result<ExportOutput, ExportError> {
        let mut buffer = Vec::new();
        self.export_to(report, &mut buffer)?;
        Ok(match self.format {
            ExportFormat::PdfStream => ExportOutput::Stream(Cursor::new(buffer)),
            _ => ExportOutput::Bytes(buffer),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_types::{BandKind, ElementKind, PrintElement, Rect, Size, TextStyle};
    use std::io::Read;

    fn element(text: &str, style: TextStyle) -> PrintElement {
        PrintElement {
            kind: ElementKind::TextField,
            key: Some("k".to_string()),
            band: BandKind::Detail,
            frame: Rect::new(20.0, 20.0, 200.0, 14.0),
            style,
            text: text.to_string(),
        }
    }

    fn report(pages: Vec<Vec<PrintElement>>) -> PopulatedReport {
        let pages = pages.into_iter().map(PrintPage::new).collect();
        PopulatedReport::new("test", Size::a4(), pages, 0)
    }

    fn shown_strings(bytes: &[u8]) -> Vec<Vec<u8>> {
        let doc = Document::load_mem(bytes).unwrap();
        let mut strings = Vec::new();
        for page_id in doc.get_pages().values() {
            let content = Content::decode(&doc.get_page_content(*page_id).unwrap()).unwrap();
            for op in content.operations {
                if op.operator == "Tj" {
                    strings.push(op.operands[0].as_str().unwrap().to_vec());
                }
            }
        }
        strings
    }

    #[test]
    fn test_one_pdf_page_per_report_page() {
        let report = report(vec![
            vec![element("first", TextStyle::default())],
            vec![element("second", TextStyle::default())],
        ]);
        let bytes = PdfExporter::new().export(&report).unwrap().into_bytes();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
        assert_eq!(shown_strings(&bytes), vec![b"first".to_vec(), b"second".to_vec()]);
    }

    #[test]
    fn test_export_is_byte_identical() {
        let report = report(vec![vec![element("Q1", TextStyle::default())]]);
        let exporter = PdfExporter::new();
        let a = exporter.export(&report).unwrap();
        let b = exporter.export(&report).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_stream_matches_buffer() {
        let report = report(vec![vec![element("Q1", TextStyle::default())]]);
        let buffered = PdfExporter::new().export(&report).unwrap().into_bytes();
        match PdfExporter::streaming().export(&report).unwrap() {
            ExportOutput::Stream(mut cursor) => {
                let mut streamed = Vec::new();
                cursor.read_to_end(&mut streamed).unwrap();
                assert_eq!(streamed, buffered);
            }
            other => panic!("expected a stream, got {:?}", other),
        }
    }

    #[test]
    fn test_styled_fonts_are_registered() {
        let bold = TextStyle {
            bold: true,
            ..TextStyle::default()
        };
        let report = report(vec![vec![
            element("plain", TextStyle::default()),
            element("bold", bold),
        ]]);
        let bytes = PdfExporter::new().export(&report).unwrap().into_bytes();
        let doc = Document::load_mem(&bytes).unwrap();
        let fonts: Vec<Vec<u8>> = doc
            .objects
            .values()
            .filter_map(|o| o.as_dict().ok())
            .filter_map(|d| d.get(b"BaseFont").ok())
            .filter_map(|f| f.as_name().ok().map(|n| n.to_vec()))
            .collect();
        assert!(fonts.contains(&b"Helvetica".to_vec()));
        assert!(fonts.contains(&b"Helvetica-Bold".to_vec()));
    }

    #[test]
    fn test_unknown_font_fails_without_output() {
        let style = TextStyle {
            font: "Comic Sans".to_string(),
            ..TextStyle::default()
        };
        let report = report(vec![vec![element("x", style)]]);
        let mut out = Vec::new();
        let err = PdfExporter::new().export_to(&report, &mut out).unwrap_err();
        assert_eq!(err.format(), ExportFormat::Pdf);
        assert!(err.to_string().contains("Comic Sans"));
        assert!(out.is_empty());
    }

    #[test]
    fn test_empty_report_is_still_a_pdf() {
        let bytes = PdfExporter::new().export(&report(Vec::new())).unwrap().into_bytes();
        assert!(bytes.starts_with(b"%PDF-1.5"));
    }
}
