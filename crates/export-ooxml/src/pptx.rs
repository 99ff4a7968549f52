use crate::package::{DOCUMENT_RELATIONSHIPS_NS, Package, relationships};
use folio_export_core::{ExportError, ExportFormat, PptxConfig, ReportExporter, XmlBuilder};
use folio_types::{PopulatedReport, PrintElement, PrintPage, TextAlign};
use std::io::Write;

const PRESENTATION_NS: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const DRAWING_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

const PRESENTATION_TYPE: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
const SLIDE_TYPE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const MASTER_TYPE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
const LAYOUT_TYPE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
const THEME_TYPE: &str = "application/vnd.openxmlformats-officedocument.theme+xml";

const SLIDE_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
const MASTER_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
const LAYOUT_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
const THEME_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";

const EMU_PER_POINT: f32 = 12700.0;
// Slide ids below 256 are reserved.
const FIRST_SLIDE_ID: usize = 256;

const SLIDE_MASTER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldMaster xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst></p:sldMaster>"#;

const SLIDE_LAYOUT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" type="blank" preserve="1"><p:cSld name="Blank"><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#;

const THEME: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="folio"><a:themeElements><a:clrScheme name="folio"><a:dk1><a:srgbClr val="000000"/></a:dk1><a:lt1><a:srgbClr val="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="1F1F1F"/></a:dk2><a:lt2><a:srgbClr val="EEEEEE"/></a:lt2><a:accent1><a:srgbClr val="4472C4"/></a:accent1><a:accent2><a:srgbClr val="ED7D31"/></a:accent2><a:accent3><a:srgbClr val="A5A5A5"/></a:accent3><a:accent4><a:srgbClr val="FFC000"/></a:accent4><a:accent5><a:srgbClr val="5B9BD5"/></a:accent5><a:accent6><a:srgbClr val="70AD47"/></a:accent6><a:hlink><a:srgbClr val="0563C1"/></a:hlink><a:folHlink><a:srgbClr val="954F72"/></a:folHlink></a:clrScheme><a:fontScheme name="folio"><a:majorFont><a:latin typeface="Helvetica"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="Helvetica"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme><a:fmtScheme name="folio"><a:fillStyleLst><a:noFill/><a:noFill/><a:noFill/></a:fillStyleLst><a:lnStyleLst><a:ln><a:noFill/></a:ln><a:ln><a:noFill/></a:ln><a:ln><a:noFill/></a:ln></a:lnStyleLst><a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst><a:bgFillStyleLst><a:noFill/><a:noFill/><a:noFill/></a:bgFillStyleLst></a:fmtScheme></a:themeElements></a:theme>"#;

fn emu(points: f32) -> String {
    ((points * EMU_PER_POINT).round() as i64).to_string()
}

/// Exports reports as a presentation with one slide per page. Every element
/// becomes an absolutely positioned text box.
#[derive(Debug, Clone, Default)]
pub struct PptxExporter {
    config: PptxConfig,
}

impl PptxExporter {
    pub fn new(config: PptxConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PptxConfig {
        &self.config
    }

    fn slide(&self, page: &PrintPage) -> Result<XmlBuilder, quick_xml::Error> {
        let mut xml = XmlBuilder::new();
        xml.declaration()?;
        xml.open(
            "p:sld",
            &[
                ("xmlns:a", DRAWING_NS),
                ("xmlns:r", DOCUMENT_RELATIONSHIPS_NS),
                ("xmlns:p", PRESENTATION_NS),
            ],
        )?;
        xml.open("p:cSld", &[])?;
        xml.open("p:spTree", &[])?;
        xml.open("p:nvGrpSpPr", &[])?;
        xml.empty("p:cNvPr", &[("id", "1"), ("name", "")])?;
        xml.empty("p:cNvGrpSpPr", &[])?;
        xml.empty("p:nvPr", &[])?;
        xml.close("p:nvGrpSpPr")?;
        xml.empty("p:grpSpPr", &[])?;

        for (index, element) in page.elements().iter().enumerate() {
            // Shape id 1 belongs to the group.
            self.text_box(&mut xml, index + 2, element)?;
        }

        xml.close("p:spTree")?;
        xml.close("p:cSld")?;
        xml.open("p:clrMapOvr", &[])?;
        xml.empty("a:masterClrMapping", &[])?;
        xml.close("p:clrMapOvr")?;
        xml.close("p:sld")?;
        Ok(xml)
    }

    fn text_box(&self, xml: &mut XmlBuilder, id: usize, element: &PrintElement) -> Result<(), quick_xml::Error> {
        let id = id.to_string();
        let name = match &element.key {
            Some(key) => format!("{} {}", element.kind.as_str(), key),
            None => format!("{} {}", element.kind.as_str(), id),
        };
        let frame = element.frame;
        let (x, y) = (emu(frame.x), emu(frame.y));
        let (cx, cy) = (emu(frame.width), emu(frame.height));

        xml.open("p:sp", &[])?;
        xml.open("p:nvSpPr", &[])?;
        xml.empty("p:cNvPr", &[("id", id.as_str()), ("name", name.as_str())])?;
        xml.empty("p:cNvSpPr", &[("txBox", "1")])?;
        xml.empty("p:nvPr", &[])?;
        xml.close("p:nvSpPr")?;

        xml.open("p:spPr", &[])?;
        xml.open("a:xfrm", &[])?;
        xml.empty("a:off", &[("x", x.as_str()), ("y", y.as_str())])?;
        xml.empty("a:ext", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
        xml.close("a:xfrm")?;
        xml.open("a:prstGeom", &[("prst", "rect")])?;
        xml.empty("a:avLst", &[])?;
        xml.close("a:prstGeom")?;
        xml.empty("a:noFill", &[])?;
        xml.close("p:spPr")?;

        xml.open("p:txBody", &[])?;
        xml.empty(
            "a:bodyPr",
            &[("wrap", "square"), ("lIns", "0"), ("tIns", "0"), ("rIns", "0"), ("bIns", "0")],
        )?;
        xml.empty("a:lstStyle", &[])?;
        self.paragraphs(xml, element)?;
        xml.close("p:txBody")?;
        xml.close("p:sp")
    }

    fn paragraphs(&self, xml: &mut XmlBuilder, element: &PrintElement) -> Result<(), quick_xml::Error> {
        let style = &element.style;
        let align = match style.align {
            TextAlign::Left => "l",
            TextAlign::Center => "ctr",
            TextAlign::Right => "r",
        };
        // Hundredths of a point.
        let size = ((style.size * 100.0).round() as i64).to_string();
        let bold = if style.bold { "1" } else { "0" };
        let italic = if style.italic { "1" } else { "0" };

        let lines: Vec<&str> = if element.text.is_empty() {
            vec![""]
        } else {
            element.text.lines().collect()
        };
        for line in lines {
            xml.open("a:p", &[])?;
            xml.empty("a:pPr", &[("algn", align)])?;
            xml.open("a:r", &[])?;
            if self.config.ignore_text_formatting {
                xml.empty("a:rPr", &[("lang", "en-US")])?;
            } else {
                xml.open(
                    "a:rPr",
                    &[("lang", "en-US"), ("sz", size.as_str()), ("b", bold), ("i", italic)],
                )?;
                xml.empty("a:latin", &[("typeface", style.font.as_str())])?;
                xml.close("a:rPr")?;
            }
            xml.text_element("a:t", &[], line)?;
            xml.close("a:r")?;
            xml.close("a:p")?;
        }
        Ok(())
    }
}

fn presentation(report: &PopulatedReport) -> Result<XmlBuilder, quick_xml::Error> {
    let size = report.page_size();
    let (cx, cy) = (emu(size.width), emu(size.height));

    let mut xml = XmlBuilder::new();
    xml.declaration()?;
    xml.open(
        "p:presentation",
        &[
            ("xmlns:a", DRAWING_NS),
            ("xmlns:r", DOCUMENT_RELATIONSHIPS_NS),
            ("xmlns:p", PRESENTATION_NS),
        ],
    )?;
    xml.open("p:sldMasterIdLst", &[])?;
    xml.empty("p:sldMasterId", &[("id", "2147483648"), ("r:id", "rId1")])?;
    xml.close("p:sldMasterIdLst")?;
    if report.page_count() > 0 {
        xml.open("p:sldIdLst", &[])?;
        for index in 0..report.page_count() {
            let id = (FIRST_SLIDE_ID + index).to_string();
            let rel = slide_relationship_id(index);
            xml.empty("p:sldId", &[("id", id.as_str()), ("r:id", rel.as_str())])?;
        }
        xml.close("p:sldIdLst")?;
    }
    xml.empty("p:sldSz", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
    xml.empty("p:notesSz", &[("cx", cy.as_str()), ("cy", cx.as_str())])?;
    xml.close("p:presentation")?;
    Ok(xml)
}

// rId1 is the master; slides follow; the theme comes last.
fn slide_relationship_id(index: usize) -> String {
    format!("rId{}", index + 2)
}

fn slide_part(index: usize) -> String {
    format!("slides/slide{}.xml", index + 1)
}

impl ReportExporter for PptxExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Pptx
    }

    fn export_to(&self, report: &PopulatedReport, writer: &mut dyn Write) -> Result<(), ExportError> {
        let format = ExportFormat::Pptx;
        let pages = report.pages();

        let mut overrides = vec![
            ("/ppt/presentation.xml".to_string(), PRESENTATION_TYPE),
            ("/ppt/slideMasters/slideMaster1.xml".to_string(), MASTER_TYPE),
            ("/ppt/slideLayouts/slideLayout1.xml".to_string(), LAYOUT_TYPE),
            ("/ppt/theme/theme1.xml".to_string(), THEME_TYPE),
        ];
        overrides.extend((0..pages.len()).map(|i| (format!("/ppt/{}", slide_part(i)), SLIDE_TYPE)));

        let mut package = Package::new(format);
        package.add_content_types(&overrides)?;
        package.add_root_relationship("ppt/presentation.xml")?;

        let presentation = presentation(report).map_err(ExportError::xml(format))?;
        package.add_xml("ppt/presentation.xml", presentation)?;

        let ids: Vec<String> = (0..pages.len()).map(slide_relationship_id).collect();
        let parts: Vec<String> = (0..pages.len()).map(slide_part).collect();
        let theme_id = slide_relationship_id(pages.len());
        let mut entries = vec![("rId1", MASTER_REL, "slideMasters/slideMaster1.xml")];
        for (id, part) in ids.iter().zip(&parts) {
            entries.push((id.as_str(), SLIDE_REL, part.as_str()));
        }
        entries.push((theme_id.as_str(), THEME_REL, "theme/theme1.xml"));
        package.add_xml("ppt/_rels/presentation.xml.rels", relationships(format, &entries)?)?;

        package.add("ppt/slideMasters/slideMaster1.xml", SLIDE_MASTER.as_bytes())?;
        package.add_xml(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            relationships(
                format,
                &[
                    ("rId1", LAYOUT_REL, "../slideLayouts/slideLayout1.xml"),
                    ("rId2", THEME_REL, "../theme/theme1.xml"),
                ],
            )?,
        )?;
        package.add("ppt/slideLayouts/slideLayout1.xml", SLIDE_LAYOUT.as_bytes())?;
        package.add_xml(
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            relationships(format, &[("rId1", MASTER_REL, "../slideMasters/slideMaster1.xml")])?,
        )?;
        package.add("ppt/theme/theme1.xml", THEME.as_bytes())?;

        let layout_rels = relationships(format, &[("rId1", LAYOUT_REL, "../slideLayouts/slideLayout1.xml")])?
            .finish();
        for (index, page) in pages.iter().enumerate() {
            let slide = self.slide(page).map_err(ExportError::xml(format))?;
            package.add_xml(&format!("ppt/{}", slide_part(index)), slide)?;
            package.add(
                &format!("ppt/slides/_rels/slide{}.xml.rels", index + 1),
                &layout_rels,
            )?;
        }

        let bytes = package.finish()?;
        log::debug!(
            "Exported '{}' as PPTX ({} slides, {} bytes)",
            report.name(),
            pages.len(),
            bytes.len()
        );
        writer.write_all(&bytes).map_err(ExportError::io(format))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::testing::{entry_names, read_entry};
    use folio_types::{BandKind, ElementKind, Rect, Size, TextStyle};

    fn element(text: &str, style: TextStyle) -> PrintElement {
        PrintElement {
            kind: ElementKind::StaticText,
            key: Some("label".to_string()),
            band: BandKind::Title,
            frame: Rect::new(10.0, 20.0, 100.0, 14.0),
            style,
            text: text.to_string(),
        }
    }

    fn two_pages() -> PopulatedReport {
        let bold = TextStyle {
            bold: true,
            align: TextAlign::Center,
            ..TextStyle::default()
        };
        PopulatedReport::new(
            "deck",
            Size::new(600.0, 400.0),
            vec![
                PrintPage::new(vec![element("Hello", bold)]),
                PrintPage::new(vec![element("a & b", TextStyle::default())]),
            ],
            0,
        )
    }

    #[test]
    fn test_one_slide_per_page() {
        let bytes = PptxExporter::default().export(&two_pages()).unwrap().into_bytes();
        let names = entry_names(&bytes);
        assert!(names.contains(&"ppt/slides/slide1.xml".to_string()));
        assert!(names.contains(&"ppt/slides/slide2.xml".to_string()));
        assert!(!names.contains(&"ppt/slides/slide3.xml".to_string()));

        let presentation = read_entry(&bytes, "ppt/presentation.xml");
        let doc = roxmltree::Document::parse(&presentation).unwrap();
        let ids: Vec<&str> = doc
            .descendants()
            .filter(|n| n.has_tag_name((PRESENTATION_NS, "sldId")))
            .filter_map(|n| n.attribute("id"))
            .collect();
        assert_eq!(ids, vec!["256", "257"]);
        assert!(presentation.contains("<p:sldSz cx=\"7620000\" cy=\"5080000\"/>"));

        let rels = read_entry(&bytes, "ppt/_rels/presentation.xml.rels");
        assert!(rels.contains("Id=\"rId3\""));
        assert!(rels.contains("Target=\"slides/slide2.xml\""));
    }

    #[test]
    fn test_text_box_position_and_formatting() {
        let bytes = PptxExporter::default().export(&two_pages()).unwrap().into_bytes();
        let slide = read_entry(&bytes, "ppt/slides/slide1.xml");
        assert!(slide.contains("<a:off x=\"127000\" y=\"254000\"/>"));
        assert!(slide.contains("<a:ext cx=\"1270000\" cy=\"177800\"/>"));
        assert!(slide.contains("algn=\"ctr\""));
        assert!(slide.contains("b=\"1\""));
        assert!(slide.contains("<a:latin typeface=\"Helvetica\"/>"));
        assert!(slide.contains("<a:t>Hello</a:t>"));

        let second = read_entry(&bytes, "ppt/slides/slide2.xml");
        assert!(second.contains("<a:t>a &amp; b</a:t>"));
    }

    #[test]
    fn test_ignore_text_formatting() {
        let exporter = PptxExporter::new(PptxConfig {
            ignore_text_formatting: true,
        });
        let bytes = exporter.export(&two_pages()).unwrap().into_bytes();
        let slide = read_entry(&bytes, "ppt/slides/slide1.xml");
        assert!(!slide.contains("a:latin"));
        assert!(!slide.contains("b=\"1\""));
        assert!(slide.contains("<a:t>Hello</a:t>"));
    }

    #[test]
    fn test_export_is_byte_identical() {
        let exporter = PptxExporter::default();
        let a = exporter.export(&two_pages()).unwrap();
        let b = exporter.export(&two_pages()).unwrap();
        assert_eq!(a, b);
    }
}
