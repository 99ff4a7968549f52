//! Zip packaging shared by the three Office formats.

use folio_export_core::{ExportError, ExportFormat, XmlBuilder};
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

pub(crate) const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
pub(crate) const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
pub(crate) const OFFICE_DOCUMENT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub(crate) const DOCUMENT_RELATIONSHIPS_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// An OPC package under construction.
///
/// Every entry carries the same fixed timestamp so that identical content
/// yields identical archives.
pub(crate) struct Package {
    format: ExportFormat,
    zip: ZipWriter<Cursor<Vec<u8>>>,
    options: FileOptions,
}

impl Package {
    pub(crate) fn new(format: ExportFormat) -> Self {
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());
        Self {
            format,
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            options,
        }
    }

    pub(crate) fn add(&mut self, name: &str, bytes: &[u8]) -> Result<(), ExportError> {
        self.zip
            .start_file(name, self.options)
            .map_err(|e| ExportError::failed(self.format, format!("cannot add '{}': {}", name, e)))?;
        self.zip.write_all(bytes).map_err(ExportError::io(self.format))
    }

    pub(crate) fn add_xml(&mut self, name: &str, xml: XmlBuilder) -> Result<(), ExportError> {
        self.add(name, &xml.finish())
    }

    /// Writes `_rels/.rels` pointing at the main document part.
    pub(crate) fn add_root_relationship(&mut self, target: &str) -> Result<(), ExportError> {
        let xml = relationships(self.format, &[("rId1", OFFICE_DOCUMENT_REL, target)])?;
        self.add_xml("_rels/.rels", xml)
    }

    /// Writes `[Content_Types].xml` from (part name, content type) overrides.
    pub(crate) fn add_content_types(&mut self, overrides: &[(String, &str)]) -> Result<(), ExportError> {
        let format = self.format;
        let build = || -> Result<XmlBuilder, quick_xml::Error> {
            let mut xml = XmlBuilder::new();
            xml.declaration()?;
            xml.open("Types", &[("xmlns", CONTENT_TYPES_NS)])?;
            xml.empty(
                "Default",
                &[
                    ("Extension", "rels"),
                    ("ContentType", "application/vnd.openxmlformats-package.relationships+xml"),
                ],
            )?;
            xml.empty("Default", &[("Extension", "xml"), ("ContentType", "application/xml")])?;
            for (part, content_type) in overrides {
                xml.empty("Override", &[("PartName", part.as_str()), ("ContentType", *content_type)])?;
            }
            xml.close("Types")?;
            Ok(xml)
        };
        let xml = build().map_err(ExportError::xml(format))?;
        self.add_xml("[Content_Types].xml", xml)
    }

    pub(crate) fn finish(self) -> Result<Vec<u8>, ExportError> {
        let mut zip = self.zip;
        let cursor = zip
            .finish()
            .map_err(|e| ExportError::failed(self.format, format!("cannot finish package: {}", e)))?;
        Ok(cursor.into_inner())
    }
}

/// Builds a relationships part from (id, type, target) triples.
pub(crate) fn relationships(
    format: ExportFormat,
    entries: &[(&str, &str, &str)],
) -> Result<XmlBuilder, ExportError> {
    let build = || -> Result<XmlBuilder, quick_xml::Error> {
        let mut xml = XmlBuilder::new();
        xml.declaration()?;
        xml.open("Relationships", &[("xmlns", RELATIONSHIPS_NS)])?;
        for (id, kind, target) in entries {
            xml.empty("Relationship", &[("Id", *id), ("Type", *kind), ("Target", *target)])?;
        }
        xml.close("Relationships")?;
        Ok(xml)
    };
    build().map_err(ExportError::xml(format))
}

#[cfg(test)]
pub(crate) mod testing {
    use std::io::{Cursor, Read};

    /// Reads one entry of a package as text.
    pub(crate) fn read_entry(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut text = String::new();
        entry.read_to_string(&mut text).unwrap();
        text
    }

    pub(crate) fn entry_names(bytes: &[u8]) -> Vec<String> {
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        archive.file_names().map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{entry_names, read_entry};
    use super::*;

    fn sample() -> Vec<u8> {
        let mut package = Package::new(ExportFormat::Docx);
        package
            .add_content_types(&[("/word/document.xml".to_string(), "application/xml")])
            .unwrap();
        package.add_root_relationship("word/document.xml").unwrap();
        package.add("word/document.xml", b"<doc/>").unwrap();
        package.finish().unwrap()
    }

    #[test]
    fn test_package_entries() {
        let bytes = sample();
        let mut names = entry_names(&bytes);
        names.sort();
        assert_eq!(names, vec!["[Content_Types].xml", "_rels/.rels", "word/document.xml"]);
        assert!(read_entry(&bytes, "_rels/.rels").contains("Target=\"word/document.xml\""));
    }

    #[test]
    fn test_package_is_reproducible() {
        assert_eq!(sample(), sample());
    }
}
