use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every output format a populated report can be exported to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    Pdf,
    PdfStream,
    XmlDump,
    Xlsx,
    Docx,
    Pptx,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 6] = [
        ExportFormat::Pdf,
        ExportFormat::PdfStream,
        ExportFormat::XmlDump,
        ExportFormat::Xlsx,
        ExportFormat::Docx,
        ExportFormat::Pptx,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::PdfStream => "pdf-stream",
            ExportFormat::XmlDump => "xml-dump",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Docx => "docx",
            ExportFormat::Pptx => "pptx",
        }
    }

    /// File extension for files of this format, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf | ExportFormat::PdfStream => "pdf",
            ExportFormat::XmlDump => "xml",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Docx => "docx",
            ExportFormat::Pptx => "pptx",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        ExportFormat::ALL
            .into_iter()
            .find(|f| f.as_str() == normalized)
            .ok_or_else(|| {
                let known: Vec<&str> = ExportFormat::ALL.iter().map(|f| f.as_str()).collect();
                format!("unknown export format '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format_names() {
        assert_eq!("pdf".parse::<ExportFormat>(), Ok(ExportFormat::Pdf));
        assert_eq!("XML_DUMP".parse::<ExportFormat>(), Ok(ExportFormat::XmlDump));
        assert_eq!("pdf-stream".parse::<ExportFormat>(), Ok(ExportFormat::PdfStream));
        assert!("odt".parse::<ExportFormat>().unwrap_err().contains("odt"));
    }

    #[test]
    fn test_display_matches_serde() {
        for format in ExportFormat::ALL {
            let json = serde_json::to_string(&format).unwrap();
            assert_eq!(json, format!("\"{}\"", format));
        }
    }
}
