use crate::error::ExportError;
use crate::format::ExportFormat;
use folio_types::PopulatedReport;
use std::io::{Cursor, Write};

/// What an export hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutput {
    /// A complete document.
    Bytes(Vec<u8>),
    /// A readable stream positioned at the start of the document.
    Stream(Cursor<Vec<u8>>),
    /// A textual document.
    Text(String),
}

impl ExportOutput {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ExportOutput::Bytes(bytes) => bytes,
            ExportOutput::Stream(cursor) => cursor.get_ref(),
            ExportOutput::Text(text) => text.as_bytes(),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            ExportOutput::Bytes(bytes) => bytes,
            ExportOutput::Stream(cursor) => cursor.into_inner(),
            ExportOutput::Text(text) => text.into_bytes(),
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Turns a populated report into one output format.
///
/// Exporters only read the report. Identical reports exported with identical
/// configuration produce identical bytes.
pub trait ReportExporter: Send + Sync {
    fn format(&self) -> ExportFormat;

    /// Writes the document into `writer`.
    fn export_to(&self, report: &PopulatedReport, writer: &mut dyn Write) -> Result<(), ExportError>;

    /// Exports into memory.
    fn export(&self, report: &PopulatedReport) -> Result<ExportOutput, ExportError> {
        let mut buffer = Vec::new();
        self.export_to(report, &mut buffer)?;
        Ok(ExportOutput::Bytes(buffer))
    }
}
