use crate::format::ExportFormat;
use thiserror::Error;

/// A failure while exporting a report. Always names the format.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("{format} export failed: {message}")]
    Failed {
        format: ExportFormat,
        message: String,
    },

    #[error("{format} export could not write its output: {source}")]
    Io {
        format: ExportFormat,
        #[source]
        source: std::io::Error,
    },

    #[error("{format} export produced invalid XML: {source}")]
    Xml {
        format: ExportFormat,
        #[source]
        source: quick_xml::Error,
    },
}

impl ExportError {
    pub fn failed(format: ExportFormat, message: impl Into<String>) -> Self {
        ExportError::Failed {
            format,
            message: message.into(),
        }
    }

    pub fn io(format: ExportFormat) -> impl FnOnce(std::io::Error) -> Self {
        move |source| ExportError::Io { format, source }
    }

    pub fn xml(format: ExportFormat) -> impl FnOnce(quick_xml::Error) -> Self {
        move |source| ExportError::Xml { format, source }
    }

    pub fn format(&self) -> ExportFormat {
        match self {
            ExportError::Failed { format, .. }
            | ExportError::Io { format, .. }
            | ExportError::Xml { format, .. } => *format,
        }
    }
}
