// src/error.rs
use folio_export_core::ExportError;
use folio_fill::FillError;
use folio_resource::ListError;
use folio_source::SourceError;
use folio_template_core::{CompileError, LoadError, TemplateError};
use folio_traits::SinkError;
use std::path::PathBuf;
use thiserror::Error;

/// Every failure the report engine can surface, one kind per pipeline stage.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Unsupported template format '{0}': expected a .compiled or .source file")]
    UnsupportedTemplateFormat(String),

    #[error("Failed to load template '{identifier}': {source}")]
    TemplateLoad {
        identifier: String,
        #[source]
        source: LoadError,
    },

    #[error("Failed to compile template '{identifier}': {source}")]
    TemplateCompile {
        identifier: String,
        #[source]
        source: CompileError,
    },

    #[error("Invalid data source: {0}")]
    InvalidDataSource(String),

    /// Entities or XML text that could not be turned into a data source.
    #[error(transparent)]
    DataConversion(SourceError),

    #[error("Failed to fill report '{template}': {source}")]
    Fill {
        template: String,
        #[source]
        source: FillError,
    },

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    SinkWrite(#[from] SinkError),

    #[error("Failed to write compiled artifact for '{identifier}': {source}")]
    Artifact {
        identifier: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReportError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| ReportError::Io { path, source }
    }
}

impl From<TemplateError> for ReportError {
    fn from(e: TemplateError) -> Self {
        match e {
            TemplateError::UnsupportedFormat(identifier) => ReportError::UnsupportedTemplateFormat(identifier),
            TemplateError::Load { identifier, source } => ReportError::TemplateLoad { identifier, source },
            TemplateError::Compile { identifier, source } => ReportError::TemplateCompile { identifier, source },
        }
    }
}

impl From<SourceError> for ReportError {
    fn from(e: SourceError) -> Self {
        match e {
            SourceError::InvalidDataSource(message) => ReportError::InvalidDataSource(message),
            other => ReportError::DataConversion(other),
        }
    }
}

impl From<ListError> for ReportError {
    fn from(e: ListError) -> Self {
        match e {
            ListError::DirectoryNotFound(path) => ReportError::DirectoryNotFound(path),
            ListError::Io { path, source } => ReportError::Io { path, source },
        }
    }
}
