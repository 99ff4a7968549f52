//! folio: fill report templates from five kinds of data source and export
//! them as PDF, XML, XLSX, DOCX or PPTX.
//!
//! ```no_run
//! use folio::{DataSourceVariant, ExportFormat, ParameterMap, ReportEngineBuilder};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), folio::ReportError> {
//! let engine = ReportEngineBuilder::new().with_template_dir("templates").build();
//! let rows = vec![json!({"amount": 10}), json!({"amount": 20})];
//! let report = engine.generate(
//!     "invoice.source",
//!     Some(DataSourceVariant::RowCollection(rows)),
//!     ParameterMap::new().with("title", "Q1"),
//! )?;
//! engine.export_and_save(&report, ExportFormat::Pdf, "invoice.pdf")?;
//! # Ok(())
//! # }
//! ```

pub mod batch;
mod builder;
mod engine;
pub mod error;

pub use batch::{RecompileOutcome, RecompileSummary};
pub use builder::ReportEngineBuilder;
pub use engine::ReportEngine;
pub use error::ReportError;

pub use folio_export_core::{
    DocxConfig, ExportError, ExportFormat, ExportOutput, ExportSettings, PptxConfig, ReportExporter,
    XlsxConfig,
};
pub use folio_fill::FillError;
pub use folio_resource::{FileSink, FilesystemResourceProvider, list_files};
pub use folio_source::{DataSourceVariant, EngineDataSource, SourceError, adapt, parse_xml};
pub use folio_template_core::{CompiledTemplate, TemplateError};
pub use folio_traits::{
    Connection, DataError, InMemoryConnection, InMemoryResourceProvider, InMemorySink, ReportSink,
    ResourceProvider, RowCursor, SinkError, VecCursor,
};
pub use folio_types::{ParamValue, ParameterMap, PopulatedReport, XML_DATA_DOCUMENT, XmlDocument};
