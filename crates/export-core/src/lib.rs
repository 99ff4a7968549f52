//! Shared export plumbing for folio.
//!
//! - [`ReportExporter`]: the trait each output format implements
//! - [`ExportFormat`] / [`ExportOutput`]: what was asked for and what came back
//! - [`ExportSettings`]: per-format configuration
//! - [`Grid`] and [`XmlBuilder`]: helpers for the table-based and XML-based formats

mod config;
mod error;
mod exporter;
mod format;
pub mod grid;
mod xml;

pub use config::{DocxConfig, ExportSettings, PptxConfig, XlsxConfig};
pub use error::ExportError;
pub use exporter::{ExportOutput, ReportExporter};
pub use format::ExportFormat;
pub use grid::{Grid, GridCell, format_points};
pub use xml::XmlBuilder;
