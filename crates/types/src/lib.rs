//! Foundation types shared by every stage of the folio pipeline.
//!
//! - [`ParameterMap`] / [`ParamValue`]: named fill parameters
//! - [`XmlDocument`]: an owned XML tree usable as a data source
//! - [`PopulatedReport`]: the immutable, filled report model handed to exporters

pub mod geometry;
pub mod params;
pub mod report;
pub mod xml;

pub use geometry::{Rect, Size};
pub use params::{ParamValue, ParameterMap, XML_DATA_DOCUMENT};
pub use report::{
    BandKind, ElementKind, PopulatedReport, PrintElement, PrintPage, TextAlign, TextStyle,
};
pub use xml::{XmlDocument, XmlElement, XmlNode};

/// A single data row as seen by the engine.
///
/// Rows are opaque JSON values; field lookup happens by name on object rows.
pub type Row = serde_json::Value;
