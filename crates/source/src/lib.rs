//! Data source abstractions for the fill step.
//!
//! Callers describe their data with a [`DataSourceVariant`], one arm per
//! supported shape. [`adapt`] normalizes any of them into the single contract
//! the filler consumes: an [`EngineDataSource`] plus a [`ParameterMap`].
//!
//! ## Example
//!
//! ```ignore
//! use folio_source::{adapt, DataSourceVariant};
//! use folio_types::ParameterMap;
//! use serde_json::json;
//!
//! let rows = vec![json!({"amount": 10}), json!({"amount": 20})];
//! let (source, params) = adapt(Some(DataSourceVariant::RowCollection(rows)), ParameterMap::new())?;
//! ```
//!
//! [`ParameterMap`]: folio_types::ParameterMap

mod adapter;
mod error;
mod variant;
mod xml;

pub use adapter::{EngineDataSource, RowSource, adapt};
pub use error::SourceError;
pub use variant::DataSourceVariant;
pub use xml::parse_xml;
