use crate::error::SourceError;
use folio_traits::{Connection, RowCursor};
use folio_types::{ParameterMap, Row, XmlDocument};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// The five shapes of data a report can be filled from. Exactly one is active per fill.
pub enum DataSourceVariant<'a> {
    /// An ordered, in-memory sequence of opaque rows.
    RowCollection(Vec<Row>),
    /// A forward-only cursor, consumed as it is read.
    Cursor(&'a mut dyn RowCursor),
    /// A parsed XML document; rows are selected by the template's xpath query.
    XmlTree(Arc<XmlDocument>),
    /// An open connection; the template's sql query is run against it.
    LiveConnection(&'a mut dyn Connection),
    /// A flat parameter mapping with no row iteration.
    FlatMap(ParameterMap),
}

impl DataSourceVariant<'static> {
    /// Builds a row collection from serializable domain entities.
    pub fn from_entities<T: Serialize>(entities: &[T]) -> Result<Self, SourceError> {
        let rows = entities
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DataSourceVariant::RowCollection(rows))
    }
}

impl DataSourceVariant<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            DataSourceVariant::RowCollection(_) => "RowCollection",
            DataSourceVariant::Cursor(_) => "Cursor",
            DataSourceVariant::XmlTree(_) => "XmlTree",
            DataSourceVariant::LiveConnection(_) => "LiveConnection",
            DataSourceVariant::FlatMap(_) => "FlatMap",
        }
    }
}

impl fmt::Debug for DataSourceVariant<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceVariant::RowCollection(rows) => {
                f.debug_tuple("RowCollection").field(&rows.len()).finish()
            }
            DataSourceVariant::XmlTree(doc) => f.debug_tuple("XmlTree").field(&doc.root().name()).finish(),
            DataSourceVariant::FlatMap(map) => f.debug_tuple("FlatMap").field(map).finish(),
            other => f.write_str(other.kind()),
        }
    }
}
