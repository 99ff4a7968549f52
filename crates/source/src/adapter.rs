use crate::error::SourceError;
use crate::variant::DataSourceVariant;
use folio_traits::{Connection, DataError, RowCursor, VecCursor};
use folio_types::{ParameterMap, Row, XML_DATA_DOCUMENT};
use std::fmt;

/// A row-by-row source handed to the filler.
///
/// Wraps either an in-memory collection or a borrowed cursor. Reading is
/// destructive in both cases: a row that has been read is gone.
pub struct RowSource<'a> {
    inner: Box<dyn RowCursor + 'a>,
    size_hint: Option<usize>,
    read: usize,
}

impl<'a> RowSource<'a> {
    /// Create a source over an in-memory collection.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let size_hint = Some(rows.len());
        Self {
            inner: Box::new(VecCursor::new(rows)),
            size_hint,
            read: 0,
        }
    }

    /// Create a source that drains a cursor. The size is unknown up front.
    pub fn from_cursor<C: RowCursor + 'a>(cursor: C) -> Self {
        Self {
            inner: Box::new(cursor),
            size_hint: None,
            read: 0,
        }
    }

    /// Get the next row, or `None` when the source is exhausted.
    pub fn next_row(&mut self) -> Result<Option<Row>, DataError> {
        let row = self.inner.next_row()?;
        if row.is_some() {
            self.read += 1;
        }
        Ok(row)
    }

    /// Hint about the total number of rows. `None` if unknown.
    pub fn size_hint(&self) -> Option<usize> {
        self.size_hint
    }

    /// Number of rows read so far.
    pub fn rows_read(&self) -> usize {
        self.read
    }
}

/// The normalized data source the filler consumes.
pub enum EngineDataSource<'a> {
    /// Rows to iterate one by one.
    Rows(RowSource<'a>),
    /// A live connection, passed through unchanged; the engine runs its own query.
    Connection(&'a mut dyn Connection),
    /// No row source. The engine consults the parameters instead
    /// (for example the XML document under [`XML_DATA_DOCUMENT`]).
    Empty,
}

impl EngineDataSource<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            EngineDataSource::Rows(_) => "rows",
            EngineDataSource::Connection(_) => "connection",
            EngineDataSource::Empty => "empty",
        }
    }
}

impl fmt::Debug for EngineDataSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineDataSource::Rows(rows) => f
                .debug_struct("Rows")
                .field("size_hint", &rows.size_hint())
                .field("read", &rows.rows_read())
                .finish(),
            other => f.write_str(other.kind()),
        }
    }
}

/// Normalizes a data source variant and the caller's parameters into the fill contract.
///
/// - `RowCollection` and `Cursor` become a [`RowSource`]; parameters pass through.
/// - `XmlTree` yields no row source and stores the document under
///   [`XML_DATA_DOCUMENT`], replacing any value already there.
/// - `LiveConnection` is passed through as the data source; parameters pass through.
/// - `FlatMap` yields no row source, and the map itself becomes the parameters.
///
/// Performs no I/O. The only failure is an absent variant.
pub fn adapt<'a>(
    variant: Option<DataSourceVariant<'a>>,
    mut params: ParameterMap,
) -> Result<(EngineDataSource<'a>, ParameterMap), SourceError> {
    let variant = variant.ok_or_else(|| {
        SourceError::InvalidDataSource("no data source variant was supplied".to_string())
    })?;
    log::debug!("Adapting {} data source", variant.kind());

    let adapted = match variant {
        DataSourceVariant::RowCollection(rows) => {
            (EngineDataSource::Rows(RowSource::from_rows(rows)), params)
        }
        DataSourceVariant::Cursor(cursor) => {
            (EngineDataSource::Rows(RowSource::from_cursor(cursor)), params)
        }
        DataSourceVariant::XmlTree(doc) => {
            if params.insert(XML_DATA_DOCUMENT, doc).is_some() {
                log::debug!("Replaced existing '{}' parameter with the XML tree", XML_DATA_DOCUMENT);
            }
            (EngineDataSource::Empty, params)
        }
        DataSourceVariant::LiveConnection(connection) => {
            (EngineDataSource::Connection(connection), params)
        }
        DataSourceVariant::FlatMap(map) => {
            if !params.is_empty() {
                log::debug!("FlatMap source replaces {} caller parameters", params.len());
            }
            (EngineDataSource::Empty, map)
        }
    };
    Ok(adapted)
}
