//! Forward-only row cursors.
//!
//! A cursor is a single-consumer resource: reading a row removes it. Once a
//! cursor reports exhaustion it keeps doing so; re-reading an exhausted cursor
//! yields no rows rather than an error.

use folio_types::Row;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("Cursor read failed: {0}")]
    Read(String),

    #[error("Query '{query}' failed: {message}")]
    Query { query: String, message: String },
}

/// A forward-only cursor over tabular rows, already positioned before its first row.
pub trait RowCursor: Send {
    /// Advances the cursor and returns the next row, or `None` once exhausted.
    fn next_row(&mut self) -> Result<Option<Row>, DataError>;
}

impl RowCursor for Box<dyn RowCursor + '_> {
    fn next_row(&mut self) -> Result<Option<Row>, DataError> {
        (**self).next_row()
    }
}

impl<C: RowCursor + ?Sized> RowCursor for &mut C {
    fn next_row(&mut self) -> Result<Option<Row>, DataError> {
        (**self).next_row()
    }
}

/// A cursor over rows held in memory. Rows are moved out as they are read.
pub struct VecCursor {
    rows: std::vec::IntoIter<Row>,
    consumed: usize,
}

impl VecCursor {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows: rows.into_iter(),
            consumed: 0,
        }
    }

    /// Number of rows read so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn remaining(&self) -> usize {
        self.rows.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}

impl RowCursor for VecCursor {
    fn next_row(&mut self) -> Result<Option<Row>, DataError> {
        let row = self.rows.next();
        if row.is_some() {
            self.consumed += 1;
        }
        Ok(row)
    }
}
