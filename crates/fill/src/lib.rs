//! The fill step: compiled template + data + parameters -> [`PopulatedReport`].
//!
//! Bands are stacked top to bottom inside the page margins. Expressions see
//! three scopes: `param`, `field` (the current row) and `var` (declared
//! variables plus `PAGE_NUMBER`, `PAGE_COUNT` and `REPORT_COUNT`).
//!
//! [`PopulatedReport`]: folio_types::PopulatedReport

mod error;
mod filler;
mod params;
mod rows;
mod variables;

pub use error::FillError;
pub use filler::fill;
pub use variables::{PAGE_COUNT, PAGE_NUMBER, REPORT_COUNT};
