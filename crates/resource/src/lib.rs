//! Filesystem collaborators for folio.
//!
//! - [`FilesystemResourceProvider`]: loads templates below a template directory
//! - [`FileSink`]: writes exported documents to files
//! - [`list_files`]: lists a directory by extension for batch recompiles
//!
//! The in-memory provider from `folio-traits` is re-exported for convenience.

mod filesystem;
mod listing;
mod sink;

pub use filesystem::FilesystemResourceProvider;
pub use listing::{ListError, list_files};
pub use sink::FileSink;

pub use folio_traits::InMemoryResourceProvider;
