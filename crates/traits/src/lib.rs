pub mod connection;
pub mod cursor;
pub mod resource;
pub mod sink;

pub use connection::{Connection, InMemoryConnection};
pub use cursor::{DataError, RowCursor, VecCursor};
pub use resource::{InMemoryResourceProvider, ResourceError, ResourceProvider, SharedResourceData};
pub use sink::{InMemorySink, ReportSink, SinkError};
