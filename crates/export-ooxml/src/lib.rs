//! Office Open XML exporters.
//!
//! All three formats are zip packages written with a fixed entry timestamp,
//! so exporting the same report twice yields the same bytes.

mod docx;
mod package;
mod pptx;
mod xlsx;

pub use docx::DocxExporter;
pub use pptx::PptxExporter;
pub use xlsx::XlsxExporter;
