//! PDF export backed by `lopdf`.
//!
//! Text is drawn with the standard 14 Type1 fonts in WinAnsi encoding; one
//! PDF page is produced per report page. Content streams are left
//! uncompressed and no timestamps are written, so output is reproducible.

mod exporter;
pub mod fonts;

pub use exporter::PdfExporter;
