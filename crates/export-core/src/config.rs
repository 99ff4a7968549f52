//! Per-format export configuration.
//!
//! All knobs default to off, so `ExportSettings::default()` reproduces the
//! plain exports. Configs deserialize from JSON with missing keys defaulted.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct XlsxConfig {
    /// Write each report page to its own worksheet.
    pub one_page_per_sheet: bool,
    /// Write numeric-looking text as number cells.
    pub detect_cell_type: bool,
    /// Keep every element on a single grid row, dropping rows that start no element.
    pub collapse_row_span: bool,
    /// Worksheet name, or prefix when paging by sheet.
    pub sheet_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocxConfig {
    /// Let table rows grow with their content instead of fixing their height.
    pub flexible_row_height: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PptxConfig {
    /// Drop font, size, weight and slant from text runs.
    pub ignore_text_formatting: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportSettings {
    pub xlsx: XlsxConfig,
    pub docx: DocxConfig,
    pub pptx: PptxConfig,
}
