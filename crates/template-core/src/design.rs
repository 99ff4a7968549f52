//! The serializable template design.
//!
//! This is the shape of a `.source` template (JSON, camelCase keys) and of the
//! `design` payload inside a `.compiled` artifact.

use folio_types::{BandKind, TextAlign};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReportDesign {
    pub name: String,
    #[serde(default)]
    pub page: PageSetup,
    #[serde(default)]
    pub when_no_data: WhenNoData,
    #[serde(default)]
    pub parameters: Vec<ParameterDesign>,
    #[serde(default)]
    pub fields: Vec<FieldDesign>,
    #[serde(default)]
    pub variables: Vec<VariableDesign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<QueryDesign>,
    #[serde(default)]
    pub styles: Vec<StyleDesign>,
    #[serde(default)]
    pub bands: Bands,
}

/// Page geometry in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PageSetup {
    pub width: f32,
    pub height: f32,
    #[serde(default = "default_margin")]
    pub margin: f32,
}

fn default_margin() -> f32 {
    20.0
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            width: 595.0,
            height: 842.0,
            margin: default_margin(),
        }
    }
}

impl PageSetup {
    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    pub fn content_height(&self) -> f32 {
        self.height - 2.0 * self.margin
    }
}

/// What to print when the data source yields no rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WhenNoData {
    /// Print every band except the detail band.
    #[default]
    AllSectionsNoDetail,
    /// Produce a report with no pages.
    NoPages,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ParameterDesign {
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FieldDesign {
    pub name: String,
    /// Location of the value relative to an XML row node. Defaults to the field name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl FieldDesign {
    pub fn xml_path(&self) -> &str {
        self.path.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Calculation {
    Count,
    Sum,
    Average,
    Lowest,
    Highest,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResetScope {
    #[default]
    Report,
    Page,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VariableDesign {
    pub name: String,
    pub calculation: Calculation,
    /// The field aggregated. `count` without a field counts rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default)]
    pub reset: ResetScope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QueryLanguage {
    Sql,
    Xpath,
}

impl QueryLanguage {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryLanguage::Sql => "sql",
            QueryLanguage::Xpath => "xpath",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct QueryDesign {
    pub language: QueryLanguage,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StyleDesign {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f32>,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Bands {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<BandDesign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_header: Option<BandDesign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_header: Option<BandDesign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<BandDesign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_footer: Option<BandDesign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_footer: Option<BandDesign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<BandDesign>,
}

impl Bands {
    pub fn get(&self, kind: BandKind) -> Option<&BandDesign> {
        match kind {
            BandKind::Title => self.title.as_ref(),
            BandKind::PageHeader => self.page_header.as_ref(),
            BandKind::ColumnHeader => self.column_header.as_ref(),
            BandKind::Detail => self.detail.as_ref(),
            BandKind::ColumnFooter => self.column_footer.as_ref(),
            BandKind::PageFooter => self.page_footer.as_ref(),
            BandKind::Summary => self.summary.as_ref(),
        }
    }

    /// Height of a band, zero when the band is absent.
    pub fn height(&self, kind: BandKind) -> f32 {
        self.get(kind).map_or(0.0, |b| b.height)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BandKind, &BandDesign)> {
        ALL_BANDS
            .iter()
            .filter_map(move |kind| self.get(*kind).map(|band| (*kind, band)))
    }
}

pub const ALL_BANDS: [BandKind; 7] = [
    BandKind::Title,
    BandKind::PageHeader,
    BandKind::ColumnHeader,
    BandKind::Detail,
    BandKind::ColumnFooter,
    BandKind::PageFooter,
    BandKind::Summary,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BandDesign {
    pub height: f32,
    #[serde(default)]
    pub elements: Vec<ElementDesign>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementType {
    StaticText,
    TextField,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ElementDesign {
    #[serde(rename = "type")]
    pub kind: ElementType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default)]
    pub align: TextAlign,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_design_uses_defaults() {
        let design: ReportDesign = serde_json::from_value(json!({"name": "empty"})).unwrap();
        assert_eq!(design.page, PageSetup::default());
        assert_eq!(design.when_no_data, WhenNoData::AllSectionsNoDetail);
        assert!(design.bands.iter().next().is_none());
        assert_eq!(design.page.content_height(), 802.0);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let result: Result<ReportDesign, _> =
            serde_json::from_value(json!({"name": "x", "bandz": {}}));
        assert!(result.is_err());
    }

    #[test]
    fn test_bands_iterate_in_print_order() {
        let design: ReportDesign = serde_json::from_value(json!({
            "name": "x",
            "bands": {
                "summary": {"height": 10},
                "title": {"height": 20},
                "detail": {"height": 12}
            }
        }))
        .unwrap();
        let kinds: Vec<BandKind> = design.bands.iter().map(|(k, _)| k).collect();
        assert_eq!(kinds, vec![BandKind::Title, BandKind::Detail, BandKind::Summary]);
        assert_eq!(design.bands.height(BandKind::PageFooter), 0.0);
    }
}
