//! The populated report model.
//!
//! A [`PopulatedReport`] is the output of a fill: fixed pages of absolutely
//! positioned text elements. It owns all of its data, never refers back to the
//! data source it was filled from, and is read-only once built, so it can be
//! exported any number of times, from any number of threads.

use crate::geometry::{Rect, Size};
use serde::{Deserialize, Serialize};

/// The report section an element was printed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BandKind {
    Title,
    PageHeader,
    ColumnHeader,
    Detail,
    ColumnFooter,
    PageFooter,
    Summary,
}

impl BandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BandKind::Title => "title",
            BandKind::PageHeader => "pageHeader",
            BandKind::ColumnHeader => "columnHeader",
            BandKind::Detail => "detail",
            BandKind::ColumnFooter => "columnFooter",
            BandKind::PageFooter => "pageFooter",
            BandKind::Summary => "summary",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

/// A fully resolved text style. Fonts are carried by name; each exporter
/// decides which names it can honour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font: String,
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
    pub align: TextAlign,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: "Helvetica".to_string(),
            size: 10.0,
            bold: false,
            italic: false,
            align: TextAlign::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    StaticText,
    TextField,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::StaticText => "staticText",
            ElementKind::TextField => "textField",
        }
    }
}

/// A single printed text element in page coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintElement {
    pub kind: ElementKind,
    pub key: Option<String>,
    pub band: BandKind,
    pub frame: Rect,
    pub style: TextStyle,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrintPage {
    elements: Vec<PrintElement>,
}

impl PrintPage {
    pub fn new(elements: Vec<PrintElement>) -> Self {
        Self { elements }
    }

    pub fn elements(&self) -> &[PrintElement] {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// The immutable result of filling a template with data.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulatedReport {
    name: String,
    page_size: Size,
    pages: Vec<PrintPage>,
    row_count: usize,
}

impl PopulatedReport {
    pub fn new(name: impl Into<String>, page_size: Size, pages: Vec<PrintPage>, row_count: usize) -> Self {
        Self {
            name: name.into(),
            page_size,
            pages,
            row_count,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn page_size(&self) -> Size {
        self.page_size
    }

    pub fn pages(&self) -> &[PrintPage] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Number of data rows consumed while filling.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Iterates all elements in page order.
    pub fn elements(&self) -> impl Iterator<Item = &PrintElement> {
        self.pages.iter().flat_map(|p| p.elements.iter())
    }

    /// Iterates the elements printed from template elements carrying `key`.
    pub fn elements_with_key<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a PrintElement> {
        self.elements().filter(move |e| e.key.as_deref() == Some(key))
    }
}
