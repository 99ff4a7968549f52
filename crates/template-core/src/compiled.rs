use crate::design::{
    Bands, ElementDesign, FieldDesign, PageSetup, ParameterDesign, QueryDesign, ReportDesign,
    VariableDesign, WhenNoData,
};
use folio_types::{BandKind, TextStyle};
use handlebars::Handlebars;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Name under which the expression of element `index` in `band` is registered.
pub fn expression_id(band: BandKind, index: usize) -> String {
    format!("{}.{}", band.as_str(), index)
}

/// An engine-ready template: a validated design plus its pre-parsed expressions.
///
/// Immutable once built and safe to share between fills.
pub struct CompiledTemplate {
    design: ReportDesign,
    styles: HashMap<String, TextStyle>,
    registry: Handlebars<'static>,
}

impl CompiledTemplate {
    pub(crate) fn new(
        design: ReportDesign,
        styles: HashMap<String, TextStyle>,
        registry: Handlebars<'static>,
    ) -> Self {
        Self {
            design,
            styles,
            registry,
        }
    }

    pub fn name(&self) -> &str {
        &self.design.name
    }

    pub fn design(&self) -> &ReportDesign {
        &self.design
    }

    pub fn page(&self) -> PageSetup {
        self.design.page
    }

    pub fn when_no_data(&self) -> WhenNoData {
        self.design.when_no_data
    }

    pub fn bands(&self) -> &Bands {
        &self.design.bands
    }

    pub fn parameters(&self) -> &[ParameterDesign] {
        &self.design.parameters
    }

    pub fn fields(&self) -> &[FieldDesign] {
        &self.design.fields
    }

    pub fn variables(&self) -> &[VariableDesign] {
        &self.design.variables
    }

    pub fn query(&self) -> Option<&QueryDesign> {
        self.design.query.as_ref()
    }

    /// The resolved style of an element: its named style (or the default) plus its alignment.
    pub fn element_style(&self, element: &ElementDesign) -> TextStyle {
        let mut style = element
            .style
            .as_ref()
            .and_then(|name| self.styles.get(name))
            .cloned()
            .unwrap_or_default();
        style.align = element.align;
        style
    }

    /// Renders the expression of element `index` in `band` against `context`.
    pub fn render_expression(
        &self,
        band: BandKind,
        index: usize,
        context: &Value,
    ) -> Result<String, handlebars::RenderError> {
        self.registry.render(&expression_id(band, index), context)
    }
}

impl fmt::Debug for CompiledTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledTemplate")
            .field("name", &self.design.name)
            .field("styles", &self.styles.keys().collect::<Vec<_>>())
            .field("expressions", &self.registry.get_templates().len())
            .finish()
    }
}
