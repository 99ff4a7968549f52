//! Compiles `.source` templates into [`CompiledTemplate`]s.
//!
//! Compilation parses the JSON design, checks that it is internally
//! consistent, and pre-parses every expression so that a fill never sees a
//! malformed template.

use crate::compiled::{CompiledTemplate, expression_id};
use crate::design::{BandDesign, Calculation, ElementType, ReportDesign, StyleDesign};
use crate::error::CompileError;
use folio_types::{BandKind, TextStyle};
use handlebars::Handlebars;
use std::collections::{HashMap, HashSet};

// Tolerance for float comparisons on geometry.
const EPSILON: f32 = 0.01;

/// Compile template source bytes.
pub fn compile(source: &[u8]) -> Result<CompiledTemplate, CompileError> {
    let text = std::str::from_utf8(source).map_err(|_| CompileError::Encoding)?;
    let design: ReportDesign = serde_json::from_str(text)?;
    compile_design(design)
}

/// Validate an already parsed design and register its expressions.
pub fn compile_design(design: ReportDesign) -> Result<CompiledTemplate, CompileError> {
    validate(&design)?;
    let styles = resolve_styles(&design.styles);
    let registry = build_registry(&design)?;
    log::debug!(
        "Compiled template '{}' ({} expressions)",
        design.name,
        registry.get_templates().len()
    );
    Ok(CompiledTemplate::new(design, styles, registry))
}

fn invalid(message: impl Into<String>) -> CompileError {
    CompileError::Invalid(message.into())
}

fn ensure_unique<'a>(what: &str, names: impl Iterator<Item = &'a str>) -> Result<(), CompileError> {
    let mut seen = HashSet::new();
    for name in names {
        if name.trim().is_empty() {
            return Err(invalid(format!("{} with an empty name", what)));
        }
        if !seen.insert(name) {
            return Err(invalid(format!("duplicate {} '{}'", what, name)));
        }
    }
    Ok(())
}

fn validate(design: &ReportDesign) -> Result<(), CompileError> {
    if design.name.trim().is_empty() {
        return Err(invalid("template name is empty"));
    }

    let page = design.page;
    if page.width <= 0.0 || page.height <= 0.0 {
        return Err(invalid(format!(
            "page size {}x{} must be positive",
            page.width, page.height
        )));
    }
    if page.margin < 0.0 || page.content_width() <= 0.0 || page.content_height() <= 0.0 {
        return Err(invalid(format!("margin {} leaves no room for content", page.margin)));
    }

    ensure_unique("parameter", design.parameters.iter().map(|p| p.name.as_str()))?;
    ensure_unique("field", design.fields.iter().map(|f| f.name.as_str()))?;
    ensure_unique("variable", design.variables.iter().map(|v| v.name.as_str()))?;
    ensure_unique("style", design.styles.iter().map(|s| s.name.as_str()))?;

    for style in &design.styles {
        if let Some(size) = style.size
            && size <= 0.0
        {
            return Err(invalid(format!("style '{}' has font size {}", style.name, size)));
        }
    }

    let fields: HashSet<&str> = design.fields.iter().map(|f| f.name.as_str()).collect();
    for variable in &design.variables {
        match &variable.field {
            Some(field) if !fields.contains(field.as_str()) => {
                return Err(invalid(format!(
                    "variable '{}' refers to undeclared field '{}'",
                    variable.name, field
                )));
            }
            None if variable.calculation != Calculation::Count => {
                return Err(invalid(format!(
                    "variable '{}' needs a field for its calculation",
                    variable.name
                )));
            }
            _ => {}
        }
    }

    if let Some(query) = &design.query
        && query.text.trim().is_empty()
    {
        return Err(invalid("query text is empty"));
    }

    let styles: HashSet<&str> = design.styles.iter().map(|s| s.name.as_str()).collect();
    for (kind, band) in design.bands.iter() {
        validate_band(kind, band, design, &styles)?;
    }
    validate_band_fit(design)
}

fn validate_band(
    kind: BandKind,
    band: &BandDesign,
    design: &ReportDesign,
    styles: &HashSet<&str>,
) -> Result<(), CompileError> {
    let page = design.page;
    if band.height < 0.0 {
        return Err(invalid(format!("band '{}' has negative height", kind.as_str())));
    }
    if band.height > page.content_height() + EPSILON {
        return Err(invalid(format!(
            "band '{}' is {}pt high but the page only has {}pt of content height",
            kind.as_str(),
            band.height,
            page.content_height()
        )));
    }

    for (index, element) in band.elements.iter().enumerate() {
        let location = format!("{}[{}]", kind.as_str(), index);
        if element.x < 0.0 || element.y < 0.0 || element.width <= 0.0 || element.height <= 0.0 {
            return Err(invalid(format!("element {} has invalid geometry", location)));
        }
        if element.y + element.height > band.height + EPSILON {
            return Err(invalid(format!(
                "element {} extends below its band",
                location
            )));
        }
        if element.x + element.width > page.content_width() + EPSILON {
            return Err(invalid(format!(
                "element {} extends past the content width",
                location
            )));
        }
        if let Some(style) = &element.style
            && !styles.contains(style.as_str())
        {
            return Err(invalid(format!(
                "element {} uses unknown style '{}'",
                location, style
            )));
        }
        match element.kind {
            ElementType::StaticText if element.text.is_none() => {
                return Err(invalid(format!("static text {} has no text", location)));
            }
            ElementType::TextField if element.expression.is_none() => {
                return Err(invalid(format!("text field {} has no expression", location)));
            }
            _ => {}
        }
    }
    Ok(())
}

/// Checks that every page can make progress: a page holding the fixed bands
/// must always leave room for the band the filler is trying to place.
fn validate_band_fit(design: &ReportDesign) -> Result<(), CompileError> {
    let bands = &design.bands;
    let available = design.page.content_height() + EPSILON;
    let chrome = bands.height(BandKind::PageHeader) + bands.height(BandKind::PageFooter);

    if chrome + bands.height(BandKind::Title) > available {
        return Err(invalid("title, page header and page footer do not fit on one page"));
    }
    let detail_page = chrome
        + bands.height(BandKind::ColumnHeader)
        + bands.height(BandKind::Detail)
        + bands.height(BandKind::ColumnFooter);
    if detail_page > available {
        return Err(invalid(
            "a detail band does not fit on a page with its headers and footers",
        ));
    }
    if chrome + bands.height(BandKind::Summary) > available {
        return Err(invalid("summary, page header and page footer do not fit on one page"));
    }
    Ok(())
}

fn resolve_styles(styles: &[StyleDesign]) -> HashMap<String, TextStyle> {
    styles
        .iter()
        .map(|style| {
            let base = TextStyle::default();
            let resolved = TextStyle {
                font: style.font.clone().unwrap_or(base.font),
                size: style.size.unwrap_or(base.size),
                bold: style.bold,
                italic: style.italic,
                align: base.align,
            };
            (style.name.clone(), resolved)
        })
        .collect()
}

fn build_registry(design: &ReportDesign) -> Result<Handlebars<'static>, CompileError> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry.register_escape_fn(handlebars::no_escape);

    for (kind, band) in design.bands.iter() {
        for (index, element) in band.elements.iter().enumerate() {
            if let Some(expression) = &element.expression {
                let id = expression_id(kind, index);
                registry
                    .register_template_string(&id, expression)
                    .map_err(|e| CompileError::Expression {
                        location: id.clone(),
                        source: Box::new(e),
                    })?;
            }
        }
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source(value: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    fn invoice() -> serde_json::Value {
        json!({
            "name": "invoice",
            "parameters": [{"name": "title"}],
            "fields": [{"name": "amount"}],
            "variables": [{"name": "total", "calculation": "sum", "field": "amount"}],
            "styles": [{"name": "heading", "font": "Helvetica", "size": 14, "bold": true}],
            "bands": {
                "title": {"height": 30, "elements": [
                    {"type": "textField", "key": "title", "x": 0, "y": 0, "width": 300, "height": 20,
                     "style": "heading", "expression": "{{param.title}}"}
                ]},
                "detail": {"height": 14, "elements": [
                    {"type": "textField", "key": "amount", "x": 0, "y": 0, "width": 100, "height": 14,
                     "align": "right", "expression": "{{field.amount}}"}
                ]}
            }
        })
    }

    #[test]
    fn test_compile_valid_template() {
        let template = compile(&source(invoice())).unwrap();
        assert_eq!(template.name(), "invoice");
        assert_eq!(template.fields().len(), 1);

        let rendered = template
            .render_expression(BandKind::Detail, 0, &json!({"field": {"amount": 10}}))
            .unwrap();
        assert_eq!(rendered, "10");
    }

    #[test]
    fn test_element_style_resolution() {
        let template = compile(&source(invoice())).unwrap();
        let title = &template.bands().get(BandKind::Title).unwrap().elements[0];
        let style = template.element_style(title);
        assert_eq!(style.size, 14.0);
        assert!(style.bold);

        let amount = &template.bands().get(BandKind::Detail).unwrap().elements[0];
        let style = template.element_style(amount);
        assert_eq!(style, TextStyle { align: folio_types::TextAlign::Right, ..TextStyle::default() });
    }

    #[test]
    fn test_expressions_are_not_html_escaped() {
        let template = compile(&source(invoice())).unwrap();
        let rendered = template
            .render_expression(BandKind::Title, 0, &json!({"param": {"title": "R&D <Q1>"}}))
            .unwrap();
        assert_eq!(rendered, "R&D <Q1>");
    }

    #[test]
    fn test_invalid_utf8_is_an_encoding_error() {
        assert!(matches!(compile(&[0xff, 0xfe]), Err(CompileError::Encoding)));
    }

    #[test]
    fn test_malformed_json_is_a_syntax_error() {
        assert!(matches!(compile(b"{\"name\": "), Err(CompileError::Syntax(_))));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let mut design = invoice();
        design["fields"] = json!([{"name": "amount"}, {"name": "amount"}]);
        let err = compile(&source(design)).unwrap_err();
        assert!(err.to_string().contains("duplicate field 'amount'"));
    }

    #[test]
    fn test_variable_with_unknown_field_rejected() {
        let mut design = invoice();
        design["variables"] = json!([{"name": "total", "calculation": "sum", "field": "price"}]);
        assert!(matches!(compile(&source(design)), Err(CompileError::Invalid(_))));
    }

    #[test]
    fn test_element_outside_band_rejected() {
        let mut design = invoice();
        design["bands"]["detail"]["elements"][0]["height"] = json!(40);
        let err = compile(&source(design)).unwrap_err();
        assert!(err.to_string().contains("below its band"));
    }

    #[test]
    fn test_unknown_style_rejected() {
        let mut design = invoice();
        design["bands"]["detail"]["elements"][0]["style"] = json!("missing");
        assert!(matches!(compile(&source(design)), Err(CompileError::Invalid(_))));
    }

    #[test]
    fn test_text_field_without_expression_rejected() {
        let mut design = invoice();
        design["bands"]["detail"]["elements"][0]
            .as_object_mut()
            .unwrap()
            .remove("expression");
        assert!(matches!(compile(&source(design)), Err(CompileError::Invalid(_))));
    }

    #[test]
    fn test_bad_expression_reports_location() {
        let mut design = invoice();
        design["bands"]["detail"]["elements"][0]["expression"] = json!("{{field.amount");
        match compile(&source(design)) {
            Err(CompileError::Expression { location, .. }) => assert_eq!(location, "detail.0"),
            other => panic!("expected expression error, got {:?}", other),
        }
    }

    #[test]
    fn test_detail_that_cannot_fit_rejected() {
        let mut design = invoice();
        design["page"] = json!({"width": 300, "height": 100, "margin": 10});
        design["bands"].as_object_mut().unwrap().remove("title");
        design["bands"]["pageHeader"] = json!({"height": 40});
        design["bands"]["pageFooter"] = json!({"height": 40});
        let err = compile(&source(design)).unwrap_err();
        assert!(err.to_string().contains("detail band does not fit"));
    }
}
