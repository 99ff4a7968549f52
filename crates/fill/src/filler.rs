use crate::error::FillError;
use crate::params::parameter_scope;
use crate::rows::{RowStream, bind_fields};
use crate::variables::{PAGE_COUNT, PAGE_NUMBER, REPORT_COUNT, Variables};
use folio_source::EngineDataSource;
use folio_template_core::{CompiledTemplate, ElementType, PageSetup, WhenNoData, expression_id};
use folio_types::{
    BandKind, ElementKind, ParameterMap, PopulatedReport, PrintElement, PrintPage, Rect, Size,
};
use serde_json::{Map, Value};

const EPSILON: f32 = 0.01;

/// Fills `template` with the rows of `source` and the given parameters.
///
/// The source is drained completely. The returned report owns all of its
/// data; nothing in it refers back to the source or the parameters.
pub fn fill(
    template: &CompiledTemplate,
    source: EngineDataSource<'_>,
    params: ParameterMap,
) -> Result<PopulatedReport, FillError> {
    let scope = parameter_scope(template, &params)?;
    log::debug!(
        "Filling '{}' from {} source with {} parameters",
        template.name(),
        source.kind(),
        scope.len()
    );
    let mut rows = RowStream::open(template, source, &params)?;

    let mut filler = Filler::new(template, scope);
    filler.run(&mut rows)?;
    let report = filler.finish();
    log::info!(
        "Filled '{}': {} rows on {} pages",
        report.name(),
        report.row_count(),
        report.page_count()
    );
    Ok(report)
}

struct Filler<'t> {
    template: &'t CompiledTemplate,
    page: PageSetup,
    params: Value,
    fields: Map<String, Value>,
    variables: Variables,
    report_count: usize,
    page_count: usize,
    pages: Vec<PrintPage>,
    current: Vec<PrintElement>,
    // Space used on the current page, from the top of the content area.
    offset: f32,
}

impl<'t> Filler<'t> {
    fn new(template: &'t CompiledTemplate, params: Map<String, Value>) -> Self {
        // Fields read as null until the first row is bound.
        let fields = template
            .fields()
            .iter()
            .map(|f| (f.name.clone(), Value::Null))
            .collect();
        Self {
            template,
            page: template.page(),
            params: Value::Object(params),
            fields,
            variables: Variables::new(template.variables()),
            report_count: 0,
            page_count: 0,
            pages: Vec::new(),
            current: Vec::new(),
            offset: 0.0,
        }
    }

    fn height(&self, kind: BandKind) -> f32 {
        self.template.bands().height(kind)
    }

    fn fits(&self, height: f32) -> bool {
        let bottom = self.page.content_height() - self.height(BandKind::PageFooter);
        self.offset + height <= bottom + EPSILON
    }

    fn run(&mut self, rows: &mut RowStream<'_>) -> Result<(), FillError> {
        let mut next = rows.next_row()?;
        if next.is_none() && self.template.when_no_data() == WhenNoData::NoPages {
            log::debug!("No rows for '{}', producing no pages", self.template.name());
            return Ok(());
        }

        self.start_page()?;
        self.place(BandKind::Title)?;
        let detail = self.height(BandKind::Detail) + self.height(BandKind::ColumnFooter);
        if !self.fits(self.height(BandKind::ColumnHeader) + detail) {
            self.end_page()?;
            self.start_page()?;
        }
        self.place(BandKind::ColumnHeader)?;

        while let Some(record) = next {
            let fields = bind_fields(self.template.fields(), record, self.report_count + 1)?;
            if !self.fits(detail) {
                self.place(BandKind::ColumnFooter)?;
                self.end_page()?;
                self.start_page()?;
                self.place(BandKind::ColumnHeader)?;
            }
            self.fields = fields;
            self.report_count += 1;
            self.page_count += 1;
            self.variables.update(&self.fields)?;
            self.place(BandKind::Detail)?;
            next = rows.next_row()?;
        }

        self.place(BandKind::ColumnFooter)?;
        if !self.fits(self.height(BandKind::Summary)) {
            self.end_page()?;
            self.start_page()?;
        }
        self.place(BandKind::Summary)?;
        self.end_page()
    }

    fn start_page(&mut self) -> Result<(), FillError> {
        self.offset = 0.0;
        self.page_count = 0;
        self.variables.reset_page();
        self.place(BandKind::PageHeader)
    }

    fn end_page(&mut self) -> Result<(), FillError> {
        let top = self.page.content_height() - self.height(BandKind::PageFooter);
        self.render_band(BandKind::PageFooter, top)?;
        let elements = std::mem::take(&mut self.current);
        self.pages.push(PrintPage::new(elements));
        Ok(())
    }

    /// Stacks a band below whatever is already on the page.
    fn place(&mut self, kind: BandKind) -> Result<(), FillError> {
        self.render_band(kind, self.offset)?;
        self.offset += self.height(kind);
        Ok(())
    }

    fn render_band(&mut self, kind: BandKind, top: f32) -> Result<(), FillError> {
        let Some(band) = self.template.bands().get(kind) else {
            return Ok(());
        };
        if band.elements.is_empty() {
            return Ok(());
        }
        let context = self.context();
        let origin_x = self.page.margin;
        let origin_y = self.page.margin + top;

        for (index, element) in band.elements.iter().enumerate() {
            let (kind_out, text) = match element.kind {
                ElementType::StaticText => (
                    ElementKind::StaticText,
                    element.text.clone().unwrap_or_default(),
                ),
                ElementType::TextField => {
                    let text = self
                        .template
                        .render_expression(kind, index, &context)
                        .map_err(|e| FillError::Expression {
                            location: expression_id(kind, index),
                            source: Box::new(e),
                        })?;
                    (ElementKind::TextField, text)
                }
            };
            self.current.push(PrintElement {
                kind: kind_out,
                key: element.key.clone(),
                band: kind,
                frame: Rect::new(
                    origin_x + element.x,
                    origin_y + element.y,
                    element.width,
                    element.height,
                ),
                style: self.template.element_style(element),
                text,
            });
        }
        Ok(())
    }

    fn context(&self) -> Value {
        let mut vars = self.variables.values();
        vars.insert(PAGE_NUMBER.to_string(), Value::from(self.pages.len() + 1));
        vars.insert(REPORT_COUNT.to_string(), Value::from(self.report_count));
        vars.insert(PAGE_COUNT.to_string(), Value::from(self.page_count));

        let mut context = Map::new();
        context.insert("param".to_string(), self.params.clone());
        context.insert("field".to_string(), Value::Object(self.fields.clone()));
        context.insert("var".to_string(), Value::Object(vars));
        Value::Object(context)
    }

    fn finish(self) -> PopulatedReport {
        PopulatedReport::new(
            self.template.name(),
            Size::new(self.page.width, self.page.height),
            self.pages,
            self.report_count,
        )
    }
}
