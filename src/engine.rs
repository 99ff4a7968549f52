// src/engine.rs
use crate::batch::{self, RecompileSummary};
use crate::error::ReportError;
use folio_export_core::{
    DocxConfig, ExportFormat, ExportOutput, ExportSettings, PptxConfig, ReportExporter, XlsxConfig,
};
use folio_export_ooxml::{DocxExporter, PptxExporter, XlsxExporter};
use folio_export_pdf::PdfExporter;
use folio_export_xml::XmlDumpExporter;
use folio_source::{DataSourceVariant, adapt};
use folio_template_core::{CompiledTemplate, ResolveTemplate};
use folio_traits::ReportSink;
use folio_types::{ParameterMap, PopulatedReport};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The report pipeline: resolve a template, fill it from a data source,
/// export the result and hand the bytes to a sink.
///
/// The engine holds only immutable configuration and shared collaborators,
/// so one instance can serve concurrent requests. Build one with
/// [`ReportEngineBuilder`](crate::ReportEngineBuilder).
pub struct ReportEngine {
    resolver: Arc<dyn ResolveTemplate>,
    sink: Arc<dyn ReportSink>,
    settings: ExportSettings,
}

impl std::fmt::Debug for ReportEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportEngine")
            .field("resolver", &self.resolver)
            .field("sink", &self.sink.name())
            .field("settings", &self.settings)
            .finish()
    }
}

impl ReportEngine {
    pub(crate) fn new(
        resolver: Arc<dyn ResolveTemplate>,
        sink: Arc<dyn ReportSink>,
        settings: ExportSettings,
    ) -> Self {
        Self {
            resolver,
            sink,
            settings,
        }
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Resolves a `.compiled` or `.source` template identifier.
    pub fn resolve(&self, identifier: &str) -> Result<Arc<CompiledTemplate>, ReportError> {
        Ok(self.resolver.resolve(identifier)?)
    }

    /// Adapts the data source and fills the template.
    ///
    /// An absent variant is an [`ReportError::InvalidDataSource`].
    pub fn populate(
        &self,
        template: &CompiledTemplate,
        source: Option<DataSourceVariant<'_>>,
        params: ParameterMap,
    ) -> Result<PopulatedReport, ReportError> {
        let (data, params) = adapt(source, params)?;
        folio_fill::fill(template, data, params).map_err(|source| ReportError::Fill {
            template: template.name().to_string(),
            source,
        })
    }

    /// Resolves `identifier` and fills it in one call.
    pub fn generate(
        &self,
        identifier: &str,
        source: Option<DataSourceVariant<'_>>,
        params: ParameterMap,
    ) -> Result<PopulatedReport, ReportError> {
        let template = self.resolve(identifier)?;
        self.populate(&template, source, params)
    }

    /// The exporter for `format`, configured from this engine's settings.
    pub fn exporter(&self, format: ExportFormat) -> Box<dyn ReportExporter> {
        match format {
            ExportFormat::Pdf => Box::new(PdfExporter::new()),
            ExportFormat::PdfStream => Box::new(PdfExporter::streaming()),
            ExportFormat::XmlDump => Box::new(XmlDumpExporter::new()),
            ExportFormat::Xlsx => Box::new(XlsxExporter::new(self.settings.xlsx.clone())),
            ExportFormat::Docx => Box::new(DocxExporter::new(self.settings.docx.clone())),
            ExportFormat::Pptx => Box::new(PptxExporter::new(self.settings.pptx.clone())),
        }
    }

    pub fn export(&self, report: &PopulatedReport, format: ExportFormat) -> Result<ExportOutput, ReportError> {
        let output = self.exporter(format).export(report)?;
        log::info!("Exported '{}' as {} ({} bytes)", report.name(), format, output.len());
        Ok(output)
    }

    /// Writes the `format` encoding of `report` into `writer` as it is produced.
    pub fn export_to(
        &self,
        report: &PopulatedReport,
        format: ExportFormat,
        writer: &mut dyn Write,
    ) -> Result<(), ReportError> {
        Ok(self.exporter(format).export_to(report, writer)?)
    }

    /// Exports one report to several formats. With the `parallel` feature the
    /// exports run on the rayon pool; results keep the order of `formats`.
    pub fn export_many(
        &self,
        report: &PopulatedReport,
        formats: &[ExportFormat],
    ) -> Vec<(ExportFormat, Result<ExportOutput, ReportError>)> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            formats
                .par_iter()
                .map(|format| (*format, self.export(report, *format)))
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            formats
                .iter()
                .map(|format| (*format, self.export(report, *format)))
                .collect()
        }
    }

    pub fn export_pdf(&self, report: &PopulatedReport) -> Result<Vec<u8>, ReportError> {
        Ok(PdfExporter::new().export(report)?.into_bytes())
    }

    /// Streams the PDF encoding into `writer`.
    pub fn export_pdf_stream(&self, report: &PopulatedReport, writer: &mut dyn Write) -> Result<(), ReportError> {
        Ok(PdfExporter::streaming().export_to(report, writer)?)
    }

    pub fn export_xml(&self, report: &PopulatedReport) -> Result<String, ReportError> {
        Ok(XmlDumpExporter::new().render(report)?)
    }

    pub fn export_xlsx(&self, report: &PopulatedReport, config: &XlsxConfig) -> Result<Vec<u8>, ReportError> {
        Ok(XlsxExporter::new(config.clone()).export(report)?.into_bytes())
    }

    pub fn export_docx(&self, report: &PopulatedReport, config: &DocxConfig) -> Result<Vec<u8>, ReportError> {
        Ok(DocxExporter::new(config.clone()).export(report)?.into_bytes())
    }

    pub fn export_pptx(&self, report: &PopulatedReport, config: &PptxConfig) -> Result<Vec<u8>, ReportError> {
        Ok(PptxExporter::new(config.clone()).export(report)?.into_bytes())
    }

    /// Hands `bytes` to the sink. Write failures are returned, never swallowed.
    pub fn save(&self, bytes: &[u8], destination: &str) -> Result<(), ReportError> {
        self.sink.write(bytes, destination)?;
        log::info!("Saved {} bytes to '{}' via {}", bytes.len(), destination, self.sink.name());
        Ok(())
    }

    /// Exports `report` as `format` and saves the result.
    pub fn export_and_save(
        &self,
        report: &PopulatedReport,
        format: ExportFormat,
        destination: &str,
    ) -> Result<(), ReportError> {
        let output = self.export(report, format)?;
        self.save(output.as_bytes(), destination)
    }

    /// Compiles one `.source` file and writes its `.compiled` sibling through the sink.
    pub fn recompile(&self, source: &Path) -> Result<PathBuf, ReportError> {
        batch::recompile_file(source, self.sink.as_ref())
    }

    /// Recompiles every file with `extension` in `dir`. Per-file failures are
    /// collected in the summary; only a missing or unreadable directory fails
    /// the whole call.
    pub fn recompile_all(&self, dir: &Path, extension: &str, recursive: bool) -> Result<RecompileSummary, ReportError> {
        batch::recompile_all(dir, extension, recursive, self.sink.as_ref())
    }
}
