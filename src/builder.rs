// src/builder.rs
use crate::engine::ReportEngine;
use folio_export_core::{DocxConfig, ExportSettings, PptxConfig, XlsxConfig};
use folio_resource::{FileSink, FilesystemResourceProvider};
use folio_template_core::{CachingResolver, ResolveTemplate, TemplateResolver};
use folio_traits::{ReportSink, ResourceProvider};
use std::path::Path;
use std::sync::Arc;

/// A builder for creating a [`ReportEngine`].
///
/// Defaults: template identifiers are plain file paths (absolute, or
/// relative to the working directory), compiled templates are not cached, documents are saved with a [`FileSink`], and
/// every exporter uses its default configuration.
pub struct ReportEngineBuilder {
    provider: Option<Arc<dyn ResourceProvider>>,
    caching: bool,
    sink: Option<Arc<dyn ReportSink>>,
    settings: ExportSettings,
}

impl Default for ReportEngineBuilder {
    fn default() -> Self {
        Self {
            provider: None,
            caching: false,
            sink: None,
            settings: ExportSettings::default(),
        }
    }
}

impl ReportEngineBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Reads templates from files below `dir`. Identifiers that are absolute
    /// or climb out of `dir` are refused.
    pub fn with_template_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.provider = Some(Arc::new(FilesystemResourceProvider::new(dir)));
        self
    }

    /// Reads templates through a custom provider (in-memory, remote, ...).
    pub fn with_provider<P: ResourceProvider + 'static>(mut self, provider: P) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    /// Keeps resolved templates in memory, keyed by identifier.
    pub fn with_caching(mut self, caching: bool) -> Self {
        self.caching = caching;
        self
    }

    pub fn with_sink<S: ReportSink + 'static>(mut self, sink: S) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    pub fn with_shared_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_export_settings(mut self, settings: ExportSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_xlsx_config(mut self, config: XlsxConfig) -> Self {
        self.settings.xlsx = config;
        self
    }

    pub fn with_docx_config(mut self, config: DocxConfig) -> Self {
        self.settings.docx = config;
        self
    }

    pub fn with_pptx_config(mut self, config: PptxConfig) -> Self {
        self.settings.pptx = config;
        self
    }

    pub fn build(self) -> ReportEngine {
        let provider = self
            .provider
            .unwrap_or_else(|| Arc::new(FilesystemResourceProvider::unconfined()));
        let resolver = TemplateResolver::new(provider);
        let resolver: Arc<dyn ResolveTemplate> = if self.caching {
            log::debug!("Template caching enabled");
            Arc::new(CachingResolver::new(resolver))
        } else {
            Arc::new(resolver)
        };
        let sink = self.sink.unwrap_or_else(|| Arc::new(FileSink::new()));
        ReportEngine::new(resolver, sink, self.settings)
    }
}
