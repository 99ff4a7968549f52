//! Turns a template identifier into a [`CompiledTemplate`].

use crate::compiled::CompiledTemplate;
use crate::compiler::compile;
use crate::error::{LoadError, TemplateError};
use crate::identifier::{TemplateForm, TemplateIdentifier};
use folio_traits::ResourceProvider;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, RwLock};

/// Resolves template identifiers. Implemented by [`TemplateResolver`] and [`CachingResolver`].
pub trait ResolveTemplate: Send + Sync + Debug {
    fn resolve(&self, identifier: &str) -> Result<Arc<CompiledTemplate>, TemplateError>;
}

/// Resolves identifiers against a [`ResourceProvider`].
///
/// The extension alone decides the path taken: `.compiled` artifacts are
/// loaded, `.source` files are compiled, and anything else is rejected before
/// the provider is touched.
#[derive(Debug)]
pub struct TemplateResolver<P: ResourceProvider> {
    provider: P,
}

impl<P: ResourceProvider> TemplateResolver<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Reads and compiles a `.source` template, whatever the resolver would do with it.
    pub fn compile_source(&self, identifier: &TemplateIdentifier) -> Result<CompiledTemplate, TemplateError> {
        let bytes = self
            .provider
            .load(identifier.as_str())
            .map_err(|e| TemplateError::load(identifier.as_str(), e))?;
        compile(&bytes).map_err(|e| TemplateError::compile(identifier.as_str(), e))
    }

    fn load_compiled(&self, identifier: &TemplateIdentifier) -> Result<CompiledTemplate, TemplateError> {
        let load = || -> Result<CompiledTemplate, LoadError> {
            let bytes = self.provider.load(identifier.as_str())?;
            CompiledTemplate::from_artifact(&bytes)
        };
        load().map_err(|e| TemplateError::load(identifier.as_str(), e))
    }
}

impl<P: ResourceProvider> ResolveTemplate for TemplateResolver<P> {
    fn resolve(&self, identifier: &str) -> Result<Arc<CompiledTemplate>, TemplateError> {
        let id = TemplateIdentifier::parse(identifier)
            .ok_or_else(|| TemplateError::UnsupportedFormat(identifier.to_string()))?;

        log::debug!("Resolving template '{}' via {}", identifier, self.provider.name());
        let template = match id.form() {
            TemplateForm::Compiled => self.load_compiled(&id)?,
            TemplateForm::Source => self.compile_source(&id)?,
        };
        log::info!("Resolved template '{}' ({})", template.name(), identifier);
        Ok(Arc::new(template))
    }
}

/// Memoizes another resolver by identifier. Failures are not cached.
#[derive(Debug)]
pub struct CachingResolver<R: ResolveTemplate> {
    inner: R,
    cache: RwLock<HashMap<String, Arc<CompiledTemplate>>>,
}

impl<R: ResolveTemplate> CachingResolver<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Drops all cached templates. Returns 0 removed if the lock is poisoned.
    pub fn clear(&self) -> usize {
        self.cache
            .write()
            .map(|mut cache| {
                let count = cache.len();
                cache.clear();
                count
            })
            .unwrap_or(0)
    }

    pub fn cached(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }
}

impl<R: ResolveTemplate> ResolveTemplate for CachingResolver<R> {
    fn resolve(&self, identifier: &str) -> Result<Arc<CompiledTemplate>, TemplateError> {
        if let Ok(cache) = self.cache.read()
            && let Some(template) = cache.get(identifier)
        {
            log::debug!("Template cache hit for '{}'", identifier);
            return Ok(Arc::clone(template));
        }

        let template = self.inner.resolve(identifier)?;
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(identifier.to_string(), Arc::clone(&template));
        }
        Ok(template)
    }
}

impl<R: ResolveTemplate + ?Sized> ResolveTemplate for Arc<R> {
    fn resolve(&self, identifier: &str) -> Result<Arc<CompiledTemplate>, TemplateError> {
        (**self).resolve(identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_traits::{InMemoryResourceProvider, ResourceError, SharedResourceData};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts every call that would touch storage.
    #[derive(Debug, Default)]
    struct CountingProvider {
        inner: InMemoryResourceProvider,
        calls: AtomicUsize,
    }

    impl CountingProvider {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ResourceProvider for CountingProvider {
        fn load(&self, path: &str) -> Result<SharedResourceData, ResourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.load(path)
        }

        fn exists(&self, path: &str) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.exists(path)
        }

        fn name(&self) -> &'static str {
            "CountingProvider"
        }
    }

    fn source_bytes() -> Vec<u8> {
        serde_json::to_vec(&json!({
            "name": "invoice",
            "bands": {"title": {"height": 20, "elements": [
                {"type": "staticText", "x": 0, "y": 0, "width": 100, "height": 20, "text": "Invoice"}
            ]}}
        }))
        .unwrap()
    }

    #[test]
    fn test_unsupported_extension_does_no_io() {
        let resolver = TemplateResolver::new(Arc::new(CountingProvider::default()));

        let err = resolver.resolve("report.txt").unwrap_err();
        assert!(matches!(err, TemplateError::UnsupportedFormat(ref id) if id == "report.txt"));

        let err = resolver.resolve("/no/such/dir/report.txt").unwrap_err();
        assert!(matches!(err, TemplateError::UnsupportedFormat(_)));
        assert_eq!(resolver.provider().calls(), 0);
    }

    #[test]
    fn test_missing_compiled_is_a_load_error() {
        let resolver = TemplateResolver::new(InMemoryResourceProvider::new());
        match resolver.resolve("report.compiled") {
            Err(TemplateError::Load { identifier, source: LoadError::Resource(ResourceError::NotFound(_)) }) => {
                assert_eq!(identifier, "report.compiled")
            }
            other => panic!("expected load error, got {:?}", other),
        }
    }

    #[test]
    fn test_source_is_compiled() {
        let provider = InMemoryResourceProvider::new();
        provider.add("invoice.source", source_bytes()).unwrap();
        let template = TemplateResolver::new(provider).resolve("invoice.source").unwrap();
        assert_eq!(template.name(), "invoice");
    }

    #[test]
    fn test_compiled_is_loaded() {
        let compiled = compile(&source_bytes()).unwrap().to_artifact().unwrap();
        let provider = InMemoryResourceProvider::new();
        provider.add("invoice.compiled", compiled).unwrap();
        let template = TemplateResolver::new(provider).resolve("invoice.compiled").unwrap();
        assert_eq!(template.name(), "invoice");
    }

    #[test]
    fn test_source_bytes_under_compiled_name_fail_to_load() {
        let provider = InMemoryResourceProvider::new();
        provider.add("invoice.compiled", source_bytes()).unwrap();
        let err = TemplateResolver::new(provider).resolve("invoice.compiled").unwrap_err();
        assert!(matches!(err, TemplateError::Load { .. }));
    }

    #[test]
    fn test_broken_source_is_a_compile_error() {
        let provider = InMemoryResourceProvider::new();
        provider.add("broken.source", "{\"name\": ").unwrap();
        let err = TemplateResolver::new(provider).resolve("broken.source").unwrap_err();
        assert!(matches!(err, TemplateError::Compile { .. }));
        assert!(err.to_string().contains("broken.source"));
    }

    #[test]
    fn test_caching_resolver_loads_once() {
        let provider = Arc::new(CountingProvider::default());
        provider.inner.add("invoice.source", source_bytes()).unwrap();
        let resolver = CachingResolver::new(TemplateResolver::new(Arc::clone(&provider)));

        let first = resolver.resolve("invoice.source").unwrap();
        let second = resolver.resolve("invoice.source").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(provider.calls(), 1);
        assert_eq!(resolver.cached(), 1);

        assert_eq!(resolver.clear(), 1);
        resolver.resolve("invoice.source").unwrap();
        assert_eq!(provider.calls(), 2);
    }

    #[test]
    fn test_caching_resolver_does_not_cache_failures() {
        let provider = Arc::new(CountingProvider::default());
        let resolver = CachingResolver::new(TemplateResolver::new(Arc::clone(&provider)));

        assert!(resolver.resolve("late.source").is_err());
        provider.inner.add("late.source", source_bytes()).unwrap();
        assert!(resolver.resolve("late.source").is_ok());
        assert_eq!(resolver.cached(), 1);
    }
}
