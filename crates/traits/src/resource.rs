//! ResourceProvider trait for abstracting template storage.
//!
//! The template resolver reads `.source` and `.compiled` artifacts through this
//! trait so that it is not tied to the filesystem.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, RwLock};
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ResourceError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Failed to load resource '{path}': {message}")]
    LoadFailed { path: String, message: String },

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ResourceError {
    fn from(err: std::io::Error) -> Self {
        ResourceError::Io(err.to_string())
    }
}

/// Shared resource data type (reference-counted bytes).
pub type SharedResourceData = Arc<Vec<u8>>;

/// Loads template artifacts by path.
///
/// # Implementations
///
/// - `FilesystemResourceProvider` (in `folio-resource`): reads below a template directory
/// - [`InMemoryResourceProvider`]: pre-populated memory, for tests and embedding
pub trait ResourceProvider: Send + Sync + Debug {
    /// Load a resource by its path.
    fn load(&self, path: &str) -> Result<SharedResourceData, ResourceError>;

    /// Check if a resource exists.
    fn exists(&self, path: &str) -> bool;

    /// Returns a human-readable name for this provider (for logging).
    fn name(&self) -> &'static str;
}

impl<P: ResourceProvider + ?Sized> ResourceProvider for Arc<P> {
    fn load(&self, path: &str) -> Result<SharedResourceData, ResourceError> {
        (**self).load(path)
    }

    fn exists(&self, path: &str) -> bool {
        (**self).exists(path)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// An in-memory resource provider.
#[derive(Debug, Default)]
pub struct InMemoryResourceProvider {
    resources: RwLock<HashMap<String, SharedResourceData>>,
}

impl InMemoryResourceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource to the in-memory store, replacing any previous content.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::LoadFailed` if the internal lock is poisoned.
    pub fn add(&self, path: impl Into<String>, data: impl Into<Vec<u8>>) -> Result<(), ResourceError> {
        let path_string = path.into();
        let mut resources = self
            .resources
            .write()
            .map_err(|_| ResourceError::LoadFailed {
                path: path_string.clone(),
                message: "resource store lock poisoned".to_string(),
            })?;
        resources.insert(path_string, Arc::new(data.into()));
        Ok(())
    }

    /// Returns 0 if the lock is poisoned.
    pub fn len(&self) -> usize {
        self.resources.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResourceProvider for InMemoryResourceProvider {
    fn load(&self, path: &str) -> Result<SharedResourceData, ResourceError> {
        let resources = self
            .resources
            .read()
            .map_err(|_| ResourceError::LoadFailed {
                path: path.to_string(),
                message: "resource store lock poisoned".to_string(),
            })?;
        resources
            .get(path)
            .cloned()
            .ok_or_else(|| ResourceError::NotFound(path.to_string()))
    }

    fn exists(&self, path: &str) -> bool {
        self.resources
            .read()
            .map(|r| r.contains_key(path))
            .unwrap_or(false)
    }

    fn name(&self) -> &'static str {
        "InMemoryResourceProvider"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_provider_add_and_load() {
        let provider = InMemoryResourceProvider::new();
        provider.add("invoice.source", b"{}".to_vec()).unwrap();

        let data = provider.load("invoice.source").unwrap();
        assert_eq!(&*data, b"{}");
        assert!(provider.exists("invoice.source"));
    }

    #[test]
    fn test_in_memory_provider_not_found() {
        let provider = InMemoryResourceProvider::new();
        let result = provider.load("missing.compiled");
        assert!(matches!(result, Err(ResourceError::NotFound(_))));
        assert!(!provider.exists("missing.compiled"));
    }

    #[test]
    fn test_in_memory_provider_overwrite() {
        let provider = InMemoryResourceProvider::new();
        provider.add("a.source", "original").unwrap();
        provider.add("a.source", "updated").unwrap();

        assert_eq!(&*provider.load("a.source").unwrap(), b"updated");
        assert_eq!(provider.len(), 1);
    }

    #[test]
    fn test_shared_provider_delegates() {
        let provider = Arc::new(InMemoryResourceProvider::new());
        provider.add("x.source", "x").unwrap();
        let shared: Arc<InMemoryResourceProvider> = Arc::clone(&provider);
        assert!(shared.exists("x.source"));
        assert_eq!(ResourceProvider::name(&shared), "InMemoryResourceProvider");
    }

    #[test]
    fn test_resource_error_display() {
        let err = ResourceError::LoadFailed {
            path: "report.compiled".to_string(),
            message: "permission denied".to_string(),
        };
        assert!(err.to_string().contains("report.compiled"));
        assert!(err.to_string().contains("permission denied"));
    }
}
