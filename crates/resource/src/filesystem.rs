//! Template storage on the local filesystem.
//!
//! A provider with a template directory resolves identifiers relative to it
//! and refuses absolute paths and paths that climb out of the directory. An
//! unconfined provider takes identifiers as plain paths.

use folio_traits::{ResourceError, ResourceProvider, SharedResourceData};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Loads template artifacts from a template directory.
///
/// The directory does not have to exist when the provider is created; lookups
/// against a missing directory simply report `NotFound`.
#[derive(Debug, Clone)]
pub struct FilesystemResourceProvider {
    template_dir: PathBuf,
    // Canonical form of `template_dir`, when it exists.
    canonical_dir: Option<PathBuf>,
    confined: bool,
}

impl FilesystemResourceProvider {
    pub fn new(template_dir: impl AsRef<Path>) -> Self {
        let template_dir = template_dir.as_ref().to_path_buf();
        let canonical_dir = template_dir.canonicalize().ok();
        Self {
            template_dir,
            canonical_dir,
            confined: true,
        }
    }

    /// A provider that loads any absolute path, or any path relative to the
    /// working directory, as given.
    pub fn unconfined() -> Self {
        Self {
            template_dir: PathBuf::from("."),
            canonical_dir: None,
            confined: false,
        }
    }

    pub fn template_dir(&self) -> &Path {
        &self.template_dir
    }

    /// Maps an identifier to a path inside the template directory.
    fn resolve(&self, identifier: &str) -> Result<PathBuf, ResourceError> {
        let relative = Path::new(identifier);
        if !self.confined {
            return Ok(relative.to_path_buf());
        }
        let escapes = relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_) | Component::RootDir));
        if escapes {
            return Err(ResourceError::NotFound(format!(
                "{} (outside the template directory)",
                identifier
            )));
        }

        let path = self.template_dir.join(relative);
        // Symlinks may still point elsewhere.
        if let (Ok(canonical), Some(base)) = (path.canonicalize(), &self.canonical_dir)
            && !canonical.starts_with(base)
        {
            return Err(ResourceError::NotFound(format!(
                "{} (outside the template directory)",
                identifier
            )));
        }
        Ok(path)
    }
}

impl ResourceProvider for FilesystemResourceProvider {
    fn load(&self, path: &str) -> Result<SharedResourceData, ResourceError> {
        let full_path = self.resolve(path)?;
        log::debug!("Loading template resource {}", full_path.display());
        std::fs::read(&full_path).map(Arc::new).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ResourceError::NotFound(path.to_string()),
            _ => ResourceError::LoadFailed {
                path: path.to_string(),
                message: e.to_string(),
            },
        })
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_ok_and(|p| p.is_file())
    }

    fn name(&self) -> &'static str {
        "FilesystemResourceProvider"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_existing_template() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("invoice.source"), b"{}").unwrap();

        let provider = FilesystemResourceProvider::new(dir.path());
        assert_eq!(&*provider.load("invoice.source").unwrap(), b"{}");
        assert!(provider.exists("invoice.source"));
    }

    #[test]
    fn test_unconfined_loads_absolute_paths() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hello.source");
        fs::write(&path, b"{}").unwrap();
        let identifier = path.to_str().unwrap();

        let provider = FilesystemResourceProvider::unconfined();
        assert_eq!(&*provider.load(identifier).unwrap(), b"{}");
        assert!(provider.exists(identifier));

        let confined = FilesystemResourceProvider::new(dir.path());
        assert!(matches!(confined.load(identifier), Err(ResourceError::NotFound(_))));
    }

    #[test]
    fn test_missing_template_is_not_found() {
        let dir = tempdir().unwrap();
        let provider = FilesystemResourceProvider::new(dir.path());

        assert!(matches!(provider.load("report.compiled"), Err(ResourceError::NotFound(_))));
        assert!(!provider.exists("report.compiled"));
    }

    #[test]
    fn test_missing_template_dir_is_not_found() {
        let dir = tempdir().unwrap();
        let provider = FilesystemResourceProvider::new(dir.path().join("absent"));
        assert!(matches!(provider.load("report.compiled"), Err(ResourceError::NotFound(_))));
    }

    #[test]
    fn test_directories_do_not_exist_as_templates() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("nested.source")).unwrap();
        let provider = FilesystemResourceProvider::new(dir.path());
        assert!(!provider.exists("nested.source"));
    }

    #[test]
    fn test_nested_paths_are_allowed() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("sales")).unwrap();
        fs::write(dir.path().join("sales/q1.source"), b"q1").unwrap();

        let provider = FilesystemResourceProvider::new(dir.path());
        assert_eq!(&*provider.load("sales/q1.source").unwrap(), b"q1");
    }

    #[test]
    fn test_traversal_is_refused() {
        let outer = tempdir().unwrap();
        fs::create_dir(outer.path().join("templates")).unwrap();
        fs::write(outer.path().join("secret.source"), b"secret").unwrap();

        let provider = FilesystemResourceProvider::new(outer.path().join("templates"));
        assert!(provider.load("../secret.source").is_err());
        assert!(!provider.exists("../secret.source"));
        assert!(!provider.exists("a/../../secret.source"));
        assert!(provider.load("/etc/passwd").is_err());
    }
}
