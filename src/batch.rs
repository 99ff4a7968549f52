//! Batch recompilation of `.source` templates into `.compiled` artifacts.

use crate::error::ReportError;
use folio_resource::list_files;
use folio_template_core::{COMPILED_EXTENSION, compile};
use folio_traits::ReportSink;
use std::path::{Path, PathBuf};

/// What happened to one file of a batch.
#[derive(Debug)]
pub struct RecompileOutcome {
    pub source: PathBuf,
    /// The written artifact path, or why the file was skipped.
    pub result: Result<PathBuf, ReportError>,
}

impl RecompileOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-file results of a batch recompile, in listing order.
#[derive(Debug, Default)]
pub struct RecompileSummary {
    outcomes: Vec<RecompileOutcome>,
}

impl RecompileSummary {
    pub fn outcomes(&self) -> &[RecompileOutcome] {
        &self.outcomes
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &RecompileOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(RecompileOutcome::is_ok)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Compiles `source` and writes the artifact next to it (same stem, `.compiled`).
pub fn recompile_file(source: &Path, sink: &dyn ReportSink) -> Result<PathBuf, ReportError> {
    let identifier = source.display().to_string();
    let bytes = std::fs::read(source).map_err(ReportError::io(source))?;
    let template = compile(&bytes).map_err(|source| ReportError::TemplateCompile {
        identifier: identifier.clone(),
        source,
    })?;
    let artifact = template.to_artifact().map_err(|source| ReportError::Artifact {
        identifier: identifier.clone(),
        source,
    })?;

    let target = source.with_extension(COMPILED_EXTENSION);
    sink.write(&artifact, &target.to_string_lossy())?;
    log::debug!("Recompiled {} -> {}", identifier, target.display());
    Ok(target)
}

/// Recompiles every matching file in `dir`. One failing file never stops
/// the others; each gets its own outcome.
pub fn recompile_all(
    dir: &Path,
    extension: &str,
    recursive: bool,
    sink: &dyn ReportSink,
) -> Result<RecompileSummary, ReportError> {
    let files = list_files(dir, extension, recursive)?;
    let outcomes: Vec<RecompileOutcome> = files
        .into_iter()
        .map(|source| {
            let result = recompile_file(&source, sink);
            if let Err(e) = &result {
                log::warn!("Skipping {}: {}", source.display(), e);
            }
            RecompileOutcome { source, result }
        })
        .collect();

    let summary = RecompileSummary { outcomes };
    log::info!(
        "Recompiled {} of {} templates in {}",
        summary.succeeded(),
        summary.len(),
        dir.display()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_resource::FileSink;
    use folio_template_core::CompiledTemplate;
    use std::fs;
    use tempfile::tempdir;

    const VALID: &str = r#"{"name": "ok", "bands": {"title": {"height": 20, "elements": [
        {"type": "staticText", "x": 0, "y": 0, "width": 100, "height": 20, "text": "Hi"}]}}}"#;

    #[test]
    fn test_recompile_writes_sibling_artifact() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("ok.source");
        fs::write(&source, VALID).unwrap();

        let target = recompile_file(&source, &FileSink::new()).unwrap();
        assert_eq!(target, dir.path().join("ok.compiled"));
        let template = CompiledTemplate::from_artifact(&fs::read(&target).unwrap()).unwrap();
        assert_eq!(template.name(), "ok");
    }

    #[test]
    fn test_one_failure_does_not_stop_the_batch() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.source"), VALID).unwrap();
        fs::write(dir.path().join("b.source"), "{ not json").unwrap();
        fs::write(dir.path().join("c.source"), VALID).unwrap();

        let summary = recompile_all(dir.path(), "source", false, &FileSink::new()).unwrap();
        assert_eq!(summary.len(), 3);
        assert_eq!(summary.succeeded(), 2);
        assert!(!summary.is_success());

        let failed: Vec<_> = summary.failures().collect();
        assert_eq!(failed.len(), 1);
        assert!(failed[0].source.ends_with("b.source"));
        assert!(matches!(failed[0].result, Err(ReportError::TemplateCompile { .. })));
        assert!(dir.path().join("a.compiled").exists());
        assert!(dir.path().join("c.compiled").exists());
        assert!(!dir.path().join("b.compiled").exists());
    }

    #[test]
    fn test_missing_directory_fails_the_batch() {
        let dir = tempdir().unwrap();
        let err = recompile_all(&dir.path().join("absent"), "source", false, &FileSink::new()).unwrap_err();
        assert!(matches!(err, ReportError::DirectoryNotFound(_)));
    }
}
