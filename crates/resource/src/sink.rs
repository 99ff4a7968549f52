use folio_traits::{ReportSink, SinkError};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes documents to files.
///
/// Destinations are file paths, resolved against an optional output
/// directory. An existing file is truncated; the data is flushed and synced
/// before `write` returns.
#[derive(Debug, Clone, Default)]
pub struct FileSink {
    output_dir: Option<PathBuf>,
}

impl FileSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves relative destinations against `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: Some(dir.as_ref().to_path_buf()),
        }
    }

    pub fn path_for(&self, destination: &str) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.join(destination),
            None => PathBuf::from(destination),
        }
    }
}

impl ReportSink for FileSink {
    fn write(&self, bytes: &[u8], destination: &str) -> Result<(), SinkError> {
        let path = self.path_for(destination);
        let fail = |source| SinkError::Write {
            destination: path.display().to_string(),
            source,
        };

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(fail)?;
        file.write_all(bytes).map_err(fail)?;
        file.flush().map_err(fail)?;
        file.sync_all().map_err(fail)?;

        log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "FileSink"
    }
}
