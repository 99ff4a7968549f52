use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_EXTENSION: &str = "source";

#[derive(Error, Debug)]
pub enum ListError {
    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Cannot read directory '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Lists the files in `dir` whose extension matches `extension`.
///
/// The leading dot is optional and an empty extension means `source`.
/// Results are sorted by path. A missing directory is an error, never an
/// empty listing.
pub fn list_files(dir: &Path, extension: &str, recursive: bool) -> Result<Vec<PathBuf>, ListError> {
    if !dir.is_dir() {
        return Err(ListError::DirectoryNotFound(dir.to_path_buf()));
    }
    let extension = match extension.trim_start_matches('.') {
        "" => DEFAULT_EXTENSION,
        ext => ext,
    };

    let mut files = Vec::new();
    collect(dir, extension, recursive, &mut files)?;
    files.sort();
    log::debug!("Found {} '.{}' files in {}", files.len(), extension, dir.display());
    Ok(files)
}

fn collect(dir: &Path, extension: &str, recursive: bool, files: &mut Vec<PathBuf>) -> Result<(), ListError> {
    let io = |source| ListError::Io {
        path: dir.to_path_buf(),
        source,
    };
    for entry in std::fs::read_dir(dir).map_err(io)? {
        let path = entry.map_err(io)?.path();
        if path.is_dir() {
            if recursive {
                collect(&path, extension, recursive, files)?;
            }
        } else if path.extension().is_some_and(|e| e == extension) {
            files.push(path);
        }
    }
    Ok(())
}
