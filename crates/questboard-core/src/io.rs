use crate::error::{QuestError, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Replace the file at `path` (in practice `.questboard/config.yaml`) with
/// `contents`.
///
/// The bytes are staged in a sibling temp file, flushed, and renamed over the
/// target, so a running server never loads a torn config. The workspace
/// directory is created when missing.
pub fn replace_file(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            ensure_directory(dir)?;
            dir
        }
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(contents)?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Make sure `dir` exists as a directory, creating parents as needed.
///
/// A regular file sitting where `.questboard/` should be is reported as a
/// validation error rather than a raw io error.
pub fn ensure_directory(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    if dir.exists() {
        return Err(QuestError::Validation(format!(
            "{} exists but is not a directory",
            dir.display()
        )));
    }
    std::fs::create_dir_all(dir)?;
    Ok(())
}
