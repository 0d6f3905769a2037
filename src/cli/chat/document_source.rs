use std::fs;
use std::path::{Path, PathBuf};

use eyre::{eyre, Result};

/// A document read from disk, ready to hand to a session.
#[derive(Debug)]
pub struct SourceFile {
    pub name: String,
    pub extension: String,
    pub bytes: Vec<u8>,
}

/// Read the file at `path`. The extension (lower-cased, with its leading
/// dot) decides how the content is parsed later.
///
/// # Errors
///
/// Returns an error if the path does not exist, is not a file, or cannot be
/// read.
pub fn read_document(path: &str) -> Result<SourceFile> {
    let path = sanitize_path(path);
    if !path.exists() {
        return Err(eyre!("File not found: {}", path.display()));
    }
    if !path.is_file() {
        return Err(eyre!("Not a file: {}", path.display()));
    }

    let bytes =
        fs::read(&path).map_err(|e| eyre!("Failed to read file {}: {}", path.display(), e))?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let extension = path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default();

    Ok(SourceFile {
        name,
        extension,
        bytes,
    })
}

/// Expand `~` and resolve relative paths against the current directory.
pub fn sanitize_path(path: &str) -> PathBuf {
    let path = path.trim();

    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }

    let path_buf = Path::new(path);
    if path_buf.is_relative() {
        if let Ok(current_dir) = std::env::current_dir() {
            return current_dir.join(path_buf);
        }
    }

    path_buf.to_path_buf()
}
