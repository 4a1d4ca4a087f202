use std::path::Path;

use super::error::FilenameError;

/// Base filename and port count taken from a path such as `dir/BSL1.s2p`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    pub filename: String,
    pub ports: usize,
}

/// Just the base filename, using the platform's path separator.
pub fn base_name(path: &Path) -> Result<String, FilenameError> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| FilenameError::NoFileName(path.display().to_string()))
}

/// Base filename plus the port count encoded as the extension's second
/// character (`s2p` → 2).
pub fn parse(path: &Path) -> Result<FileMeta, FilenameError> {
    let filename = base_name(path)?;
    let ports = filename
        .rsplit_once('.')
        .and_then(|(_, ext)| ext.chars().nth(1))
        .and_then(|c| c.to_digit(10))
        .filter(|&d| d > 0)
        .ok_or_else(|| FilenameError::NoPortDigit {
            filename: filename.clone(),
        })?;

    Ok(FileMeta {
        filename,
        ports: ports as usize,
    })
}
