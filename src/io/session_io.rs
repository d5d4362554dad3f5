use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::model::session::Session;

/// Error type for session file operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("could not write session to {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not encode session: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Read the stored session. A missing or unreadable file means signed out.
pub fn read_session(path: &Path) -> Session {
    let Ok(content) = fs::read_to_string(path) else {
        return Session::anonymous();
    };
    serde_json::from_str(&content).unwrap_or_else(|e| {
        tracing::warn!("ignoring unreadable session file {}: {e}", path.display());
        Session::anonymous()
    })
}

/// Write the session atomically: a reader sees either the old file or the new one.
pub fn write_session(path: &Path, session: &Session) -> Result<(), SessionError> {
    let write_err = |source| SessionError::WriteError {
        path: path.to_path_buf(),
        source,
    };
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(write_err)?;

    let content = serde_json::to_string_pretty(session)?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(content.as_bytes()).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

/// Remove the stored session. Returns whether a session existed.
pub fn clear_session(path: &Path) -> std::io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
