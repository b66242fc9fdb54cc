//! Loading and saving source files.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8")]
    InvalidUtf8 { path: PathBuf },

    #[error("{path} has no parent directory")]
    NoParent { path: PathBuf },

    #[error("{path} changed on disk since it was loaded")]
    ChangedOnDisk { path: PathBuf },
}

/// A source file and the content hash it had when last read or written.
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    text: String,
    fingerprint: u64,
}

impl Document {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref().to_path_buf();
        let bytes = fs::read(&path).map_err(|source| DocumentError::Io {
            path: path.clone(),
            source,
        })?;
        let text =
            String::from_utf8(bytes).map_err(|_| DocumentError::InvalidUtf8 { path: path.clone() })?;
        let fingerprint = xxh3_64(text.as_bytes());
        tracing::debug!(path = %path.display(), bytes = text.len(), "document loaded");

        Ok(Self {
            path,
            text,
            fingerprint,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// True when the file no longer holds what was last loaded or saved.
    pub fn changed_on_disk(&self) -> Result<bool, DocumentError> {
        let bytes = fs::read(&self.path).map_err(|source| DocumentError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(xxh3_64(&bytes) != self.fingerprint)
    }

    /// Write `text` back, refusing if someone else changed the file first.
    pub fn save(&mut self, text: &str) -> Result<(), DocumentError> {
        if self.changed_on_disk()? {
            return Err(DocumentError::ChangedOnDisk {
                path: self.path.clone(),
            });
        }
        self.overwrite(text)
    }

    /// Write `text` back unconditionally.
    pub fn overwrite(&mut self, text: &str) -> Result<(), DocumentError> {
        atomic_write(&self.path, text.as_bytes())?;
        self.text = text.to_string();
        self.fingerprint = xxh3_64(text.as_bytes());
        tracing::info!(path = %self.path.display(), bytes = text.len(), "document saved");
        Ok(())
    }
}

/// Tempfile in the same directory, fsync, rename, then bump the mtime so
/// file watchers notice.
fn atomic_write(path: &Path, content: &[u8]) -> Result<(), DocumentError> {
    let io = |source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    };
    let parent = match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
        Some(parent) => parent,
        None => {
            return Err(DocumentError::NoParent {
                path: path.to_path_buf(),
            })
        }
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(io)?;
    temp.write_all(content).map_err(io)?;
    temp.as_file().sync_all().map_err(io)?;
    temp.persist(path).map_err(|error| io(error.error))?;

    filetime::set_file_mtime(path, filetime::FileTime::now()).map_err(io)?;
    Ok(())
}
