//! JSON-file store for predictor attributes, one file per unique id.

use std::path::{Path, PathBuf};

use super::{data_dir, write_atomic};
use crate::error::StorageError;
use crate::predictor::PredictorAttributes;

/// Sub-directory of the data directory holding state files.
const STATE_DIR: &str = "state";

#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    /// Store rooted at `dir`, created if missing.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            StorageError::DataDirUnavailable(format!("{}: {e}", dir.display()))
        })?;
        Ok(Self { dir })
    }

    /// Store under `<data_dir>/state`.
    pub fn open_default() -> Result<Self, StorageError> {
        Self::new(data_dir()?.join(STATE_DIR))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, unique_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize(unique_id)))
    }

    /// Load stored attributes, `None` if nothing was saved yet.
    pub fn load(&self, unique_id: &str) -> Result<Option<PredictorAttributes>, StorageError> {
        let path = self.path_for(unique_id);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StorageError::ReadFailed { path, source }),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| StorageError::DecodeFailed {
                path,
                message: e.to_string(),
            })
    }

    pub fn save(
        &self,
        unique_id: &str,
        attributes: &PredictorAttributes,
    ) -> Result<(), StorageError> {
        let path = self.path_for(unique_id);
        let content = serde_json::to_string_pretty(attributes).map_err(|e| {
            StorageError::DecodeFailed {
                path: path.clone(),
                message: e.to_string(),
            }
        })?;
        write_atomic(&path, &content)
    }

    /// Delete stored attributes. Returns whether anything was removed.
    pub fn remove(&self, unique_id: &str) -> Result<bool, StorageError> {
        let path = self.path_for(unique_id);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StorageError::WriteFailed { path, source }),
        }
    }
}

/// Keep ids usable as file names.
fn sanitize(unique_id: &str) -> String {
    unique_id
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' => c,
            _ => '_',
        })
        .collect()
}
