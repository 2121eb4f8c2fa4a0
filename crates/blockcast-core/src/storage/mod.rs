mod config;
mod state;

pub use config::Config;
pub use state::StateStore;

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns the blockcast data directory, creating it if needed.
///
/// `BLOCKCAST_DATA_DIR` overrides the location. Otherwise it is
/// `~/.config/blockcast[-dev]/`, with `BLOCKCAST_ENV=dev` selecting the
/// development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("BLOCKCAST_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("BLOCKCAST_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("blockcast-dev")
            } else {
                base_dir.join("blockcast")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| {
        StorageError::DataDirUnavailable(format!("{}: {e}", dir.display()))
    })?;
    Ok(dir)
}

/// Write `content` to `path` via a sibling temp file and rename.
pub(crate) fn write_atomic(path: &std::path::Path, content: &str) -> Result<(), StorageError> {
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, content).map_err(|source| StorageError::WriteFailed {
        path: tmp.clone(),
        source,
    })?;
    std::fs::rename(&tmp, path).map_err(|source| StorageError::WriteFailed {
        path: path.to_path_buf(),
        source,
    })
}
