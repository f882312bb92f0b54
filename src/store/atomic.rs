//! Atomic document writes
//!
//! 1. Write to `<file>.tmp` next to the target
//! 2. `sync_all()` to flush to disk
//! 3. Rename over the target (atomic on most filesystems)
//!
//! A reader therefore sees either the previous document or the new one,
//! never a truncated file.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Temp file used while `path` is being replaced
pub(crate) fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("document"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Atomically replace `path` with `content`, creating parent directories
pub(crate) async fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let temp = temp_path(path);
    let result = async {
        let mut file = fs::File::create(&temp).await?;
        file.write_all(content).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&temp, path).await
    }
    .await;

    if result.is_err() {
        let _ = fs::remove_file(&temp).await;
    }
    result
}
