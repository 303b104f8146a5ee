//! Atomic file writes.
//!
//! Writes go to a hidden temp file in the target directory, are synced to
//! disk, and are then renamed over the target. On POSIX `rename()` replaces
//! the destination atomically, so readers observe either the old record or
//! the new one, never a partial write. Source and target must live on the
//! same filesystem. A crash can leave a `.{filename}.tmp` file behind.

use crate::error::{AgentryError, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Atomically write bytes to `path`, creating parent directories as needed.
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            AgentryError::UserError(format!(
                "failed to create directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let temp_path = temp_path_for(path)?;
    write_and_sync(&temp_path, content)?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        AgentryError::UserError(format!("failed to replace '{}': {}", path.display(), e))
    })?;

    // Sync the directory entry as well so the rename itself is durable.
    if let Some(parent) = path.parent()
        && let Ok(dir) = File::open(parent)
    {
        let _ = dir.sync_all();
    }

    Ok(())
}

/// String convenience wrapper around [`atomic_write`].
pub fn atomic_write_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

fn temp_path_for(target: &Path) -> Result<PathBuf> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AgentryError::UserError("invalid file path".to_string()))?;
    Ok(parent.join(format!(".{}.tmp", filename)))
}

fn write_and_sync(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| {
        AgentryError::UserError(format!(
            "failed to create temporary file '{}': {}",
            path.display(),
            e
        ))
    })?;

    file.write_all(content)
        .and_then(|_| file.sync_all())
        .map_err(|e| {
            let _ = fs::remove_file(path);
            AgentryError::UserError(format!("failed to write '{}': {}", path.display(), e))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_writes_new_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("agent.json");

        atomic_write(&path, b"{\"id\": 1}").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"id\": 1}");
    }

    #[test]
    fn test_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("agent.json");
        fs::write(&path, "old").unwrap();

        atomic_write(&path, b"new").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("agents").join("7.json");

        atomic_write_file(&path, "{}").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("agent.json");

        atomic_write(&path, b"content").unwrap();

        assert!(!dir.path().join(".agent.json.tmp").exists());
    }

    #[test]
    fn test_empty_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.json");

        atomic_write(&path, b"").unwrap();

        assert!(fs::read(&path).unwrap().is_empty());
    }

    #[test]
    fn test_temp_path_in_same_directory() {
        let temp = temp_path_for(Path::new("/data/agents/3.json")).unwrap();
        assert_eq!(temp, Path::new("/data/agents/.3.json.tmp"));
    }
}
