//! Atomic key-value TOML file.
//!
//! The persisted state is a flat TOML table of string values. Writes go to a
//! temporary sibling, are fsynced, then renamed over the target, all under an
//! exclusive lock on a `.lock` sibling.

use clauseguard_core::error::{ClauseError, Result};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

/// The on-disk document: key -> value.
pub type StateTable = BTreeMap<String, String>;

/// Handle to a key-value TOML file. Blocking; call from `spawn_blocking`.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the table. A missing or blank file reads as empty.
    pub fn read(&self) -> Result<StateTable> {
        if !self.path.exists() {
            return Ok(StateTable::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(StateTable::new());
        }

        Ok(toml::from_str(&content)?)
    }

    /// Applies `f` to the current table and writes the result back.
    ///
    /// Read, change and write happen under one exclusive lock. Nothing is
    /// written if `f` reports that the table is unchanged.
    pub fn modify<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut StateTable) -> bool,
    {
        let _lock = FileLock::acquire(&self.path)?;

        let mut table = self.read()?;
        if f(&mut table) {
            self.write(&table)?;
        }
        Ok(())
    }

    fn write(&self, table: &StateTable) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(table)?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(content.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| ClauseError::io("State path has no parent directory"))?;
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| ClauseError::io("State path has no file name"))?;

        Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
    }
}

/// Exclusive lock on `<path>.lock`, released on drop.
struct FileLock {
    file: File,
    lock_path: PathBuf,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self> {
        let lock_path = path.with_extension("lock");
        if let Some(parent) = lock_path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        fs2::FileExt::lock_exclusive(&file)
            .map_err(|e| ClauseError::io(format!("Failed to acquire state lock: {}", e)))?;

        Ok(Self { file, lock_path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
        let _ = fs::remove_file(&self.lock_path);
    }
}
