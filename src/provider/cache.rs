//! On-disk cache of raw daily payloads (`YYYY-MM-DD_data.json`)

use crate::error::Result;
use crate::logging::get_logger;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}_data.json", date.format("%Y-%m-%d")))
    }

    /// Cached body for `date`; unreadable files count as a miss
    pub fn read(&self, date: NaiveDate) -> Option<String> {
        let path = self.path_for(date);
        if !path.exists() {
            return None;
        }
        match std::fs::read_to_string(&path) {
            Ok(body) => {
                get_logger("cache").info(&format!("Using cached data from {}", path.display()));
                Some(body)
            }
            Err(e) => {
                get_logger("cache").error(&format!(
                    "Error reading cached data from {}: {}",
                    path.display(),
                    e
                ));
                None
            }
        }
    }

    /// Store a body, creating the directory if needed
    pub fn write(&self, date: NaiveDate, body: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(date);
        std::fs::write(&path, body)?;
        get_logger("cache").info(&format!("Data saved to cache: {}", path.display()));
        Ok(path)
    }

    /// Drop the cached body for `date`, if any
    pub fn invalidate(&self, date: NaiveDate) -> Result<()> {
        let path = self.path_for(date);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}
