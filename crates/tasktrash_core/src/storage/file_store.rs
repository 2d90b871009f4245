use super::KeyValueStore;
use crate::error::AppError;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const STORE_DIR_NAME: &str = "tasktrash";
const STORE_PATH_ENV_VAR: &str = "TASKTRASH_STORE_PATH";

pub fn store_path_override() -> Option<PathBuf> {
    std::env::var(STORE_PATH_ENV_VAR)
        .ok()
        .filter(|path| !path.trim().is_empty())
        .map(PathBuf::from)
}

pub fn store_path(namespace: &str) -> Result<PathBuf, AppError> {
    match store_path_override() {
        Some(path) => Ok(path),
        None => default_store_path(namespace),
    }
}

fn default_store_path(namespace: &str) -> Result<PathBuf, AppError> {
    let file_name = format!("{namespace}.json");
    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join(STORE_DIR_NAME).join(file_name))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join(STORE_DIR_NAME)
            .join(file_name))
    }
}

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, AppError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = std::fs::read_to_string(&self.path)
            .map_err(|err| AppError::io(format!("{}: {}", self.path.display(), err)))?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|err| {
            AppError::invalid_data(format!("invalid JSON in {}: {}", self.path.display(), err))
        })
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(entries)?;
        let staging = staging_path(&self.path);
        std::fs::write(&staging, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&staging, permissions)?;
        }

        std::fs::rename(&staging, &self.path)?;
        debug!("wrote {} key(s) to {}", entries.len(), self.path.display());
        Ok(())
    }

    /// Entries to build the next write on. A corrupt file is replaced, not merged.
    fn entries_for_write(&self) -> Result<BTreeMap<String, String>, AppError> {
        match self.read_entries() {
            Ok(entries) => Ok(entries),
            Err(AppError::InvalidData(message)) => {
                warn!("discarding corrupt store file: {message}");
                Ok(BTreeMap::new())
            }
            Err(err) => Err(err),
        }
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        let mut entries = self.entries_for_write()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), AppError> {
        let mut entries = self.entries_for_write()?;
        if entries.remove(key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}
