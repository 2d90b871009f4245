use crate::error::AppError;
use crate::storage::{store_path, store_path_override};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "TASKTRASH_CONFIG_PATH";
pub const DEFAULT_NAMESPACE: &str = "default";

pub fn canonical_name(raw: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub store_path: Option<PathBuf>,
}

impl Config {
    pub fn namespace(&self) -> String {
        self.namespace
            .as_deref()
            .and_then(canonical_name)
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string())
    }

    /// `TASKTRASH_STORE_PATH`, then `store_path`, then the per-namespace default.
    pub fn resolve_store_path(&self) -> Result<PathBuf, AppError> {
        if let Some(path) = store_path_override() {
            return Ok(path);
        }
        match &self.store_path {
            Some(path) => Ok(path.clone()),
            None => store_path(&self.namespace()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub namespace: Option<String>,
    pub store_path: Option<PathBuf>,
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("tasktrash")
            .join(CONFIG_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("tasktrash")
            .join(CONFIG_FILE_NAME))
    }
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(namespace) = overrides.namespace.as_ref() {
        merged.namespace = Some(namespace.clone());
    }
    if let Some(path) = overrides.store_path.as_ref() {
        merged.store_path = Some(path.clone());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::{
        Config, ConfigOverrides, DEFAULT_NAMESPACE, canonical_name, load_config_from_path,
        load_config_with_fallback_from_path, merge_overrides,
    };
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn missing_config_is_default_without_error() {
        let dir = TempDir::new().unwrap();
        let result = load_config_with_fallback_from_path(&dir.path().join("config.json"));

        assert_eq!(result.config, Config::default());
        assert!(result.error.is_none());
    }

    #[test]
    fn invalid_config_is_default_with_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ invalid json ").unwrap();

        let result = load_config_with_fallback_from_path(&path);

        assert_eq!(result.config, Config::default());
        assert_eq!(result.error.map(|err| err.code()), Some("invalid_data"));
    }

    #[test]
    fn reads_valid_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let content = serde_json::json!({
            "namespace": "Work Tasks",
            "store_path": "/srv/tasks.json"
        });
        fs::write(&path, serde_json::to_string(&content).unwrap()).unwrap();

        let loaded = load_config_from_path(&path).unwrap();

        assert_eq!(loaded.namespace(), "work_tasks");
        assert_eq!(loaded.store_path, Some(PathBuf::from("/srv/tasks.json")));
    }

    #[test]
    fn blank_namespace_uses_default() {
        let config = Config {
            namespace: Some(" -- ".into()),
            ..Config::default()
        };

        assert_eq!(config.namespace(), DEFAULT_NAMESPACE);
    }

    #[test]
    fn overrides_win_and_leave_base_untouched() {
        let base = Config {
            namespace: Some("home".into()),
            store_path: None,
        };
        let overrides = ConfigOverrides {
            namespace: None,
            store_path: Some(PathBuf::from("/tmp/x.json")),
        };

        let merged = merge_overrides(&base, &overrides);

        assert_eq!(merged.namespace(), "home");
        assert_eq!(merged.store_path, Some(PathBuf::from("/tmp/x.json")));
        assert_eq!(base.store_path, None);
        assert_eq!(merge_overrides(&base, &ConfigOverrides::default()), base);
    }

    #[test]
    fn unknown_config_keys_are_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"theme":"noir","namespace":"home"}"#).unwrap();

        let loaded = load_config_from_path(&path).unwrap();

        assert_eq!(loaded.namespace(), "home");
        assert_eq!(loaded.store_path, None);
    }

    #[test]
    fn canonical_name_folds_separators() {
        assert_eq!(canonical_name("  My  Origin!! "), Some("my_origin".into()));
        assert_eq!(canonical_name("***"), None);
    }
}
