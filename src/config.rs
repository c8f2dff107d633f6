use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BackendConfig {
    /// Base URL of the hosted auth service
    pub auth_url: Option<String>,
    /// Base URL of the remote data store
    pub api_url: Option<String>,
    /// Publishable API key sent with every backend request
    pub api_key: Option<String>,
    /// Path to the local SQLite database
    pub database: Option<String>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("tasklog.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".tasklog").join("tasklog.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<BackendConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: BackendConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &BackendConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasklog.toml");

        let config = BackendConfig {
            auth_url: Some("https://auth.example.com".to_string()),
            api_url: Some("https://api.example.com".to_string()),
            api_key: Some("pk_test".to_string()),
            database: None,
        };
        write_config(&path, &config, false).unwrap();

        let loaded = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded.auth_url.as_deref(), Some("https://auth.example.com"));
        assert_eq!(loaded.api_key.as_deref(), Some("pk_test"));
        assert!(loaded.database.is_none());
    }

    #[test]
    fn test_write_config_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasklog.toml");

        write_config(&path, &BackendConfig::default(), false).unwrap();
        assert!(write_config(&path, &BackendConfig::default(), false).is_err());
        write_config(&path, &BackendConfig::default(), true).unwrap();
    }

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(Some(&dir.path().join("absent.toml"))).unwrap();
        assert!(loaded.is_none());
    }
}
