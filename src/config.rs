//! Database path configuration
//!
//! Each entity type lives in its own backing file. Paths come from a small
//! TOML file so every consumer resolves the same file per store; handing a
//! different path to the pool for the same entity type would split the cache.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    pub data_dir: Option<String>,
    pub user_db: Option<String>,
    pub track_db: Option<String>,
    pub playlist_db: Option<String>,
}

impl StoreConfig {
    pub fn user_db_path(&self) -> PathBuf {
        self.resolve(self.user_db.as_deref(), "user.db")
    }

    pub fn track_db_path(&self) -> PathBuf {
        self.resolve(self.track_db.as_deref(), "track.db")
    }

    pub fn playlist_db_path(&self) -> PathBuf {
        self.resolve(self.playlist_db.as_deref(), "playlist.db")
    }

    fn resolve(&self, explicit: Option<&str>, file: &str) -> PathBuf {
        match explicit {
            Some(path) => PathBuf::from(path),
            None => self
                .data_dir
                .as_deref()
                .map(PathBuf::from)
                .unwrap_or_else(default_data_dir)
                .join(file),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("rowcache.toml")
}

pub fn default_data_dir() -> PathBuf {
    PathBuf::from(".rowcache")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<StoreConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: StoreConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &StoreConfig, force: bool) -> anyhow::Result<()> {
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
