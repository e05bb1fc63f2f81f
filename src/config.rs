use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::moves::DEFAULT_DIFFICULTY;
use crate::session::SPEED_STEPS;

/// Last-used session parameters, persisted between runs. This is the
/// settings surface only; finished sessions are never recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub rounds: u32,
    pub round_secs: u32,
    pub rest_secs: u32,
    pub speed: f32,
    pub category: String,
    pub difficulty: String,
    pub shuffle: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rounds: 3,
            round_secs: 180,
            rest_secs: 60,
            speed: SPEED_STEPS[0],
            category: "boxing".to_string(),
            difficulty: DEFAULT_DIFFICULTY.to_string(),
            shuffle: false,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "spar") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("spar_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                return cfg;
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
