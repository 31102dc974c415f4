use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::session::{clamp_phase_duration, DEFAULT_PHASE_DURATION};

/// Preferences remembered between runs. Sessions themselves are never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub phase_duration_secs: u8,
    pub sound_enabled: bool,
    pub reduced_motion: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            phase_duration_secs: DEFAULT_PHASE_DURATION,
            sound_enabled: false,
            reduced_motion: false,
        }
    }
}

impl From<&crate::app::App> for Config {
    fn from(app: &crate::app::App) -> Self {
        Self {
            phase_duration_secs: app.session.config().phase_duration_secs,
            sound_enabled: app.session.sound_enabled(),
            reduced_motion: app.motion.reduced(),
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
        let path = if let Some(pd) = ProjectDirs::from("", "", "boxbreath") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("boxbreath_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let mut cfg = fs::read(&self.path)
            .ok()
            .and_then(|bytes| serde_json::from_slice::<Config>(&bytes).ok())
            .unwrap_or_default();
        cfg.phase_duration_secs = clamp_phase_duration(cfg.phase_duration_secs);
        cfg
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
