use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::TimelineConfig;
use crate::error::{Result, TimelineError};
use crate::model::{Milestone, Task, ViewSettings};

const TASKS_FILE: &str = "tasks.json";
const MILESTONES_FILE: &str = "milestones.json";
const SETTINGS_FILE: &str = "view_settings.json";
const CONFIG_FILE: &str = "config.json";

/// JSON files holding tasks, milestones, view settings and config.
///
/// Loading never fails: a missing file yields the empty/default value and an
/// unreadable one is logged and treated the same way.
#[derive(Debug, Clone)]
pub struct Storage {
    data_dir: PathBuf,
    config_dir: PathBuf,
}

impl Storage {
    /// Keep every file under `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            config_dir: dir.clone(),
            data_dir: dir,
        }
    }

    /// The platform's per-user data and config directories.
    pub fn from_project_dirs() -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "taskline").ok_or(TimelineError::NoDataDir)?;
        Ok(Self {
            data_dir: dirs.data_dir().to_path_buf(),
            config_dir: dirs.config_dir().to_path_buf(),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn load_config(&self) -> TimelineConfig {
        load_or_default::<TimelineConfig>(&self.config_dir.join(CONFIG_FILE)).sanitized()
    }

    pub fn load_tasks(&self) -> Vec<Task> {
        load_or_default(&self.data_dir.join(TASKS_FILE))
    }

    pub fn save_tasks(&self, tasks: &[Task]) -> Result<()> {
        write_json(&self.data_dir.join(TASKS_FILE), &tasks)
    }

    pub fn load_milestones(&self) -> Vec<Milestone> {
        load_or_default(&self.data_dir.join(MILESTONES_FILE))
    }

    pub fn save_milestones(&self, milestones: &[Milestone]) -> Result<()> {
        write_json(&self.data_dir.join(MILESTONES_FILE), &milestones)
    }

    pub fn load_settings(&self) -> Option<ViewSettings> {
        load_or_default(&self.data_dir.join(SETTINGS_FILE))
    }

    pub fn save_settings(&self, settings: &ViewSettings) -> Result<()> {
        write_json(&self.data_dir.join(SETTINGS_FILE), settings)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(TimelineError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_str(&json)
        .map(Some)
        .map_err(|source| TimelineError::Json {
            path: path.to_path_buf(),
            source,
        })
}

fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    match read_json(path) {
        Ok(Some(value)) => {
            info!(path = %path.display(), "loaded");
            value
        }
        Ok(None) => T::default(),
        Err(e) => {
            warn!(error = %e, "falling back to defaults");
            T::default()
        }
    }
}

/// Write through a sibling temp file so a crash never leaves half a file.
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let io_err = |source| TimelineError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|source| TimelineError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)
}
