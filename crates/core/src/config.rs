use daw_project::ProjectFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Undo steps kept per project; unlimited when absent.
    #[serde(default)]
    pub max_undo_steps: Option<usize>,
    #[serde(default)]
    pub project_format: ProjectFormat,
}

impl SessionConfig {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("daw").join("session.toml"))
    }

    /// Read `<config dir>/daw/session.toml`, used by
    /// [`Session::with_user_config`](crate::Session::with_user_config).
    /// Missing or invalid files give the defaults.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                log::warn!("ignoring invalid config {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Persist to the file [`SessionConfig::load`] reads, for a host that
    /// edits settings at runtime. Failures are logged, not returned.
    pub fn save(&self) {
        let Some(path) = Self::config_path() else {
            return;
        };
        self.save_to(&path);
    }

    pub fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }

        match toml::to_string_pretty(self) {
            Ok(contents) => {
                if let Err(e) = fs::write(path, contents) {
                    log::warn!("failed to write config {}: {e}", path.display());
                }
            }
            Err(e) => log::warn!("failed to encode config: {e}"),
        }
    }
}
