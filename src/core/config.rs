//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::url::ViewMode;
use crate::core::workspace::Workspace;
use crate::entities::part::DEFAULT_QC_WEIGHT;

/// Console configuration with layered hierarchy
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default author for new entities
    pub author: Option<String>,

    /// Default output format
    pub default_format: Option<String>,

    /// View mode used when the location does not name one
    pub default_view: Option<ViewMode>,

    /// Re-seed the set when the sidebar switches project
    pub auto_expand_first_set: Option<bool>,

    /// Weight for QC tests added without one
    pub default_qc_weight: Option<f64>,
}

impl Config {
    /// Load configuration for a workspace root, merging in priority order
    pub fn load_for(root: Option<&Path>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/prodcfg/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read(&global_path) {
                config.merge(global);
            }
        }

        // 3. Workspace config (.prodcfg/config.yaml)
        if let Some(root) = root {
            let workspace_config = root.join(Workspace::DIR).join("config.yaml");
            if let Some(local) = Self::read(&workspace_config) {
                config.merge(local);
            }
        }

        // 4. Environment variables
        config.merge(Self::from_env());

        config
    }

    fn read(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                None
            }
        }
    }

    fn from_env() -> Config {
        let mut config = Config::default();
        if let Ok(author) = std::env::var("PRODCFG_AUTHOR") {
            config.author = Some(author);
        }
        if let Ok(view) = std::env::var("PRODCFG_DEFAULT_VIEW") {
            config.default_view = view.parse().ok();
        }
        if let Ok(flag) = std::env::var("PRODCFG_AUTO_EXPAND") {
            config.auto_expand_first_set = parse_flag(&flag);
        }
        config
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "prodcfg")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.author.is_some() {
            self.author = other.author;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.default_view.is_some() {
            self.default_view = other.default_view;
        }
        if other.auto_expand_first_set.is_some() {
            self.auto_expand_first_set = other.auto_expand_first_set;
        }
        if other.default_qc_weight.is_some() {
            self.default_qc_weight = other.default_qc_weight;
        }
    }

    /// Get the author name, falling back to the login name
    pub fn author(&self) -> String {
        if let Some(ref author) = self.author {
            return author.clone();
        }
        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string())
    }

    pub fn default_view(&self) -> ViewMode {
        self.default_view.unwrap_or_default()
    }

    /// The sidebar auto-expands unless configured otherwise
    pub fn auto_expand_first_set(&self) -> bool {
        self.auto_expand_first_set.unwrap_or(true)
    }

    /// Configured default QC weight, clamped to 0..=1
    pub fn default_qc_weight(&self) -> f64 {
        self.default_qc_weight
            .filter(|w| (0.0..=1.0).contains(w))
            .unwrap_or(DEFAULT_QC_WEIGHT)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_other() {
        let mut base = Config {
            author: Some("base".to_string()),
            default_qc_weight: Some(0.2),
            ..Default::default()
        };
        base.merge(Config {
            author: Some("override".to_string()),
            ..Default::default()
        });
        assert_eq!(base.author.as_deref(), Some("override"));
        assert_eq!(base.default_qc_weight, Some(0.2));
    }

    #[test]
    fn test_workspace_config_is_read() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join(Workspace::DIR);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("config.yaml"),
            "default_view: table\nauto_expand_first_set: false\ndefault_qc_weight: 0.25\n",
        )
        .unwrap();

        let config = Config::load_for(Some(tmp.path()));
        assert_eq!(config.default_view(), ViewMode::Table);
        assert!(!config.auto_expand_first_set());
        assert!((config.default_qc_weight() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_out_of_range_weight_falls_back() {
        let config = Config {
            default_qc_weight: Some(1.5),
            ..Default::default()
        };
        assert!((config.default_qc_weight() - DEFAULT_QC_WEIGHT).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("YES"), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
