use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default `collapse=` threshold: blocks with more lines than this collapse.
pub const MAX_CODE_LINES: usize = 20;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config at {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config JSON at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Config {
    /// Emit one debug event per rendered node. Never changes output.
    #[serde(default)]
    pub verbose: bool,

    #[serde(default = "default_collapse_threshold")]
    pub collapse_threshold: usize,

    #[serde(default = "default_theme")]
    pub theme: String,

    #[serde(default = "default_border_style")]
    pub border_style: String,

    #[serde(default = "default_line_numbers")]
    pub line_numbers: bool,
}

fn default_collapse_threshold() -> usize {
    MAX_CODE_LINES
}
fn default_theme() -> String {
    "RDark".to_string()
}
fn default_border_style() -> String {
    "solid".to_string()
}
fn default_line_numbers() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Config {
            verbose: false,
            collapse_threshold: MAX_CODE_LINES,
            theme: default_theme(),
            border_style: default_border_style(),
            line_numbers: true,
        }
    }
}

impl Config {
    pub fn enable_verbose_logging(&mut self) {
        self.verbose = true;
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// First of `md2jira.config.json`, `config/md2jira.config.json` that
    /// exists, else defaults.
    pub fn discover() -> Result<Self, ConfigError> {
        for p in ["md2jira.config.json", "config/md2jira.config.json"] {
            let path = Path::new(p);
            if path.is_file() {
                return Self::load_from_path(path);
            }
        }
        Ok(Config::default())
    }
}
