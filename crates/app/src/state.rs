use std::{fs, path::PathBuf};

use common::bucket::ThreadId;
use common::chunks::CHUNK_SIZE;
use common::session::{DEFAULT_FLAT_DEPTH, DEFAULT_LIST_DEPTH};
use serde::{Deserialize, Serialize};
use url::Url;

pub const APP_NAME: &str = "bsync";
pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the bucket service
    #[serde(default = "default_remote")]
    pub remote: Url,
    /// Size of the chunks pushes are split into
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Default depth for `bucket ls`
    #[serde(default = "default_list_depth")]
    pub list_depth: u32,
    /// Default depth for `bucket flat`
    #[serde(default = "default_flat_depth")]
    pub flat_depth: u32,
    /// Default log directive, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Write daily rolling log files here as well as to stderr
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    /// Thread scope for bucket commands
    #[serde(default)]
    pub thread: Option<ThreadId>,
    /// Principal used against the in-memory remote
    #[serde(default = "default_identity")]
    pub identity: String,
}

fn default_remote() -> Url {
    Url::parse("http://localhost:3007").expect("hardcoded URL must parse")
}

fn default_chunk_size() -> usize {
    CHUNK_SIZE
}

fn default_list_depth() -> u32 {
    DEFAULT_LIST_DEPTH
}

fn default_flat_depth() -> u32 {
    DEFAULT_FLAT_DEPTH
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_identity() -> String {
    "local".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            remote: default_remote(),
            chunk_size: default_chunk_size(),
            list_depth: default_list_depth(),
            flat_depth: default_flat_depth(),
            log_level: default_log_level(),
            log_dir: None,
            thread: None,
            identity: default_identity(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the config directory (~/.bsync)
    pub app_dir: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the config directory path (custom or default ~/.bsync)
    pub fn app_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new config directory
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let app_dir = Self::app_dir(custom_path)?;
        let config_path = app_dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Err(StateError::AlreadyInitialized);
        }
        fs::create_dir_all(&app_dir)?;

        let config = config.unwrap_or_default();
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        Ok(Self {
            app_dir,
            config_path,
            config,
        })
    }

    /// Load existing state from the config directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let app_dir = Self::app_dir(custom_path)?;
        let config_path = app_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Err(StateError::NotInitialized);
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            app_dir,
            config_path,
            config,
        })
    }

    /// The stored config, or the defaults when there is none. A config
    ///  file that exists but does not parse is still an error.
    pub fn load_config(custom_path: Option<PathBuf>) -> Result<AppConfig, StateError> {
        match Self::load(custom_path) {
            Ok(state) => Ok(state.config),
            Err(StateError::NotInitialized) | Err(StateError::NoHomeDirectory) => {
                Ok(AppConfig::default())
            }
            Err(e) => Err(e),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("config directory not initialized. Run 'bsync init' first")]
    NotInitialized,

    #[error("config directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state");

        let config = AppConfig {
            chunk_size: 4096,
            thread: Some(ThreadId::generate()),
            ..Default::default()
        };
        let state = AppState::init(Some(path.clone()), Some(config.clone())).unwrap();
        assert!(state.config_path.exists());

        let loaded = AppState::load(Some(path.clone())).unwrap();
        assert_eq!(loaded.config, config);

        assert!(matches!(
            AppState::init(Some(path), None),
            Err(StateError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_missing_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppState::load_config(Some(dir.path().join("nope"))).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.remote.as_str(), "http://localhost:3007/");
        assert_eq!(config.chunk_size, 1024);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "list_depth = 3\n").unwrap();
        let config = AppState::load_config(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(config.list_depth, 3);
        assert_eq!(config.flat_depth, 5);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_broken_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "chunk_size = \"big\"\n").unwrap();
        assert!(matches!(
            AppState::load_config(Some(dir.path().to_path_buf())),
            Err(StateError::TomlDe(_))
        ));
    }
}
