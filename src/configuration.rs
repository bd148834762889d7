//! Main configuration of the fact client.
//!
//! The configuration is loaded once per process from `config.yml` and handed
//! to every component that needs it. The only code path that mutates it is
//! the configure command, which persists a new copy through
//! [`crate::config_updater::ConfigUpdater`].

use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::debug;
use url::Url;

pub const APP_NAME: &str = "fact";
pub const CONFIG_DIR_ENV: &str = "FACT_CONFIG_DIR";
pub const DEFAULT_CONFIGURATION_FILE_NAME: &str = "config.yml";
pub const DEFAULT_CREDENTIALS_FILE_NAME: &str = "credentials.yml";

pub const DEFAULT_API_PREFIX: &str = "/api/v1";
pub const DEFAULT_ASSET_COMMAND: &str = "asset";
pub const DEFAULT_MAX_KEY_LENGTH: usize = 128;
pub const DEFAULT_MAX_VALUE_LENGTH: usize = 4096;
pub const DEFAULT_LOG_LEVEL: &str = "error";

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("failed to resolve the configuration directory")]
    FailedToFindConfigurationDirectory,
    #[error("failed to load {}, because of: {cause}", .path.display())]
    FailedToLoadData {
        path: PathBuf,
        cause: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("failed to write {}, because of: {cause}", .path.display())]
    FailedToWriteData {
        path: PathBuf,
        cause: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Locations of the two persisted documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    directory: PathBuf,
}

impl ConfigPaths {
    /// Honours `FACT_CONFIG_DIR` before falling back to the per-user config directory.
    pub fn from_env() -> Result<ConfigPaths, ConfigurationError> {
        if let Ok(directory) = std::env::var(CONFIG_DIR_ENV) {
            if !directory.is_empty() {
                return Ok(ConfigPaths::in_directory(directory));
            }
        }

        match config_dir() {
            Some(directory) => Ok(ConfigPaths::in_directory(directory.join(APP_NAME))),
            None => Err(ConfigurationError::FailedToFindConfigurationDirectory),
        }
    }

    pub fn in_directory(directory: impl Into<PathBuf>) -> ConfigPaths {
        ConfigPaths {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn main(&self) -> PathBuf {
        self.directory.join(DEFAULT_CONFIGURATION_FILE_NAME)
    }

    pub fn credentials(&self) -> PathBuf {
        self.directory.join(DEFAULT_CREDENTIALS_FILE_NAME)
    }
}

/// Which asset a command targets when none is given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DefaultAsset {
    /// Multi-asset mode: every command names its asset.
    #[default]
    NoDefault,
    /// Single-asset mode with a concrete identifier.
    ExplicitId(String),
    /// Single-asset mode with a name still waiting to be resolved.
    PendingName(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ConfigurationFile", into = "ConfigurationFile")]
pub struct Configuration {
    default_asset: DefaultAsset,
    base_url: Option<Url>,
    api_prefix: String,
    asset_command: String,
    max_key_length: usize,
    max_value_length: usize,
    log_level: String,
    log_path: Option<PathBuf>,
    development: bool,
    allowed_special_keys: BTreeMap<String, Vec<String>>,
    disabled_special_keys: Vec<String>,
    /// Set when the file enabled `static_asset_id` without naming an asset.
    ignored_static_asset_flag: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            default_asset: DefaultAsset::NoDefault,
            base_url: None,
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            asset_command: DEFAULT_ASSET_COMMAND.to_string(),
            max_key_length: DEFAULT_MAX_KEY_LENGTH,
            max_value_length: DEFAULT_MAX_VALUE_LENGTH,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_path: None,
            development: false,
            allowed_special_keys: BTreeMap::new(),
            disabled_special_keys: Vec::new(),
            ignored_static_asset_flag: false,
        }
    }
}

impl Configuration {
    pub fn default_asset(&self) -> &DefaultAsset {
        &self.default_asset
    }

    /// Loading runs before logging is set up, so the warning is left to the caller.
    pub fn ignored_static_asset_flag(&self) -> bool {
        self.ignored_static_asset_flag
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    pub fn api_prefix(&self) -> &str {
        &self.api_prefix
    }

    pub fn asset_command(&self) -> &str {
        &self.asset_command
    }

    pub fn max_key_length(&self) -> usize {
        self.max_key_length
    }

    pub fn max_value_length(&self) -> usize {
        self.max_value_length
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    /// Development installs log at debug unless a level was chosen explicitly.
    pub fn effective_log_level(&self) -> &str {
        if self.development && self.log_level == DEFAULT_LOG_LEVEL {
            "debug"
        } else {
            &self.log_level
        }
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    pub fn development(&self) -> bool {
        self.development
    }

    pub fn allowed_special_keys(&self) -> &BTreeMap<String, Vec<String>> {
        &self.allowed_special_keys
    }

    pub fn disabled_special_keys(&self) -> &[String] {
        &self.disabled_special_keys
    }

    pub fn with_default_asset(mut self, default_asset: DefaultAsset) -> Self {
        self.default_asset = default_asset;
        self
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn with_asset_command(mut self, asset_command: impl Into<String>) -> Self {
        self.asset_command = asset_command.into();
        self
    }

    pub fn with_max_key_length(mut self, max_key_length: usize) -> Self {
        self.max_key_length = max_key_length;
        self
    }

    pub fn with_max_value_length(mut self, max_value_length: usize) -> Self {
        self.max_value_length = max_value_length;
        self
    }

    pub fn with_allowed_special_key(mut self, key: impl Into<String>, values: Vec<String>) -> Self {
        self.allowed_special_keys.insert(key.into(), values);
        self
    }

    pub fn with_disabled_special_key(mut self, key: impl Into<String>) -> Self {
        self.disabled_special_keys.push(key.into());
        self
    }

    /// A missing file yields the blank configuration.
    pub fn load_or_default(path: &Path) -> Result<Configuration, ConfigurationError> {
        if !path.exists() {
            return Ok(Configuration::default());
        }
        Configuration::load_from_file(path)
    }

    pub fn load_from_file(path: &Path) -> Result<Configuration, ConfigurationError> {
        let data = fs::read_to_string(path).map_err(|cause| ConfigurationError::FailedToLoadData {
            path: path.to_path_buf(),
            cause: Box::new(cause),
        })?;

        if data.trim().is_empty() {
            return Ok(Configuration::default());
        }

        serde_yaml::from_str(&data).map_err(|cause| ConfigurationError::FailedToLoadData {
            path: path.to_path_buf(),
            cause: Box::new(cause),
        })
    }

    /// Writes only the fields that differ from the blank configuration.
    pub fn save(&self, path: &Path) -> Result<(), ConfigurationError> {
        let data = serde_yaml::to_string(self).map_err(|cause| {
            ConfigurationError::FailedToWriteData {
                path: path.to_path_buf(),
                cause: Box::new(cause),
            }
        })?;
        write_atomically(path, &data)
    }
}

/// Replaces `path` with `contents` through a temporary file in the same directory.
///
/// An existing file keeps its permissions.
pub(crate) fn write_atomically(path: &Path, contents: &str) -> Result<(), ConfigurationError> {
    let failed = |cause: Box<dyn std::error::Error + Send + Sync>| {
        ConfigurationError::FailedToWriteData {
            path: path.to_path_buf(),
            cause,
        }
    };

    let directory = match path.parent() {
        Some(directory) => directory,
        None => return Err(ConfigurationError::FailedToFindConfigurationDirectory),
    };
    fs::create_dir_all(directory).map_err(|e| failed(Box::new(e)))?;

    let mut file = NamedTempFile::new_in(directory).map_err(|e| failed(Box::new(e)))?;
    file.write_all(contents.as_bytes())
        .map_err(|e| failed(Box::new(e)))?;

    // The temporary file starts out private; a replaced file keeps its mode.
    if let Ok(metadata) = fs::metadata(path) {
        file.as_file()
            .set_permissions(metadata.permissions())
            .map_err(|e| failed(Box::new(e)))?;
    }
    file.persist(path).map_err(|e| failed(Box::new(e.error)))?;

    debug!("Wrote {}", path.display());
    Ok(())
}

/// On-disk shape of `config.yml`.
///
/// `static_asset_id` keeps its historical `string | true` encoding; the
/// conversion into [`Configuration`] turns it into a [`DefaultAsset`].
#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigurationFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    static_asset_id: Option<StaticAssetId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unresolved_asset_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_url: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    asset_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_key_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_value_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    log_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    log_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    development: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    allowed_special_keys: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    disabled_special_keys: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum StaticAssetId {
    Flag(bool),
    Number(u64),
    Id(String),
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn unless_blank<T: PartialEq>(value: T, blank: &T) -> Option<T> {
    if value == *blank {
        None
    } else {
        Some(value)
    }
}

impl From<ConfigurationFile> for Configuration {
    fn from(file: ConfigurationFile) -> Self {
        let blank = Configuration::default();
        let name = non_empty(file.unresolved_asset_name);
        let ignored_static_asset_flag =
            matches!(file.static_asset_id, Some(StaticAssetId::Flag(true))) && name.is_none();

        let default_asset = match file.static_asset_id {
            None | Some(StaticAssetId::Flag(false)) => DefaultAsset::NoDefault,
            Some(StaticAssetId::Flag(true)) => match name {
                Some(name) => DefaultAsset::PendingName(name),
                None => DefaultAsset::NoDefault,
            },
            Some(StaticAssetId::Number(id)) => DefaultAsset::ExplicitId(id.to_string()),
            Some(StaticAssetId::Id(id)) if id.is_empty() => DefaultAsset::NoDefault,
            Some(StaticAssetId::Id(id)) => DefaultAsset::ExplicitId(id),
        };

        Configuration {
            default_asset,
            base_url: file.base_url,
            api_prefix: non_empty(file.api_prefix).unwrap_or(blank.api_prefix),
            asset_command: non_empty(file.asset_command).unwrap_or(blank.asset_command),
            max_key_length: file.max_key_length.unwrap_or(blank.max_key_length),
            max_value_length: file.max_value_length.unwrap_or(blank.max_value_length),
            log_level: non_empty(file.log_level).unwrap_or(blank.log_level),
            log_path: file.log_path.filter(|p| !p.as_os_str().is_empty()),
            development: file.development.unwrap_or(blank.development),
            allowed_special_keys: file.allowed_special_keys.unwrap_or_default(),
            disabled_special_keys: file.disabled_special_keys.unwrap_or_default(),
            ignored_static_asset_flag,
        }
    }
}

impl From<Configuration> for ConfigurationFile {
    fn from(configuration: Configuration) -> Self {
        let blank = Configuration::default();

        let (static_asset_id, unresolved_asset_name) = match configuration.default_asset {
            DefaultAsset::NoDefault => (None, None),
            DefaultAsset::ExplicitId(id) => (Some(StaticAssetId::Id(id)), None),
            DefaultAsset::PendingName(name) => (Some(StaticAssetId::Flag(true)), Some(name)),
        };

        ConfigurationFile {
            static_asset_id,
            unresolved_asset_name,
            base_url: configuration.base_url,
            api_prefix: unless_blank(configuration.api_prefix, &blank.api_prefix),
            asset_command: unless_blank(configuration.asset_command, &blank.asset_command),
            max_key_length: unless_blank(configuration.max_key_length, &blank.max_key_length),
            max_value_length: unless_blank(
                configuration.max_value_length,
                &blank.max_value_length,
            ),
            log_level: unless_blank(configuration.log_level, &blank.log_level),
            log_path: configuration.log_path,
            development: unless_blank(configuration.development, &blank.development),
            allowed_special_keys: unless_blank(
                configuration.allowed_special_keys,
                &blank.allowed_special_keys,
            ),
            disabled_special_keys: unless_blank(
                configuration.disabled_special_keys,
                &blank.disabled_special_keys,
            ),
        }
    }
}
