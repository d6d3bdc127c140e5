use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Config, CoreError, StorageBackend};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub endpoint: Option<EndpointConfig>,
    pub storage: Option<StorageConfig>,
    pub display: Option<DisplayConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// `local`, `http`, `memory` or `none`.
    pub backend: Option<String>,
    pub local_dir: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub theme: Option<String>,
}

/// Platform config directory path: `<config_dir>/docqa/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("docqa").join("config.toml"))
}

/// Load config by cascading CWD `.docqa.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".docqa.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let be = base.endpoint.unwrap_or_default();
    let oe = overlay.endpoint.unwrap_or_default();
    let bs = base.storage.unwrap_or_default();
    let os = overlay.storage.unwrap_or_default();
    let bd = base.display.unwrap_or_default();
    let od = overlay.display.unwrap_or_default();

    ConfigFile {
        endpoint: Some(EndpointConfig {
            url: oe.url.or(be.url),
            timeout_secs: oe.timeout_secs.or(be.timeout_secs),
        }),
        storage: Some(StorageConfig {
            backend: os.backend.or(bs.backend),
            local_dir: os.local_dir.or(bs.local_dir),
            base_url: os.base_url.or(bs.base_url),
        }),
        display: Some(DisplayConfig {
            theme: od.theme.or(bd.theme),
        }),
    }
}

/// Save the config to the platform config directory.
pub fn save_config(config: &ConfigFile) -> Result<PathBuf, CoreError> {
    let path = config_path()
        .ok_or_else(|| CoreError::Config("could not determine config directory".into()))?;
    save_to_path(config, &path)?;
    Ok(path)
}

pub fn save_to_path(config: &ConfigFile, path: &Path) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| CoreError::Config(format!("failed to create config directory: {e}")))?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| CoreError::Config(format!("failed to serialize config: {e}")))?;
    std::fs::write(path, content)
        .map_err(|e| CoreError::Config(format!("failed to write config: {e}")))?;
    Ok(())
}

/// Parse a storage backend name plus its parameters.
pub fn parse_storage(
    backend: &str,
    local_dir: Option<&str>,
    base_url: Option<&str>,
) -> Result<StorageBackend, CoreError> {
    match backend.trim().to_ascii_lowercase().as_str() {
        "local" => Ok(match local_dir.filter(|d| !d.is_empty()) {
            Some(dir) => StorageBackend::Local(PathBuf::from(dir)),
            None => StorageBackend::default_local(),
        }),
        "http" => base_url
            .filter(|u| !u.is_empty())
            .map(|u| StorageBackend::Http(u.to_string()))
            .ok_or_else(|| CoreError::Config("storage backend `http` needs a base_url".into())),
        "memory" => Ok(StorageBackend::Memory),
        "none" | "off" | "disabled" => Ok(StorageBackend::Disabled),
        other => Err(CoreError::Config(format!(
            "unknown storage backend `{other}` (expected local, http, memory or none)"
        ))),
    }
}

/// Fill `config` from the file. Only values present in the file are applied.
pub fn apply_to_config(file_cfg: &ConfigFile, config: &mut Config) -> Result<(), CoreError> {
    if let Some(ep) = &file_cfg.endpoint {
        if let Some(url) = ep.url.as_deref().filter(|u| !u.is_empty()) {
            config.endpoint_url = url.to_string();
        }
        if let Some(secs) = ep.timeout_secs {
            config.request_timeout = Duration::from_secs(secs.max(1));
        }
    }
    if let Some(st) = &file_cfg.storage {
        let local_dir = st.local_dir.as_deref();
        let base_url = st.base_url.as_deref();
        match st.backend.as_deref() {
            Some(backend) => config.storage = parse_storage(backend, local_dir, base_url)?,
            // A directory alone still means local storage.
            None => {
                if let Some(dir) = local_dir.filter(|d| !d.is_empty()) {
                    config.storage = StorageBackend::Local(PathBuf::from(dir));
                }
            }
        }
    }
    if let Some(theme) = file_cfg
        .display
        .as_ref()
        .and_then(|d| d.theme.as_deref())
        .filter(|t| !t.is_empty())
    {
        config.theme = theme.to_string();
    }
    Ok(())
}

/// Override `config` from `DOCQA_*` environment variables.
pub fn apply_env(config: &mut Config) -> Result<(), CoreError> {
    apply_env_with(config, |k| std::env::var(k).ok())
}

pub(crate) fn apply_env_with(
    config: &mut Config,
    var: impl Fn(&str) -> Option<String>,
) -> Result<(), CoreError> {
    if let Some(url) = var("DOCQA_ENDPOINT").filter(|v| !v.is_empty()) {
        config.endpoint_url = url;
    }
    if let Some(secs) = var("DOCQA_TIMEOUT") {
        let secs: u64 = secs
            .trim()
            .parse()
            .map_err(|_| CoreError::Config(format!("DOCQA_TIMEOUT must be seconds, got `{secs}`")))?;
        config.request_timeout = Duration::from_secs(secs.max(1));
    }
    let dir = var("DOCQA_STORAGE_DIR");
    let url = var("DOCQA_STORAGE_URL");
    if let Some(backend) = var("DOCQA_STORAGE") {
        config.storage = parse_storage(&backend, dir.as_deref(), url.as_deref())?;
    } else if let Some(dir) = dir.filter(|d| !d.is_empty()) {
        config.storage = StorageBackend::Local(PathBuf::from(dir));
    } else if let Some(url) = url.filter(|u| !u.is_empty()) {
        config.storage = StorageBackend::Http(url);
    }
    Ok(())
}

/// Convert the effective config into a `ConfigFile` for saving.
pub fn from_config(config: &Config) -> ConfigFile {
    let (local_dir, base_url) = match &config.storage {
        StorageBackend::Local(dir) => (Some(dir.display().to_string()), None),
        StorageBackend::Http(url) => (None, Some(url.clone())),
        StorageBackend::Memory | StorageBackend::Disabled => (None, None),
    };
    ConfigFile {
        endpoint: Some(EndpointConfig {
            url: Some(config.endpoint_url.clone()),
            timeout_secs: Some(config.request_timeout.as_secs()),
        }),
        storage: Some(StorageConfig {
            backend: Some(config.storage.label().to_string()),
            local_dir,
            base_url,
        }),
        display: Some(DisplayConfig {
            theme: Some(config.theme.clone()),
        }),
    }
}
