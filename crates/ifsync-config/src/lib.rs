//! Configuration for the ifsync tools.
//!
//! TOML profiles, community-string resolution (env + keyring +
//! plaintext), and translation into the engine's `RunConfig` and the
//! session layer's `SessionConfig`. The CLI adds flag-aware wrappers
//! on top; core never sees these types.

use std::collections::HashMap;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ifsync_core::{FieldConfig, RunConfig};
use ifsync_snmp::{Oid, SessionConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no community string configured for profile '{profile}'")]
    NoCommunity { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl From<ifsync_core::CoreError> for ConfigError {
    fn from(err: ifsync_core::CoreError) -> Self {
        Self::Validation {
            field: "fields".into(),
            reason: err.to_string(),
        }
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named site profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    5
}

/// Delimited record file description.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// Path to the delimited inventory export.
    pub path: PathBuf,

    /// Column delimiter (single character, default tab).
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

fn default_delimiter() -> char {
    '\t'
}

/// A named site profile.
#[derive(Debug, Deserialize, Serialize)]
pub struct Profile {
    /// SNMP community string (plaintext — prefer keyring or env var).
    pub community: Option<String>,

    /// Environment variable name containing the community string.
    pub community_env: Option<String>,

    /// Agent UDP port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Per-request timeout in seconds.
    pub timeout: Option<u64>,

    /// Per-request retry count.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Bounded probe concurrency.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Substitute pattern matches for missing interface names.
    #[serde(default)]
    pub auto_match: bool,

    /// Record column holding the device serial.
    #[serde(default = "default_device_field")]
    pub device_field: String,

    /// Record column holding the interface name.
    #[serde(default = "default_interface_field")]
    pub interface_field: String,

    /// Informational columns, rendered and written back in this order.
    #[serde(default)]
    pub info_fields: Vec<String>,

    /// Write-back column OID (dotted, without the interface index).
    pub sync_oid: Option<String>,

    /// Inventory record source.
    pub source: Option<SourceConfig>,

    /// Zone-file shaped node list consumed by discovery.
    pub nodes_file: Option<PathBuf>,

    /// Directory for the zone / record / unmatched caches.
    pub cache_dir: Option<PathBuf>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            community: None,
            community_env: None,
            port: default_port(),
            timeout: None,
            retries: default_retries(),
            workers: default_workers(),
            auto_match: false,
            device_field: default_device_field(),
            interface_field: default_interface_field(),
            info_fields: Vec::new(),
            sync_oid: None,
            source: None,
            nodes_file: None,
            cache_dir: None,
        }
    }
}

fn default_port() -> u16 {
    161
}
fn default_retries() -> u32 {
    2
}
fn default_workers() -> usize {
    8
}
fn default_device_field() -> String {
    "serial".into()
}
fn default_interface_field() -> String {
    "interface".into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("net", "ifsync", "ifsync").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("ifsync");
    p
}

// ── Config loading / saving ─────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    let path = config_path();

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("IFSYNC_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Community resolution ────────────────────────────────────────────

/// Resolve the community string from the credential chain:
/// profile env var → system keyring → plaintext in config.
pub fn resolve_community(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's community_env → env var lookup
    if let Some(ref env_name) = profile.community_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new("ifsync", &format!("{profile_name}/community")) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref community) = profile.community {
        return Ok(SecretString::from(community.clone()));
    }

    Err(ConfigError::NoCommunity {
        profile: profile_name.into(),
    })
}

// ── Translation into engine / session types ─────────────────────────

/// Build the engine's `RunConfig` from a profile. Field-name validation
/// happens here, before any probing.
pub fn profile_to_run_config(profile: &Profile) -> Result<RunConfig, ConfigError> {
    let fields = FieldConfig {
        device_field: profile.device_field.clone(),
        interface_field: profile.interface_field.clone(),
        info_fields: profile.info_fields.clone(),
    };
    let mut run = RunConfig::new(fields)?;
    run.auto_match = profile.auto_match;
    run.workers = profile.workers.max(1);
    if let Some(ref dotted) = profile.sync_oid {
        run.sync_oid = dotted.parse::<Oid>().map_err(|e| ConfigError::Validation {
            field: "sync_oid".into(),
            reason: e.to_string(),
        })?;
    }
    Ok(run)
}

/// Build a `SessionConfig` for one target host from a profile.
pub fn profile_to_session_config(
    profile: &Profile,
    profile_name: &str,
    host: IpAddr,
) -> Result<SessionConfig, ConfigError> {
    let community = resolve_community(profile, profile_name)?;
    Ok(SessionConfig {
        host,
        port: profile.port,
        community,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(default_timeout())),
        retries: profile.retries,
    })
}
