//! CLI configuration — thin wrapper around `ifsync_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--community, --timeout, etc.).

use std::net::IpAddr;
use std::time::Duration;

use clap::ValueEnum;
use secrecy::SecretString;
use tracing::warn;

use ifsync_snmp::SessionConfig;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use ifsync_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, profile_to_run_config,
    save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Load the active profile and the `[defaults]` section, falling back
/// to an all-defaults profile when nothing is configured and no
/// profile was explicitly requested.
pub fn load_active_profile(global: &GlobalOpts) -> Result<(String, Profile, Defaults), CliError> {
    let mut config = load_config_or_default();
    let name = active_profile_name(global, &config);
    let defaults = std::mem::take(&mut config.defaults);
    if let Some(profile) = config.profiles.remove(&name) {
        return Ok((name, profile, defaults));
    }
    // An explicitly requested profile must exist.
    if global.profile.is_some() {
        let available: Vec<_> = config.profiles.keys().cloned().collect();
        return Err(CliError::ProfileNotFound {
            name,
            available: if available.is_empty() {
                "(none)".into()
            } else {
                available.join(", ")
            },
        });
    }
    Ok((name, Profile::default(), defaults))
}

/// Pick the output format: flag/env first, then the config defaults.
pub fn effective_output(global: &GlobalOpts, defaults: &Defaults) -> OutputFormat {
    match global.output {
        Some(ref format) => format.clone(),
        None => OutputFormat::from_str(&defaults.output, true).unwrap_or_else(|_| {
            warn!(value = %defaults.output, "unknown default output format, using table");
            OutputFormat::Table
        }),
    }
}

/// Pick the color mode: flag first, then the config defaults.
pub fn effective_color(global: &GlobalOpts, defaults: &Defaults) -> ColorMode {
    match global.color {
        Some(ref mode) => mode.clone(),
        None => ColorMode::from_str(&defaults.color, true).unwrap_or_else(|_| {
            warn!(value = %defaults.color, "unknown default color mode, using auto");
            ColorMode::Auto
        }),
    }
}

/// Build the per-host session template with CLI flag overrides.
///
/// Community resolution: flag > profile env var > keyring > plaintext.
pub fn resolve_session_template(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
    defaults: &Defaults,
) -> Result<SessionTemplate, CliError> {
    let community = if let Some(ref community) = global.community {
        SecretString::from(community.clone())
    } else {
        ifsync_config::resolve_community(profile, profile_name)?
    };
    Ok(SessionTemplate {
        community,
        port: profile.port,
        timeout: Duration::from_secs(
            global.timeout.or(profile.timeout).unwrap_or(defaults.timeout),
        ),
        retries: profile.retries,
    })
}

/// Everything but the target host of a `SessionConfig`.
#[derive(Debug, Clone)]
pub struct SessionTemplate {
    pub community: SecretString,
    pub port: u16,
    pub timeout: Duration,
    pub retries: u32,
}

impl SessionTemplate {
    pub fn for_host(&self, host: IpAddr) -> SessionConfig {
        SessionConfig {
            host,
            port: self.port,
            community: self.community.clone(),
            timeout: self.timeout,
            retries: self.retries,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn bare_global() -> GlobalOpts {
        GlobalOpts {
            profile: None,
            community: Some("public".into()),
            output: None,
            color: None,
            verbose: 0,
            quiet: false,
            yes: false,
            timeout: None,
            log_file: None,
        }
    }

    #[test]
    fn config_defaults_back_the_output_and_color_flags() {
        let global = bare_global();
        let defaults = Defaults {
            output: "json".into(),
            color: "never".into(),
            ..Defaults::default()
        };
        assert_eq!(effective_output(&global, &defaults), OutputFormat::Json);
        assert_eq!(effective_color(&global, &defaults), ColorMode::Never);

        let mut flagged = bare_global();
        flagged.output = Some(OutputFormat::Plain);
        flagged.color = Some(ColorMode::Always);
        assert_eq!(effective_output(&flagged, &defaults), OutputFormat::Plain);
        assert_eq!(effective_color(&flagged, &defaults), ColorMode::Always);
    }

    #[test]
    fn unknown_default_strings_fall_back_safely() {
        let global = bare_global();
        let defaults = Defaults {
            output: "tabble".into(),
            color: "maybe".into(),
            ..Defaults::default()
        };
        assert_eq!(effective_output(&global, &defaults), OutputFormat::Table);
        assert_eq!(effective_color(&global, &defaults), ColorMode::Auto);
    }

    #[test]
    fn timeout_resolution_ends_at_config_defaults() {
        let profile = Profile::default();
        let defaults = Defaults {
            timeout: 9,
            ..Defaults::default()
        };

        let template =
            resolve_session_template(&profile, "default", &bare_global(), &defaults).unwrap();
        assert_eq!(template.timeout, Duration::from_secs(9));

        let mut flagged = bare_global();
        flagged.timeout = Some(2);
        let template =
            resolve_session_template(&profile, "default", &flagged, &defaults).unwrap();
        assert_eq!(template.timeout, Duration::from_secs(2));
    }
}
