//! Config subcommand handlers.

use std::collections::HashMap;
use std::path::PathBuf;

use dialoguer::{Input, Select};

use ifsync_config::SourceConfig;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn store_in_keyring(profile_name: &str, community: &str) -> Result<(), CliError> {
    let entry = keyring::Entry::new("ifsync", &format!("{profile_name}/community")).map_err(
        |e| CliError::Validation {
            field: "keyring".into(),
            reason: format!("failed to access keyring: {e}"),
        },
    )?;
    entry
        .set_password(community)
        .map_err(|e| CliError::Validation {
            field: "keyring".into(),
            reason: format!("failed to store community in keyring: {e}"),
        })?;
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("ifsync — configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            // 1. Profile name
            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            // 2. Community string
            let community = rpassword::prompt_password("SNMP community: ").map_err(prompt_err)?;
            if community.is_empty() {
                return Err(CliError::Validation {
                    field: "community".into(),
                    reason: "community string cannot be empty".into(),
                });
            }

            let store_choices = &[
                "Store in system keyring (recommended)",
                "Save to config file (plaintext)",
            ];
            let store_selection = Select::new()
                .with_prompt("Where to store the community string?")
                .items(store_choices)
                .default(0)
                .interact()
                .map_err(prompt_err)?;

            let community_field = if store_selection == 0 {
                store_in_keyring(&profile_name, &community)?;
                eprintln!("   Community stored in system keyring");
                None
            } else {
                Some(community)
            };

            // 3. Node list
            let nodes_file: String = Input::new()
                .with_prompt("Node list file (empty to pass via --nodes)")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;

            // 4. Record source
            let source_path: String = Input::new()
                .with_prompt("Record export file (empty to pass via --source)")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;

            // 5. Field names
            let device_field: String = Input::new()
                .with_prompt("Serial column name")
                .default("serial".into())
                .interact_text()
                .map_err(prompt_err)?;
            let interface_field: String = Input::new()
                .with_prompt("Interface column name")
                .default("interface".into())
                .interact_text()
                .map_err(prompt_err)?;
            let info_csv: String = Input::new()
                .with_prompt("Info column names (comma separated)")
                .interact_text()
                .map_err(prompt_err)?;
            let info_fields: Vec<String> = info_csv
                .split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string)
                .collect();

            let profile = Profile {
                community: community_field,
                device_field,
                interface_field,
                info_fields,
                nodes_file: (!nodes_file.is_empty()).then(|| PathBuf::from(nodes_file)),
                source: (!source_path.is_empty()).then(|| SourceConfig {
                    path: PathBuf::from(source_path),
                    delimiter: '\t',
                }),
                ..Profile::default()
            };

            let mut profiles = HashMap::new();
            profiles.insert(profile_name.clone(), profile);

            let cfg = Config {
                default_profile: Some(profile_name.clone()),
                defaults: Default::default(),
                profiles,
            };
            config::save_config(&cfg)?;

            eprintln!("\nConfiguration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: ifsync discover --nodes <zone-file>");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let format = config::effective_output(global, &cfg.defaults);
            let out = output::render_single(
                &format,
                &cfg,
                |c| format!("{c:#?}"),
                |_| "config".into(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        // ── SetCommunity ────────────────────────────────────────────
        ConfigCommand::SetCommunity { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name =
                profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));

            let community =
                rpassword::prompt_password("SNMP community: ").map_err(prompt_err)?;
            if community.is_empty() {
                return Err(CliError::Validation {
                    field: "community".into(),
                    reason: "community string cannot be empty".into(),
                });
            }

            store_in_keyring(&profile_name, &community)?;
            eprintln!("Community stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}
