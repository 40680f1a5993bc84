//! Shared helpers for the stage handlers.

use std::io::Read;
use std::path::Path;

use ifsync_core::{HostRecord, discover::parse_host_records};
use ifsync_config::Profile;

use crate::error::CliError;

/// Read the node list text from a flag path, the profile's nodes_file,
/// or stdin (`-`).
pub fn load_hosts(flag: Option<&Path>, profile: &Profile) -> Result<Vec<HostRecord>, CliError> {
    let text = match flag.or(profile.nodes_file.as_deref()) {
        Some(path) if path.as_os_str() == "-" => read_stdin()?,
        Some(path) => std::fs::read_to_string(path)?,
        None => read_stdin()?,
    };
    let hosts = parse_host_records(&text);
    if hosts.is_empty() {
        return Err(CliError::NoHosts);
    }
    Ok(hosts)
}

fn read_stdin() -> Result<String, CliError> {
    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;
    Ok(text)
}
