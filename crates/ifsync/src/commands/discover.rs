//! `ifsync discover` — probe the node list and report what answered.

use serde::Serialize;
use tabled::Tabled;

use ifsync_core::{Topology, cache, discover::discover};

use crate::cli::{DiscoverArgs, GlobalOpts, OutputFormat};
use crate::commands::util;
use crate::config;
use crate::error::CliError;
use crate::output;
use crate::session::UdpFactory;

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct NodeRow {
    #[tabled(rename = "HOSTNAME")]
    pub hostname: String,
    #[tabled(rename = "ADDRESS")]
    pub address: String,
    #[tabled(rename = "STATE")]
    pub state: String,
    #[tabled(rename = "DEVICES")]
    pub devices: usize,
    #[tabled(rename = "INTERFACES")]
    pub interfaces: usize,
}

pub fn node_rows(topology: &Topology, color: bool) -> Vec<NodeRow> {
    topology
        .nodes()
        .map(|node| NodeRow {
            hostname: node.hostname.clone(),
            address: node.ip.to_string(),
            state: output::state_cell(node.state, color),
            devices: topology.devices_of(node.ip).count(),
            interfaces: topology
                .devices_of(node.ip)
                .map(|d| topology.interfaces_of(&d.key).count())
                .sum(),
        })
        .collect()
}

pub async fn handle(args: DiscoverArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (profile_name, profile, defaults) = config::load_active_profile(global)?;
    let template = config::resolve_session_template(&profile, &profile_name, global, &defaults)?;
    let hosts = util::load_hosts(args.nodes.as_deref(), &profile)?;

    let factory = UdpFactory::new(template);
    let (topology, summary) = discover(&factory, &hosts, profile.workers.max(1)).await;

    if let Some(ref path) = args.cache {
        cache::write_zone_cache(path, &topology)?;
    }

    let format = config::effective_output(global, &defaults);
    // Color codes only belong in the human-facing table.
    let color = format == OutputFormat::Table
        && output::should_color(&config::effective_color(global, &defaults));
    let rows = node_rows(&topology, color);
    let out = output::render_list(&format, &rows, Clone::clone, |r| {
        format!("{}\t{}", r.hostname, r.address)
    });
    output::print_output(&out, global.quiet);
    if !global.quiet {
        eprintln!(
            "{} probed, {} active, {} inactive; {} devices, {} interfaces",
            summary.probed, summary.active, summary.inactive, summary.devices, summary.interfaces
        );
    }
    Ok(())
}
