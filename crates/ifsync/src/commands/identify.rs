//! `ifsync identify` — discover, then reconcile inventory records onto
//! the topology and settle conflicts.

use ifsync_core::{
    AutoChooser, ConflictLog, Reconciler, ResolveSummary, RunConfig, Topology, cache,
    conflict::resolve,
    discover::{discover, parse_host_records},
    source::{DelimitedFileSource, RecordSource},
};

use crate::cli::{GlobalOpts, IdentifyArgs};
use crate::commands::util;
use crate::config;
use crate::error::CliError;
use crate::output;
use crate::prompt::PromptChooser;
use crate::session::UdpFactory;

/// The identify pipeline through conflict resolution. Shared with the
/// update stage, which runs it before writing back.
pub async fn run_pipeline(
    args: &IdentifyArgs,
    global: &GlobalOpts,
) -> Result<(Topology, RunConfig, UdpFactory, ResolveSummary, usize), CliError> {
    let (profile_name, profile, defaults) = config::load_active_profile(global)?;
    let run = config::profile_to_run_config(&profile)?;
    let template = config::resolve_session_template(&profile, &profile_name, global, &defaults)?;
    let factory = UdpFactory::new(template);

    // ── Topology: live probe, or resume from the zone cache ──
    let hosts = if let Some(ref path) = args.from_cache {
        let text = std::fs::read_to_string(path)?;
        let hosts = parse_host_records(&text);
        if hosts.is_empty() {
            return Err(CliError::Cache {
                message: format!("{}: no host records", path.display()),
            });
        }
        hosts
    } else {
        util::load_hosts(args.nodes.as_deref(), &profile)?
    };
    let (mut topology, _) = discover(&factory, &hosts, run.workers).await;

    // ── Records ──
    let (path, delimiter) = match (&args.source, &profile.source) {
        (Some(path), source) => (
            path.clone(),
            args.delimiter
                .or(source.as_ref().map(|s| s.delimiter))
                .unwrap_or('\t'),
        ),
        (None, Some(source)) => (
            source.path.clone(),
            args.delimiter.unwrap_or(source.delimiter),
        ),
        (None, None) => {
            return Err(CliError::Validation {
                field: "source".into(),
                reason: "no record source configured; pass --source or set it in the profile"
                    .into(),
            });
        }
    };
    let records = DelimitedFileSource::new(path)
        .with_delimiter(delimiter)
        .load(&run.fields)?;

    // ── Reconcile ──
    let mut conflicts = ConflictLog::new();
    let mut reconciler = Reconciler::new(&run.fields, run.auto_match);
    let raised = reconciler.synchronize(&mut topology, &mut conflicts, records);

    // ── Settle conflicts ──
    let summary = if args.auto {
        resolve(
            &mut topology,
            conflicts,
            &run.fields,
            &mut AutoChooser,
            args.deep,
        )
    } else {
        let mut chooser = PromptChooser {
            assume_yes: global.yes,
        };
        resolve(&mut topology, conflicts, &run.fields, &mut chooser, args.deep)
    };

    // ── Caches ──
    if let Some(ref path) = args.cache {
        cache::write_record_cache(path, &topology, &run.fields)?;
    }
    if let Some(ref path) = args.unmatched {
        cache::write_unmatched(path, reconciler.unmatched(), &run.fields)?;
    }

    Ok((topology, run, factory, summary, raised))
}

pub async fn handle(args: IdentifyArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (_, _, _, summary, raised) = run_pipeline(&args, global).await?;

    let format = config::effective_output(global, &config::load_config_or_default().defaults);
    let out = output::render_single(
        &format,
        &summary,
        |s| {
            format!(
                "{raised} conflicts raised\n\
                 {} duplicates kept, {} replaced\n\
                 {} interfaces and {} devices left unrecognized\n\
                 {} interfaces initialized, {} unsupported device conflicts",
                s.duplicates_kept,
                s.duplicates_replaced,
                s.unrecognized_interfaces,
                s.unrecognized_devices,
                s.initialized,
                s.device_conflicts
            )
        },
        |s| format!("{}", s.duplicates_kept + s.duplicates_replaced),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
