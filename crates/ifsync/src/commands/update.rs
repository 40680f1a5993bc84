//! `ifsync update` — push merged interface metadata back to the
//! devices, either after a full pipeline run or from the record cache.

use ifsync_core::{cache, update::update};

use crate::cli::{GlobalOpts, UpdateArgs};
use crate::commands::identify;
use crate::config;
use crate::error::CliError;
use crate::output;
use crate::session::UdpFactory;

pub async fn handle(args: UpdateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (topology, run, factory) = if let Some(ref path) = args.from_record_cache {
        let (profile_name, profile, defaults) = config::load_active_profile(global)?;
        let run = config::profile_to_run_config(&profile)?;
        let template =
            config::resolve_session_template(&profile, &profile_name, global, &defaults)?;
        let topology = cache::read_record_cache(path, &run.fields)?;
        (topology, run, UdpFactory::new(template))
    } else {
        let (topology, run, factory, _, _) = identify::run_pipeline(&args.identify, global).await?;
        (topology, run, factory)
    };

    let summary = update(&topology, &factory, &run.fields, &run.sync_oid).await;

    let format = config::effective_output(global, &config::load_config_or_default().defaults);
    let out = output::render_single(
        &format,
        &summary,
        |s| format!("{} written, {} failed, {} skipped", s.written, s.failed, s.skipped),
        |s| s.written.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
