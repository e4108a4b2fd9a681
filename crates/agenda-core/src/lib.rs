pub mod cli;
pub mod commands;
pub mod config;
pub mod datetime;
pub mod render;
pub mod store;
pub mod task;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

#[tracing::instrument(skip_all)]
pub fn run(raw_args: Vec<OsString>) -> anyhow::Result<()> {
    let cli = cli::GlobalCli::parse_from(raw_args);

    cli::init_tracing(cli.verbose, cli.quiet)?;

    info!(
        verbose = cli.verbose,
        quiet = cli.quiet,
        "starting agenda CLI"
    );

    let mut cfg = config::Config::load(cli.agendarc.as_deref())?;
    cfg.apply_overrides(
        cli.rc_overrides
            .into_iter()
            .map(|kv| (kv.key, kv.value)),
    );

    let data_dir = config::resolve_data_dir(&cfg, cli.data.as_deref())?;
    debug!(data_dir = %data_dir.display(), "resolved data directory");

    let mut store =
        store::TaskStore::open(&data_dir).context("failed to open task store")?;
    let mut renderer = render::Renderer::new(&cfg)?;

    commands::dispatch(&mut store, &cfg, &mut renderer, cli.command)
}
