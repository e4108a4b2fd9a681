use anyhow::anyhow;
use chrono::Utc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::cli::{Command, SortKey};
use crate::config::Config;
use crate::datetime::parse_due_input;
use crate::render::{Renderer, short_id};
use crate::store::TaskStore;

#[instrument(skip(store, cfg, renderer, command))]
pub fn dispatch(
    store: &mut TaskStore,
    cfg: &Config,
    renderer: &mut Renderer,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::Add { name, desc, due } => cmd_add(store, name, desc, due),
        Command::List => cmd_list(store, renderer),
        Command::Show { id } => cmd_show(store, renderer, &id),
        Command::Toggle { id } => cmd_toggle(store, &id),
        Command::Delete { ids, positions } => cmd_delete(store, &ids, &positions),
        Command::Sort { key } => cmd_sort(store, key),
        Command::Config => cmd_config(cfg),
    }
}

#[instrument(skip(store, name, desc, due))]
fn cmd_add(
    store: &mut TaskStore,
    name: String,
    desc: String,
    due: Option<String>,
) -> anyhow::Result<()> {
    info!("command add");

    let now = Utc::now();
    let date = match due {
        Some(expr) => parse_due_input(&expr, now)?,
        None => now,
    };

    let task = store.add(name, desc, date)?;
    println!("Created task {}.", short_id(&task));
    Ok(())
}

#[instrument(skip(store, renderer))]
fn cmd_list(store: &mut TaskStore, renderer: &mut Renderer) -> anyhow::Result<()> {
    info!("command list");
    renderer.print_task_table(&store.tasks, Utc::now())
}

#[instrument(skip(store, renderer, handle))]
fn cmd_show(store: &mut TaskStore, renderer: &mut Renderer, handle: &str) -> anyhow::Result<()> {
    info!("command show");

    let id = store.resolve_handle(handle)?;
    let task = store
        .get(id)
        .ok_or_else(|| anyhow!("task disappeared: {id}"))?;
    renderer.print_task_detail(task, Utc::now())
}

#[instrument(skip(store, handle))]
fn cmd_toggle(store: &mut TaskStore, handle: &str) -> anyhow::Result<()> {
    info!("command toggle");

    let id = store.resolve_handle(handle)?;
    match store.toggle_status(id)? {
        Some(status) => println!("Task {} is now {}.", handle, status.label()),
        None => println!("No matching task."),
    }
    Ok(())
}

#[instrument(skip(store, handles, positions))]
fn cmd_delete(
    store: &mut TaskStore,
    handles: &[String],
    positions: &[usize],
) -> anyhow::Result<()> {
    info!("command delete");

    if handles.is_empty() && positions.is_empty() {
        return Err(anyhow!("delete requires task ids or --at positions"));
    }

    let mut ids: Vec<Uuid> = Vec::with_capacity(handles.len());
    for handle in handles {
        match store.resolve_handle(handle) {
            Ok(id) => ids.push(id),
            Err(err) => warn!(handle = %handle, error = %err, "skipping unresolved task"),
        }
    }

    let mut removed = store.delete_ids(&ids)?;
    removed += store.delete_positions(positions)?;

    println!("Deleted {removed} task(s).");
    Ok(())
}

#[instrument(skip(store))]
fn cmd_sort(store: &mut TaskStore, key: SortKey) -> anyhow::Result<()> {
    info!("command sort");

    match key {
        SortKey::Date => {
            store.sort_by_date()?;
            println!("Sorted by due date.");
        }
        SortKey::Status => {
            store.sort_by_status()?;
            println!("Sorted by status.");
        }
    }
    Ok(())
}

#[instrument(skip(cfg))]
fn cmd_config(cfg: &Config) -> anyhow::Result<()> {
    info!("command config");

    let mut entries: Vec<(&String, &String)> = cfg.iter().collect();
    entries.sort_by_key(|(key, _)| key.as_str());
    for (key, value) in entries {
        println!("{key}={value}");
    }
    Ok(())
}
