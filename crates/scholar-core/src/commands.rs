mod task_ops;
mod views;

use anyhow::{Context, anyhow};
use chrono::Utc;
use tracing::{debug, instrument};

use crate::cli::Invocation;
use crate::config::Config;
use crate::datetime::LocalDay;
use crate::render::Renderer;
use crate::store::TaskStore;

pub fn known_command_names() -> Vec<&'static str> {
    vec![
        "add",
        "modify",
        "toggle",
        "done",
        "undone",
        "delete",
        "list",
        "info",
        "stats",
        "subjects",
        "export",
        "help",
        "version",
        "quit",
        "exit",
    ]
}

pub fn expand_command_abbrev<'a>(token: &'a str, known: &[&'a str]) -> Option<&'a str> {
    if known.contains(&token) {
        return Some(token);
    }

    let mut matches = known.iter().copied().filter(|name| name.starts_with(token));
    let first = matches.next()?;
    if matches.next().is_some() {
        None
    } else {
        Some(first)
    }
}

/// Execute one parsed invocation against the session store. `now` is
/// captured once here and threaded explicitly through every operation so
/// a whole command observes a single instant.
#[instrument(skip(store, cfg, renderer, inv), fields(command = %inv.command))]
pub fn dispatch(
    store: &mut TaskStore,
    cfg: &Config,
    renderer: &mut Renderer,
    inv: &Invocation,
) -> anyhow::Result<()> {
    let now = Utc::now();
    let day = LocalDay::from_instant(now, cfg.timezone);

    debug!(args = ?inv.args, "dispatching command");

    match inv.command.as_str() {
        "add" => task_ops::cmd_add(store, cfg, &inv.args, now),
        "modify" => task_ops::cmd_modify(store, cfg, &inv.args, now),
        "toggle" | "done" | "undone" => {
            task_ops::cmd_toggle(store, inv.command.as_str(), &inv.args)
        }
        "delete" => task_ops::cmd_delete(store, &inv.args),
        "list" => views::cmd_list(store, renderer, &day),
        "info" => views::cmd_info(store, renderer, &inv.args, &day),
        "stats" => views::cmd_stats(store, renderer, &day),
        "subjects" => views::cmd_subjects(cfg),
        "export" => views::cmd_export(store),
        "help" => views::cmd_help(),
        "version" => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => Err(anyhow!("unknown command: {other}")),
    }
}

fn parse_task_id(args: &[String], command: &str) -> anyhow::Result<(u64, Vec<String>)> {
    let first = args
        .first()
        .ok_or_else(|| anyhow!("{command} requires a task id"))?;
    let id = first
        .parse::<u64>()
        .with_context(|| format!("invalid task id: {first}"))?;
    Ok((id, args[1..].to_vec()))
}
