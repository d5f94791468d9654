use tracing::instrument;

use super::parse_task_id;
use crate::config::Config;
use crate::datetime::LocalDay;
use crate::render::Renderer;
use crate::stats::compute_stats;
use crate::store::TaskStore;
use crate::task::Task;

#[instrument(skip(store, renderer, day))]
pub fn cmd_list(store: &TaskStore, renderer: &mut Renderer, day: &LocalDay) -> anyhow::Result<()> {
    if store.is_empty() {
        println!("No tasks yet. Add your first study task to get started.");
        return Ok(());
    }

    let pending: Vec<&Task> = store.tasks().iter().filter(|task| !task.completed).collect();
    let completed: Vec<&Task> = store.tasks().iter().filter(|task| task.completed).collect();

    renderer.print_task_groups(&pending, &completed, day)
}

#[instrument(skip(store, renderer, args, day))]
pub fn cmd_info(
    store: &TaskStore,
    renderer: &mut Renderer,
    args: &[String],
    day: &LocalDay,
) -> anyhow::Result<()> {
    let (id, _) = parse_task_id(args, "info")?;

    match store.get(id) {
        Some(task) => renderer.print_task_info(task, day),
        None => {
            println!("No task with id {id}.");
            Ok(())
        }
    }
}

#[instrument(skip(store, renderer, day))]
pub fn cmd_stats(store: &TaskStore, renderer: &mut Renderer, day: &LocalDay) -> anyhow::Result<()> {
    let stats = compute_stats(store.tasks(), day);
    renderer.print_stats(&stats)
}

pub fn cmd_subjects(cfg: &Config) -> anyhow::Result<()> {
    for subject in &cfg.subjects {
        println!("{subject}");
    }
    Ok(())
}

/// The snapshot as JSON lines on stdout. Output only; nothing is read
/// back in a later session.
#[instrument(skip(store))]
pub fn cmd_export(store: &TaskStore) -> anyhow::Result<()> {
    for task in store.tasks() {
        println!("{}", serde_json::to_string(task)?);
    }
    Ok(())
}

pub fn cmd_help() -> anyhow::Result<()> {
    println!(
        "\
Commands (unique prefixes work, e.g. 'mod'):
  add <title> subject:<name> [priority:<p>] [due:<expr>] [note:<text>]
  modify <id> [<title>] [subject:...] [priority:...] [due:...] [note:...]
  toggle <id>            flip completion (aliases: done, undone)
  delete <id>            remove a task
  list                   pending and completed tasks
  info <id>              one task in full (or just type the id)
  stats                  progress, urgency, priority, and subject summary
  subjects               suggested subject names
  export                 tasks as JSON lines
  version                print version
  quit                   end the session

Due date expressions: today, tomorrow, yesterday, weekday names,
+Nd/-Nd, +Nw/-Nw, YYYY-MM-DD. Quote multi-word values:
  add Finish essay subject:\"Computer Science\" due:friday"
    );
    Ok(())
}
