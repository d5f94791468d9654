use anyhow::anyhow;
use chrono::{DateTime, Utc};
use tracing::instrument;

use super::parse_task_id;
use crate::config::Config;
use crate::datetime::parse_due_expr;
use crate::store::TaskStore;
use crate::task::{Priority, TaskDraft};

/// Field modifiers in `key:value` token form. The outer Option tracks
/// whether the key appeared at all; for `due` and `note` an empty value
/// means "clear the field".
#[derive(Debug, Default)]
struct Modifiers {
    subject: Option<String>,
    priority: Option<Priority>,
    due: Option<Option<DateTime<Utc>>>,
    note: Option<Option<String>>,
}

fn parse_words_and_mods(
    args: &[String],
    now: DateTime<Utc>,
    cfg: &Config,
) -> anyhow::Result<(Vec<String>, Modifiers)> {
    let mut words = Vec::new();
    let mut mods = Modifiers::default();

    for arg in args {
        if let Some(value) = arg
            .strip_prefix("subject:")
            .or_else(|| arg.strip_prefix("sub:"))
        {
            if value.trim().is_empty() {
                return Err(anyhow!("subject: requires a value"));
            }
            mods.subject = Some(value.to_string());
        } else if let Some(value) = arg
            .strip_prefix("priority:")
            .or_else(|| arg.strip_prefix("pri:"))
        {
            let priority = Priority::parse(value).ok_or_else(|| {
                anyhow!("invalid priority: {value} (expected high, medium, or low)")
            })?;
            mods.priority = Some(priority);
        } else if let Some(value) = arg.strip_prefix("due:") {
            if value.trim().is_empty() {
                mods.due = Some(None);
            } else {
                mods.due = Some(Some(parse_due_expr(value, now, cfg.timezone)?));
            }
        } else if let Some(value) = arg.strip_prefix("note:") {
            if value.trim().is_empty() {
                mods.note = Some(None);
            } else {
                mods.note = Some(Some(value.to_string()));
            }
        } else {
            words.push(arg.clone());
        }
    }

    Ok((words, mods))
}

#[instrument(skip(store, cfg, args, now))]
pub fn cmd_add(
    store: &mut TaskStore,
    cfg: &Config,
    args: &[String],
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    let (words, mods) = parse_words_and_mods(args, now, cfg)?;

    let title = words.join(" ");
    if title.trim().is_empty() {
        return Err(anyhow!("add requires a task title"));
    }
    let subject = mods.subject.ok_or_else(|| {
        anyhow!("add requires subject:<name> (see 'subjects' for suggestions)")
    })?;

    let draft = TaskDraft {
        title,
        note: mods.note.flatten(),
        subject,
        priority: mods.priority.unwrap_or(cfg.default_priority),
        due: mods.due.flatten(),
    };

    let task = store.add(draft, now)?;
    println!("Created task {}.", task.id);
    Ok(())
}

/// Edit semantics follow a pre-filled form: the draft starts from the
/// task's current fields and the given words/modifiers overlay it, then
/// the whole payload replaces the mutable fields at once.
#[instrument(skip(store, cfg, args, now))]
pub fn cmd_modify(
    store: &mut TaskStore,
    cfg: &Config,
    args: &[String],
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    let (id, rest) = parse_task_id(args, "modify")?;

    let Some(existing) = store.get(id) else {
        println!("No task with id {id}.");
        return Ok(());
    };
    let mut draft = existing.draft();

    let (words, mods) = parse_words_and_mods(&rest, now, cfg)?;
    if !words.is_empty() {
        draft.title = words.join(" ");
    }
    if let Some(subject) = mods.subject {
        draft.subject = subject;
    }
    if let Some(priority) = mods.priority {
        draft.priority = priority;
    }
    if let Some(due) = mods.due {
        draft.due = due;
    }
    if let Some(note) = mods.note {
        draft.note = note;
    }

    if store.update(id, draft)? {
        println!("Modified task {id}.");
    } else {
        println!("No task with id {id}.");
    }
    Ok(())
}

#[instrument(skip(store, args))]
pub fn cmd_toggle(store: &mut TaskStore, command: &str, args: &[String]) -> anyhow::Result<()> {
    let (id, _) = parse_task_id(args, command)?;

    if let Some(task) = store.get(id) {
        if command == "done" && task.completed {
            println!("Task {id} is already completed.");
            return Ok(());
        }
        if command == "undone" && !task.completed {
            println!("Task {id} is not completed.");
            return Ok(());
        }
    }

    match store.toggle(id) {
        Some(true) => println!("Completed task {id}."),
        Some(false) => println!("Reopened task {id}."),
        None => println!("No task with id {id}."),
    }
    Ok(())
}

#[instrument(skip(store, args))]
pub fn cmd_delete(store: &mut TaskStore, args: &[String]) -> anyhow::Result<()> {
    let (id, _) = parse_task_id(args, "delete")?;

    if store.remove(id) {
        println!("Deleted task {id}.");
    } else {
        println!("No task with id {id}.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{cmd_add, cmd_modify, cmd_toggle, parse_words_and_mods};
    use crate::config::Config;
    use crate::store::TaskStore;
    use crate::task::Priority;

    fn cfg() -> Config {
        Config {
            timezone: chrono_tz::UTC,
            default_priority: Priority::Medium,
            color: false,
            subjects: Vec::new(),
            loaded_file: None,
        }
    }

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 9, 9, 0, 0)
            .single()
            .expect("valid now")
    }

    fn args(parts: &[&str]) -> Vec<String> {
        parts.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn modifiers_split_from_title_words() {
        let (words, mods) = parse_words_and_mods(
            &args(&[
                "Revise",
                "chapter",
                "subject:Mathematics",
                "pri:high",
                "due:tomorrow",
                "note:sections 1-3",
            ]),
            now(),
            &cfg(),
        )
        .expect("parse");

        assert_eq!(words, vec!["Revise", "chapter"]);
        assert_eq!(mods.subject.as_deref(), Some("Mathematics"));
        assert_eq!(mods.priority, Some(Priority::High));
        assert!(mods.due.expect("due set").is_some());
        assert_eq!(
            mods.note.expect("note set").as_deref(),
            Some("sections 1-3")
        );
    }

    #[test]
    fn empty_due_and_note_mean_clear() {
        let (_, mods) =
            parse_words_and_mods(&args(&["due:", "note:"]), now(), &cfg()).expect("parse");
        assert_eq!(mods.due, Some(None));
        assert_eq!(mods.note, Some(None));
    }

    #[test]
    fn add_requires_title_and_subject() {
        let mut store = TaskStore::new();

        assert!(cmd_add(&mut store, &cfg(), &args(&["subject:Math"]), now()).is_err());
        assert!(cmd_add(&mut store, &cfg(), &args(&["Read", "notes"]), now()).is_err());
        assert!(store.is_empty());

        cmd_add(
            &mut store,
            &cfg(),
            &args(&["Read", "notes", "subject:Math"]),
            now(),
        )
        .expect("add");
        assert_eq!(store.len(), 1);
        assert_eq!(store.tasks()[0].priority, cfg().default_priority);
    }

    #[test]
    fn modify_overlays_given_fields_only() {
        let mut store = TaskStore::new();
        cmd_add(
            &mut store,
            &cfg(),
            &args(&["Essay", "subject:Literature", "pri:high", "due:tomorrow"]),
            now(),
        )
        .expect("add");
        let id = store.tasks()[0].id;

        cmd_modify(
            &mut store,
            &cfg(),
            &args(&["1", "Essay", "v2", "pri:low", "note:revised"]),
            now(),
        )
        .expect("modify");

        let task = store.get(id).expect("task present");
        assert_eq!(task.title, "Essay v2");
        assert_eq!(task.subject, "Literature");
        assert_eq!(task.priority, Priority::Low);
        assert_eq!(task.note.as_deref(), Some("revised"));
        assert!(task.due.is_some());

        cmd_modify(&mut store, &cfg(), &args(&["1", "due:"]), now()).expect("clear due");
        assert!(store.get(id).expect("task present").due.is_none());
    }

    #[test]
    fn modify_and_toggle_missing_ids_do_not_error() {
        let mut store = TaskStore::new();

        cmd_modify(&mut store, &cfg(), &args(&["42", "New", "title"]), now())
            .expect("modify absent id is a no-op");
        cmd_toggle(&mut store, "toggle", &args(&["42"])).expect("toggle absent id is a no-op");
        assert!(store.is_empty());
    }

    #[test]
    fn done_guard_leaves_completed_tasks_alone() {
        let mut store = TaskStore::new();
        cmd_add(&mut store, &cfg(), &args(&["Essay", "subject:Lit"]), now()).expect("add");
        let id = store.tasks()[0].id;

        cmd_toggle(&mut store, "done", &args(&["1"])).expect("done");
        assert!(store.get(id).expect("task").completed);

        // A second `done` must not silently reopen the task.
        cmd_toggle(&mut store, "done", &args(&["1"])).expect("done again");
        assert!(store.get(id).expect("task").completed);

        cmd_toggle(&mut store, "toggle", &args(&["1"])).expect("toggle");
        assert!(!store.get(id).expect("task").completed);
    }
}
