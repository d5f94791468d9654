use anyhow::anyhow;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::task::{Task, TaskDraft};

/// Sole owner of the task collection for one session. Insertion order is
/// canonical; the store never re-sorts. The id counter only moves forward,
/// so removed ids are never handed out again.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    last_id: u64,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append a new pending task. `now` becomes its creation
    /// timestamp; the caller supplies it so the store stays clock-free.
    #[tracing::instrument(skip(self, draft, now), fields(title = %draft.title))]
    pub fn add(&mut self, draft: TaskDraft, now: DateTime<Utc>) -> anyhow::Result<Task> {
        validate_draft(&draft)?;

        let id = self.last_id + 1;
        let task = Task::new_pending(draft, now, id);
        self.last_id = id;
        self.tasks.push(task.clone());

        info!(id, uuid = %task.uuid, count = self.tasks.len(), "task added");
        Ok(task)
    }

    /// Replace the mutable fields of the task with `id` from the draft.
    /// `uuid`, `id`, `completed`, and `created` are preserved. Returns
    /// false when no such task exists; that case is a no-op, not an error.
    #[tracing::instrument(skip(self, draft))]
    pub fn update(&mut self, id: u64, draft: TaskDraft) -> anyhow::Result<bool> {
        validate_draft(&draft)?;

        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            debug!(id, "update for unknown task id; ignoring");
            return Ok(false);
        };

        task.title = draft.title;
        task.note = draft.note;
        task.subject = draft.subject;
        task.priority = draft.priority;
        task.due = draft.due;

        info!(id, "task updated");
        Ok(true)
    }

    /// Remove the task with `id` if present. Idempotent.
    #[tracing::instrument(skip(self))]
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        let removed = self.tasks.len() != before;

        if removed {
            info!(id, count = self.tasks.len(), "task removed");
        } else {
            debug!(id, "remove for unknown task id; ignoring");
        }
        removed
    }

    /// Flip `completed` on the task with `id`. Returns the new completion
    /// state, or None when no such task exists (a no-op).
    #[tracing::instrument(skip(self))]
    pub fn toggle(&mut self, id: u64) -> Option<bool> {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            debug!(id, "toggle for unknown task id; ignoring");
            return None;
        };

        task.completed = !task.completed;
        info!(id, completed = task.completed, "task toggled");
        Some(task.completed)
    }

    /// The current snapshot, in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

fn validate_draft(draft: &TaskDraft) -> anyhow::Result<()> {
    if draft.title.trim().is_empty() {
        return Err(anyhow!("task title cannot be empty"));
    }
    if draft.subject.trim().is_empty() {
        return Err(anyhow!("task subject cannot be empty"));
    }
    Ok(())
}
