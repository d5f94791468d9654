use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "high" | "h" => Some(Self::High),
            "medium" | "med" | "m" => Some(Self::Medium),
            "low" | "l" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// A single study item. `uuid`, `id`, `completed`, and `created` are
/// store-managed; everything else comes from a [`TaskDraft`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub uuid: Uuid,

    pub id: u64,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    pub subject: String,

    pub priority: Priority,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<DateTime<Utc>>,

    pub completed: bool,

    pub created: DateTime<Utc>,
}

impl Task {
    pub fn new_pending(draft: TaskDraft, now: DateTime<Utc>, id: u64) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            id,
            title: draft.title,
            note: draft.note,
            subject: draft.subject,
            priority: draft.priority,
            due: draft.due,
            completed: false,
            created: now,
        }
    }

    /// The mutable-field subset of this task, for pre-filling an edit.
    pub fn draft(&self) -> TaskDraft {
        TaskDraft {
            title: self.title.clone(),
            note: self.note.clone(),
            subject: self.subject.clone(),
            priority: self.priority,
            due: self.due,
        }
    }
}

/// Mutation payload for `add` and `update`. Not a stored entity.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub note: Option<String>,
    pub subject: String,
    pub priority: Priority,
    pub due: Option<DateTime<Utc>>,
}
