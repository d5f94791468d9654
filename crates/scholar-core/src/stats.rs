use chrono::{DateTime, Utc};

use crate::datetime::LocalDay;
use crate::task::{Priority, Task};

/// How a task's due date relates to the reference day. Purely data; color
/// and badge treatment live in the render layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Overdue,
    DueToday,
    DueTomorrow,
    None,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriorityBreakdown {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectCount {
    pub subject: String,
    pub pending: usize,
}

#[derive(Debug, Clone, Default)]
pub struct TaskStats {
    pub completed_count: usize,
    pub pending_count: usize,
    /// Completed over total, as a percentage. 0 for an empty collection.
    pub completion_rate: f64,
    pub overdue_count: usize,
    pub due_today_count: usize,
    pub due_tomorrow_count: usize,
    /// Pending tasks per priority level.
    pub priority_breakdown: PriorityBreakdown,
    /// Up to three subjects with the most pending tasks, descending, ties
    /// in first-encountered order.
    pub top_subjects: Vec<SubjectCount>,
}

/// Overdue means due strictly before today and still pending; a completed
/// task is never overdue. Due-today/due-tomorrow are pure calendar facts
/// and apply to completed tasks too.
pub fn classify_urgency(task: &Task, day: &LocalDay) -> Urgency {
    let Some(due) = task.due else {
        return Urgency::None;
    };

    let due_date = day.project(due);
    if due_date < day.today {
        if task.completed {
            Urgency::None
        } else {
            Urgency::Overdue
        }
    } else if due_date == day.today {
        Urgency::DueToday
    } else if due_date == day.tomorrow {
        Urgency::DueTomorrow
    } else {
        Urgency::None
    }
}

/// Derive the statistics panel from a snapshot. Never mutates input; the
/// urgency buckets, priority breakdown, and subject ranking consider
/// pending tasks only.
pub fn compute_stats(tasks: &[Task], day: &LocalDay) -> TaskStats {
    let total = tasks.len();
    let completed_count = tasks.iter().filter(|task| task.completed).count();
    let pending_count = total - completed_count;
    let completion_rate = if total == 0 {
        0.0
    } else {
        completed_count as f64 / total as f64 * 100.0
    };

    let mut stats = TaskStats {
        completed_count,
        pending_count,
        completion_rate,
        ..TaskStats::default()
    };

    let mut subjects: Vec<SubjectCount> = Vec::new();
    for task in tasks.iter().filter(|task| !task.completed) {
        match classify_urgency(task, day) {
            Urgency::Overdue => stats.overdue_count += 1,
            Urgency::DueToday => stats.due_today_count += 1,
            Urgency::DueTomorrow => stats.due_tomorrow_count += 1,
            Urgency::None => {}
        }

        match task.priority {
            Priority::High => stats.priority_breakdown.high += 1,
            Priority::Medium => stats.priority_breakdown.medium += 1,
            Priority::Low => stats.priority_breakdown.low += 1,
        }

        match subjects.iter_mut().find(|entry| entry.subject == task.subject) {
            Some(entry) => entry.pending += 1,
            None => subjects.push(SubjectCount {
                subject: task.subject.clone(),
                pending: 1,
            }),
        }
    }

    // Stable sort keeps first-encountered order among equal counts.
    subjects.sort_by(|a, b| b.pending.cmp(&a.pending));
    subjects.truncate(3);
    stats.top_subjects = subjects;

    stats
}

/// Display label for a due date. Shares the day frame with
/// [`classify_urgency`] so a task's label and its urgency badge can never
/// disagree about what "today" is.
pub fn format_due_label(due: DateTime<Utc>, day: &LocalDay) -> String {
    let date = day.project(due);
    if date == day.today {
        "Today".to_string()
    } else if date == day.tomorrow {
        "Tomorrow".to_string()
    } else {
        date.format("%b %d, %Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use chrono_tz::Tz;

    use super::{Urgency, classify_urgency, compute_stats, format_due_label};
    use crate::datetime::{LocalDay, parse_due_expr};
    use crate::store::TaskStore;
    use crate::task::{Priority, Task, TaskDraft};

    fn utc() -> Tz {
        chrono_tz::UTC
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 9, 12, 0, 0)
            .single()
            .expect("valid now")
    }

    fn make_task(subject: &str, priority: Priority, due: Option<&str>, completed: bool) -> Task {
        let mut store = TaskStore::new();
        let due = due.map(|expr| parse_due_expr(expr, now(), utc()).expect("parse due"));
        let task = store
            .add(
                TaskDraft {
                    title: format!("{subject} work"),
                    subject: subject.to_string(),
                    priority,
                    due,
                    ..TaskDraft::default()
                },
                now(),
            )
            .expect("add task");
        if completed {
            store.toggle(task.id);
        }
        store.tasks()[0].clone()
    }

    #[test]
    fn empty_snapshot_has_zero_rate() {
        let day = LocalDay::from_instant(now(), utc());
        let stats = compute_stats(&[], &day);

        assert_eq!(stats.completion_rate, 0.0);
        assert_eq!(stats.completed_count, 0);
        assert_eq!(stats.pending_count, 0);
        assert!(stats.top_subjects.is_empty());
    }

    #[test]
    fn urgency_buckets_exclude_completed_tasks() {
        let day = LocalDay::from_instant(now(), utc());
        let tasks = vec![
            make_task("Mathematics", Priority::High, Some("yesterday"), false),
            make_task("Physics", Priority::Medium, Some("today"), false),
            make_task("Chemistry", Priority::Low, Some("tomorrow"), false),
            make_task("Biology", Priority::High, Some("yesterday"), true),
        ];

        let stats = compute_stats(&tasks, &day);
        assert_eq!(stats.overdue_count, 1);
        assert_eq!(stats.due_today_count, 1);
        assert_eq!(stats.due_tomorrow_count, 1);
        assert_eq!(stats.completed_count, 1);
        assert_eq!(stats.pending_count, 3);
    }

    #[test]
    fn completed_task_with_past_due_is_not_overdue() {
        let day = LocalDay::from_instant(now(), utc());
        let task = make_task("Biology", Priority::High, Some("yesterday"), true);
        assert_eq!(classify_urgency(&task, &day), Urgency::None);

        let pending = make_task("Biology", Priority::High, Some("yesterday"), false);
        assert_eq!(classify_urgency(&pending, &day), Urgency::Overdue);
    }

    #[test]
    fn completed_task_due_today_still_classifies() {
        let day = LocalDay::from_instant(now(), utc());
        let task = make_task("Physics", Priority::Medium, Some("today"), true);
        assert_eq!(classify_urgency(&task, &day), Urgency::DueToday);
    }

    #[test]
    fn top_subjects_rank_by_pending_with_stable_ties() {
        let day = LocalDay::from_instant(now(), utc());
        let tasks = vec![
            make_task("Mathematics", Priority::Medium, None, false),
            make_task("Mathematics", Priority::Medium, None, false),
            make_task("Physics", Priority::Medium, None, false),
            make_task("Mathematics", Priority::Medium, None, false),
            make_task("Chemistry", Priority::Medium, None, false),
            make_task("Physics", Priority::Medium, None, false),
        ];

        let stats = compute_stats(&tasks, &day);
        let ranked: Vec<(&str, usize)> = stats
            .top_subjects
            .iter()
            .map(|entry| (entry.subject.as_str(), entry.pending))
            .collect();
        assert_eq!(
            ranked,
            vec![("Mathematics", 3), ("Physics", 2), ("Chemistry", 1)]
        );
    }

    #[test]
    fn top_subjects_skip_completed_and_cap_at_three() {
        let day = LocalDay::from_instant(now(), utc());
        let tasks = vec![
            make_task("Mathematics", Priority::Medium, None, true),
            make_task("Physics", Priority::Medium, None, false),
            make_task("Chemistry", Priority::Medium, None, false),
            make_task("Biology", Priority::Medium, None, false),
            make_task("History", Priority::Medium, None, false),
        ];

        let stats = compute_stats(&tasks, &day);
        assert_eq!(stats.top_subjects.len(), 3);
        assert!(
            stats
                .top_subjects
                .iter()
                .all(|entry| entry.subject != "Mathematics")
        );
    }

    #[test]
    fn priority_breakdown_counts_pending_only() {
        let day = LocalDay::from_instant(now(), utc());
        let tasks = vec![
            make_task("Mathematics", Priority::High, None, false),
            make_task("Physics", Priority::High, None, true),
            make_task("Chemistry", Priority::Low, None, false),
        ];

        let stats = compute_stats(&tasks, &day);
        assert_eq!(stats.priority_breakdown.high, 1);
        assert_eq!(stats.priority_breakdown.medium, 0);
        assert_eq!(stats.priority_breakdown.low, 1);
    }

    #[test]
    fn completion_rate_is_a_percentage() {
        let day = LocalDay::from_instant(now(), utc());
        let tasks = vec![
            make_task("Mathematics", Priority::Medium, None, true),
            make_task("Physics", Priority::Medium, None, false),
            make_task("Chemistry", Priority::Medium, None, false),
            make_task("Biology", Priority::Medium, None, true),
        ];

        let stats = compute_stats(&tasks, &day);
        assert!((stats.completion_rate - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn due_label_agrees_with_urgency_classification() {
        let tz: Tz = "Asia/Tokyo".parse().expect("valid timezone");
        // 23:30 UTC: already tomorrow in Tokyo. Label and badge must agree.
        let late = Utc
            .with_ymd_and_hms(2026, 3, 9, 23, 30, 0)
            .single()
            .expect("valid now");
        let day = LocalDay::from_instant(late, tz);

        let due = parse_due_expr("today", late, tz).expect("parse due");
        let mut task = make_task("Mathematics", Priority::Medium, None, false);
        task.due = Some(due);

        assert_eq!(classify_urgency(&task, &day), Urgency::DueToday);
        assert_eq!(format_due_label(due, &day), "Today");
    }

    #[test]
    fn far_due_dates_format_as_calendar_dates() {
        let day = LocalDay::from_instant(now(), utc());
        let due = parse_due_expr("2026-04-01", now(), utc()).expect("parse due");
        assert_eq!(format_due_label(due, &day), "Apr 01, 2026");
    }
}
