//! Inputs for the store's create and edit operations.
//!
//! In a patch, `None` leaves a field alone; for optional fields,
//! `Some(None)` clears the value.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use opentodo_core::model::{clamp_progress, Project, TaskGroup, TaskItem, TaskList};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}

impl ProjectPatch {
    pub(crate) fn apply(self, project: &mut Project) {
        if let Some(name) = self.name {
            project.name = name;
        }
        if let Some(description) = self.description {
            project.description = description;
        }
    }
}

/// Title/description edit shared by task lists and task groups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TitlePatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
}

impl TitlePatch {
    pub(crate) fn apply_to_list(self, list: &mut TaskList) {
        if let Some(title) = self.title {
            list.title = title;
        }
        if let Some(description) = self.description {
            list.description = description;
        }
    }

    pub(crate) fn apply_to_group(self, group: &mut TaskGroup) {
        if let Some(title) = self.title {
            group.title = title;
        }
        if let Some(description) = self.description {
            group.description = description;
        }
    }
}

/// Fields for a task being created.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub progress: f64,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub due_time: Option<NaiveTime>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub(crate) fn into_item(self, now: DateTime<Utc>) -> TaskItem {
        let mut task = TaskItem::new(self.title);
        task.description = self.description;
        task.progress = clamp_progress(self.progress);
        task.start_date = self.start_date;
        task.due_date = self.due_date;
        task.start_time = self.start_time;
        task.due_time = self.due_time;
        task.created_at = now;
        task.updated_at = now;
        task
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub progress: Option<f64>,
    pub start_date: Option<Option<NaiveDate>>,
    pub due_date: Option<Option<NaiveDate>>,
    pub start_time: Option<Option<NaiveTime>>,
    pub due_time: Option<Option<NaiveTime>>,
    pub is_completed: Option<bool>,
}

impl TaskPatch {
    pub(crate) fn apply(self, task: &mut TaskItem, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(progress) = self.progress {
            task.progress = clamp_progress(progress);
        }
        if let Some(start_date) = self.start_date {
            task.start_date = start_date;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(start_time) = self.start_time {
            task.start_time = start_time;
        }
        if let Some(due_time) = self.due_time {
            task.due_time = due_time;
        }
        if let Some(completed) = self.is_completed {
            set_completion(task, completed, now);
        }
    }
}

/// `completedAt` is set exactly while the task is completed. Completing an
/// already completed task keeps the original completion time.
pub(crate) fn set_completion(task: &mut TaskItem, completed: bool, now: DateTime<Utc>) {
    task.is_completed = completed;
    if completed {
        task.completed_at.get_or_insert(now);
    } else {
        task.completed_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_task_clamps_progress() {
        let task = NewTask {
            progress: 150.0,
            ..NewTask::titled("x")
        }
        .into_item(Utc::now());
        assert_eq!(task.progress, 100.0);
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn patch_clears_optional_fields_only_when_asked() {
        let mut task = TaskItem::new("x");
        task.description = Some("keep".into());
        task.due_date = NaiveDate::from_ymd_opt(2024, 1, 2);

        TaskPatch {
            title: Some("renamed".into()),
            ..TaskPatch::default()
        }
        .apply(&mut task, Utc::now());
        assert_eq!(task.description.as_deref(), Some("keep"));

        TaskPatch {
            due_date: Some(None),
            ..TaskPatch::default()
        }
        .apply(&mut task, Utc::now());
        assert_eq!(task.title, "renamed");
        assert!(task.due_date.is_none());
    }

    #[test]
    fn completion_sets_and_clears_completed_at() {
        let mut task = TaskItem::new("x");
        let first = Utc::now();
        set_completion(&mut task, true, first);
        assert_eq!(task.completed_at, Some(first));

        set_completion(&mut task, true, first + chrono::Duration::seconds(1));
        assert_eq!(task.completed_at, Some(first));

        set_completion(&mut task, false, first);
        assert!(!task.is_completed);
        assert!(task.completed_at.is_none());
    }
}
