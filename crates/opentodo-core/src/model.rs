use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name given to the user of a freshly created profile.
pub const DEFAULT_USER_NAME: &str = "User";

/// Lower and upper bound for `TaskItem::progress`.
pub const PROGRESS_MIN: f64 = 0.0;
pub const PROGRESS_MAX: f64 = 100.0;

/// Opaque, document-wide unique identifier.
pub type EntityId = String;

/// Generate a fresh identifier for a new entity.
pub fn new_id() -> EntityId {
    Uuid::new_v4().to_string()
}

/// Clamp a progress value into `[0, 100]`; non-finite input becomes 0.
pub fn clamp_progress(value: f64) -> f64 {
    if value.is_nan() {
        return PROGRESS_MIN;
    }
    value.clamp(PROGRESS_MIN, PROGRESS_MAX)
}

// Every wire field also accepts its PascalCase spelling, as found in older
// backups. Output is always camelCase.

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserInformation {
    #[serde(alias = "Name")]
    pub name: String,
}

impl Default for UserInformation {
    fn default() -> Self {
        Self {
            name: DEFAULT_USER_NAME.to_string(),
        }
    }
}

/// A single task. Lives either in a list's ungrouped tasks or inside a group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskItem {
    #[serde(alias = "Id")]
    pub id: EntityId,
    #[serde(alias = "Title")]
    pub title: String,
    #[serde(alias = "Description")]
    pub description: Option<String>,
    #[serde(alias = "Progress")]
    pub progress: f64,
    #[serde(alias = "StartDate")]
    pub start_date: Option<NaiveDate>,
    #[serde(alias = "DueDate")]
    pub due_date: Option<NaiveDate>,
    #[serde(alias = "StartTime")]
    pub start_time: Option<NaiveTime>,
    #[serde(alias = "DueTime")]
    pub due_time: Option<NaiveTime>,
    #[serde(alias = "IsDeleted")]
    pub is_deleted: bool,
    /// Set when the task was soft-deleted by deleting its group, so restoring
    /// the group brings back only those tasks.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deleted_with_group: bool,
    #[serde(alias = "IsCompleted")]
    pub is_completed: bool,
    #[serde(alias = "CreatedAt")]
    pub created_at: DateTime<Utc>,
    #[serde(alias = "UpdatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(alias = "CompletedAt")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskItem {
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            title: title.into(),
            description: None,
            progress: PROGRESS_MIN,
            start_date: None,
            due_date: None,
            start_time: None,
            due_time: None,
            is_deleted: false,
            deleted_with_group: false,
            is_completed: false,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }
}

impl Default for TaskItem {
    fn default() -> Self {
        Self::new(String::new())
    }
}

/// Named subdivision of a task list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskGroup {
    #[serde(alias = "Id")]
    pub id: EntityId,
    #[serde(alias = "Title")]
    pub title: String,
    #[serde(alias = "Description")]
    pub description: Option<String>,
    #[serde(alias = "Tasks")]
    pub tasks: Vec<TaskItem>,
    /// Soft-delete marker; absent in older documents.
    #[serde(alias = "IsDeleted")]
    pub is_deleted: bool,
    #[serde(alias = "CreatedAt")]
    pub created_at: DateTime<Utc>,
    #[serde(alias = "UpdatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl TaskGroup {
    pub fn new(title: impl Into<String>, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            title: title.into(),
            description,
            tasks: Vec::new(),
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Default for TaskGroup {
    fn default() -> Self {
        Self::new(String::new(), None)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskList {
    #[serde(alias = "Id")]
    pub id: EntityId,
    #[serde(alias = "Title")]
    pub title: String,
    #[serde(alias = "Description")]
    pub description: Option<String>,
    #[serde(alias = "UngroupedTasks")]
    pub ungrouped_tasks: Vec<TaskItem>,
    #[serde(alias = "TaskGroups")]
    pub task_groups: Vec<TaskGroup>,
    #[serde(alias = "CreatedAt")]
    pub created_at: DateTime<Utc>,
    #[serde(alias = "UpdatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl TaskList {
    pub fn new(title: impl Into<String>, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            title: title.into(),
            description,
            ungrouped_tasks: Vec::new(),
            task_groups: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Every task of the list, ungrouped first, then group by group.
    pub fn all_tasks(&self) -> impl Iterator<Item = &TaskItem> {
        self.ungrouped_tasks
            .iter()
            .chain(self.task_groups.iter().flat_map(|g| g.tasks.iter()))
    }
}

impl Default for TaskList {
    fn default() -> Self {
        Self::new(String::new(), None)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    #[serde(alias = "Id")]
    pub id: EntityId,
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(alias = "Description")]
    pub description: Option<String>,
    #[serde(alias = "TaskLists")]
    pub task_lists: Vec<TaskList>,
    #[serde(alias = "CreatedAt")]
    pub created_at: DateTime<Utc>,
    #[serde(alias = "UpdatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            name: name.into(),
            description,
            task_lists: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new(String::new(), None)
    }
}

/// Root of the document: everything one local user owns.
///
/// `Default` is the fresh profile (user "User", no projects, both timestamps
/// now). Deserialization starts from that default, so fields missing from a
/// persisted payload keep their default value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    #[serde(alias = "UserInfo")]
    pub user_info: UserInformation,
    #[serde(alias = "Projects")]
    pub projects: Vec<Project>,
    #[serde(alias = "CreatedAt")]
    pub created_at: DateTime<Utc>,
    #[serde(alias = "UpdatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl Default for Profile {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            user_info: UserInformation::default(),
            projects: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Profile {
    /// Number of tasks in the document, soft-deleted ones included.
    pub fn task_count(&self) -> usize {
        self.projects
            .iter()
            .flat_map(|p| p.task_lists.iter())
            .map(|l| l.all_tasks().count())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_is_fresh() {
        let profile = Profile::default();
        assert_eq!(profile.user_info.name, "User");
        assert!(profile.projects.is_empty());
        assert_eq!(profile.created_at, profile.updated_at);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let mut task = TaskItem::new("write");
        task.due_date = NaiveDate::from_ymd_opt(2024, 3, 1);
        task.due_time = NaiveTime::from_hms_opt(9, 30, 0);
        let value = serde_json::to_value(&task).expect("serialize task");

        assert_eq!(value["title"], "write");
        assert_eq!(value["dueDate"], "2024-03-01");
        assert_eq!(value["dueTime"], "09:30:00");
        assert_eq!(value["isDeleted"], false);
        assert_eq!(value["isCompleted"], false);
        assert!(value["completedAt"].is_null());
        assert!(value["description"].is_null());
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let json = r#"{ "userInfo": { "name": "X" }, "projects": [ { "name": "Home" } ] }"#;
        let profile: Profile = serde_json::from_str(json).expect("profile should deserialize");

        assert_eq!(profile.user_info.name, "X");
        assert_eq!(profile.projects.len(), 1);
        let project = &profile.projects[0];
        assert_eq!(project.name, "Home");
        assert!(!project.id.is_empty());
        assert!(project.task_lists.is_empty());
        assert!(project.description.is_none());
    }

    #[test]
    fn reads_pascal_case_keys_and_writes_camel_case() {
        let json = r#"{
            "UserInfo": { "Name": "Ada" },
            "Projects": [{
                "Id": "p1",
                "Name": "Work",
                "TaskLists": [{
                    "Id": "l1",
                    "Title": "Inbox",
                    "UngroupedTasks": [
                        { "Id": "t1", "Title": "write", "Progress": 30, "DueDate": "2024-03-01" }
                    ],
                    "TaskGroups": [
                        { "Id": "g1", "Title": "Later", "Tasks": [{ "Id": "t2", "IsCompleted": true }] }
                    ]
                }]
            }],
            "UpdatedAt": "2024-01-01T00:00:00Z"
        }"#;
        let profile: Profile = serde_json::from_str(json).expect("pascal case profile");

        assert_eq!(profile.user_info.name, "Ada");
        let list = &profile.projects[0].task_lists[0];
        assert_eq!(profile.projects[0].name, "Work");
        assert_eq!(list.title, "Inbox");
        assert_eq!(list.ungrouped_tasks[0].progress, 30.0);
        assert_eq!(list.ungrouped_tasks[0].due_date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert!(list.task_groups[0].tasks[0].is_completed);
        assert_eq!(profile.updated_at.to_rfc3339(), "2024-01-01T00:00:00+00:00");

        let value = serde_json::to_value(&profile).expect("serialize");
        assert!(value.get("userInfo").is_some());
        assert!(value.get("UserInfo").is_none());
    }

    #[test]
    fn group_cascade_marker_is_only_written_when_set() {
        let mut task = TaskItem::new("mow");
        let value = serde_json::to_value(&task).expect("serialize");
        assert!(value.get("deletedWithGroup").is_none());

        task.is_deleted = true;
        task.deleted_with_group = true;
        let value = serde_json::to_value(&task).expect("serialize");
        assert_eq!(value["deletedWithGroup"], true);
        let back: TaskItem = serde_json::from_value(value).expect("deserialize");
        assert!(back.deleted_with_group);
    }

    #[test]
    fn group_without_deleted_flag_is_live() {
        let json = r#"{ "id": "g1", "title": "Later", "tasks": [] }"#;
        let group: TaskGroup = serde_json::from_str(json).expect("group should deserialize");
        assert!(!group.is_deleted);
    }

    #[test]
    fn clamp_progress_bounds_values() {
        assert_eq!(clamp_progress(150.0), 100.0);
        assert_eq!(clamp_progress(-3.0), 0.0);
        assert_eq!(clamp_progress(42.5), 42.5);
        assert_eq!(clamp_progress(f64::NAN), 0.0);
    }

    #[test]
    fn all_tasks_walks_ungrouped_then_groups() {
        let mut list = TaskList::new("Inbox", None);
        list.ungrouped_tasks.push(TaskItem::new("a"));
        let mut group = TaskGroup::new("g", None);
        group.tasks.push(TaskItem::new("b"));
        list.task_groups.push(group);

        let titles: Vec<_> = list.all_tasks().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b"]);
    }
}
