//! Locating entities inside the profile tree and stamping `updatedAt` along
//! the path from an entity up to its project.
//!
//! Paths are index-based and only valid while the store lock that produced
//! them is held.

use chrono::{DateTime, Utc};
use opentodo_core::model::{Profile, TaskGroup, TaskItem, TaskList};

use crate::error::{EntityKind, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ListPath {
    pub project: usize,
    pub list: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct GroupPath {
    pub list: ListPath,
    pub group: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TaskPath {
    pub list: ListPath,
    pub group: Option<usize>,
    pub task: usize,
}

/// Move a timestamp forward to `now`, never backwards.
pub(crate) fn stamp(ts: &mut DateTime<Utc>, now: DateTime<Utc>) {
    if now > *ts {
        *ts = now;
    }
}

pub(crate) fn find_project(profile: &Profile, id: &str) -> Result<usize, StoreError> {
    profile
        .projects
        .iter()
        .position(|p| p.id == id)
        .ok_or_else(|| StoreError::not_found(EntityKind::Project, id))
}

pub(crate) fn find_list(profile: &Profile, id: &str) -> Result<ListPath, StoreError> {
    for (project, p) in profile.projects.iter().enumerate() {
        if let Some(list) = p.task_lists.iter().position(|l| l.id == id) {
            return Ok(ListPath { project, list });
        }
    }
    Err(StoreError::not_found(EntityKind::TaskList, id))
}

pub(crate) fn find_group(profile: &Profile, id: &str) -> Result<GroupPath, StoreError> {
    for (project, p) in profile.projects.iter().enumerate() {
        for (list, l) in p.task_lists.iter().enumerate() {
            if let Some(group) = l.task_groups.iter().position(|g| g.id == id) {
                return Ok(GroupPath {
                    list: ListPath { project, list },
                    group,
                });
            }
        }
    }
    Err(StoreError::not_found(EntityKind::TaskGroup, id))
}

/// Group `id` inside the list at `list`; groups of other lists do not match.
pub(crate) fn find_group_in(
    profile: &Profile,
    list: ListPath,
    id: &str,
) -> Result<GroupPath, StoreError> {
    list_ref(profile, list)
        .task_groups
        .iter()
        .position(|g| g.id == id)
        .map(|group| GroupPath { list, group })
        .ok_or_else(|| StoreError::not_found(EntityKind::TaskGroup, id))
}

pub(crate) fn find_task(profile: &Profile, id: &str) -> Result<TaskPath, StoreError> {
    for (project, p) in profile.projects.iter().enumerate() {
        for (list, l) in p.task_lists.iter().enumerate() {
            let list_path = ListPath { project, list };
            if let Some(task) = l.ungrouped_tasks.iter().position(|t| t.id == id) {
                return Ok(TaskPath {
                    list: list_path,
                    group: None,
                    task,
                });
            }
            for (group, g) in l.task_groups.iter().enumerate() {
                if let Some(task) = g.tasks.iter().position(|t| t.id == id) {
                    return Ok(TaskPath {
                        list: list_path,
                        group: Some(group),
                        task,
                    });
                }
            }
        }
    }
    Err(StoreError::not_found(EntityKind::Task, id))
}

fn list_ref(profile: &Profile, path: ListPath) -> &TaskList {
    &profile.projects[path.project].task_lists[path.list]
}

pub(crate) fn list_mut(profile: &mut Profile, path: ListPath) -> &mut TaskList {
    &mut profile.projects[path.project].task_lists[path.list]
}

pub(crate) fn group_mut(profile: &mut Profile, path: GroupPath) -> &mut TaskGroup {
    &mut list_mut(profile, path.list).task_groups[path.group]
}

/// The task sequence a task lives in: a group's tasks or the list's
/// ungrouped tasks.
pub(crate) fn tasks_mut(
    profile: &mut Profile,
    list: ListPath,
    group: Option<usize>,
) -> &mut Vec<TaskItem> {
    let list = list_mut(profile, list);
    match group {
        Some(group) => &mut list.task_groups[group].tasks,
        None => &mut list.ungrouped_tasks,
    }
}

pub(crate) fn task_mut(profile: &mut Profile, path: TaskPath) -> &mut TaskItem {
    &mut tasks_mut(profile, path.list, path.group)[path.task]
}

pub(crate) fn touch_project(profile: &mut Profile, project: usize, now: DateTime<Utc>) {
    stamp(&mut profile.projects[project].updated_at, now);
}

pub(crate) fn touch_list(profile: &mut Profile, path: ListPath, now: DateTime<Utc>) {
    stamp(&mut list_mut(profile, path).updated_at, now);
    touch_project(profile, path.project, now);
}

pub(crate) fn touch_group(profile: &mut Profile, path: GroupPath, now: DateTime<Utc>) {
    stamp(&mut group_mut(profile, path).updated_at, now);
    touch_list(profile, path.list, now);
}

/// Stamp the sequence holding a task (its group, if any) and every ancestor.
pub(crate) fn touch_container(
    profile: &mut Profile,
    list: ListPath,
    group: Option<usize>,
    now: DateTime<Utc>,
) {
    match group {
        Some(group) => touch_group(profile, GroupPath { list, group }, now),
        None => touch_list(profile, list, now),
    }
}

pub(crate) fn touch_task(profile: &mut Profile, path: TaskPath, now: DateTime<Utc>) {
    stamp(&mut task_mut(profile, path).updated_at, now);
    touch_container(profile, path.list, path.group, now);
}
