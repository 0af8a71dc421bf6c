use std::sync::Arc;

use chrono::{DateTime, Utc};
use opentodo_core::{
    asset::{decode_asset, encode_asset},
    codec::{decode_profile, decode_stored_profile, encode_profile, normalize, Layout},
    model::{EntityId, Profile, Project, TaskGroup, TaskItem, TaskList},
    storage::{SlotStore, BACKGROUND_SLOT, PROFILE_BACKUP_SLOT, PROFILE_SLOT},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, instrument, warn};

use crate::{
    error::StoreError,
    patch::{set_completion, NewTask, ProjectPatch, TaskPatch, TitlePatch},
    snapshot::{export_file_name, ImportCandidate, Snapshot},
    tree::{self, ListPath},
};

const EVENT_CAPACITY: usize = 64;

/// Notifications for consumers holding derived views of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A mutation was applied (and a write attempted).
    Changed { updated_at: DateTime<Utc> },
    /// The whole document was substituted; cached views are stale.
    Replaced { updated_at: DateTime<Utc> },
    /// The background asset was set or cleared.
    BackgroundChanged,
    /// Everything was discarded; consumers must reinitialize.
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Uninitialized,
    Ready,
}

#[derive(Debug)]
struct StoreState {
    phase: Phase,
    profile: Profile,
    background: Option<String>,
}

/// Single owner of the live profile and background asset.
///
/// Every mutation stamps `updatedAt` on the touched entity, its ancestors and
/// the profile, then writes the whole document to the `profile` slot before
/// returning. A failed write is reported to the caller but the in-memory
/// change stays; the next successful write persists it.
///
/// Clones are handles to the same store. All entry points are serialized by
/// one async mutex held across the slot write.
pub struct ProfileStore<S: SlotStore> {
    state: Arc<Mutex<StoreState>>,
    slots: Arc<S>,
    events: broadcast::Sender<StoreEvent>,
}

impl<S: SlotStore> Clone for ProfileStore<S> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            slots: Arc::clone(&self.slots),
            events: self.events.clone(),
        }
    }
}

impl<S: SlotStore> ProfileStore<S> {
    pub fn new(slots: S) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(StoreState {
                phase: Phase::Uninitialized,
                profile: Profile::default(),
                background: None,
            })),
            slots: Arc::new(slots),
            events,
        }
    }

    pub fn slots(&self) -> &S {
        &self.slots
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub async fn is_ready(&self) -> bool {
        self.state.lock().await.phase == Phase::Ready
    }

    /// Load the persisted document and background. Never fails: unreadable or
    /// missing slots are logged and the current (default) state is kept.
    ///
    /// A stored document that does not decode cleanly is copied to the
    /// `PROFILE_BACKUP_SLOT` first, then recovered with its unreadable values
    /// dropped. Defaults are used only when nothing can be recovered.
    #[instrument(skip(self))]
    pub async fn init(&self) {
        let mut state = self.state.lock().await;

        match self.slots.get(PROFILE_SLOT).await {
            Ok(Some(bytes)) => match decode_profile(&bytes) {
                Ok(profile) => state.profile = profile,
                Err(err) => {
                    warn!("stored profile does not decode cleanly: {err}");
                    self.back_up_unreadable(&bytes).await;
                    match decode_stored_profile(&bytes) {
                        Ok((profile, dropped)) => {
                            warn!(dropped, "recovered stored profile");
                            state.profile = profile;
                        }
                        Err(err) => warn!("stored profile unreadable, using defaults: {err}"),
                    }
                }
            },
            Ok(None) => debug!("no stored profile, starting fresh"),
            Err(err) => warn!("failed to read profile slot: {err}"),
        }

        match self.slots.get(BACKGROUND_SLOT).await {
            Ok(Some(bytes)) => match String::from_utf8(bytes) {
                Ok(uri) => state.background = Some(uri),
                Err(err) => warn!("stored background is not text, ignoring: {err}"),
            },
            Ok(None) => {}
            Err(err) => warn!("failed to read background slot: {err}"),
        }

        state.phase = Phase::Ready;
    }

    async fn back_up_unreadable(&self, bytes: &[u8]) {
        match self.slots.put(PROFILE_BACKUP_SLOT, bytes).await {
            Ok(()) => info!(slot = PROFILE_BACKUP_SLOT, "kept a copy of the stored profile"),
            Err(err) => warn!("failed to back up stored profile: {err}"),
        }
    }

    /// Clone of the live document.
    pub async fn profile(&self) -> Profile {
        self.state.lock().await.profile.clone()
    }

    /// Run `f` against the live document without cloning it.
    pub async fn read<R>(&self, f: impl FnOnce(&Profile) -> R) -> R {
        f(&self.state.lock().await.profile)
    }

    pub async fn updated_at(&self) -> DateTime<Utc> {
        self.state.lock().await.profile.updated_at
    }

    /// Background image as its stored data URI.
    pub async fn background(&self) -> Option<String> {
        self.state.lock().await.background.clone()
    }

    /// Background image bytes, decoded from the data URI on demand.
    pub async fn background_bytes(&self) -> Result<Option<Vec<u8>>, StoreError> {
        let state = self.state.lock().await;
        match &state.background {
            Some(uri) => Ok(Some(decode_asset(uri)?)),
            None => Ok(None),
        }
    }

    async fn mutate<T>(
        &self,
        op: impl FnOnce(&mut Profile, DateTime<Utc>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut state = self.state.lock().await;
        if state.phase != Phase::Ready {
            return Err(StoreError::Uninitialized);
        }

        let now = Utc::now().max(state.profile.updated_at);
        let out = op(&mut state.profile, now)?;
        state.profile.updated_at = now;

        let written = self.persist(&state.profile).await;
        let _ = self.events.send(StoreEvent::Changed { updated_at: now });
        if let Err(err) = &written {
            warn!("auto-save failed, keeping in-memory change: {err}");
        }
        written.map(|_| out)
    }

    async fn persist(&self, profile: &Profile) -> Result<(), StoreError> {
        let bytes = encode_profile(profile, Layout::Compact)?;
        self.slots.put(PROFILE_SLOT, &bytes).await?;
        debug!(len = bytes.len(), "profile persisted");
        Ok(())
    }

    pub async fn set_user_name(&self, name: impl Into<String>) -> Result<(), StoreError> {
        let name = name.into();
        self.mutate(move |profile, _| {
            profile.user_info.name = name;
            Ok(())
        })
        .await
    }

    pub async fn add_project(
        &self,
        name: impl Into<String>,
        description: Option<String>,
    ) -> Result<EntityId, StoreError> {
        let mut project = Project::new(name, description);
        self.mutate(move |profile, now| {
            project.created_at = now;
            project.updated_at = now;
            let id = project.id.clone();
            profile.projects.push(project);
            Ok(id)
        })
        .await
    }

    pub async fn update_project(&self, id: &str, patch: ProjectPatch) -> Result<(), StoreError> {
        self.mutate(|profile, now| {
            let index = tree::find_project(profile, id)?;
            patch.apply(&mut profile.projects[index]);
            tree::touch_project(profile, index, now);
            Ok(())
        })
        .await
    }

    /// Remove a project and everything it owns.
    pub async fn delete_project(&self, id: &str) -> Result<Project, StoreError> {
        self.mutate(|profile, _| {
            let index = tree::find_project(profile, id)?;
            Ok(profile.projects.remove(index))
        })
        .await
    }

    pub async fn add_task_list(
        &self,
        project_id: &str,
        title: impl Into<String>,
        description: Option<String>,
    ) -> Result<EntityId, StoreError> {
        let mut list = TaskList::new(title, description);
        self.mutate(|profile, now| {
            let project = tree::find_project(profile, project_id)?;
            list.created_at = now;
            list.updated_at = now;
            let id = list.id.clone();
            profile.projects[project].task_lists.push(list);
            tree::touch_project(profile, project, now);
            Ok(id)
        })
        .await
    }

    pub async fn update_task_list(&self, id: &str, patch: TitlePatch) -> Result<(), StoreError> {
        self.mutate(|profile, now| {
            let path = tree::find_list(profile, id)?;
            patch.apply_to_list(tree::list_mut(profile, path));
            tree::touch_list(profile, path, now);
            Ok(())
        })
        .await
    }

    /// Remove a list together with its groups and tasks.
    pub async fn delete_task_list(&self, id: &str) -> Result<TaskList, StoreError> {
        self.mutate(|profile, now| {
            let path = tree::find_list(profile, id)?;
            let removed = profile.projects[path.project].task_lists.remove(path.list);
            tree::touch_project(profile, path.project, now);
            Ok(removed)
        })
        .await
    }

    pub async fn add_task_group(
        &self,
        list_id: &str,
        title: impl Into<String>,
        description: Option<String>,
    ) -> Result<EntityId, StoreError> {
        let mut group = TaskGroup::new(title, description);
        self.mutate(|profile, now| {
            let path = tree::find_list(profile, list_id)?;
            group.created_at = now;
            group.updated_at = now;
            let id = group.id.clone();
            tree::list_mut(profile, path).task_groups.push(group);
            tree::touch_list(profile, path, now);
            Ok(id)
        })
        .await
    }

    pub async fn update_task_group(&self, id: &str, patch: TitlePatch) -> Result<(), StoreError> {
        self.mutate(|profile, now| {
            let path = tree::find_group(profile, id)?;
            patch.apply_to_group(tree::group_mut(profile, path));
            tree::touch_group(profile, path, now);
            Ok(())
        })
        .await
    }

    /// Mark a group and every live task inside it deleted. Tasks that were
    /// already deleted on their own keep that state through a later restore.
    pub async fn soft_delete_task_group(&self, id: &str) -> Result<(), StoreError> {
        self.set_group_deleted(id, true).await
    }

    /// Undo `soft_delete_task_group`, restoring only the tasks it deleted.
    pub async fn restore_task_group(&self, id: &str) -> Result<(), StoreError> {
        self.set_group_deleted(id, false).await
    }

    async fn set_group_deleted(&self, id: &str, deleted: bool) -> Result<(), StoreError> {
        self.mutate(|profile, now| {
            let path = tree::find_group(profile, id)?;
            let group = tree::group_mut(profile, path);
            group.is_deleted = deleted;
            for task in &mut group.tasks {
                let cascaded = if deleted {
                    !task.is_deleted
                } else {
                    task.deleted_with_group
                };
                if cascaded {
                    task.is_deleted = deleted;
                    task.deleted_with_group = deleted;
                    tree::stamp(&mut task.updated_at, now);
                }
            }
            tree::touch_group(profile, path, now);
            Ok(())
        })
        .await
    }

    pub async fn delete_task_group_permanently(&self, id: &str) -> Result<TaskGroup, StoreError> {
        self.mutate(|profile, now| {
            let path = tree::find_group(profile, id)?;
            let removed = tree::list_mut(profile, path.list)
                .task_groups
                .remove(path.group);
            tree::touch_list(profile, path.list, now);
            Ok(removed)
        })
        .await
    }

    /// Create a task in a list, inside `group_id` when given.
    pub async fn add_task(
        &self,
        list_id: &str,
        group_id: Option<&str>,
        task: NewTask,
    ) -> Result<EntityId, StoreError> {
        self.mutate(|profile, now| {
            let list = tree::find_list(profile, list_id)?;
            let group = match group_id {
                Some(group_id) => Some(tree::find_group_in(profile, list, group_id)?.group),
                None => None,
            };
            let item = task.into_item(now);
            let id = item.id.clone();
            tree::tasks_mut(profile, list, group).push(item);
            tree::touch_container(profile, list, group, now);
            Ok(id)
        })
        .await
    }

    pub async fn update_task(&self, id: &str, patch: TaskPatch) -> Result<TaskItem, StoreError> {
        self.edit_task(id, |task, now| patch.apply(task, now)).await
    }

    pub async fn set_task_completed(
        &self,
        id: &str,
        completed: bool,
    ) -> Result<TaskItem, StoreError> {
        self.edit_task(id, |task, now| set_completion(task, completed, now))
            .await
    }

    /// Set progress, clamped to `[0, 100]`.
    pub async fn set_task_progress(&self, id: &str, progress: f64) -> Result<TaskItem, StoreError> {
        self.update_task(
            id,
            TaskPatch {
                progress: Some(progress),
                ..TaskPatch::default()
            },
        )
        .await
    }

    pub async fn soft_delete_task(&self, id: &str) -> Result<TaskItem, StoreError> {
        self.edit_task(id, |task, _| set_deleted(task, true)).await
    }

    pub async fn restore_task(&self, id: &str) -> Result<TaskItem, StoreError> {
        self.edit_task(id, |task, _| set_deleted(task, false)).await
    }

    async fn edit_task(
        &self,
        id: &str,
        edit: impl FnOnce(&mut TaskItem, DateTime<Utc>),
    ) -> Result<TaskItem, StoreError> {
        self.mutate(|profile, now| {
            let path = tree::find_task(profile, id)?;
            edit(tree::task_mut(profile, path), now);
            tree::touch_task(profile, path, now);
            Ok(tree::task_mut(profile, path).clone())
        })
        .await
    }

    /// Remove a task from its sequence for good.
    pub async fn delete_task_permanently(&self, id: &str) -> Result<TaskItem, StoreError> {
        self.mutate(|profile, now| {
            let path = tree::find_task(profile, id)?;
            let removed = tree::tasks_mut(profile, path.list, path.group).remove(path.task);
            tree::touch_container(profile, path.list, path.group, now);
            Ok(removed)
        })
        .await
    }

    /// Re-parent a task: into `group_id` of `list_id`, or the list's ungrouped
    /// tasks when no group is given. The task is appended at the end.
    pub async fn move_task(
        &self,
        id: &str,
        list_id: &str,
        group_id: Option<&str>,
    ) -> Result<(), StoreError> {
        self.mutate(|profile, now| {
            let source = tree::find_task(profile, id)?;
            let target: ListPath = tree::find_list(profile, list_id)?;
            let target_group = match group_id {
                Some(group_id) => Some(tree::find_group_in(profile, target, group_id)?.group),
                None => None,
            };

            let mut task = tree::tasks_mut(profile, source.list, source.group).remove(source.task);
            tree::touch_container(profile, source.list, source.group, now);

            task.deleted_with_group = false;
            tree::stamp(&mut task.updated_at, now);
            tree::tasks_mut(profile, target, target_group).push(task);
            tree::touch_container(profile, target, target_group, now);
            Ok(())
        })
        .await
    }

    /// Pretty-printed snapshot of the live document. No side effects.
    pub async fn export_snapshot(&self) -> Result<Snapshot, StoreError> {
        let state = self.state.lock().await;
        let bytes = encode_profile(&state.profile, Layout::Pretty)?;
        Ok(Snapshot {
            file_name: export_file_name(Utc::now()),
            bytes,
        })
    }

    /// Decode an import without applying it.
    pub async fn import_snapshot(&self, bytes: &[u8]) -> Result<ImportCandidate, StoreError> {
        let profile = decode_profile(bytes)?;
        let live_updated_at = self.updated_at().await;
        Ok(ImportCandidate {
            profile,
            live_updated_at,
        })
    }

    pub async fn apply_imported(&self, candidate: ImportCandidate) -> Result<(), StoreError> {
        self.replace(candidate.into_profile()).await
    }

    /// Substitute the whole document and write it immediately. The background
    /// slot is left alone.
    #[instrument(skip_all)]
    pub async fn replace(&self, mut profile: Profile) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if state.phase != Phase::Ready {
            return Err(StoreError::Uninitialized);
        }

        normalize(&mut profile);
        let updated_at = profile.updated_at;
        state.profile = profile;
        info!(projects = state.profile.projects.len(), "profile replaced");

        let written = self.persist(&state.profile).await;
        let _ = self.events.send(StoreEvent::Replaced { updated_at });
        written
    }

    /// Store a new background image. Does not touch the profile document.
    pub async fn set_background(&self, bytes: &[u8]) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let uri = encode_asset(bytes)?;
        self.slots.put(BACKGROUND_SLOT, uri.as_bytes()).await?;
        state.background = Some(uri);
        let _ = self.events.send(StoreEvent::BackgroundChanged);
        Ok(())
    }

    pub async fn clear_background(&self) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        self.slots.delete(BACKGROUND_SLOT).await?;
        state.background = None;
        let _ = self.events.send(StoreEvent::BackgroundChanged);
        Ok(())
    }

    /// Discard the document and background, clear both slots and tell every
    /// subscriber to reinitialize. In-memory state is reset even if clearing
    /// a slot fails; the first failure is returned.
    #[instrument(skip(self))]
    pub async fn reset(&self) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.profile = Profile::default();
        state.background = None;
        state.phase = Phase::Ready;

        let profile_cleared = self.slots.delete(PROFILE_SLOT).await;
        let background_cleared = self.slots.delete(BACKGROUND_SLOT).await;
        info!("profile store reset");
        let _ = self.events.send(StoreEvent::Reset);

        profile_cleared?;
        background_cleared?;
        Ok(())
    }
}

/// Deleting or restoring a task by itself takes it out of its group's cascade.
fn set_deleted(task: &mut TaskItem, deleted: bool) {
    task.is_deleted = deleted;
    task.deleted_with_group = false;
}
