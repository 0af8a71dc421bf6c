use color_eyre::Result;
use opentodo_core::storage::SlotStore;
use opentodo_profile::{NewTask, ProjectPatch, TaskPatch, TitlePatch};

use crate::{
    cli::{GroupCommand, ListCommand, ProjectCommand, Schedule, TaskCommand, TitleEdit},
    session::Session,
};

/// `None` leaves a field alone, `clear` empties it, a value replaces it.
fn field_patch<T>(value: Option<T>, clear: bool) -> Option<Option<T>> {
    if clear {
        Some(None)
    } else {
        value.map(Some)
    }
}

impl From<TitleEdit> for TitlePatch {
    fn from(edit: TitleEdit) -> Self {
        TitlePatch {
            title: edit.title,
            description: field_patch(edit.description, edit.no_description),
        }
    }
}

fn task_patch(
    title: Option<String>,
    description: Option<Option<String>>,
    schedule: Schedule,
    clear_schedule: bool,
) -> TaskPatch {
    TaskPatch {
        title,
        description,
        progress: schedule.progress,
        start_date: field_patch(schedule.start_date, clear_schedule),
        due_date: field_patch(schedule.due_date, clear_schedule),
        start_time: field_patch(schedule.start_time, clear_schedule),
        due_time: field_patch(schedule.due_time, clear_schedule),
        is_completed: None,
    }
}

pub async fn handle_project<S: SlotStore>(cmd: ProjectCommand, session: &Session<S>) -> Result<()> {
    let store = &session.store;
    match cmd {
        ProjectCommand::Add { name, description } => {
            let id = store
                .add_project(name.clone(), description)
                .await
                .map_err(|e| session.notify(e))?;
            session.say_with("project.created", &[("name", name.as_str())]);
            println!("{id}");
        }
        ProjectCommand::List => {
            let projects = store
                .read(|profile| {
                    profile
                        .projects
                        .iter()
                        .map(|p| {
                            let live = p
                                .task_lists
                                .iter()
                                .flat_map(|l| l.all_tasks())
                                .filter(|t| !t.is_deleted)
                                .count();
                            (p.id.clone(), p.name.clone(), p.description.clone(), live)
                        })
                        .collect::<Vec<_>>()
                })
                .await;
            if projects.is_empty() {
                session.say("project.none");
                return Ok(());
            }
            for (id, name, description, live) in projects {
                let count = live.to_string();
                println!(
                    "{id} {name} ({})",
                    session
                        .locale
                        .translate("list.tasks_count", &[("count", count.as_str())])
                );
                if let Some(desc) = description {
                    println!("    {desc}");
                }
            }
        }
        ProjectCommand::Update {
            id,
            name,
            description,
            no_description,
        } => {
            store
                .update_project(
                    &id,
                    ProjectPatch {
                        name,
                        description: field_patch(description, no_description),
                    },
                )
                .await
                .map_err(|e| session.notify(e))?;
            session.say("common.updated");
        }
        ProjectCommand::Rm { id } => {
            let removed = store
                .delete_project(&id)
                .await
                .map_err(|e| session.notify(e))?;
            session.say_with("project.deleted", &[("name", removed.name.as_str())]);
        }
    }
    Ok(())
}

pub async fn handle_list<S: SlotStore>(cmd: ListCommand, session: &Session<S>) -> Result<()> {
    let store = &session.store;
    match cmd {
        ListCommand::Add {
            project_id,
            title,
            description,
        } => {
            let id = store
                .add_task_list(&project_id, title.clone(), description)
                .await
                .map_err(|e| session.notify(e))?;
            session.say_with("list.created", &[("name", title.as_str())]);
            println!("{id}");
        }
        ListCommand::Update { id, edit } => {
            store
                .update_task_list(&id, edit.into())
                .await
                .map_err(|e| session.notify(e))?;
            session.say("common.updated");
        }
        ListCommand::Rm { id } => {
            store
                .delete_task_list(&id)
                .await
                .map_err(|e| session.notify(e))?;
            session.say("task.purged");
        }
    }
    Ok(())
}

pub async fn handle_group<S: SlotStore>(cmd: GroupCommand, session: &Session<S>) -> Result<()> {
    let store = &session.store;
    match cmd {
        GroupCommand::Add {
            list_id,
            title,
            description,
        } => {
            let id = store
                .add_task_group(&list_id, title.clone(), description)
                .await
                .map_err(|e| session.notify(e))?;
            session.say_with("group.created", &[("name", title.as_str())]);
            println!("{id}");
        }
        GroupCommand::Update { id, edit } => {
            store
                .update_task_group(&id, edit.into())
                .await
                .map_err(|e| session.notify(e))?;
            session.say("common.updated");
        }
        GroupCommand::Rm { id } => {
            store
                .soft_delete_task_group(&id)
                .await
                .map_err(|e| session.notify(e))?;
            session.say("group.delete_msg");
        }
        GroupCommand::Restore { id } => {
            store
                .restore_task_group(&id)
                .await
                .map_err(|e| session.notify(e))?;
            session.say("task.restored");
        }
        GroupCommand::Purge { id } => {
            store
                .delete_task_group_permanently(&id)
                .await
                .map_err(|e| session.notify(e))?;
            session.say("task.purged");
        }
    }
    Ok(())
}

pub async fn handle_task<S: SlotStore>(cmd: TaskCommand, session: &Session<S>) -> Result<()> {
    let store = &session.store;
    match cmd {
        TaskCommand::Add {
            list_id,
            title,
            group,
            description,
            schedule,
        } => {
            let task = NewTask {
                title: title.clone(),
                description,
                progress: schedule.progress.unwrap_or_default(),
                start_date: schedule.start_date,
                due_date: schedule.due_date,
                start_time: schedule.start_time,
                due_time: schedule.due_time,
            };
            let id = store
                .add_task(&list_id, group.as_deref(), task)
                .await
                .map_err(|e| session.notify(e))?;
            session.say_with("task.created", &[("name", title.as_str())]);
            println!("{id}");
        }
        TaskCommand::Update {
            id,
            title,
            description,
            no_description,
            schedule,
            clear_schedule,
        } => {
            let description = field_patch(description, no_description);
            store
                .update_task(&id, task_patch(title, description, schedule, clear_schedule))
                .await
                .map_err(|e| session.notify(e))?;
            session.say("common.updated");
        }
        TaskCommand::Done { id } => {
            let task = store
                .set_task_completed(&id, true)
                .await
                .map_err(|e| session.notify(e))?;
            println!("{}: {}", session.locale.t("task.completed"), task.title);
        }
        TaskCommand::Undo { id } => {
            let task = store
                .set_task_completed(&id, false)
                .await
                .map_err(|e| session.notify(e))?;
            println!("{}: {}", session.locale.t("task.reopened"), task.title);
        }
        TaskCommand::Progress { id, value } => {
            let task = store
                .set_task_progress(&id, value)
                .await
                .map_err(|e| session.notify(e))?;
            println!("{}: {}%", task.title, task.progress);
        }
        TaskCommand::Rm { id } => {
            let task = store
                .soft_delete_task(&id)
                .await
                .map_err(|e| session.notify(e))?;
            println!("{}: {}", session.locale.t("task.deleted"), task.title);
        }
        TaskCommand::Restore { id } => {
            let task = store
                .restore_task(&id)
                .await
                .map_err(|e| session.notify(e))?;
            println!("{}: {}", session.locale.t("task.restored"), task.title);
        }
        TaskCommand::Purge { id } => {
            let task = store
                .delete_task_permanently(&id)
                .await
                .map_err(|e| session.notify(e))?;
            println!("{}: {}", session.locale.t("task.purged"), task.title);
        }
        TaskCommand::Move { id, list_id, group } => {
            store
                .move_task(&id, &list_id, group.as_deref())
                .await
                .map_err(|e| session.notify(e))?;
            session.say("common.updated");
        }
    }
    Ok(())
}
