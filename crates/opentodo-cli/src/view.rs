//! Flattened, display-ready outline of a profile shared by `profile show` and the TUI.

use opentodo_core::{
    locale::LocaleTable,
    model::{Profile, TaskGroup, TaskItem, TaskList},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Project,
    List,
    Group,
    Task,
    /// "No tasks here" style filler.
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineRow {
    pub depth: usize,
    pub kind: RowKind,
    pub text: String,
    pub deleted: bool,
    pub completed: bool,
}

impl OutlineRow {
    fn new(depth: usize, kind: RowKind, text: String) -> Self {
        Self {
            depth,
            kind,
            text,
            deleted: false,
            completed: false,
        }
    }
}

/// Outline of every project. Soft-deleted groups and tasks are skipped unless
/// `show_deleted` is set.
pub fn outline(profile: &Profile, locale: &LocaleTable, show_deleted: bool) -> Vec<OutlineRow> {
    let mut rows = Vec::new();
    for project in &profile.projects {
        rows.push(OutlineRow::new(
            0,
            RowKind::Project,
            with_id(&project.name, &project.id),
        ));
        if project.task_lists.is_empty() {
            rows.push(OutlineRow::new(
                1,
                RowKind::Placeholder,
                locale.t("list.no_lists"),
            ));
        }
        for list in &project.task_lists {
            push_list(&mut rows, list, locale, show_deleted);
        }
    }
    rows
}

fn push_list(
    rows: &mut Vec<OutlineRow>,
    list: &TaskList,
    locale: &LocaleTable,
    show_deleted: bool,
) {
    let live = list
        .all_tasks()
        .filter(|t| !t.is_deleted)
        .count()
        .to_string();
    rows.push(OutlineRow::new(
        1,
        RowKind::List,
        format!(
            "{}  {}",
            with_id(&list.title, &list.id),
            locale.translate("list.tasks_count", &[("count", live.as_str())])
        ),
    ));

    let tasks: Vec<&TaskItem> = visible(&list.ungrouped_tasks, show_deleted).collect();
    let groups: Vec<&TaskGroup> = list
        .task_groups
        .iter()
        .filter(|g| show_deleted || !g.is_deleted)
        .collect();
    if tasks.is_empty() && groups.is_empty() {
        rows.push(OutlineRow::new(
            2,
            RowKind::Placeholder,
            locale.t("list.no_tasks"),
        ));
    }
    for task in tasks {
        rows.push(task_row(2, task, locale));
    }
    for group in groups {
        let mut row = OutlineRow::new(2, RowKind::Group, with_id(&group.title, &group.id));
        row.deleted = group.is_deleted;
        if group.is_deleted {
            row.text = format!("{} ({})", row.text, locale.t("common.deleted"));
        }
        rows.push(row);

        let mut shown = visible(&group.tasks, show_deleted).peekable();
        if shown.peek().is_none() {
            rows.push(OutlineRow::new(
                3,
                RowKind::Placeholder,
                locale.t("list.empty_group"),
            ));
        }
        for task in shown {
            rows.push(task_row(3, task, locale));
        }
    }
}

fn visible(tasks: &[TaskItem], show_deleted: bool) -> impl Iterator<Item = &TaskItem> {
    tasks.iter().filter(move |t| show_deleted || !t.is_deleted)
}

fn task_row(depth: usize, task: &TaskItem, locale: &LocaleTable) -> OutlineRow {
    let mark = if task.is_completed { "x" } else { " " };
    let mut text = format!("[{mark}] {}", task.title);
    if !task.is_completed && task.progress > 0.0 {
        text.push_str(&format!("  {}%", task.progress.round()));
    }
    if let Some(due) = task.due_date {
        text.push_str(&format!("  due {}", due.format("%Y-%m-%d")));
        if let Some(time) = task.due_time {
            text.push_str(&format!(" {}", time.format("%H:%M")));
        }
    }
    if task.is_deleted {
        text.push_str(&format!("  ({})", locale.t("common.deleted")));
    }
    text.push_str(&format!("  [{}]", task.id));

    OutlineRow {
        depth,
        kind: RowKind::Task,
        text,
        deleted: task.is_deleted,
        completed: task.is_completed,
    }
}

fn with_id(name: &str, id: &str) -> String {
    format!("{name} [{id}]")
}

/// Plain-text rendering with two spaces of indent per level.
pub fn render_tree(profile: &Profile, locale: &LocaleTable, show_deleted: bool) -> String {
    let mut out = format!("{}\n", profile.user_info.name);
    if profile.projects.is_empty() {
        out.push_str(&locale.t("project.none"));
        out.push('\n');
        return out;
    }
    for row in outline(profile, locale, show_deleted) {
        out.push_str(&"  ".repeat(row.depth));
        out.push_str(&row.text);
        out.push('\n');
    }
    out
}

/// Dark-background guess from the terminal's `COLORFGBG` (`"fg;bg"`).
pub fn prefers_dark(colorfgbg: Option<&str>) -> bool {
    colorfgbg
        .and_then(|value| value.rsplit(';').next())
        .and_then(|bg| bg.trim().parse::<u8>().ok())
        .is_some_and(|bg| bg < 7 || bg == 8)
}

pub fn os_prefers_dark() -> bool {
    prefers_dark(std::env::var("COLORFGBG").ok().as_deref())
}
