//! UI string lookup with a selected → default → raw key fallback.

use std::{fmt, str::FromStr};

use tracing::warn;

use crate::storage::{SlotStore, SlotStoreError, LOCALE_SLOT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    EnUs,
    ZhCn,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::EnUs, Locale::ZhCn];

    pub fn code(&self) -> &'static str {
        match self {
            Locale::EnUs => "en-US",
            Locale::ZhCn => "zh-CN",
        }
    }

    fn messages(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Locale::EnUs => EN_US,
            Locale::ZhCn => ZH_CN,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::ALL
            .into_iter()
            .find(|l| l.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unsupported locale: {s}"))
    }
}

/// Translator bound to one selected locale.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocaleTable {
    locale: Locale,
}

impl LocaleTable {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn t(&self, key: &str) -> String {
        self.translate(key, &[])
    }

    /// Look up `key`, substituting `{name}` placeholders from `args`.
    pub fn translate(&self, key: &str, args: &[(&str, &str)]) -> String {
        let mut text = lookup(self.locale, key)
            .or_else(|| lookup(Locale::default(), key))
            .unwrap_or(key)
            .to_string();
        for (name, value) in args {
            text = text.replace(&format!("{{{name}}}"), value);
        }
        text
    }
}

fn lookup(locale: Locale, key: &str) -> Option<&'static str> {
    locale
        .messages()
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
}

/// Selected locale from the `locale` slot; unknown or unreadable values fall
/// back to the default.
pub async fn load_locale<S: SlotStore + ?Sized>(store: &S) -> Locale {
    match store.get(LOCALE_SLOT).await {
        Ok(Some(bytes)) => match String::from_utf8_lossy(&bytes).parse() {
            Ok(locale) => locale,
            Err(err) => {
                warn!("ignoring stored locale: {err}");
                Locale::default()
            }
        },
        Ok(None) => Locale::default(),
        Err(err) => {
            warn!("failed to read locale slot: {err}");
            Locale::default()
        }
    }
}

pub async fn save_locale<S: SlotStore + ?Sized>(
    store: &S,
    locale: Locale,
) -> Result<(), SlotStoreError> {
    store.put(LOCALE_SLOT, locale.code().as_bytes()).await
}

static EN_US: &[(&str, &str)] = &[
    ("app.title", "OpenTodo"),
    ("nav.projects", "Projects"),
    ("nav.settings", "Settings"),
    ("common.success", "Success"),
    ("common.error", "Error"),
    ("common.created", "Created"),
    ("home.welcome", "Welcome to OpenTodo"),
    ("home.subtitle", "Select a project to start or create a new one."),
    ("settings.language", "Language"),
    ("settings.theme", "Theme"),
    ("settings.theme_auto", "System (Auto)"),
    ("settings.theme_light", "Light"),
    ("settings.theme_dark", "Dark"),
    ("settings.export_success", "Profile exported successfully"),
    ("settings.import_success", "Profile imported successfully"),
    ("settings.import_warn", "This will overwrite your current data."),
    ("settings.parse_error", "Failed to parse profile file"),
    ("settings.storage_error", "Could not write to local storage"),
    ("settings.asset_error", "Background image could not be read"),
    ("settings.reset_done", "All data has been reset"),
    ("settings.reset_confirm", "Are you sure you want to delete all data? This cannot be undone."),
    ("settings.background_set", "Background image updated"),
    ("settings.background_cleared", "Background image removed"),
    ("import.notify.title", "Profile Detected"),
    ("import.notify.msg", "Found profile updated at: {date}. Do you want to import?"),
    ("import.older", "The file is older than your current data (updated at {date}). Re-run with --yes to import anyway."),
    ("project.created", "Created project {name}"),
    ("project.deleted", "Deleted project {name}"),
    ("project.none", "No projects yet. Add one with `opentodo project add <name>`."),
    ("list.no_tasks", "No tasks here"),
    ("list.empty_group", "Empty Group"),
    ("list.tasks_count", "{count} Tasks"),
    ("list.no_lists", "No lists yet."),
    ("list.show_deleted", "Show Deleted"),
    ("list.created", "Created list {name}"),
    ("task.created", "Created task {name}"),
    ("task.completed", "Completed"),
    ("task.reopened", "Reopened"),
    ("task.deleted", "Moved to trash"),
    ("task.restored", "Restored"),
    ("task.purged", "Deleted permanently"),
    ("group.created", "Created group {name}"),
    ("group.delete_msg", "Tasks inside will be deleted (soft)."),
    ("common.updated", "Updated"),
    ("common.deleted", "deleted"),
    ("import.confirm_hint", "Re-run with --yes to import."),
    ("settings.reset_hint", "Re-run with --yes to confirm."),
    ("settings.no_background", "No background image set"),
    ("tui.help", "q quit · d show deleted · ↑/↓ scroll"),
];

static ZH_CN: &[(&str, &str)] = &[
    ("app.title", "OpenTodo"),
    ("nav.projects", "项目列表"),
    ("nav.settings", "设置"),
    ("common.success", "成功"),
    ("common.error", "错误"),
    ("common.created", "创建于"),
    ("home.welcome", "欢迎使用 OpenTodo"),
    ("home.subtitle", "请选择一个项目开始，或创建一个新项目。"),
    ("settings.language", "语言"),
    ("settings.theme", "主题"),
    ("settings.theme_auto", "跟随系统"),
    ("settings.theme_light", "明亮"),
    ("settings.theme_dark", "暗黑"),
    ("settings.export_success", "数据导出成功"),
    ("settings.import_success", "数据导入成功"),
    ("settings.import_warn", "这将覆盖您当前的所有数据。"),
    ("settings.parse_error", "解析配置文件失败"),
    ("settings.reset_confirm", "确定要删除所有数据吗？此操作无法撤销。"),
    ("import.notify.title", "检测到配置文件"),
    ("import.notify.msg", "发现更新于 {date} 的配置。是否导入？"),
    ("list.no_tasks", "暂无任务"),
    ("list.empty_group", "空分组"),
    ("list.tasks_count", "{count} 个任务"),
    ("list.no_lists", "暂无列表"),
    ("list.show_deleted", "显示已删除"),
    ("task.completed", "已完成"),
    ("group.delete_msg", "分组内的任务将被移入回收站。"),
    ("common.updated", "已更新"),
    ("common.deleted", "已删除"),
    ("import.confirm_hint", "使用 --yes 重新运行以导入。"),
    ("settings.reset_hint", "使用 --yes 重新运行以确认。"),
    ("tui.help", "q 退出 · d 显示已删除 · ↑/↓ 滚动"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemorySlotStore;

    #[test]
    fn falls_back_from_selected_to_default_to_key() {
        let zh = LocaleTable::new(Locale::ZhCn);
        assert_eq!(zh.t("nav.settings"), "设置");
        // Only present in the default table.
        assert_eq!(zh.t("project.none"), LocaleTable::default().t("project.none"));
        assert_eq!(zh.t("does.not.exist"), "does.not.exist");
    }

    #[test]
    fn substitutes_named_arguments() {
        let en = LocaleTable::new(Locale::EnUs);
        assert_eq!(en.translate("list.tasks_count", &[("count", "3")]), "3 Tasks");
        assert_eq!(
            LocaleTable::new(Locale::ZhCn).translate("list.tasks_count", &[("count", "3")]),
            "3 个任务"
        );
    }

    #[test]
    fn parses_locale_codes() {
        assert_eq!("zh-CN".parse::<Locale>(), Ok(Locale::ZhCn));
        assert_eq!("en-us".parse::<Locale>(), Ok(Locale::EnUs));
        assert!("fr-FR".parse::<Locale>().is_err());
    }

    #[tokio::test]
    async fn locale_slot_round_trip_and_fallback() {
        let store = InMemorySlotStore::new();
        assert_eq!(load_locale(&store).await, Locale::EnUs);

        save_locale(&store, Locale::ZhCn).await.expect("save");
        assert_eq!(load_locale(&store).await, Locale::ZhCn);

        store.put(LOCALE_SLOT, b"klingon").await.expect("put");
        assert_eq!(load_locale(&store).await, Locale::EnUs);
    }
}
