use std::{
    fs,
    path::{Path, PathBuf},
};

use color_eyre::{eyre::eyre, Result};
use opentodo_core::{
    locale::save_locale,
    storage::SlotStore,
    theme::{load_theme, save_theme, ThemeMode},
};
use tracing::info;

use crate::{
    cli::{BackgroundCommand, ProfileCommand, SettingsCommand},
    session::Session,
    view,
};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Execute a whole-profile subcommand. `export_dir` is the configured default
/// backup location.
pub async fn handle_profile<S: SlotStore>(
    cmd: ProfileCommand,
    session: &Session<S>,
    export_dir: Option<&Path>,
) -> Result<()> {
    let store = &session.store;
    match cmd {
        ProfileCommand::Show { deleted } => {
            let profile = store.profile().await;
            print!("{}", view::render_tree(&profile, &session.locale, deleted));
        }
        ProfileCommand::Rename { name } => {
            store
                .set_user_name(name)
                .await
                .map_err(|e| session.notify(e))?;
            session.say("common.updated");
        }
        ProfileCommand::Export { out } => {
            let dir = out
                .or_else(|| export_dir.map(Path::to_path_buf))
                .unwrap_or_else(|| PathBuf::from("."));
            let path = export_to(session, &dir).await?;
            session.say("settings.export_success");
            println!("{}", path.display());
        }
        ProfileCommand::Import { file, yes } => {
            import_from(session, &file, yes).await?;
        }
        ProfileCommand::Reset { yes } => {
            if !yes {
                session.say("settings.reset_confirm");
                session.say("settings.reset_hint");
                return Ok(());
            }
            store.reset().await.map_err(|e| session.notify(e))?;
            session.say("settings.reset_done");
        }
    }
    Ok(())
}

/// Write the pretty snapshot into `dir` under its dated name.
async fn export_to<S: SlotStore>(session: &Session<S>, dir: &Path) -> Result<PathBuf> {
    let snapshot = session
        .store
        .export_snapshot()
        .await
        .map_err(|e| session.notify(e))?;
    fs::create_dir_all(dir)?;
    let path = dir.join(&snapshot.file_name);
    fs::write(&path, &snapshot.bytes)?;
    info!(path = %path.display(), "profile exported");
    Ok(path)
}

/// Decode `file` and apply it when confirmed. Without confirmation only the
/// candidate's timestamp is reported and nothing changes.
async fn import_from<S: SlotStore>(
    session: &Session<S>,
    file: &Path,
    confirmed: bool,
) -> Result<bool> {
    let bytes = fs::read(file)?;
    let candidate = session
        .store
        .import_snapshot(&bytes)
        .await
        .map_err(|e| session.notify(e))?;

    if !confirmed {
        let date = candidate.updated_at().format(DATE_FORMAT).to_string();
        session.say("import.notify.title");
        session.say_with("import.notify.msg", &[("date", date.as_str())]);
        session.say("settings.import_warn");
        if candidate.is_older_than_live() {
            let live = candidate.live_updated_at.format(DATE_FORMAT).to_string();
            session.say_with("import.older", &[("date", live.as_str())]);
        } else {
            session.say("import.confirm_hint");
        }
        return Ok(false);
    }

    session
        .store
        .apply_imported(candidate)
        .await
        .map_err(|e| session.notify(e))?;
    session.say("settings.import_success");
    Ok(true)
}

pub async fn handle_background<S: SlotStore>(
    cmd: BackgroundCommand,
    session: &Session<S>,
) -> Result<()> {
    let store = &session.store;
    match cmd {
        BackgroundCommand::Set { file } => {
            let bytes = fs::read(&file)?;
            store
                .set_background(&bytes)
                .await
                .map_err(|e| session.notify(e))?;
            session.say("settings.background_set");
        }
        BackgroundCommand::Clear => {
            store
                .clear_background()
                .await
                .map_err(|e| session.notify(e))?;
            session.say("settings.background_cleared");
        }
        BackgroundCommand::Export { file } => {
            let bytes = store
                .background_bytes()
                .await
                .map_err(|e| session.notify(e))?
                .ok_or_else(|| eyre!(session.locale.t("settings.no_background")))?;
            fs::write(&file, bytes)?;
            println!("{}", file.display());
        }
    }
    Ok(())
}

fn theme_label_key(mode: ThemeMode) -> &'static str {
    match mode {
        ThemeMode::Light => "settings.theme_light",
        ThemeMode::Dark => "settings.theme_dark",
        ThemeMode::Auto => "settings.theme_auto",
    }
}

pub async fn handle_settings<S: SlotStore>(
    cmd: SettingsCommand,
    session: &Session<S>,
) -> Result<()> {
    let slots = session.store.slots();
    match cmd {
        SettingsCommand::Show => {
            let theme = load_theme(slots).await;
            let effective = if theme.is_dark(view::os_prefers_dark()) {
                ThemeMode::Dark
            } else {
                ThemeMode::Light
            };
            println!(
                "{}: {}",
                session.locale.t("settings.language"),
                session.locale.locale()
            );
            println!(
                "{}: {} ({})",
                session.locale.t("settings.theme"),
                session.locale.t(theme_label_key(theme)),
                session.locale.t(theme_label_key(effective))
            );
        }
        SettingsCommand::Locale { locale } => {
            save_locale(slots, locale)
                .await
                .map_err(|e| session.notify(e.into()))?;
            println!("{}: {locale}", session.locale.t("common.updated"));
        }
        SettingsCommand::Theme { mode } => {
            save_theme(slots, mode)
                .await
                .map_err(|e| session.notify(e.into()))?;
            println!(
                "{}: {}",
                session.locale.t("common.updated"),
                session.locale.t(theme_label_key(mode))
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentodo_core::{
        locale::{load_locale, Locale},
        storage::InMemorySlotStore,
    };
    use opentodo_profile::ProfileStore;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDRbody";

    async fn session() -> Session<InMemorySlotStore> {
        let store = ProfileStore::new(InMemorySlotStore::new());
        store.init().await;
        Session::open(store).await
    }

    #[tokio::test]
    async fn export_writes_dated_backup_that_imports_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = session().await;
        source
            .store
            .add_project("Home", None)
            .await
            .expect("project");
        source.store.set_user_name("Ada").await.expect("rename");

        let path = export_to(&source, dir.path()).await.expect("export");
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .expect("file name");
        assert!(name.starts_with("OpenTodo_Backup_"));
        assert!(name.ends_with(".json"));

        let target = session().await;
        let applied = import_from(&target, &path, true).await.expect("import");
        assert!(applied);
        assert_eq!(target.store.profile().await, source.store.profile().await);
    }

    #[tokio::test]
    async fn import_without_confirmation_changes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = session().await;
        source
            .store
            .add_project("Other", None)
            .await
            .expect("project");
        let path = export_to(&source, dir.path()).await.expect("export");

        let target = session().await;
        let before = target.store.profile().await;
        let applied = import_from(&target, &path, false).await.expect("preview");
        assert!(!applied);
        assert_eq!(target.store.profile().await, before);
    }

    #[tokio::test]
    async fn malformed_import_reports_category() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").expect("write");

        let target = session().await;
        let err = import_from(&target, &path, true)
            .await
            .expect_err("should fail");
        assert!(err.to_string().contains("malformed json"));
        assert!(target.store.profile().await.projects.is_empty());
    }

    #[tokio::test]
    async fn reset_requires_confirmation() {
        let session = session().await;
        session
            .store
            .add_project("Keep", None)
            .await
            .expect("project");

        handle_profile(ProfileCommand::Reset { yes: false }, &session, None)
            .await
            .expect("preview");
        assert_eq!(session.store.profile().await.projects.len(), 1);

        handle_profile(ProfileCommand::Reset { yes: true }, &session, None)
            .await
            .expect("reset");
        assert!(session.store.profile().await.projects.is_empty());
    }

    #[tokio::test]
    async fn background_set_export_and_clear() {
        let dir = tempfile::tempdir().expect("tempdir");
        let image = dir.path().join("bg.png");
        let copy = dir.path().join("copy.png");
        fs::write(&image, PNG).expect("write");

        let session = session().await;
        handle_background(BackgroundCommand::Set { file: image }, &session)
            .await
            .expect("set");
        handle_background(BackgroundCommand::Export { file: copy.clone() }, &session)
            .await
            .expect("export");
        assert_eq!(fs::read(&copy).expect("read"), PNG);

        handle_background(BackgroundCommand::Clear, &session)
            .await
            .expect("clear");
        assert!(session.store.background().await.is_none());
        assert!(
            handle_background(BackgroundCommand::Export { file: copy }, &session)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn unknown_background_format_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("notes.txt");
        fs::write(&file, "plain text").expect("write");

        let session = session().await;
        let err = handle_background(BackgroundCommand::Set { file }, &session)
            .await
            .expect_err("not an image");
        assert!(err.to_string().contains("unreadable image"));
    }

    #[tokio::test]
    async fn settings_persist_locale_and_theme() {
        let session = session().await;
        handle_settings(
            SettingsCommand::Locale {
                locale: Locale::ZhCn,
            },
            &session,
        )
        .await
        .expect("locale");
        handle_settings(
            SettingsCommand::Theme {
                mode: ThemeMode::Dark,
            },
            &session,
        )
        .await
        .expect("theme");
        handle_settings(SettingsCommand::Show, &session)
            .await
            .expect("show");

        let slots = session.store.slots();
        assert_eq!(load_locale(slots).await, Locale::ZhCn);
        assert_eq!(load_theme(slots).await, ThemeMode::Dark);
    }
}
