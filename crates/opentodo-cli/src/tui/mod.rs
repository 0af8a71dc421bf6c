use std::{io, time::Duration};

use color_eyre::Result;
use crossterm::{
    event::{self, DisableMouseCapture, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use opentodo_core::{locale::LocaleTable, model::Profile, theme::ThemeMode};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph},
    Terminal,
};

use crate::view::{self, OutlineRow, RowKind};

/// Colors for one effective theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Palette {
    accent: Color,
    text: Color,
    muted: Color,
    done: Color,
    deleted: Color,
}

impl Palette {
    fn for_theme(mode: ThemeMode, os_prefers_dark: bool) -> Self {
        if mode.is_dark(os_prefers_dark) {
            Self {
                accent: Color::Cyan,
                text: Color::White,
                muted: Color::DarkGray,
                done: Color::Green,
                deleted: Color::Red,
            }
        } else {
            Self {
                accent: Color::Blue,
                text: Color::Black,
                muted: Color::Gray,
                done: Color::Green,
                deleted: Color::Red,
            }
        }
    }

    fn style(&self, row: &OutlineRow) -> Style {
        let base = match row.kind {
            RowKind::Project => Style::default()
                .fg(self.accent)
                .add_modifier(Modifier::BOLD),
            RowKind::List => Style::default().fg(self.text).add_modifier(Modifier::BOLD),
            RowKind::Group => Style::default()
                .fg(self.accent)
                .add_modifier(Modifier::ITALIC),
            RowKind::Task if row.completed => Style::default().fg(self.done),
            RowKind::Task => Style::default().fg(self.text),
            RowKind::Placeholder => Style::default().fg(self.muted),
        };
        if row.deleted {
            base.fg(self.deleted).add_modifier(Modifier::CROSSED_OUT)
        } else {
            base
        }
    }
}

/// Read-only view of the project tree.
/// Press `q` or `Esc` to exit, `d` to toggle soft-deleted items.
pub fn launch(profile: &Profile, locale: &LocaleTable, theme: ThemeMode) -> Result<()> {
    let palette = Palette::for_theme(theme, view::os_prefers_dark());
    // Guard restores the terminal even if we early-return.
    let _guard = TerminalGuard::enter()?;
    let mut terminal = _guard.terminal()?;
    let mut show_deleted = false;
    let mut state = ListState::default();

    loop {
        let rows = view::outline(profile, locale, show_deleted);
        if rows.is_empty() {
            state.select(None);
        } else if state.selected().is_none_or(|i| i >= rows.len()) {
            state.select(Some(0));
        }

        terminal.draw(|frame| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .margin(1)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(1),
                    Constraint::Length(3),
                ])
                .split(frame.area());

            let header = Paragraph::new(Line::from(vec![
                Span::styled(
                    locale.t("app.title"),
                    Style::default()
                        .fg(palette.accent)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::styled(&profile.user_info.name, Style::default().fg(palette.text)),
            ]))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .title(locale.t("home.welcome")),
            );
            frame.render_widget(header, chunks[0]);

            let items: Vec<ListItem> = if rows.is_empty() {
                vec![ListItem::new(Span::styled(
                    locale.t("home.subtitle"),
                    Style::default().fg(palette.muted),
                ))]
            } else {
                rows.iter()
                    .map(|row| {
                        ListItem::new(Line::from(vec![
                            Span::raw("  ".repeat(row.depth)),
                            Span::styled(row.text.as_str(), palette.style(row)),
                        ]))
                    })
                    .collect()
            };

            let mut title = locale.t("nav.projects");
            if show_deleted {
                title = format!("{title} · {}", locale.t("list.show_deleted"));
            }
            let body = List::new(items)
                .block(Block::default().borders(Borders::ALL).title(title))
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
            frame.render_stateful_widget(body, chunks[1], &mut state);

            let footer = Paragraph::new(Span::styled(
                locale.t("tui.help"),
                Style::default().fg(palette.muted),
            ))
            .block(Block::default().borders(Borders::ALL));
            frame.render_widget(footer, chunks[2]);
        })?;

        if event::poll(Duration::from_millis(150))? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char('d') => show_deleted = !show_deleted,
                    KeyCode::Down | KeyCode::Char('j') => state.select_next(),
                    KeyCode::Up | KeyCode::Char('k') => state.select_previous(),
                    _ => {}
                }
            }
        }
    }

    Ok(())
}

struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        // Enter alternate screen to avoid polluting the shell buffer.
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self)
    }

    fn terminal(&self) -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
        let backend = CrosstermBackend::new(io::stdout());
        Ok(Terminal::new(backend)?)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(err) = disable_raw_mode() {
            eprintln!("failed to disable raw mode: {err}");
        }
        if let Err(err) = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture) {
            eprintln!("failed to restore terminal: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_theme_follows_terminal() {
        assert_eq!(
            Palette::for_theme(ThemeMode::Auto, true),
            Palette::for_theme(ThemeMode::Dark, false)
        );
        assert_eq!(
            Palette::for_theme(ThemeMode::Auto, false),
            Palette::for_theme(ThemeMode::Light, true)
        );
    }

    #[test]
    fn deleted_rows_are_struck_through() {
        let palette = Palette::for_theme(ThemeMode::Light, false);
        let row = OutlineRow {
            depth: 2,
            kind: RowKind::Task,
            text: "x".into(),
            deleted: true,
            completed: false,
        };
        let style = palette.style(&row);
        assert_eq!(style.fg, Some(palette.deleted));
        assert!(style.add_modifier.contains(Modifier::CROSSED_OUT));
    }
}
