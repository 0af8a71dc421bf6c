use std::{fmt, str::FromStr};

use tracing::warn;

use crate::storage::{SlotStore, SlotStoreError, THEME_SLOT};

/// Stored theme preference; `Auto` follows the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    Auto,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::Auto => "auto",
        }
    }

    /// Effective dark flag given the OS preference.
    pub fn is_dark(&self, os_prefers_dark: bool) -> bool {
        match self {
            ThemeMode::Light => false,
            ThemeMode::Dark => true,
            ThemeMode::Auto => os_prefers_dark,
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            "auto" => Ok(ThemeMode::Auto),
            other => Err(format!("unsupported theme: {other}")),
        }
    }
}

pub async fn load_theme<S: SlotStore + ?Sized>(store: &S) -> ThemeMode {
    match store.get(THEME_SLOT).await {
        Ok(Some(bytes)) => String::from_utf8_lossy(&bytes).parse().unwrap_or_else(|err| {
            warn!("ignoring stored theme: {err}");
            ThemeMode::default()
        }),
        Ok(None) => ThemeMode::default(),
        Err(err) => {
            warn!("failed to read theme slot: {err}");
            ThemeMode::default()
        }
    }
}

pub async fn save_theme<S: SlotStore + ?Sized>(
    store: &S,
    mode: ThemeMode,
) -> Result<(), SlotStoreError> {
    store.put(THEME_SLOT, mode.as_str().as_bytes()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemorySlotStore;

    #[test]
    fn auto_follows_os_preference() {
        assert!(ThemeMode::Auto.is_dark(true));
        assert!(!ThemeMode::Auto.is_dark(false));
        assert!(ThemeMode::Dark.is_dark(false));
        assert!(!ThemeMode::Light.is_dark(true));
    }

    #[tokio::test]
    async fn theme_slot_round_trip() {
        let store = InMemorySlotStore::new();
        assert_eq!(load_theme(&store).await, ThemeMode::Auto);
        save_theme(&store, ThemeMode::Dark).await.expect("save");
        assert_eq!(load_theme(&store).await, ThemeMode::Dark);
    }
}
