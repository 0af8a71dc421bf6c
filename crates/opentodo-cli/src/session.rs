use color_eyre::eyre::{eyre, Report};
use opentodo_core::{
    locale::{load_locale, LocaleTable},
    storage::SlotStore,
};
use opentodo_profile::{ProfileStore, StoreError};
use tracing::warn;

/// An initialized profile store plus the translator for user-facing output.
pub struct Session<S: SlotStore> {
    pub store: ProfileStore<S>,
    pub locale: LocaleTable,
}

impl<S: SlotStore> Session<S> {
    /// Wrap an already initialized store, reading the locale from its slots.
    pub async fn open(store: ProfileStore<S>) -> Self {
        let locale = LocaleTable::new(load_locale(store.slots()).await);
        Self { store, locale }
    }

    /// Turn a store failure into a one-line notification with its category.
    pub fn notify(&self, err: StoreError) -> Report {
        let key = match &err {
            StoreError::Codec(_) => "settings.parse_error",
            StoreError::StorageUnavailable(_) => "settings.storage_error",
            StoreError::AssetDecodeFailed(_) => "settings.asset_error",
            _ => "common.error",
        };
        warn!(category = err.category(), "{err}");
        eyre!("{}: {} ({err})", self.locale.t(key), err.category())
    }

    pub fn say(&self, key: &str) {
        println!("{}", self.locale.t(key));
    }

    pub fn say_with(&self, key: &str, args: &[(&str, &str)]) {
        println!("{}", self.locale.translate(key, args));
    }
}
