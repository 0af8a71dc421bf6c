use std::path::PathBuf;

use crate::config::Config;
use color_eyre::Result;
use dirs::data_dir;
use opentodo_profile::ProfileStore;
use opentodo_storage::file_slot_store::FileSlotStore;
use tracing::debug;

/// Environment variable overriding every other data directory setting.
pub const DATA_DIR_ENV: &str = "OPENTODO_DATA_DIR";

/// Resolve the default data directory for OpenTodo.
pub fn default_data_dir() -> Result<PathBuf> {
    let base = data_dir().ok_or_else(|| color_eyre::eyre::eyre!("no data dir available"))?;
    Ok(base.join("opentodo"))
}

/// Pick the slot directory: environment override, then config, then the platform default.
pub fn resolve_data_dir(config: &Config) -> Result<PathBuf> {
    let from_env = std::env::var_os(DATA_DIR_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from);
    resolve_data_dir_with(config, from_env)
}

fn resolve_data_dir_with(config: &Config, from_env: Option<PathBuf>) -> Result<PathBuf> {
    match from_env.or_else(|| config.data_dir.clone()) {
        Some(root) => Ok(root),
        None => default_data_dir(),
    }
}

/// Build the file-backed slot store using config overrides.
pub fn store_from_config(config: &Config) -> Result<FileSlotStore> {
    Ok(store_at(resolve_data_dir(config)?, config))
}

fn store_at(root: PathBuf, config: &Config) -> FileSlotStore {
    debug!(?root, quota = ?config.slot_quota_bytes, "initializing slot store");
    let store = FileSlotStore::new(root);
    match config.slot_quota_bytes {
        Some(limit) => store.with_quota(limit),
        None => store,
    }
}

/// Open the profile store and load whatever is persisted.
pub async fn open_profile_store(config: &Config) -> Result<ProfileStore<FileSlotStore>> {
    let store = ProfileStore::new(store_from_config(config)?);
    store.init().await;
    Ok(store)
}
