//! Slot storage: the key/value medium the profile store and its collaborators
//! persist into. Each slot is written independently; there is no cross-slot
//! transaction.

pub mod slot_store;

pub use slot_store::{InMemorySlotStore, SlotStore, SlotStoreError};

/// Slot holding the JSON-encoded profile document.
pub const PROFILE_SLOT: &str = "profile";
/// Slot receiving the raw bytes of a stored profile that did not decode
/// cleanly, written before the recovered document replaces them.
pub const PROFILE_BACKUP_SLOT: &str = "profile-unreadable";
/// Slot holding the background image as a data URI.
pub const BACKGROUND_SLOT: &str = "background-asset";
/// Slot holding the selected UI locale code.
pub const LOCALE_SLOT: &str = "locale";
/// Slot holding the selected theme mode.
pub const THEME_SLOT: &str = "theme";
