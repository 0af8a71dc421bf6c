//! The profile store: sole owner of the live OpenTodo document, persisting
//! it to a [`SlotStore`](opentodo_core::storage::SlotStore) after every
//! mutation and handling import, export and reset.

pub mod error;
pub mod patch;
pub mod snapshot;
pub mod store;
mod tree;

pub use error::{EntityKind, StoreError};
pub use patch::{NewTask, ProjectPatch, TaskPatch, TitlePatch};
pub use snapshot::{export_file_name, ImportCandidate, Snapshot};
pub use store::{ProfileStore, StoreEvent};
