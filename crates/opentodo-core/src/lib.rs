//! Core of OpenTodo: the profile document model, its JSON codec, the slot
//! storage contract, and the small locale/theme collaborators.

pub mod asset;
pub mod codec;
pub mod locale;
pub mod model;
pub mod storage;
pub mod theme;

/// Product name used in export file names and UI strings.
pub const PRODUCT_NAME: &str = "OpenTodo";
