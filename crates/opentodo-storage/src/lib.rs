//! Durable slot storage: one file per slot under a data directory.

pub mod file_slot_store;
