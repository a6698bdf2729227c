//! CLI command implementations.

pub mod apply;
pub mod list;
pub mod verify;
pub mod version;
