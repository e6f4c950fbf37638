//! Command implementations for vimctl

pub mod create;
pub mod profile;
