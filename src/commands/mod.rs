//! Command implementations for the mixer CLI

pub mod build;
pub mod bundle;
pub mod completions;
pub mod helpers;
pub mod init;
pub mod versions;
