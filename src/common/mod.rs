//! Common utilities shared across modules

pub mod fs;
