//! User-facing operation layers built on the engines

pub mod list;
