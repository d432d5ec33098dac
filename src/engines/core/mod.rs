//! Core threading primitives

pub mod config;
pub mod interrupt;
pub mod parallel;
pub mod pool;
pub mod queue;
pub mod task;
