//! Desktop reminder to drink water. It either runs once per invocation from the Windows Task
//! Scheduler, or stays alive and reminds every interval by itself.
//!

pub mod cli;
pub mod config;
pub mod notifier;
pub mod reminder;
pub mod scheduler;
pub mod utils;
