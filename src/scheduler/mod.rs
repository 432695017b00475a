//! Integration with the Windows Task Scheduler. The program never creates the task itself, it
//! writes a launcher script plus an importable task document and can ask the OS whether the task
//! exists.

pub mod descriptor;
pub mod instructions;
pub mod launcher;

use std::{
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::{
    config::{AppPaths, ReminderConfig},
    reminder::window::is_active,
};

use descriptor::generate_task_descriptor;
use instructions::describe_setup_instructions;
use launcher::generate_launcher;

/// Name the task is expected to be registered under.
pub const TASK_NAME: &str = "WaterReminder_Task";

/// Asks the host scheduler about registered tasks.
#[cfg_attr(test, mockall::automock)]
pub trait TaskQueryPort {
    /// `Ok(true)` when the task exists. An error means the query itself could not be made.
    fn query(&self, task_name: &str) -> Result<bool>;
}

/// Queries through `schtasks`, a zero exit code means the task is registered.
pub struct SchtasksQuery;

impl TaskQueryPort for SchtasksQuery {
    fn query(&self, task_name: &str) -> Result<bool> {
        let status = Command::new("schtasks")
            .args(["/query", "/tn", task_name])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .context("Failed to run schtasks")?;
        debug!("schtasks exited with {status}");
        Ok(status.success())
    }
}

/// Registration check that treats any failure to ask as "not registered".
pub fn is_task_registered(port: &dyn TaskQueryPort, task_name: &str) -> bool {
    port.query(task_name)
        .inspect_err(|e| warn!("Couldn't query task {task_name}: {e:?}"))
        .unwrap_or(false)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupArtifacts {
    pub launcher: PathBuf,
    pub descriptor: PathBuf,
}

/// Regenerates both artifacts from the current settings and prints how to register them.
pub fn setup(
    config: &ReminderConfig,
    paths: &AppPaths,
    executable: &Path,
    now: NaiveDateTime,
) -> Result<SetupArtifacts> {
    println!("🔧 Setting up Windows Task Scheduler...");
    println!("{}", "=".repeat(50));

    let launcher = generate_launcher(paths, executable)?;
    println!("✅ Created batch script: {}", launcher.display());
    let descriptor = generate_task_descriptor(config, paths, &launcher, now)?;
    println!("✅ Created Task Scheduler XML: {}", descriptor.display());

    let artifacts = SetupArtifacts {
        launcher,
        descriptor,
    };
    let settings = std::path::absolute(&paths.settings)?;
    println!(
        "{}",
        describe_setup_instructions(config, &artifacts, &settings)
    );
    info!("Setup finished with {artifacts:?}");
    Ok(artifacts)
}

/// Snapshot shown at the top of the interactive menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusInfo {
    pub files_created: bool,
    pub task_registered: bool,
    pub last_reminder: Option<NaiveDateTime>,
    pub is_active: bool,
}

impl StatusInfo {
    pub fn collect(
        paths: &AppPaths,
        port: &dyn TaskQueryPort,
        config: &ReminderConfig,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            files_created: paths.artifacts_exist(),
            task_registered: is_task_registered(port, TASK_NAME),
            last_reminder: config.last_reminder,
            is_active: is_active(now.time(), config.start_time, config.end_time),
        }
    }
}
