//! Settings of the reminder and the locations of every file the program touches.
//!
//! The settings file is the only durable state. It is not locked, so two invocations running at
//! the same moment race on it and the last writer wins.

pub mod store;

use std::{
    num::NonZeroU32,
    path::{Path, PathBuf},
};

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::utils::time::hh_mm;

pub const SETTINGS_FILE_NAME: &str = "water_reminder_config.json";
pub const LAUNCHER_FILE_NAME: &str = "water_reminder_task.bat";
pub const DESCRIPTOR_FILE_NAME: &str = "WaterReminder_Task.xml";
pub const LOG_DIR_NAME: &str = "logs";

/// The persisted reminder settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderConfig {
    pub interval_minutes: NonZeroU32,
    #[serde(with = "hh_mm")]
    pub start_time: NaiveTime,
    #[serde(with = "hh_mm")]
    pub end_time: NaiveTime,
    pub message: String,
    pub title: String,
    /// Passed along as a sound hint, nothing else depends on it.
    pub sound_enabled: bool,
    /// Local wall-clock time of the last notification that was actually shown.
    pub last_reminder: Option<NaiveDateTime>,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            interval_minutes: NonZeroU32::new(60).expect("60 is not zero"),
            start_time: NaiveTime::from_hms_opt(8, 0, 0).expect("08:00 is a valid time"),
            end_time: NaiveTime::from_hms_opt(22, 0, 0).expect("22:00 is a valid time"),
            message: "💧 Time to drink water! Stay hydrated! 💧".into(),
            title: "Water Reminder".into(),
            sound_enabled: true,
            last_reminder: None,
        }
    }
}

impl ReminderConfig {
    pub fn interval(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.interval_minutes.get()))
    }

    /// Windows that cross midnight are not supported, the active check is always false for them.
    pub fn window_spans_midnight(&self) -> bool {
        self.end_time < self.start_time
    }
}

/// Every path used by the program, derived from one base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub base_dir: PathBuf,
    pub settings: PathBuf,
    pub launcher: PathBuf,
    pub descriptor: PathBuf,
    pub logs: PathBuf,
}

impl AppPaths {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        Self {
            settings: base_dir.join(SETTINGS_FILE_NAME),
            launcher: base_dir.join(LAUNCHER_FILE_NAME),
            descriptor: base_dir.join(DESCRIPTOR_FILE_NAME),
            logs: base_dir.join(LOG_DIR_NAME),
            base_dir,
        }
    }

    pub fn artifacts_exist(&self) -> bool {
        self.launcher.exists() && self.descriptor.exists()
    }
}
