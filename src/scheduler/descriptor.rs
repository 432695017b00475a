use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, TimeDelta};
use tracing::{info, warn};

use crate::{
    config::{AppPaths, ReminderConfig},
    utils::time::format_time_of_day,
};

const AUTHOR: &str = "Water Reminder";
const DESCRIPTION: &str = "Reminds you to drink water regularly";
const EXECUTION_TIME_LIMIT: &str = "PT1M";

/// Task Scheduler expects durations as ISO 8601, e.g. `PT14H0M`.
fn iso_duration(value: TimeDelta) -> String {
    format!("PT{}H{}M", value.num_hours(), value.num_minutes() % 60)
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

const BOUNDARY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Repetition inside the active window. Task Scheduler refuses a repetition whose duration is not
/// longer than its interval, such windows get a single fire at `start_time` instead.
fn repetition(config: &ReminderConfig) -> Option<String> {
    if config.window_spans_midnight() {
        warn!("Active window crosses midnight, the task will not repeat during the day");
        return None;
    }
    let window = config.end_time - config.start_time;
    if window <= config.interval() {
        warn!(
            "Active window of {} minutes is not longer than the {} minute interval, the task \
             fires once a day",
            window.num_minutes(),
            config.interval_minutes
        );
        return None;
    }
    Some(format!(
        r#"
      <Repetition>
        <Interval>PT{}M</Interval>
        <Duration>{}</Duration>
        <StopAtDurationEnd>false</StopAtDurationEnd>
      </Repetition>"#,
        config.interval_minutes,
        iso_duration(window)
    ))
}

/// Builds the Task Scheduler import document.
///
/// Today's window is a `TimeTrigger` bounded by `start_time` and `end_time`. A `CalendarTrigger`
/// repeats the same window every day from tomorrow on, a calendar trigger's `EndBoundary` would
/// retire it for good so the daily end is only carried by the repetition duration.
pub fn render_task_descriptor(
    config: &ReminderConfig,
    launcher: &Path,
    now: NaiveDateTime,
) -> String {
    let first_start = now.date().and_time(config.start_time);
    let mut first_end = now.date().and_time(config.end_time);
    if config.window_spans_midnight() {
        first_end += TimeDelta::days(1);
    }
    let daily_start = first_start + TimeDelta::days(1);
    let repetition = repetition(config).unwrap_or_default();
    let working_dir = launcher.parent().unwrap_or(launcher);

    format!(
        r#"<?xml version="1.0" encoding="UTF-16"?>
<Task version="1.4" xmlns="http://schemas.microsoft.com/windows/2004/02/mit/task">
  <RegistrationInfo>
    <Date>{registered}</Date>
    <Author>{AUTHOR}</Author>
    <Description>{description}</Description>
  </RegistrationInfo>
  <Triggers>
    <TimeTrigger>{repetition}
      <StartBoundary>{first_start}</StartBoundary>
      <EndBoundary>{first_end}</EndBoundary>
      <ExecutionTimeLimit>{EXECUTION_TIME_LIMIT}</ExecutionTimeLimit>
      <Enabled>true</Enabled>
    </TimeTrigger>
    <CalendarTrigger>{repetition}
      <StartBoundary>{daily_start}</StartBoundary>
      <ExecutionTimeLimit>{EXECUTION_TIME_LIMIT}</ExecutionTimeLimit>
      <Enabled>true</Enabled>
      <ScheduleByDay>
        <DaysInterval>1</DaysInterval>
      </ScheduleByDay>
    </CalendarTrigger>
  </Triggers>
  <Principals>
    <Principal id="Author">
      <LogonType>InteractiveToken</LogonType>
      <RunLevel>LeastPrivilege</RunLevel>
    </Principal>
  </Principals>
  <Settings>
    <MultipleInstancesPolicy>IgnoreNew</MultipleInstancesPolicy>
    <DisallowStartIfOnBatteries>false</DisallowStartIfOnBatteries>
    <StopIfGoingOnBatteries>false</StopIfGoingOnBatteries>
    <AllowHardTerminate>true</AllowHardTerminate>
    <StartWhenAvailable>false</StartWhenAvailable>
    <RunOnlyIfNetworkAvailable>false</RunOnlyIfNetworkAvailable>
    <IdleSettings>
      <StopOnIdleEnd>true</StopOnIdleEnd>
      <RestartOnIdle>false</RestartOnIdle>
    </IdleSettings>
    <AllowStartOnDemand>true</AllowStartOnDemand>
    <Enabled>true</Enabled>
    <Hidden>false</Hidden>
    <RunOnlyIfIdle>false</RunOnlyIfIdle>
    <DisallowStartOnRemoteAppSession>false</DisallowStartOnRemoteAppSession>
    <UseUnifiedSchedulingEngine>true</UseUnifiedSchedulingEngine>
    <WakeToRun>false</WakeToRun>
    <ExecutionTimeLimit>{EXECUTION_TIME_LIMIT}</ExecutionTimeLimit>
    <Priority>7</Priority>
  </Settings>
  <Actions Context="Author">
    <Exec>
      <Command>{command}</Command>
      <WorkingDirectory>{working_dir}</WorkingDirectory>
    </Exec>
  </Actions>
</Task>
"#,
        registered = now.format(BOUNDARY_FORMAT),
        description = escape_xml(&format!(
            "{DESCRIPTION} ({}-{})",
            format_time_of_day(config.start_time),
            format_time_of_day(config.end_time)
        )),
        first_start = first_start.format(BOUNDARY_FORMAT),
        first_end = first_end.format(BOUNDARY_FORMAT),
        daily_start = daily_start.format(BOUNDARY_FORMAT),
        command = escape_xml(&launcher.display().to_string()),
        working_dir = escape_xml(&working_dir.display().to_string()),
    )
}

/// UTF-16LE with a byte order mark, matching the encoding the document declares.
pub fn encode_utf16_with_bom(content: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(content.len() * 2 + 2);
    bytes.extend_from_slice(&[0xFF, 0xFE]);
    for unit in content.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    bytes
}

/// Writes the import document next to the launcher, replacing any previous one, and returns its
/// absolute path.
pub fn generate_task_descriptor(
    config: &ReminderConfig,
    paths: &AppPaths,
    launcher: &Path,
    now: NaiveDateTime,
) -> Result<PathBuf> {
    let content = render_task_descriptor(config, launcher, now);
    std::fs::write(&paths.descriptor, encode_utf16_with_bom(&content))
        .with_context(|| format!("Failed to write task descriptor {:?}", paths.descriptor))?;
    let path = std::path::absolute(&paths.descriptor)?;
    info!("Created task descriptor {path:?}");
    Ok(path)
}
