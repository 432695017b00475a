use std::path::Path;

use chrono::TimeDelta;

use crate::{config::ReminderConfig, utils::time::format_time_of_day};

use super::{SetupArtifacts, TASK_NAME};

/// Walkthrough printed after setup. It offers importing the generated document or creating the
/// task by hand, followed by the values the user needs.
pub fn describe_setup_instructions(
    config: &ReminderConfig,
    artifacts: &SetupArtifacts,
    settings: &Path,
) -> String {
    let start = format_time_of_day(config.start_time);
    let end = format_time_of_day(config.end_time);
    let interval = config.interval_minutes;
    let launcher = artifacts.launcher.display();
    let descriptor = artifacts.descriptor.display();
    let settings = settings.display();

    let window = (config.end_time - config.start_time).max(TimeDelta::zero());
    let window_hours = if window.num_minutes() % 60 == 0 {
        format!("{} hours", window.num_hours())
    } else {
        format!("{} hours {} minutes", window.num_hours(), window.num_minutes() % 60)
    };

    let mut text = format!(
        "\n📋 SETUP INSTRUCTIONS:\n\
         {rule}\n\
         \n\
         🎯 METHOD 1 - Easy Import (Recommended):\n\
         1. Press Win + R, type 'taskschd.msc' and press Enter\n\
         2. In Task Scheduler, click 'Import Task...' in the right panel\n\
         3. Browse and select: {descriptor}\n\
         4. Click 'OK' to import the task\n\
         5. Name the task '{TASK_NAME}' so this program can find it\n\
         \n\
         🔧 METHOD 2 - Manual Setup:\n\
         1. Press Win + R, type 'taskschd.msc' and press Enter\n\
         2. Click 'Create Basic Task...' in the right panel\n\
         3. Name: '{TASK_NAME}'\n\
         4. Trigger: Select 'Daily'\n\
         5. Start time: {start}\n\
         6. Action: 'Start a program'\n\
         7. Program/script: {launcher}\n\
         8. In Advanced settings:\n\
         \x20  - Check 'Repeat task every: {interval} minutes'\n\
         \x20  - For a duration of: {window_hours}\n\
         9. Click 'Finish'\n\
         \n\
         ✅ VERIFICATION:\n\
         - You can test the task by right-clicking it and selecting 'Run'\n\
         - Check 'Task Scheduler Library' to see your created task\n\
         - The task will run automatically based on your schedule\n\
         \n\
         ⚙️  CURRENT SETTINGS:\n\
         - Interval: Every {interval} minutes\n\
         - Active hours: {start} to {end}\n\
         - Message: {message}\n\
         \n\
         📁 FILES CREATED:\n\
         - Batch file: {launcher}\n\
         - XML file: {descriptor}\n\
         - Config file: {settings}\n",
        rule = "=".repeat(30),
        message = config.message,
    );
    if config.window_spans_midnight() {
        text.push_str(
            "\n⚠️  Active hours cross midnight, which is not supported. Reminders will not be shown \
             until the end time is after the start time.\n",
        );
    }
    text
}
