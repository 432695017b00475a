use std::{
    io::{BufRead, Write},
    path::{Path, PathBuf},
};

use ansi_term::Colour;
use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{
    config::{AppPaths, ReminderConfig},
    notifier::NotificationBackend,
    reminder::{next_due, FireOutcome, ReminderEngine},
    scheduler::{self, SetupArtifacts, StatusInfo, TaskQueryPort},
    utils::time::{format_clock, format_time_of_day},
};

use super::{
    configure::{edit_config, prompt},
    shutdown::detect_shutdown,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Setup,
    TestNotification,
    Configure,
    RunContinuously,
    DetailedStatus,
    Exit,
}

/// Which menu is offered depends on how far the setup got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    Fresh,
    Unregistered,
    Registered,
}

impl MenuState {
    pub fn from_status(status: &StatusInfo) -> Self {
        match (status.files_created, status.task_registered) {
            (false, _) => MenuState::Fresh,
            (true, false) => MenuState::Unregistered,
            (true, true) => MenuState::Registered,
        }
    }

    pub fn options(self) -> &'static [(MenuAction, &'static str)] {
        match self {
            MenuState::Fresh => &[
                (
                    MenuAction::Setup,
                    "Setup Task Scheduler (recommended - works in background)",
                ),
                (
                    MenuAction::RunContinuously,
                    "Run continuously (keep program running)",
                ),
                (MenuAction::Configure, "Configure settings first"),
                (MenuAction::TestNotification, "Send test notification"),
                (MenuAction::Exit, "Exit"),
            ],
            MenuState::Unregistered => &[
                (MenuAction::Setup, "Setup Task Scheduler"),
                (MenuAction::TestNotification, "Send test notification"),
                (MenuAction::Configure, "Configure settings"),
                (MenuAction::RunContinuously, "Run continuously (manual mode)"),
                (MenuAction::Exit, "Exit"),
            ],
            MenuState::Registered => &[
                (MenuAction::TestNotification, "Send test notification"),
                (MenuAction::Configure, "Configure settings"),
                (MenuAction::DetailedStatus, "View detailed status"),
                (MenuAction::Setup, "Re-setup Task Scheduler"),
                (MenuAction::RunContinuously, "Run continuously (manual mode)"),
                (MenuAction::Exit, "Exit"),
            ],
        }
    }

    fn headline(self) -> &'static str {
        match self {
            MenuState::Fresh => "🚀 Welcome! Let's set up your water reminder.",
            MenuState::Unregistered => {
                "⚠️  Task Scheduler task not found. You may need to set it up."
            }
            MenuState::Registered => "🎉 Your water reminder is running automatically!",
        }
    }

    /// Maps the 1-based number typed by the user onto an action.
    pub fn choose(self, answer: &str) -> Option<MenuAction> {
        let index = answer.trim().parse::<usize>().ok()?.checked_sub(1)?;
        self.options().get(index).map(|(action, _)| *action)
    }
}

fn yes_no(value: bool, yes: &str, no: &str) -> String {
    if value {
        Colour::Green.paint(yes).to_string()
    } else {
        Colour::Red.paint(no).to_string()
    }
}

pub fn render_status(status: &StatusInfo, config: &ReminderConfig) -> String {
    let mut lines = vec![
        "📊 STATUS:".to_string(),
        format!("✅ Setup files: {}", yes_no(status.files_created, "Created", "Missing")),
        format!(
            "{} Task Scheduler: {}",
            if status.task_registered { "✅" } else { "❌" },
            yes_no(status.task_registered, "Active", "Not found")
        ),
    ];
    if let Some(last) = status.last_reminder {
        lines.push(format!("🕒 Last reminder: {}", format_clock(last)));
    }
    lines.push(format!(
        "⏰ Currently {} (Active: {}-{})",
        yes_no(status.is_active, "ACTIVE", "INACTIVE"),
        format_time_of_day(config.start_time),
        format_time_of_day(config.end_time)
    ));
    lines.join("\n")
}

pub fn render_detailed_status(
    status: &StatusInfo,
    config: &ReminderConfig,
    paths: &AppPaths,
) -> String {
    let file_state = |path: &Path| {
        format!(
            "{} ({})",
            path.display(),
            yes_no(path.exists(), "exists", "missing")
        )
    };
    let next = next_due(config)
        .map(|v| v.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "on the next scheduled run".into());
    let last = config
        .last_reminder
        .map(|v| v.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "never".into());

    [
        "📊 DETAILED STATUS:".to_string(),
        "=".repeat(30),
        format!("Settings file: {}", file_state(paths.settings.as_path())),
        format!("Batch file: {}", file_state(paths.launcher.as_path())),
        format!("XML file: {}", file_state(paths.descriptor.as_path())),
        format!(
            "Task '{}': {}",
            scheduler::TASK_NAME,
            yes_no(status.task_registered, "registered", "not registered")
        ),
        String::new(),
        format!("Interval: every {} minutes", config.interval_minutes),
        format!(
            "Active hours: {} to {}",
            format_time_of_day(config.start_time),
            format_time_of_day(config.end_time)
        ),
        format!("Title: {}", config.title),
        format!("Message: {}", config.message),
        format!("Sound: {}", if config.sound_enabled { "on" } else { "off" }),
        String::new(),
        format!("Last reminder: {last}"),
        format!("Next reminder due: {next}"),
        format!(
            "Currently {}",
            yes_no(status.is_active, "ACTIVE", "INACTIVE")
        ),
    ]
    .join("\n")
}

/// Everything a single invocation of the program works with.
pub struct Shell<B, Q> {
    engine: ReminderEngine<B>,
    query: Q,
    paths: AppPaths,
    executable: PathBuf,
}

impl<B: NotificationBackend, Q: TaskQueryPort> Shell<B, Q> {
    pub fn new(engine: ReminderEngine<B>, query: Q, paths: AppPaths, executable: PathBuf) -> Self {
        Self {
            engine,
            query,
            paths,
            executable,
        }
    }

    pub fn engine(&self) -> &ReminderEngine<B> {
        &self.engine
    }

    pub fn status(&self) -> StatusInfo {
        StatusInfo::collect(
            &self.paths,
            &self.query,
            self.engine.config(),
            self.engine.now(),
        )
    }

    /// Single evaluation used by the scheduled task.
    pub fn notify(&mut self) -> Result<FireOutcome> {
        let now = self.engine.now();
        let outcome = self.engine.fire_if_due(now)?;
        info!("Scheduled run finished with {outcome:?}");
        Ok(outcome)
    }

    pub fn setup(&self) -> Result<SetupArtifacts> {
        scheduler::setup(
            self.engine.config(),
            &self.paths,
            &self.executable,
            self.engine.now(),
        )
    }

    pub fn test_notification(&self, output: &mut impl Write) -> Result<()> {
        if self.engine.send_test() {
            writeln!(output, "✅ Test notification sent!")?;
        } else {
            writeln!(output, "❌ Failed to send notification")?;
        }
        Ok(())
    }

    pub fn configure(&mut self, input: &mut impl BufRead, output: &mut impl Write) -> Result<()> {
        let config = edit_config(self.engine.config(), input, output)?;
        self.engine.update_config(config)?;
        writeln!(output, "✅ Configuration saved!")?;
        writeln!(
            output,
            "\n⚠️  Note: If you already set up Task Scheduler, you may need to\n\
             update the task or recreate it to use the new settings."
        )?;
        Ok(())
    }

    /// Runs until ctrl-c.
    pub async fn run_continuous(&mut self) -> Result<()> {
        let shutdown = CancellationToken::new();
        let engine = &mut self.engine;
        let (_, result) = tokio::join!(detect_shutdown(shutdown.clone()), async {
            let result = engine.run_continuous(shutdown.clone()).await;
            shutdown.cancel();
            result
        });
        result
    }

    pub fn detailed_status(&self, output: &mut impl Write) -> Result<()> {
        let status = self.status();
        writeln!(
            output,
            "{}",
            render_detailed_status(&status, self.engine.config(), &self.paths)
        )?;
        Ok(())
    }

    /// Shows the status and the menu fitting it, then performs one chosen action.
    pub async fn run_menu(
        &mut self,
        input: &mut impl BufRead,
        output: &mut impl Write,
    ) -> Result<()> {
        let status = self.status();
        let state = MenuState::from_status(&status);

        writeln!(output, "🚰 === Windows Water Reminder ===")?;
        if status.files_created {
            writeln!(output, "{}", render_status(&status, self.engine.config()))?;
            writeln!(output)?;
        }
        writeln!(output, "{}", state.headline())?;
        let options = state.options();
        for (number, (_, label)) in options.iter().enumerate() {
            writeln!(output, "{}. {label}", number + 1)?;
        }

        let question = format!("Choose option (1-{}): ", options.len());
        let answer = prompt(input, output, &question)?.unwrap_or_default();
        let Some(action) = state.choose(&answer) else {
            writeln!(output, "Invalid choice")?;
            return Ok(());
        };
        info!("Menu action {action:?}");
        self.dispatch(action, input, output).await
    }

    pub async fn dispatch(
        &mut self,
        action: MenuAction,
        input: &mut impl BufRead,
        output: &mut impl Write,
    ) -> Result<()> {
        match action {
            MenuAction::Setup => self.setup().map(|_| ()),
            MenuAction::TestNotification => self.test_notification(output),
            MenuAction::Configure => self.configure(input, output),
            MenuAction::RunContinuously => self.run_continuous().await,
            MenuAction::DetailedStatus => self.detailed_status(output),
            MenuAction::Exit => {
                writeln!(output, "Goodbye! Stay hydrated! 💧")?;
                Ok(())
            }
        }
    }
}
