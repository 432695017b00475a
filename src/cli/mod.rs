pub mod configure;
pub mod menu;
pub mod shutdown;

use std::{env, io, path::PathBuf};

use anyhow::Result;
use clap::Parser;
use menu::Shell;
use tracing::{error, info, level_filters::LevelFilter, warn};

use crate::{
    config::{
        store::{ConfigStore, LoadOutcome},
        AppPaths,
    },
    notifier::{ensure_notification_facility, DesktopBackend, Notifier},
    reminder::ReminderEngine,
    scheduler::SchtasksQuery,
    utils::{
        clock::DefaultClock,
        dir::resolve_base_dir,
        logging::enable_logging,
    },
};

#[derive(Parser, Debug)]
#[command(name = "water-reminder", version, long_about = None)]
#[command(about = "Reminds you to drink water throughout the day", long_about = None)]
pub struct Args {
    #[arg(long, help = "Send a notification if one is due. Used by the scheduled task")]
    notify: bool,
    #[arg(long, help = "Keep running and remind every interval")]
    continuous: bool,
    #[arg(long, help = "Edit settings interactively")]
    configure: bool,
    #[arg(long, help = "Generate the Task Scheduler files and print setup instructions")]
    setup: bool,
    #[arg(
        long,
        help = "Directory holding the settings and generated files. Defaults to the current directory"
    )]
    dir: Option<PathBuf>,
    #[arg(long = "log-filter", help = "Log level, overrides RUST_LOG")]
    log: Option<LevelFilter>,
    /// This option is for debugging purposes only.
    #[arg(long = "log-console")]
    log_console: bool,
}

/// What a single invocation does. Flags are checked in declaration order and the first one set
/// wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Notify,
    Continuous,
    Configure,
    Setup,
    Menu,
}

impl Args {
    pub fn mode(&self) -> Mode {
        if self.notify {
            Mode::Notify
        } else if self.continuous {
            Mode::Continuous
        } else if self.configure {
            Mode::Configure
        } else if self.setup {
            Mode::Setup
        } else {
            Mode::Menu
        }
    }
}

fn report_load_outcome(outcome: &LoadOutcome, store: &ConfigStore) {
    match outcome {
        LoadOutcome::Missing => info!("No settings at {:?}, using defaults", store.path()),
        LoadOutcome::Loaded { rejected } if rejected.is_empty() => {
            info!("Loaded settings from {:?}", store.path())
        }
        LoadOutcome::Loaded { rejected } => {
            warn!("Loaded settings with defaults for invalid fields {rejected:?}")
        }
        LoadOutcome::Corrupt(reason) => {
            warn!("Settings at {:?} are unusable ({reason}), using defaults", store.path())
        }
    }
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();
    let paths = AppPaths::new(resolve_base_dir(args.dir.clone())?);
    enable_logging(&paths.logs, args.log, args.log_console)?;

    if let Err(e) = ensure_notification_facility() {
        error!("Notification facility missing {e:?}");
        eprintln!("{e}");
        std::process::exit(1);
    }

    let store = ConfigStore::new(&paths.settings);
    let (config, outcome) = store.load();
    report_load_outcome(&outcome, &store);

    let engine = ReminderEngine::new(
        config,
        store,
        Notifier::new(DesktopBackend, Box::new(DefaultClock)),
        Box::new(DefaultClock),
    );
    let mut shell = Shell::new(engine, SchtasksQuery, paths, env::current_exe()?);

    let mut input = io::stdin().lock();
    let mut output = io::stdout();
    let mode = args.mode();
    info!("Running in {mode:?} mode");
    match mode {
        Mode::Notify => shell.notify().map(|_| ()),
        Mode::Continuous => shell.run_continuous().await,
        Mode::Configure => shell.configure(&mut input, &mut output),
        Mode::Setup => shell.setup().map(|_| ()),
        Mode::Menu => shell.run_menu(&mut input, &mut output).await,
    }
}
