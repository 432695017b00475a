//! Decides when a reminder is shown. There are two ways to drive it:
//!  - [ReminderEngine::fire_if_due] evaluates once. It is what the OS scheduler runs, so it honours
//!    both the active window and the cooldown since the last reminder.
//!  - [ReminderEngine::run_continuous] keeps the process alive and sleeps between reminders. The
//!    sleep already spaces reminders out, so the cooldown is not consulted there.

pub mod window;

use anyhow::Result;
use chrono::NaiveDateTime;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    config::{store::ConfigStore, ReminderConfig},
    notifier::{NotificationBackend, Notifier, DEFAULT_TIMEOUT_SECONDS},
    utils::{
        clock::Clock,
        time::{format_clock, format_time_of_day},
    },
};

use window::is_active;

/// Result of a single scheduled evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    Inactive,
    NotDue,
    Sent,
    SendFailed,
}

/// True when no reminder was shown yet or the interval has fully elapsed since the last one.
pub fn is_reminder_due(config: &ReminderConfig, now: NaiveDateTime) -> bool {
    match config.last_reminder {
        None => true,
        Some(last) => now - last >= config.interval(),
    }
}

/// Moment after which the next scheduled run will show a reminder again.
pub fn next_due(config: &ReminderConfig) -> Option<NaiveDateTime> {
    config.last_reminder.map(|last| last + config.interval())
}

pub struct ReminderEngine<B> {
    config: ReminderConfig,
    store: ConfigStore,
    notifier: Notifier<B>,
    clock: Box<dyn Clock>,
}

impl<B: NotificationBackend> ReminderEngine<B> {
    pub fn new(
        config: ReminderConfig,
        store: ConfigStore,
        notifier: Notifier<B>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            config,
            store,
            notifier,
            clock,
        }
    }

    pub fn config(&self) -> &ReminderConfig {
        &self.config
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    /// Replaces the settings and writes them to disk right away.
    pub fn update_config(&mut self, config: ReminderConfig) -> Result<()> {
        self.config = config;
        self.store.save(&self.config)
    }

    pub fn is_active_at(&self, now: NaiveDateTime) -> bool {
        if self.config.window_spans_midnight() {
            warn!(
                "Active window {}-{} crosses midnight, which is not supported. No reminder will \
                 be shown",
                format_time_of_day(self.config.start_time),
                format_time_of_day(self.config.end_time)
            );
        }
        is_active(now.time(), self.config.start_time, self.config.end_time)
    }

    /// Shows the configured reminder without touching `last_reminder`.
    pub fn send_test(&self) -> bool {
        self.send_reminder()
    }

    /// One evaluation for a scheduler triggered run.
    #[tracing::instrument(skip(self))]
    pub fn fire_if_due(&mut self, now: NaiveDateTime) -> Result<FireOutcome> {
        if !self.is_active_at(now) {
            debug!("Outside of active window");
            return Ok(FireOutcome::Inactive);
        }
        if !is_reminder_due(&self.config, now) {
            debug!("Last reminder at {:?} is too recent", self.config.last_reminder);
            return Ok(FireOutcome::NotDue);
        }
        if !self.send_reminder() {
            return Ok(FireOutcome::SendFailed);
        }
        self.record_reminder(now)?;
        Ok(FireOutcome::Sent)
    }

    /// Shows a reminder every interval while inside the active window, until `shutdown` is
    /// cancelled.
    pub async fn run_continuous(&mut self, shutdown: CancellationToken) -> Result<()> {
        println!("Water reminder started!");
        println!("Interval: {} minutes", self.config.interval_minutes);
        println!(
            "Active hours: {} - {}",
            format_time_of_day(self.config.start_time),
            format_time_of_day(self.config.end_time)
        );
        println!("Press Ctrl+C to stop");
        info!("Continuous mode started with {:?}", self.config);

        while !shutdown.is_cancelled() {
            let now = self.clock.now();
            if self.is_active_at(now) {
                if self.send_reminder() {
                    self.record_reminder(now)?;
                }
            } else {
                debug!("Skipping reminder at {}, outside of active window", format_clock(now));
            }

            let interval = self.config.interval().to_std()?;
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = self.clock.sleep(interval) => ()
            }
        }

        info!("Continuous mode stopped");
        println!("\nWater reminder stopped.");
        Ok(())
    }

    fn send_reminder(&self) -> bool {
        self.notifier.send(
            &self.config.title,
            &self.config.message,
            DEFAULT_TIMEOUT_SECONDS,
            self.config.sound_enabled,
        )
    }

    fn record_reminder(&mut self, now: NaiveDateTime) -> Result<()> {
        self.config.last_reminder = Some(now);
        self.store.save(&self.config)
    }
}

#[cfg(test)]
mod tests {
    use std::{num::NonZeroU32, path::Path, time::Duration};

    use anyhow::{anyhow, Result};
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
    use tempfile::tempdir;
    use tokio_util::sync::CancellationToken;

    use super::{is_reminder_due, next_due, FireOutcome, ReminderEngine};
    use crate::{
        config::{store::ConfigStore, ReminderConfig},
        notifier::{MockNotificationBackend, Notifier},
        utils::{logging::TEST_LOGGING, test_clock::ManualClock},
    };

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn backend(sends: usize) -> MockNotificationBackend {
        let mut backend = MockNotificationBackend::new();
        backend.expect_show().times(sends).returning(|_| Ok(()));
        backend
    }

    fn engine(
        dir: &Path,
        config: ReminderConfig,
        backend: MockNotificationBackend,
        clock: &ManualClock,
    ) -> ReminderEngine<MockNotificationBackend> {
        ReminderEngine::new(
            config,
            ConfigStore::new(dir.join("settings.json")),
            Notifier::new(backend, Box::new(clock.clone())),
            Box::new(clock.clone()),
        )
    }

    #[test]
    fn due_without_previous_reminder() {
        assert!(is_reminder_due(&ReminderConfig::default(), at(9, 0)));
        assert_eq!(next_due(&ReminderConfig::default()), None);
    }

    #[test]
    fn due_once_interval_elapsed() {
        let config = ReminderConfig {
            last_reminder: Some(at(9, 0)),
            ..Default::default()
        };
        assert!(!is_reminder_due(&config, at(9, 0)));
        assert!(!is_reminder_due(&config, at(9, 59)));
        assert!(is_reminder_due(&config, at(10, 0)));
        assert!(is_reminder_due(&config, at(13, 0)));
        assert_eq!(next_due(&config), Some(at(10, 0)));
    }

    #[test]
    fn fire_sends_and_records_when_due() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let clock = ManualClock::new(at(9, 0));
        let mut engine = engine(dir.path(), ReminderConfig::default(), backend(1), &clock);

        assert_eq!(engine.fire_if_due(at(9, 0))?, FireOutcome::Sent);
        assert_eq!(engine.config().last_reminder, Some(at(9, 0)));

        let (stored, _) = ConfigStore::new(dir.path().join("settings.json")).load();
        assert_eq!(stored.last_reminder, Some(at(9, 0)));

        assert_eq!(engine.fire_if_due(at(9, 0))?, FireOutcome::NotDue);
        Ok(())
    }

    #[test]
    fn fire_is_silent_outside_window_even_if_due() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let clock = ManualClock::new(at(23, 0));
        let mut engine = engine(dir.path(), ReminderConfig::default(), backend(0), &clock);

        assert_eq!(engine.fire_if_due(at(23, 0))?, FireOutcome::Inactive);
        assert_eq!(engine.fire_if_due(at(7, 0))?, FireOutcome::Inactive);
        assert_eq!(engine.config().last_reminder, None);
        assert!(!dir.path().join("settings.json").exists());
        Ok(())
    }

    #[test]
    fn fire_is_silent_inside_window_when_not_due() -> Result<()> {
        let dir = tempdir()?;
        let clock = ManualClock::new(at(10, 30));
        let config = ReminderConfig {
            last_reminder: Some(at(10, 0)),
            ..Default::default()
        };
        let mut engine = engine(dir.path(), config, backend(0), &clock);

        assert_eq!(engine.fire_if_due(at(10, 30))?, FireOutcome::NotDue);
        assert_eq!(engine.config().last_reminder, Some(at(10, 0)));
        Ok(())
    }

    #[test]
    fn failed_send_keeps_last_reminder() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let clock = ManualClock::new(at(12, 0));
        let mut backend = MockNotificationBackend::new();
        backend
            .expect_show()
            .times(1)
            .returning(|_| Err(anyhow!("no notification service")));
        let config = ReminderConfig {
            last_reminder: Some(at(8, 0)),
            ..Default::default()
        };
        let mut engine = engine(dir.path(), config, backend, &clock);

        assert_eq!(engine.fire_if_due(at(12, 0))?, FireOutcome::SendFailed);
        assert_eq!(engine.config().last_reminder, Some(at(8, 0)));
        assert!(!dir.path().join("settings.json").exists());
        Ok(())
    }

    #[test]
    fn fire_never_sends_for_window_across_midnight() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let clock = ManualClock::new(at(23, 30));
        let config = ReminderConfig {
            start_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            ..Default::default()
        };
        let mut engine = engine(dir.path(), config, backend(0), &clock);
        assert_eq!(engine.fire_if_due(at(23, 30))?, FireOutcome::Inactive);
        assert_eq!(engine.fire_if_due(at(3, 0))?, FireOutcome::Inactive);
        Ok(())
    }

    #[tokio::test]
    async fn continuous_mode_sends_every_interval_regardless_of_cooldown() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let shutdown = CancellationToken::new();
        let clock = ManualClock::new(at(9, 0)).cancel_after(3, shutdown.clone());
        let config = ReminderConfig {
            interval_minutes: NonZeroU32::new(30).unwrap(),
            // Not due under the cooldown rule, continuous mode doesn't care.
            last_reminder: Some(at(9, 0)),
            ..Default::default()
        };
        let mut engine = engine(dir.path(), config, backend(3), &clock);

        engine.run_continuous(shutdown).await?;

        assert_eq!(clock.sleeps(), vec![Duration::from_secs(30 * 60); 3]);
        assert_eq!(engine.config().last_reminder, Some(at(10, 0)));
        let (stored, _) = ConfigStore::new(dir.path().join("settings.json")).load();
        assert_eq!(stored.last_reminder, Some(at(10, 0)));
        Ok(())
    }

    #[tokio::test]
    async fn continuous_mode_waits_outside_window() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let shutdown = CancellationToken::new();
        // 21:00 and 22:00 are inside, 23:00 and midnight are not.
        let clock = ManualClock::new(at(21, 0)).cancel_after(4, shutdown.clone());
        let mut engine = engine(dir.path(), ReminderConfig::default(), backend(2), &clock);

        engine.run_continuous(shutdown).await?;

        assert_eq!(clock.sleeps().len(), 4);
        assert_eq!(engine.config().last_reminder, Some(at(22, 0)));
        Ok(())
    }

    #[tokio::test]
    async fn continuous_mode_keeps_going_after_failed_send() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let shutdown = CancellationToken::new();
        let clock = ManualClock::new(at(9, 0)).cancel_after(2, shutdown.clone());
        let mut backend = MockNotificationBackend::new();
        backend
            .expect_show()
            .times(2)
            .returning(|_| Err(anyhow!("busy")));
        let mut engine = engine(dir.path(), ReminderConfig::default(), backend, &clock);

        engine.run_continuous(shutdown).await?;

        assert_eq!(clock.sleeps().len(), 2);
        assert_eq!(engine.config().last_reminder, None);
        Ok(())
    }

    #[tokio::test]
    async fn continuous_mode_stops_immediately_when_already_cancelled() -> Result<()> {
        let dir = tempdir()?;
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        let clock = ManualClock::new(at(9, 0));
        let mut engine = engine(dir.path(), ReminderConfig::default(), backend(0), &clock);

        engine.run_continuous(shutdown).await?;

        assert!(clock.sleeps().is_empty());
        Ok(())
    }

    #[test]
    fn update_config_persists() -> Result<()> {
        let dir = tempdir()?;
        let clock = ManualClock::new(at(9, 0));
        let mut engine = engine(dir.path(), ReminderConfig::default(), backend(0), &clock);
        let config = ReminderConfig {
            message: "Glass of water".into(),
            ..Default::default()
        };
        engine.update_config(config.clone())?;
        assert_eq!(engine.store().load().0, config);
        Ok(())
    }
}
