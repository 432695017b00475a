use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};

/// Represents an entity responsible for providing local wall-clock time across the application.
/// Reminder decisions only ever look at it through this trait, so tests can move time by hand.
#[async_trait]
pub trait Clock: Sync + Send + 'static {
    fn now(&self) -> NaiveDateTime;

    async fn sleep(&self, duration: Duration);
}

pub struct DefaultClock;

#[async_trait]
impl Clock for DefaultClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
