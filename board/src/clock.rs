//! Shared wall clock behind the live age column.
//!
//! One background task publishes the current time on a watch channel; every
//! open row re-renders its age from the latest value instead of running its
//! own timer.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use common::format;
use store::models::Ticket;

pub struct ElapsedClock {
    rx: watch::Receiver<DateTime<Utc>>,
    task: JoinHandle<()>,
}

impl ElapsedClock {
    /// Starts the clock at the display resolution of the age column.
    pub fn start() -> Self {
        Self::with_period(Duration::from_secs(1))
    }

    pub fn with_period(period: Duration) -> Self {
        let (tx, rx) = watch::channel(Utc::now());
        let task = tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                // No receivers left means nothing renders ages anymore.
                if tx.send(Utc::now()).is_err() {
                    break;
                }
            }
        });
        Self { rx, task }
    }

    pub fn subscribe(&self) -> watch::Receiver<DateTime<Utc>> {
        self.rx.clone()
    }

    pub fn now(&self) -> DateTime<Utc> {
        *self.rx.borrow()
    }

    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for ElapsedClock {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Text for the age cell: open tickets count up from creation, closed tickets
/// pin to the closing timestamp.
pub fn age_label(ticket: &Ticket, now: DateTime<Utc>) -> String {
    match ticket.closed_at {
        Some(closed_at) if ticket.is_closed() => format::timestamp(&closed_at),
        _ => format::elapsed(ticket.created_at, now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::test_utils::{closed_ticket, sample_ticket, sample_time};

    #[tokio::test]
    async fn publishes_ticks() {
        let clock = ElapsedClock::with_period(Duration::from_millis(10));
        let mut rx = clock.subscribe();

        time::timeout(Duration::from_millis(500), rx.changed())
            .await
            .expect("a tick within 500ms")
            .unwrap();
        assert!(*rx.borrow() <= Utc::now());
        clock.stop();
    }

    #[tokio::test]
    async fn stop_ends_the_stream() {
        let clock = ElapsedClock::with_period(Duration::from_millis(10));
        let mut rx = clock.subscribe();
        clock.stop();

        let drained = time::timeout(Duration::from_millis(500), async move {
            while rx.changed().await.is_ok() {}
        })
        .await;
        assert!(drained.is_ok());
    }

    #[test]
    fn age_label_splits_on_status() {
        let open = sample_ticket(2, 9, None);
        let now = open.created_at + chrono::Duration::seconds(3 * 3600 + 12 * 60);
        assert_eq!(age_label(&open, now), "3h 12m");

        let closed = closed_ticket(3, 9, None);
        assert_eq!(
            age_label(&closed, now),
            format::timestamp(&sample_time(3 + 60))
        );
    }
}
