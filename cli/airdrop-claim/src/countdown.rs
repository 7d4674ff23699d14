use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;
use tokio::time::{interval, Interval, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Countdown {
    /// Time left from `now` until `target`, all zero once `target` has passed.
    pub fn between(now: DateTime<Utc>, target: DateTime<Utc>) -> Self {
        let remaining = (target - now).num_seconds();
        if remaining <= 0 {
            return Self::default();
        }
        Self {
            days: remaining / 86_400,
            hours: (remaining / 3_600) % 24,
            minutes: (remaining / 60) % 60,
            seconds: remaining % 60,
        }
    }

    pub fn is_finished(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:02}",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// Periodic countdown towards a launch time.
///
/// Ticking stops when the timer is dropped.
#[derive(Debug)]
pub struct CountdownTimer {
    target: DateTime<Utc>,
    interval: Interval,
}

impl CountdownTimer {
    pub fn start(target: DateTime<Utc>, period: Duration) -> Self {
        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { target, interval }
    }

    pub fn target(&self) -> DateTime<Utc> {
        self.target
    }

    pub async fn tick(&mut self) -> Countdown {
        self.interval.tick().await;
        Countdown::between(Utc::now(), self.target)
    }
}
