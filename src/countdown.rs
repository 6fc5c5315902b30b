//! Countdown Scheduler
//!
//! Times the gap between draws. The scheduler owns at most one timer task;
//! the task only emits pulses, while the tick count lives here so the
//! owner can pause and resume at an exact position.

use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

/// Default spacing between ticks
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// What a timer task reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSignal {
    /// One period elapsed
    Tick,
    /// Zero-length countdown finished
    Expired,
}

/// A timer signal stamped with the countdown run that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerPulse {
    pub generation: u64,
    pub signal: TimerSignal,
}

/// Result of feeding a pulse back into the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownUpdate {
    /// Still counting, this many ticks left
    Remaining(u32),
    /// Reached zero; the timer has been stopped
    Expired,
}

/// Pausable countdown that reports through a channel
#[derive(Debug)]
pub struct Countdown<E> {
    ticks_left: u32,
    generation: u64,
    period: Duration,
    timer: Option<JoinHandle<()>>,
    events: UnboundedSender<E>,
}

impl<E> Countdown<E>
where
    E: From<TimerPulse> + Send + 'static,
{
    pub fn new(events: UnboundedSender<E>) -> Self {
        Self::with_period(events, TICK_PERIOD)
    }

    pub fn with_period(events: UnboundedSender<E>, period: Duration) -> Self {
        Self {
            ticks_left: 0,
            generation: 0,
            period,
            timer: None,
            events,
        }
    }

    /// Start a fresh countdown of `duration` ticks
    pub fn start(&mut self, duration: u32) {
        self.arm(duration);
    }

    /// Continue from a previously retained position
    pub fn resume(&mut self, ticks_left: u32) {
        self.arm(ticks_left);
    }

    /// Stop the timer, keeping the tick position. Safe to call repeatedly.
    pub fn cancel(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
            debug!(
                "Countdown {} cancelled at {}",
                self.generation, self.ticks_left
            );
        }
    }

    /// Stop the timer and forget the position
    pub fn clear(&mut self) {
        self.cancel();
        self.ticks_left = 0;
    }

    pub fn ticks_left(&self) -> u32 {
        self.ticks_left
    }

    pub fn is_active(&self) -> bool {
        self.timer.is_some()
    }

    /// Apply a pulse. Pulses from cancelled or superseded runs yield `None`.
    pub fn handle(&mut self, pulse: TimerPulse) -> Option<CountdownUpdate> {
        if !self.is_active() || pulse.generation != self.generation {
            debug!("Ignoring stale timer pulse {:?}", pulse);
            return None;
        }

        match pulse.signal {
            TimerSignal::Tick => {
                self.ticks_left = self.ticks_left.saturating_sub(1);
                if self.ticks_left == 0 {
                    self.cancel();
                    Some(CountdownUpdate::Expired)
                } else {
                    Some(CountdownUpdate::Remaining(self.ticks_left))
                }
            }
            TimerSignal::Expired => {
                self.cancel();
                Some(CountdownUpdate::Expired)
            }
        }
    }

    fn arm(&mut self, ticks: u32) {
        self.cancel();
        self.ticks_left = ticks;
        self.generation += 1;

        let generation = self.generation;
        let events = self.events.clone();
        let period = self.period;

        let timer = if ticks == 0 {
            // Never expire inside the caller's stack
            tokio::spawn(async move {
                tokio::task::yield_now().await;
                let _ = events.send(E::from(TimerPulse {
                    generation,
                    signal: TimerSignal::Expired,
                }));
            })
        } else {
            tokio::spawn(async move {
                let mut ticker = interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    let pulse = TimerPulse {
                        generation,
                        signal: TimerSignal::Tick,
                    };
                    if events.send(E::from(pulse)).is_err() {
                        break;
                    }
                }
            })
        };

        debug!("Countdown {} armed with {} ticks", generation, ticks);
        self.timer = Some(timer);
    }
}

impl<E> Drop for Countdown<E> {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
