//! Fires sync passes at the configured hours of the day.

use crate::sync::PassReport;
use crate::Engine;
use chrono::Timelike;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

pub trait Clock: Send + Sync {
    /// Current hour of the day in `0..=23`.
    fn current_hour(&self) -> u32;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn current_hour(&self) -> u32 {
        chrono::Local::now().hour()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intervals {
    /// Wait while outside every scheduled hour.
    pub outside_window: Duration,
    /// Wait while a pass started elsewhere is still running.
    pub busy: Duration,
    /// Wait after a pass so the same hour does not fire twice.
    pub after_pass: Duration,
}

impl Default for Intervals {
    fn default() -> Self {
        Self {
            outside_window: Duration::from_secs(10 * 60),
            busy: Duration::from_secs(10 * 60),
            after_pass: Duration::from_secs(60 * 60),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    OutsideWindow,
    Busy,
    Ran(PassReport),
}

impl Tick {
    pub fn delay(&self, intervals: &Intervals) -> Duration {
        match self {
            Tick::OutsideWindow => intervals.outside_window,
            Tick::Busy => intervals.busy,
            Tick::Ran(_) => intervals.after_pass,
        }
    }
}

pub fn within_window(hour: u32, scheduled: &[u32]) -> bool {
    scheduled.contains(&hour)
}

pub struct Scheduler<C = LocalClock> {
    engine: Engine,
    clock: C,
    intervals: Intervals,
}

impl Scheduler<LocalClock> {
    pub fn new(engine: Engine) -> Self {
        Self::with_clock(engine, LocalClock)
    }
}

impl<C> Scheduler<C>
where
    C: Clock,
{
    pub fn with_clock(engine: Engine, clock: C) -> Self {
        Self {
            engine,
            clock,
            intervals: Intervals::default(),
        }
    }

    pub fn intervals(mut self, intervals: Intervals) -> Self {
        self.intervals = intervals;
        self
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// One scheduling decision; runs the pass on the calling task when due.
    pub async fn tick(&self) -> Tick {
        let hours = self.engine.scheduled_hours().await;
        let hour = self.clock.current_hour();
        if !within_window(hour, &hours) {
            tracing::debug!(
                hour,
                sync_start_times = ?hours,
                "not in sync time window"
            );
            return Tick::OutsideWindow;
        }
        if self.engine.state().in_progress() {
            tracing::info!("sync time but a pass is already running");
            return Tick::Busy;
        }
        tracing::info!(hour, "time to start sync");
        match self.engine.sync_now().await {
            Some(report) => {
                tracing::info!("sync done, sleeping for {:?}", self.intervals.after_pass);
                Tick::Ran(report)
            }
            None => Tick::Busy,
        }
    }

    /// Manual trigger; never blocks the scheduling loop.
    pub fn trigger(&self) -> Option<JoinHandle<PassReport>> {
        self.engine.trigger()
    }

    /// Runs until `shutdown` fires. A pass in progress is finished first.
    pub async fn run(&self, mut shutdown: broadcast::Receiver<bool>) {
        loop {
            let delay = self.tick().await.delay(&self.intervals);
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.recv() => {
                    tracing::info!("scheduler shutting down");
                    break;
                }
            }
        }
    }
}
