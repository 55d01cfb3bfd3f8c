//! # Tick Scheduler
//!
//! A single explicit registry of fixed-interval tasks, driven by
//! `advance(now)`. Tick cadence and ordering are deterministic: due
//! tasks are returned in registration order, and tests drive virtual
//! time directly without wall-clock waits.
//!
//! Production wraps this in [`TickDriver`], which maps real time onto
//! the simulation's millisecond scale.

use std::time::{Duration, Instant};

use blackice_shared::SimTime;

use crate::config::SchedulerConfig;

/// The scheduled task kinds, in dispatch order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskKind {
    /// Intrusion detection and counter-measure resolution.
    IntrusionSweep,
    /// Scheduled breach/crack resumptions.
    ActionResolve,
    /// Market order expiry.
    MarketSweep,
    /// NPC liquidity restock.
    NpcRestock,
    /// Ghost spawn and expiry.
    GhostSweep,
    /// Black-market decay and restock.
    BlackMarketTick,
}

/// One registered task.
#[derive(Clone, Copy, Debug)]
struct TaskEntry {
    kind: TaskKind,
    interval_ms: u64,
    next_due: SimTime,
}

/// Fixed-interval task registry.
pub struct Scheduler {
    tasks: Vec<TaskEntry>,
}

impl Scheduler {
    /// Registers the standard task set with the configured cadences.
    ///
    /// The first firing of each task is one full interval after start —
    /// boot work (world generation, market seeding) is not a tick.
    #[must_use]
    pub fn new(config: &SchedulerConfig) -> Self {
        let cadences = [
            (TaskKind::IntrusionSweep, config.trace_update_interval_ms),
            (TaskKind::ActionResolve, config.action_resolve_interval_ms),
            (TaskKind::MarketSweep, config.market_sweep_interval_ms),
            (TaskKind::NpcRestock, config.npc_restock_interval_ms),
            (TaskKind::GhostSweep, config.ghost_sweep_interval_ms),
            (TaskKind::BlackMarketTick, config.blackmarket_tick_interval_ms),
        ];
        Self {
            tasks: cadences
                .into_iter()
                .map(|(kind, interval_ms)| TaskEntry {
                    kind,
                    interval_ms,
                    next_due: interval_ms,
                })
                .collect(),
        }
    }

    /// Returns every task due at `now`, in registration order, and
    /// re-arms them.
    ///
    /// A task that fell multiple intervals behind fires once and is
    /// re-armed relative to `now` — sweeps are idempotent over the
    /// backlog, so catch-up bursts would only waste work.
    pub fn advance(&mut self, now: SimTime) -> Vec<TaskKind> {
        let mut due = Vec::new();
        for task in &mut self.tasks {
            if now >= task.next_due {
                due.push(task.kind);
                task.next_due = now + task.interval_ms;
            }
        }
        due
    }

    /// The earliest time any task becomes due.
    #[must_use]
    pub fn next_due(&self) -> Option<SimTime> {
        self.tasks.iter().map(|t| t.next_due).min()
    }
}

/// Maps wall-clock time onto the simulation's millisecond scale.
///
/// The driving loop asks for `now()`, pumps the simulation, then sleeps
/// until the next task is due.
pub struct TickDriver {
    start: Instant,
}

impl TickDriver {
    /// Starts the clock.
    #[must_use]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Milliseconds since the driver started.
    #[must_use]
    pub fn now(&self) -> SimTime {
        #[allow(clippy::cast_possible_truncation)]
        let elapsed = self.start.elapsed().as_millis() as SimTime;
        elapsed
    }

    /// Sleeps until the given simulation time (no-op if already past).
    pub fn sleep_until(&self, due: SimTime) {
        let now = self.now();
        if due > now {
            std::thread::sleep(Duration::from_millis(due - now));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SchedulerConfig {
        SchedulerConfig {
            trace_update_interval_ms: 1_000,
            market_sweep_interval_ms: 5_000,
            npc_restock_interval_ms: 10_000,
            ghost_sweep_interval_ms: 2_000,
            blackmarket_tick_interval_ms: 10_000,
            action_resolve_interval_ms: 250,
        }
    }

    #[test]
    fn test_nothing_due_before_first_interval() {
        let mut scheduler = Scheduler::new(&config());
        assert!(scheduler.advance(0).is_empty());
        assert!(scheduler.advance(249).is_empty());
    }

    #[test]
    fn test_due_tasks_fire_in_registration_order() {
        let mut scheduler = Scheduler::new(&config());
        let due = scheduler.advance(5_000);
        assert_eq!(
            due,
            vec![
                TaskKind::IntrusionSweep,
                TaskKind::ActionResolve,
                TaskKind::MarketSweep,
                TaskKind::GhostSweep,
            ]
        );
    }

    #[test]
    fn test_rearm_relative_to_now() {
        let mut scheduler = Scheduler::new(&config());
        assert_eq!(scheduler.advance(1_000), vec![TaskKind::IntrusionSweep, TaskKind::ActionResolve]);
        // Re-armed at 2_000 / 1_250; nothing in between.
        assert!(scheduler.advance(1_100).is_empty());
        assert_eq!(scheduler.advance(1_250), vec![TaskKind::ActionResolve]);
    }

    #[test]
    fn test_backlog_fires_once() {
        let mut scheduler = Scheduler::new(&config());
        // 10 intervals behind: one firing, re-armed from now.
        let due = scheduler.advance(10_000);
        assert_eq!(due.iter().filter(|&&t| t == TaskKind::IntrusionSweep).count(), 1);
        assert!(scheduler.advance(10_500).is_empty());
        assert!(!scheduler.advance(11_000).is_empty());
    }

    #[test]
    fn test_next_due() {
        let mut scheduler = Scheduler::new(&config());
        assert_eq!(scheduler.next_due(), Some(250));
        scheduler.advance(250);
        assert_eq!(scheduler.next_due(), Some(500));
    }

    #[test]
    fn test_driver_maps_real_time_monotonically() {
        let driver = TickDriver::start();
        let a = driver.now();
        // Sleeping until a past deadline returns immediately.
        driver.sleep_until(0);
        let b = driver.now();
        assert!(b >= a);
    }
}
