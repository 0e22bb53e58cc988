//! Time sources that drive the clock engine.
//!
//! The engine never reads the system clock or spawns timers on its own. It asks
//! a [`TickSource`] for the current instant and for a repeating task, which
//! makes it possible to run the same engine against tokio in production and
//! against a hand-cranked clock in tests.

use crate::error::ClockError;
use chrono::Utc;
use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::trace;

/// A function closure run on every firing of a repeating task.
pub type TickTask = Arc<dyn Fn() + Send + Sync>;

/// Supplies the current time and schedules repeating work.
pub trait TickSource: Send + Sync {
    /// The current instant in milliseconds.
    fn now_ms(&self) -> u64;

    /// Runs `task` every `period`, first one period from now, until the
    /// returned handle is cancelled or dropped.
    fn schedule_repeating(&self, period: Duration, task: TickTask) -> TickHandle;
}

/// Owns a scheduled repeating task. Dropping the handle cancels the task.
pub struct TickHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TickHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Stops the task. No firing starts after this returns.
    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl std::fmt::Debug for TickHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickHandle")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// A tick source backed by the tokio runtime.
///
/// Timestamps are wall-clock milliseconds: a `chrono` epoch captured at
/// construction plus the monotonic tokio time elapsed since. Because the
/// offset comes from `tokio::time`, a paused test runtime drives it as well.
#[derive(Clone, Debug)]
pub struct TokioTickSource {
    runtime: Handle,
    epoch_ms: u64,
    origin: Instant,
}

impl TokioTickSource {
    /// Creates a source bound to the current tokio runtime.
    pub fn new() -> Result<Self, ClockError> {
        let runtime = Handle::try_current().map_err(|_| ClockError::NoRuntime)?;
        Ok(Self {
            runtime,
            epoch_ms: u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default(),
            origin: Instant::now(),
        })
    }
}

impl TickSource for TokioTickSource {
    fn now_ms(&self) -> u64 {
        let offset = u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.epoch_ms.saturating_add(offset)
    }

    fn schedule_repeating(&self, period: Duration, task: TickTask) -> TickHandle {
        let join = self.runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                task();
            }
        });
        TickHandle::new(move || join.abort())
    }
}

new_key_type! {
    /// Identifies a task scheduled on a `ManualTickSource`.
    ///
    /// Keys are never reused, so a stale handle can not cancel a newer task.
    pub struct TickKey;
}

struct Pending {
    period_ms: u64,
    next_fire: u64,
    task: TickTask,
}

#[derive(Default)]
struct ManualState {
    now: u64,
    pending: SlotMap<TickKey, Pending>,
}

/// A deterministic tick source whose time only moves when told to.
///
/// Clones share the same timeline.
#[derive(Clone, Default)]
pub struct ManualTickSource {
    state: Arc<Mutex<ManualState>>,
}

impl ManualTickSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source whose timeline starts at `now_ms`.
    pub fn starting_at(now_ms: u64) -> Self {
        let source = Self::default();
        source.state.lock().now = now_ms;
        source
    }

    /// Jumps the timeline to `now_ms` without firing anything.
    pub fn set_now(&self, now_ms: u64) {
        self.state.lock().now = now_ms;
    }

    /// Moves time forward by `ms`, firing every task that falls due.
    ///
    /// Firings run in time order. Before each one, the timeline is set to the
    /// instant that firing was due, so a task that reads the time sees its own
    /// firing instant. Tasks may cancel themselves or schedule new work.
    pub fn advance(&self, ms: u64) {
        let target = self.state.lock().now.saturating_add(ms);
        loop {
            let next = {
                let mut state = self.state.lock();
                let due = state
                    .pending
                    .iter()
                    .filter(|(_, pending)| pending.next_fire <= target)
                    .min_by_key(|(_, pending)| pending.next_fire)
                    .map(|(key, _)| key);
                match due {
                    Some(key) => {
                        let pending = &mut state.pending[key];
                        let fire_at = pending.next_fire;
                        pending.next_fire += pending.period_ms;
                        let task = Arc::clone(&pending.task);
                        state.now = fire_at;
                        Some(task)
                    }
                    None => {
                        state.now = target;
                        None
                    }
                }
            };
            match next {
                Some(task) => task(),
                None => break,
            }
        }
    }

    /// Number of tasks currently scheduled.
    pub fn pending_tasks(&self) -> usize {
        self.state.lock().pending.len()
    }
}

impl TickSource for ManualTickSource {
    fn now_ms(&self) -> u64 {
        self.state.lock().now
    }

    fn schedule_repeating(&self, period: Duration, task: TickTask) -> TickHandle {
        let period_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX).max(1);
        let key = {
            let mut state = self.state.lock();
            let next_fire = state.now.saturating_add(period_ms);
            state.pending.insert(Pending {
                period_ms,
                next_fire,
                task,
            })
        };
        trace!(?key, period_ms, "Manual task scheduled.");
        let state: Weak<Mutex<ManualState>> = Arc::downgrade(&self.state);
        TickHandle::new(move || {
            if let Some(state) = state.upgrade() {
                state.lock().pending.remove(key);
            }
        })
    }
}
