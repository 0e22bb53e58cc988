//! The core engine that runs a two-player game clock.
//!
//! A `ClockEngine` counts one player's time down while the other waits. Time is
//! charged in two ways: explicitly, whenever a player pushes, pauses, or the
//! clock is otherwise told something happened, and continuously, by a
//! repeating tick task that records elapsed time while the clock is live. Both
//! paths go through the same recording step, so the stage policies see one
//! consistent stream of measurements.

use crate::common::{Player, Status};
use crate::components::policy;
use crate::components::stage::{Stage, StageTable};
use crate::config::ClockConfig;
use crate::error::ClockError;
use crate::events::ClockEvent;
use crate::registry::Preset;
use crate::state::ClockState;
use crate::time::{TickHandle, TickSource, TickTask};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, trace};

/// A function closure that receives every state snapshot.
pub type Observer = Box<dyn Fn(&ClockState) + Send + Sync>;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// A two-player game clock.
///
/// This struct is a handle: clones share the same clock. Every operation takes
/// one internal lock, so explicit calls and tick firings coming from another
/// thread are applied one at a time.
#[derive(Clone)]
pub struct ClockEngine {
    core: Arc<Mutex<ClockCore>>,
}

/// All mutable clock state, guarded by the engine's lock.
struct ClockCore {
    name: Option<String>,
    stages: StageTable,
    update_interval: Duration,

    moves: [u32; 2],
    remaining: [u64; 2],
    last_player: Option<Player>,
    white: Option<Player>,
    log: [Vec<u64>; 2],
    status: Status,
    stage: [Stage; 2],
    timestamp: Option<u64>,

    source: Arc<dyn TickSource>,
    ticker: Option<TickHandle>,
    // Bumped whenever the ticker is replaced or cancelled; firings carrying an
    // older generation are ignored.
    tick_generation: u64,

    observer: Option<Observer>,
    event_sender: broadcast::Sender<ClockEvent>,
}

// Core implementation block for internal logic.
impl ClockCore {
    fn new(config: ClockConfig, source: Arc<dyn TickSource>) -> Result<Self, ClockError> {
        config.validate()?;
        let stages = StageTable::new(&config.stages)?;
        let initial = stages.initial();
        let update_interval = config.update_interval();
        let (event_sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            name: config.name,
            stages,
            update_interval,
            moves: [0, 0],
            remaining: initial.time,
            last_player: None,
            white: None,
            log: [Vec::new(), Vec::new()],
            status: Status::Ready,
            stage: [initial, initial],
            timestamp: None,
            source,
            ticker: None,
            tick_generation: 0,
            observer: None,
            event_sender,
        })
    }

    fn snapshot(&self) -> ClockState {
        ClockState {
            name: self.name.clone(),
            moves: self.moves,
            remaining_time: self.remaining,
            last_player: self.last_player,
            white: self.white,
            log: self.log.clone(),
            status: self.status,
            stage: self.stage,
            timestamp: self.timestamp,
            stages: self.stages.stages().to_vec(),
        }
    }

    fn notify(&self) {
        if let Some(observer) = &self.observer {
            observer(&self.snapshot());
        }
    }

    fn emit(&self, event: ClockEvent) {
        // No subscribers is fine.
        self.event_sender.send(event).ok();
    }

    fn cancel_ticks(&mut self) {
        self.tick_generation = self.tick_generation.wrapping_add(1);
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
        }
    }

    /// The elapsed time of `player`'s turn in progress.
    fn current_turn(&mut self, player: Player) -> &mut u64 {
        let log = &mut self.log[player.index()];
        if log.is_empty() {
            log.push(0);
        }
        let last = log.len() - 1;
        &mut log[last]
    }

    fn last_spent(&self, player: Player) -> u64 {
        self.log[player.index()].last().copied().unwrap_or(0)
    }

    /// Charges the time elapsed since the last recording to `player`.
    ///
    /// Returns `true` if this exhausted the player's time, in which case the
    /// clock is now `Done`.
    fn record(&mut self, player: Player) -> bool {
        let now = self.source.now_ms();
        let before = self.timestamp.replace(now);

        if let Some(before) = before {
            let diff = now.saturating_sub(before);
            let turn = self.current_turn(player);
            *turn += diff;
            let elapsed = *turn;

            let charge = policy::charge(&self.stage[player.index()], elapsed, diff);
            let remaining = &mut self.remaining[player.index()];
            *remaining = remaining.saturating_sub(charge);
        }

        if self.remaining[player.index()] == 0 {
            self.status = Status::Done;
            return true;
        }
        false
    }

    fn expire(&mut self, player: Player) {
        self.cancel_ticks();
        info!(%player, "Time expired.");
        self.emit(ClockEvent::Expired { player });
    }

    /// Applies the mover's end-of-turn policy and any stage change.
    fn settle_turn(&mut self, player: Player) {
        let spent = self.last_spent(player);
        let settlement = policy::settle(&self.stage[player.index()], spent);
        let mover = &mut self.remaining[player.index()];
        *mover = mover.saturating_add(settlement.mover);
        let opponent = &mut self.remaining[player.other().index()];
        *opponent = opponent.saturating_add(settlement.opponent);
        debug!(
            %player,
            spent,
            credited = settlement.mover,
            transferred = settlement.opponent,
            "Turn settled."
        );

        let moves = self.moves[player.index()];
        if let Some(next) = self.stages.at_move(moves) {
            let remaining = &mut self.remaining[player.index()];
            *remaining = remaining.saturating_add(next.time[player.index()]);
            self.stage[player.index()] = next;
            debug!(%player, stage = next.index, moves, "Stage advanced.");
            self.emit(ClockEvent::StageAdvanced {
                player,
                stage: next.index,
            });
        }

        self.emit(ClockEvent::TurnEnded {
            player,
            moves,
            spent_ms: spent,
        });
    }

    fn tick(&mut self, player: Player, generation: u64) {
        if generation != self.tick_generation || self.status != Status::Live {
            return;
        }
        trace!(%player, "Tick.");
        if self.record(player) {
            self.expire(player);
        }
        self.notify();
    }

    fn reinitialize(&mut self) {
        self.cancel_ticks();
        let initial = self.stages.initial();
        self.log = [Vec::new(), Vec::new()];
        self.moves = [0, 0];
        self.stage = [initial, initial];
        self.remaining = initial.time;
        self.last_player = None;
        self.white = None;
        self.timestamp = None;
        self.status = Status::Ready;
    }
}

impl ClockEngine {
    /// Creates a clock in the `Ready` state.
    pub fn new(config: ClockConfig, source: Arc<dyn TickSource>) -> Result<Self, ClockError> {
        let core = ClockCore::new(config, source)?;
        info!(
            name = core.name.as_deref().unwrap_or("unnamed"),
            stages = core.stages.len(),
            "Clock created."
        );
        Ok(Self {
            core: Arc::new(Mutex::new(core)),
        })
    }

    /// Creates a clock from a named preset.
    pub fn from_preset(preset: Preset, source: Arc<dyn TickSource>) -> Result<Self, ClockError> {
        Self::new(ClockConfig::from(preset), source)
    }

    /// Starts the repeating task that charges time to `player`.
    fn start_ticks(&self, core: &mut ClockCore, player: Player) {
        core.cancel_ticks();
        let generation = core.tick_generation;
        let weak: Weak<Mutex<ClockCore>> = Arc::downgrade(&self.core);
        let task: TickTask = Arc::new(move || {
            if let Some(core) = weak.upgrade() {
                core.lock().tick(player, generation);
            }
        });
        core.ticker = Some(core.source.schedule_repeating(core.update_interval, task));
    }
}

// Public API implementation block.
impl ClockEngine {
    /// Ends `player`'s turn and starts the opponent's time.
    ///
    /// Ignored when the clock is paused or done, and when `player` was also
    /// the last to push.
    pub fn push(&self, player: Player) {
        let mut core = self.core.lock();
        if matches!(core.status, Status::Done | Status::Paused) || core.last_player == Some(player)
        {
            trace!(%player, status = %core.status, "Push ignored.");
            return;
        }
        if core.status == Status::Ready {
            core.status = Status::Live;
            let white = player.other();
            core.white = Some(white);
            info!(%white, "Clock started.");
            core.emit(ClockEvent::Started { white });
        }
        core.cancel_ticks();
        core.last_player = Some(player);

        if core.record(player) {
            core.expire(player);
            core.notify();
            return;
        }

        core.moves[player.index()] += 1;
        core.settle_turn(player);
        core.log[player.other().index()].push(0);

        self.start_ticks(&mut core, player.other());
        core.notify();
    }

    /// Suspends counting. Only has an effect while the clock is live.
    pub fn pause(&self) {
        let mut core = self.core.lock();
        let Some(last) = core.last_player else {
            return;
        };
        if core.status != Status::Live {
            trace!(status = %core.status, "Pause ignored.");
            return;
        }
        core.cancel_ticks();
        let running = last.other();
        if core.record(running) {
            core.expire(running);
        } else {
            core.status = Status::Paused;
            info!(player = %running, "Clock paused.");
            core.emit(ClockEvent::Paused { player: running });
        }
        core.notify();
    }

    /// Resumes a paused clock. The paused interval is charged to nobody.
    pub fn resume(&self) {
        let mut core = self.core.lock();
        if core.status != Status::Paused {
            trace!(status = %core.status, "Resume ignored.");
            return;
        }
        let Some(last) = core.last_player else {
            return;
        };
        let running = last.other();
        core.timestamp = Some(core.source.now_ms());
        self.start_ticks(&mut core, running);
        core.status = Status::Live;
        info!(player = %running, "Clock resumed.");
        core.emit(ClockEvent::Resumed { player: running });
        core.notify();
    }

    /// Adds `ms` (which may be negative) to `player`'s remaining time.
    ///
    /// Works in every status. Remaining time never drops below zero.
    pub fn add_time(&self, player: Player, ms: i64) {
        let mut core = self.core.lock();
        let remaining = &mut core.remaining[player.index()];
        *remaining = if ms >= 0 {
            remaining.saturating_add(ms.unsigned_abs())
        } else {
            remaining.saturating_sub(ms.unsigned_abs())
        };
        debug!(%player, ms, "Time added.");
        core.emit(ClockEvent::TimeAdded { player, ms });
        core.notify();
    }

    /// Returns the clock to its initial state, keeping the stage table.
    pub fn reset(&self) {
        let mut core = self.core.lock();
        core.reinitialize();
        info!("Clock reset.");
        core.emit(ClockEvent::Reset);
        core.notify();
    }

    /// Returns the clock to its initial state under a new time control.
    ///
    /// An empty stage list is rejected and leaves the clock untouched.
    pub fn reset_with(&self, preset: Preset) -> Result<(), ClockError> {
        let stages = StageTable::new(&preset.stages)?;
        let mut core = self.core.lock();
        core.stages = stages;
        core.name = Some(preset.name);
        core.reinitialize();
        info!(
            name = core.name.as_deref().unwrap_or("unnamed"),
            "Clock reset with new time control."
        );
        core.emit(ClockEvent::Reset);
        core.notify();
        Ok(())
    }

    /// A snapshot of the clock.
    pub fn state(&self) -> ClockState {
        self.core.lock().snapshot()
    }

    pub fn status(&self) -> Status {
        self.core.lock().status
    }

    pub fn name(&self) -> Option<String> {
        self.core.lock().name.clone()
    }

    /// Installs the observer, replacing any previous one.
    ///
    /// The observer runs in-line with every mutation and every tick, while the
    /// clock's lock is held. It must not call back into this clock.
    pub fn on_update(&self, observer: impl Fn(&ClockState) + Send + Sync + 'static) {
        self.core.lock().observer = Some(Box::new(observer));
    }

    pub fn clear_observer(&self) {
        self.core.lock().observer = None;
    }

    /// Subscribes to the `ClockEvent` stream.
    pub fn subscribe_events(&self) -> broadcast::Receiver<ClockEvent> {
        self.core.lock().event_sender.subscribe()
    }
}

impl std::fmt::Debug for ClockEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.core.lock();
        f.debug_struct("ClockEngine")
            .field("name", &core.name)
            .field("status", &core.status)
            .field("remaining", &core.remaining)
            .field("moves", &core.moves)
            .finish()
    }
}
