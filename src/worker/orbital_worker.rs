//! Background engine running its own tick loop on a dedicated thread.
//!
//! The host talks to the engine only through messages: commands go in over a
//! bounded channel and are applied in send order, `POSITIONS_UPDATE` snapshots
//! come back once per tick while the simulation runs. A snapshot is the latest
//! known layout, nothing more: the event queue is bounded too, and a snapshot
//! that finds it full is dropped. `ERROR` events are never dropped; the loop
//! waits for the host to make room for them.
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TryRecvError, TrySendError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, error, info, trace, warn};

use crate::engine::{EngineState, OrbitalEngine};
use crate::protocol::{decode_command, Command, Event};
use crate::utils::{OrbitalError, RepulsionMode};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkerConfig {
    /// Time between ticks while running.
    pub tick_interval: Duration,
    /// Commands that may be queued before `send` blocks.
    pub command_capacity: usize,
    /// Events the host may leave unread before snapshots are dropped.
    pub event_capacity: usize,
    pub repulsion: RepulsionMode,
    /// Seed for initial node placement.
    pub seed: Option<u64>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        WorkerConfig {
            tick_interval: Duration::from_millis(16),
            command_capacity: 256,
            event_capacity: 8,
            repulsion: RepulsionMode::BarnesHut,
            seed: None,
        }
    }
}

pub(super) type StepFn = fn(&mut OrbitalEngine) -> Result<(), OrbitalError>;

pub(super) enum Inbound {
    Command(Command),
    Shutdown,
}

/// Handle to an engine running on its own thread.
///
/// Dropping the handle shuts the loop down and joins the thread.
pub struct OrbitalWorker {
    commands: SyncSender<Inbound>,
    events: Receiver<Event>,
    handle: Option<JoinHandle<()>>,
}

impl OrbitalWorker {
    /// Spawns the engine thread. The engine starts uninitialized and waits for `INIT`.
    pub fn spawn(config: WorkerConfig) -> Result<Self, OrbitalError> {
        if config.tick_interval.is_zero() || config.command_capacity == 0 || config.event_capacity == 0 {
            return Err(OrbitalError::InvalidParameter(
                "tick_interval, command_capacity and event_capacity must be non-zero".to_string(),
            ));
        }
        let (command_tx, command_rx) = mpsc::sync_channel(config.command_capacity);
        let (event_tx, event_rx) = mpsc::sync_channel(config.event_capacity);

        let engine = OrbitalEngine::uninitialized().with_repulsion(config.repulsion);
        let engine = match config.seed {
            Some(seed) => engine.with_seed(seed),
            None => engine.with_os_seed(),
        };
        let tick_interval = config.tick_interval;
        let handle = thread::Builder::new()
            .name("orbital-worker".to_string())
            .spawn(move || run_loop(engine, command_rx, event_tx, tick_interval, OrbitalEngine::step))
            .map_err(|e| OrbitalError::InvalidParameter(format!("cannot spawn worker thread: {}", e)))?;

        info!("Orbital worker started ({:?} per tick)", tick_interval);
        Ok(OrbitalWorker { commands: command_tx, events: event_rx, handle: Some(handle) })
    }

    /// Queues a command, blocking while the queue is full.
    pub fn send(&self, command: Command) -> Result<(), OrbitalError> {
        self.commands
            .send(Inbound::Command(command))
            .map_err(|_| OrbitalError::WorkerDisconnected)
    }

    /// Decodes and queues one protocol message.
    ///
    /// Returns `false` when the message was not queued: unknown types and
    /// malformed JSON are logged and dropped, as is anything sent after the
    /// worker has stopped.
    pub fn post_json(&self, text: &str) -> bool {
        match decode_command(text) {
            Ok(Some(command)) => self.send(command).is_ok(),
            Ok(None) => false,
            Err(e) => {
                warn!("Dropping inbound message: {}", e);
                false
            }
        }
    }

    /// Next pending event, if any.
    pub fn try_recv_event(&self) -> Result<Option<Event>, OrbitalError> {
        match self.events.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(OrbitalError::WorkerDisconnected),
        }
    }

    /// Waits up to `timeout` for the next event.
    pub fn recv_event_timeout(&self, timeout: Duration) -> Result<Option<Event>, OrbitalError> {
        match self.events.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(OrbitalError::WorkerDisconnected),
        }
    }

    /// Every event currently queued, oldest first.
    pub fn drain_events(&self) -> Vec<Event> {
        self.events.try_iter().collect()
    }

    /// Stops the loop and joins the thread. Calling it twice is harmless.
    ///
    /// Events still queued are discarded, so a loop waiting to deliver an
    /// `ERROR` can reach the shutdown.
    pub fn dispose(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        let mut shutdown = Some(Inbound::Shutdown);
        while let Some(inbound) = shutdown.take() {
            // A disconnected queue means the loop is already gone; the join below still reaps it.
            if let Err(TrySendError::Full(inbound)) = self.commands.try_send(inbound) {
                self.events.try_iter().for_each(drop);
                thread::yield_now();
                shutdown = Some(inbound);
            }
        }
        while !handle.is_finished() {
            self.events.try_iter().for_each(drop);
            thread::sleep(Duration::from_millis(1));
        }
        if handle.join().is_err() {
            error!("Orbital worker thread panicked outside a tick");
        }
        info!("Orbital worker stopped");
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for OrbitalWorker {
    fn drop(&mut self) {
        self.dispose();
    }
}

pub(super) fn run_loop(
    mut engine: OrbitalEngine,
    commands: Receiver<Inbound>,
    events: SyncSender<Event>,
    tick_interval: Duration,
    step: StepFn,
) {
    let mut next_tick = Instant::now() + tick_interval;
    let mut dropped: u64 = 0;
    loop {
        let inbound = if engine.state() == EngineState::Running {
            match commands.recv_timeout(next_tick.saturating_duration_since(Instant::now())) {
                Ok(inbound) => Some(inbound),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            match commands.recv() {
                Ok(inbound) => Some(inbound),
                Err(_) => break,
            }
        };

        match inbound {
            Some(Inbound::Shutdown) => break,
            Some(Inbound::Command(command)) => {
                let was_running = engine.state() == EngineState::Running;
                let name = command.name();
                if let Err(e) = engine.apply(command) {
                    warn!("{} rejected: {}", name, e);
                    if events.send(Event::error(e)).is_err() {
                        break;
                    }
                }
                if !was_running && engine.state() == EngineState::Running {
                    next_tick = Instant::now();
                }
            }
            None => {}
        }

        if engine.state() == EngineState::Running && Instant::now() >= next_tick {
            let delivered = match run_tick(&mut engine, step) {
                update @ Event::PositionsUpdate(_) => match events.try_send(update) {
                    Ok(()) => true,
                    Err(TrySendError::Full(_)) => {
                        dropped += 1;
                        trace!("Event queue full, dropped snapshot ({} so far)", dropped);
                        true
                    }
                    Err(TrySendError::Disconnected(_)) => false,
                },
                failure => events.send(failure).is_ok(),
            };
            if !delivered {
                debug!("Host dropped the event receiver");
                break;
            }
            next_tick += tick_interval;
            let now = Instant::now();
            if next_tick < now {
                // Fell behind; skip the missed ticks instead of bursting.
                next_tick = now + tick_interval;
            }
        }
    }
    debug!("Orbital worker loop exited after {} ticks, {} snapshots dropped", engine.tick_count(), dropped);
}

/// One guarded tick. A fault ends that tick only.
fn run_tick(engine: &mut OrbitalEngine, step: StepFn) -> Event {
    match panic::catch_unwind(AssertUnwindSafe(|| step(engine))) {
        Ok(Ok(())) => Event::PositionsUpdate(engine.positions()),
        Ok(Err(e)) => {
            error!("Tick failed: {}", e);
            Event::error(e)
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            let e = OrbitalError::TickPanicked(message);
            error!("{}", e);
            Event::error(e)
        }
    }
}
