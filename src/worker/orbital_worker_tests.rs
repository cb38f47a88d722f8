use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crate::engine::OrbitalEngine;
use crate::models::{Link, NodeSeed, SimulationSpace};
use crate::protocol::{Command, Event, InitPayload, StatePayload};
use crate::utils::OrbitalError;
use crate::worker::orbital_worker::{run_loop, Inbound};
use crate::worker::{OrbitalWorker, WorkerConfig};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn fast_worker() -> OrbitalWorker {
    init_logger();
    OrbitalWorker::spawn(WorkerConfig {
        tick_interval: Duration::from_millis(1),
        seed: Some(42),
        ..WorkerConfig::default()
    })
    .expect("worker spawns")
}

/// Waits for the first event matching `pred`, skipping the rest.
fn wait_for(worker: &OrbitalWorker, pred: impl Fn(&Event) -> bool) -> Option<Event> {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if let Ok(Some(event)) = worker.recv_event_timeout(Duration::from_millis(50)) {
            if pred(&event) {
                return Some(event);
            }
        }
    }
    None
}

#[test]
fn test_default_config() {
    let config = WorkerConfig::default();
    assert_eq!(config.tick_interval, Duration::from_millis(16));
    assert_eq!(config.command_capacity, 256);
    assert_eq!(config.event_capacity, 8);
    assert_eq!(config.seed, None);
}

#[test]
fn test_spawn_rejects_zero_capacity() {
    let result = OrbitalWorker::spawn(WorkerConfig { command_capacity: 0, ..WorkerConfig::default() });
    assert!(matches!(result, Err(OrbitalError::InvalidParameter(_))));
    let result = OrbitalWorker::spawn(WorkerConfig { event_capacity: 0, ..WorkerConfig::default() });
    assert!(matches!(result, Err(OrbitalError::InvalidParameter(_))));
}

fn two_node_state() -> StatePayload {
    StatePayload {
        nodes: vec![NodeSeed::new("a").at(50.0, 100.0), NodeSeed::new("b").at(150.0, 100.0)],
        links: vec![Link::new("a", "b", 0.5)],
    }
}

fn init_200() -> Command {
    Command::Init(InitPayload { width: 200.0, height: 200.0, config: Default::default() })
}

#[test]
fn test_unread_snapshots_stay_bounded() {
    init_logger();
    let mut worker = OrbitalWorker::spawn(WorkerConfig {
        tick_interval: Duration::from_millis(1),
        event_capacity: 4,
        seed: Some(42),
        ..WorkerConfig::default()
    })
    .expect("worker spawns");
    worker.send(init_200()).expect("send init");
    worker.send(Command::SetInitialState(two_node_state())).expect("send state");
    worker.send(Command::StartSimulation).expect("send start");

    // Roughly 200 ticks go by without the host reading anything.
    thread::sleep(Duration::from_millis(200));
    let backlog = worker.drain_events();
    assert!(!backlog.is_empty());
    assert!(backlog.len() <= 4, "backlog grew to {}", backlog.len());
    assert!(backlog.iter().all(|e| matches!(e, Event::PositionsUpdate(_))));

    // Fresh snapshots keep coming once there is room again.
    assert!(wait_for(&worker, |e| matches!(e, Event::PositionsUpdate(_))).is_some());
    worker.dispose();
}

#[test]
fn test_errors_survive_a_full_event_queue() {
    init_logger();
    let mut worker = OrbitalWorker::spawn(WorkerConfig {
        tick_interval: Duration::from_millis(1),
        event_capacity: 2,
        seed: Some(42),
        ..WorkerConfig::default()
    })
    .expect("worker spawns");
    worker.send(init_200()).expect("send init");
    worker.send(Command::SetInitialState(two_node_state())).expect("send state");
    worker.send(Command::StartSimulation).expect("send start");
    thread::sleep(Duration::from_millis(50));

    // A bad INIT is rejected while the queue is still full of snapshots.
    worker
        .send(Command::Init(InitPayload { width: -1.0, height: 200.0, config: Default::default() }))
        .expect("send init");
    let event = wait_for(&worker, |e| matches!(e, Event::Error { .. })).expect("an error event");
    let expected = SimulationSpace::new(-1.0, 200.0).expect_err("negative width");
    assert_eq!(event, Event::error(expected));
    worker.dispose();
    assert!(!worker.is_running());
}

static STEPS: AtomicUsize = AtomicUsize::new(0);

/// Panics on the third tick, steps normally otherwise.
fn faulty_step(engine: &mut OrbitalEngine) -> Result<(), OrbitalError> {
    if STEPS.fetch_add(1, Ordering::SeqCst) == 2 {
        panic!("forced fault");
    }
    engine.step()
}

#[test]
fn test_panicking_tick_reports_error_and_keeps_ticking() {
    init_logger();
    let (command_tx, command_rx) = mpsc::sync_channel(16);
    let (event_tx, event_rx) = mpsc::sync_channel(64);
    let engine = OrbitalEngine::uninitialized().with_seed(42);
    let handle = thread::spawn(move || run_loop(engine, command_rx, event_tx, Duration::from_millis(1), faulty_step));

    for command in [init_200(), Command::SetInitialState(two_node_state()), Command::StartSimulation] {
        command_tx.send(Inbound::Command(command)).expect("loop alive");
    }

    let deadline = Instant::now() + Duration::from_secs(5);
    let mut events = Vec::new();
    while events.len() < 6 && Instant::now() < deadline {
        if let Ok(event) = event_rx.recv_timeout(Duration::from_millis(50)) {
            events.push(event);
        }
    }
    command_tx.send(Inbound::Shutdown).expect("loop alive");
    handle.join().expect("loop exits cleanly");

    assert_eq!(events.len(), 6);
    assert!(matches!(events[0], Event::PositionsUpdate(_)));
    assert!(matches!(events[1], Event::PositionsUpdate(_)));
    match &events[2] {
        Event::Error { message } => assert_eq!(message, "Tick panicked: forced fault"),
        other => panic!("Expected an error, got {:?}", other),
    }
    assert!(events[3..].iter().all(|e| matches!(e, Event::PositionsUpdate(_))));
}

#[test]
fn test_positions_stream_while_running() {
    let mut worker = fast_worker();
    worker
        .send(Command::Init(InitPayload { width: 200.0, height: 200.0, config: Default::default() }))
        .expect("send init");
    worker
        .send(Command::SetInitialState(StatePayload {
            nodes: vec![NodeSeed::new("a").at(50.0, 100.0), NodeSeed::new("b").at(150.0, 100.0)],
            links: vec![Link::new("a", "b", 0.5)],
        }))
        .expect("send state");
    worker.send(Command::StartSimulation).expect("send start");

    let event = wait_for(&worker, |e| matches!(e, Event::PositionsUpdate(_))).expect("a positions update");
    match event {
        Event::PositionsUpdate(positions) => {
            let ids: Vec<&str> = positions.iter().map(|p| p.id.as_str()).collect();
            assert_eq!(ids, vec!["a", "b"]);
            for p in &positions {
                assert!((0.0..=200.0).contains(&p.x) && (0.0..=200.0).contains(&p.y));
            }
        }
        other => panic!("Expected positions, got {:?}", other),
    }

    worker.send(Command::StopSimulation).expect("send stop");
    worker.dispose();
    assert!(!worker.is_running());
}

#[test]
fn test_invalid_start_reports_error_and_keeps_running() {
    let mut worker = fast_worker();
    worker.send(Command::StartSimulation).expect("send start");
    let event = wait_for(&worker, |e| matches!(e, Event::Error { .. })).expect("an error event");
    assert_eq!(event, Event::error(OrbitalError::InvalidTransition { from: "uninitialized", command: "start" }));

    // The loop survives and still accepts commands.
    assert!(worker.post_json(r#"{"type":"INIT","payload":{"width":10,"height":10}}"#));
    worker.dispose();
}

#[test]
fn test_post_json_drops_unknown_and_malformed() {
    let mut worker = fast_worker();
    assert!(!worker.post_json(r#"{"type":"WARP_DRIVE"}"#));
    assert!(!worker.post_json("{not json"));
    assert!(worker.post_json(r#"{"type":"STOP_SIMULATION"}"#));
    worker.dispose();
}

#[test]
fn test_no_updates_before_start() {
    let mut worker = fast_worker();
    assert!(worker.post_json(r#"{"type":"INIT","payload":{"width":100,"height":100}}"#));
    assert!(worker.post_json(r#"{"type":"SET_INITIAL_STATE","payload":{"nodes":[{"id":"a"}],"links":[]}}"#));
    std::thread::sleep(Duration::from_millis(30));
    assert!(worker.drain_events().is_empty());
    worker.dispose();
}

#[test]
fn test_send_after_dispose_fails() {
    let mut worker = fast_worker();
    worker.dispose();
    worker.dispose();
    assert_eq!(worker.send(Command::StopSimulation), Err(OrbitalError::WorkerDisconnected));
    assert_eq!(worker.try_recv_event(), Err(OrbitalError::WorkerDisconnected));
}
