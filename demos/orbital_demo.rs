use std::time::{Duration, Instant};

use log::info;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use stardust_orbital::analysis::PeripheralPolicy;
use stardust_orbital::engine::OrbitalEngine;
use stardust_orbital::models::{InMemorySource, Link, NoteRecord, SimulationSpace};
use stardust_orbital::protocol::{Command, Event, InitPayload, StatePayload};
use stardust_orbital::utils::{now_ms, OrbitalConstants, OrbitalError, DEFAULT_BRIDGE_COUNT, DEFAULT_CLUSTER_THRESHOLD};
use stardust_orbital::worker::{OrbitalWorker, WorkerConfig};

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 600.0;

/// A few tightly linked topics, loosely cross-linked, plus some stray notes.
fn synthetic_notes(rng: &mut StdRng) -> InMemorySource {
    let now = now_ms();
    let mut notes = Vec::new();
    let mut links = Vec::new();
    for topic in 0..4 {
        for i in 0..8 {
            let id = format!("topic{}-{}", topic, i);
            let hours_ago = rng.random_range(0..24 * 30);
            notes.push(NoteRecord {
                id: id.clone(),
                links_count: None,
                access_count: rng.random_range(0..20),
                last_accessed: Some(now - hours_ago * 3_600_000),
            });
            if i > 0 {
                links.push(Link::new(id, format!("topic{}-{}", topic, rng.random_range(0..i)), 0.9));
            }
        }
    }
    for topic in 0..4 {
        links.push(Link::new(format!("hub-{}", topic), format!("topic{}-0", topic), 0.3));
        links.push(Link::new(format!("hub-{}", topic), format!("topic{}-0", (topic + 1) % 4), 0.3));
        notes.push(NoteRecord { id: format!("hub-{}", topic), links_count: None, access_count: 5, last_accessed: Some(now) });
    }
    for i in 0..6 {
        notes.push(NoteRecord { id: format!("stray-{}", i), links_count: Some(0), access_count: 0, last_accessed: Some(0) });
    }
    InMemorySource::new(notes, links)
}

fn main() -> Result<(), OrbitalError> {
    env_logger::init();
    let mut rng = StdRng::seed_from_u64(2024);
    let source = synthetic_notes(&mut rng);

    // Background run: stream positions for half a second.
    let mut worker = OrbitalWorker::spawn(WorkerConfig { seed: Some(7), ..WorkerConfig::default() })?;
    worker.send(Command::Init(InitPayload { width: WIDTH, height: HEIGHT, config: Default::default() }))?;
    worker.send(Command::SetInitialState(StatePayload {
        nodes: source.notes.iter().map(Into::into).collect(),
        links: source.links.clone(),
    }))?;
    worker.send(Command::StartSimulation)?;

    let deadline = Instant::now() + Duration::from_millis(500);
    let mut snapshots = 0;
    while Instant::now() < deadline {
        match worker.recv_event_timeout(Duration::from_millis(50))? {
            Some(Event::PositionsUpdate(_)) => snapshots += 1,
            Some(Event::Error { message }) => eprintln!("worker error: {}", message),
            None => {}
        }
    }
    worker.send(Command::StopSimulation)?;
    worker.dispose();
    info!("Received {} position snapshots from the worker", snapshots);

    // Same graph in-thread, for analysis.
    let space = SimulationSpace::new(WIDTH, HEIGHT)?;
    let mut engine = OrbitalEngine::new(space, OrbitalConstants::default())?.with_seed(7);
    engine.load_from(&source);
    engine.simulate(300)?;
    println!("Kinetic energy after 300 ticks: {:.4}", engine.kinetic_energy());

    let clusters = engine.clusters(DEFAULT_CLUSTER_THRESHOLD);
    for (i, cluster) in clusters.iter().enumerate() {
        println!("Cluster {}: {}", i, cluster.members.join(", "));
    }
    for bridge in engine.bridges(&clusters, DEFAULT_BRIDGE_COUNT) {
        println!("Bridge {} ({} links) joins {:?}", bridge.id, bridge.links_count, bridge.cluster_pairs);
    }
    let peripheral = engine.peripheral(PeripheralPolicy::default())?;
    println!("Peripheral notes: {}", peripheral.join(", "));
    let lightest = engine.peripheral(PeripheralPolicy::Percentile(0.1))?;
    println!("Lightest 10%: {}", lightest.join(", "));
    Ok(())
}
