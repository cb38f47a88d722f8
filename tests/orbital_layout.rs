use stardust_orbital::assert_float_eq;
use stardust_orbital::engine::{EngineState, OrbitalEngine};
use stardust_orbital::models::{Link, NodeSeed, SimulationSpace};
use stardust_orbital::utils::{OrbitalConstants, RepulsionMode};

fn engine(width: f64, height: f64, constants: OrbitalConstants) -> OrbitalEngine {
    let space = SimulationSpace::new(width, height).expect("valid space");
    OrbitalEngine::new(space, constants).expect("valid constants").with_seed(99)
}

#[test]
fn two_unlinked_nodes_drift_apart() {
    let mut engine = engine(200.0, 200.0, OrbitalConstants::default());
    engine.set_state(
        vec![
            NodeSeed::new("n1").at(0.0, 0.0).with_mass(2.0),
            NodeSeed::new("n2").at(100.0, 0.0).with_mass(2.0),
        ],
        vec![],
    );
    engine.simulate(50).expect("simulation");

    let n1 = engine.node("n1").expect("n1");
    let n2 = engine.node("n2").expect("n2");
    let separation = (n2.x - n1.x).hypot(n2.y - n1.y);
    assert!(separation > 100.0, "separation only {}", separation);
    for node in [n1, n2] {
        assert!((0.0..=200.0).contains(&node.x), "{} x = {}", node.id, node.x);
        assert!((0.0..=200.0).contains(&node.y), "{} y = {}", node.id, node.y);
    }
}

#[test]
fn strongly_linked_pair_closes_in() {
    let constants = OrbitalConstants::new(None, None, None, Some(0.0));
    let mut engine = engine(400.0, 400.0, constants);
    engine.set_state(
        vec![
            NodeSeed::new("a").at(100.0, 200.0).with_mass(0.1),
            NodeSeed::new("b").at(300.0, 200.0).with_mass(0.1),
        ],
        vec![Link::new("a", "b", 1.0)],
    );
    let gap = |e: &OrbitalEngine| {
        let (a, b) = (e.node("a").expect("a"), e.node("b").expect("b"));
        (b.x - a.x).hypot(b.y - a.y)
    };
    let start = gap(&engine);
    engine.simulate(100).expect("simulation");
    assert!(gap(&engine) < start);
    engine.simulate(900).expect("simulation");
    let contact = 2.0 * constants.radius_for(0.1);
    assert!(gap(&engine) >= contact - 1e-9 && gap(&engine) < contact + 1.0, "pair settled at {}", gap(&engine));
}

#[test]
fn symmetric_layout_keeps_its_centroid() {
    let mut engine = engine(400.0, 400.0, OrbitalConstants::new(None, None, None, Some(0.0)));
    engine.set_state(
        vec![
            NodeSeed::new("w").at(150.0, 200.0).with_mass(1.0),
            NodeSeed::new("e").at(250.0, 200.0).with_mass(1.0),
            NodeSeed::new("n").at(200.0, 150.0).with_mass(1.0),
            NodeSeed::new("s").at(200.0, 250.0).with_mass(1.0),
        ],
        vec![],
    );
    engine.simulate(5).expect("simulation");
    let count = engine.nodes().len() as f64;
    let cx = engine.nodes().iter().map(|n| n.x).sum::<f64>() / count;
    let cy = engine.nodes().iter().map(|n| n.y).sum::<f64>() / count;
    assert_float_eq(cx, 200.0, 1e-9, Some("centroid x drifted"));
    assert_float_eq(cy, 200.0, 1e-9, Some("centroid y drifted"));
}

#[test]
fn crowded_graph_stays_inside_the_space() {
    for mode in [RepulsionMode::Exact, RepulsionMode::BarnesHut] {
        let mut engine = engine(120.0, 80.0, OrbitalConstants::default()).with_repulsion(mode);
        let seeds: Vec<NodeSeed> = (0..60).map(|i| NodeSeed::new(format!("n{}", i)).with_usage(i % 5, 0)).collect();
        let links: Vec<Link> = (1..60).map(|i| Link::new(format!("n{}", i), format!("n{}", i / 2), 0.6)).collect();
        engine.set_state(seeds, links);
        engine.simulate(40).expect("simulation");
        for node in engine.nodes() {
            assert!(node.x.is_finite() && node.y.is_finite());
            assert!((0.0..=120.0).contains(&node.x) && (0.0..=80.0).contains(&node.y), "{:?} escaped", mode);
        }
    }
}

#[test]
fn coincident_nodes_separate() {
    let mut engine = engine(100.0, 100.0, OrbitalConstants::default());
    engine.set_state(
        vec![NodeSeed::new("a").at(50.0, 50.0), NodeSeed::new("b").at(50.0, 50.0)],
        vec![],
    );
    engine.step().expect("tick");
    let (a, b) = (engine.node("a").expect("a"), engine.node("b").expect("b"));
    assert!(a.x.is_finite() && b.x.is_finite());
    assert!(a.x < b.x);
}

#[test]
fn dangling_links_are_harmless() {
    let mut engine = engine(100.0, 100.0, OrbitalConstants::default());
    engine.set_state(
        vec![NodeSeed::new("a").at(20.0, 20.0), NodeSeed::new("b").at(80.0, 80.0)],
        vec![Link::new("a", "missing", 1.0), Link::new("a", "b", 0.3)],
    );
    engine.start().expect("start");
    engine.simulate(10).expect("simulation");
    assert_eq!(engine.state(), EngineState::Running);
    assert_eq!(engine.node("a").expect("a").links_count, 1);
}
