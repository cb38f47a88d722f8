use approx::assert_relative_eq;

use crate::integrator::{advance_positions, damp_velocities, kinetic_energy};
use crate::models::{OrbitalNode, SimulationSpace};
use crate::utils::OrbitalConstants;

fn full_step(nodes: &mut [OrbitalNode], space: &SimulationSpace, constants: &OrbitalConstants) {
    damp_velocities(nodes, constants);
    advance_positions(nodes, space, constants);
}

#[test]
fn test_damping_then_advance() {
    let constants = OrbitalConstants::default().with_time_step(0.5);
    let space = SimulationSpace::new(100.0, 100.0).expect("valid space");
    let mut nodes = vec![OrbitalNode::new("a", 10.0, 10.0, 1.0)];
    nodes[0].vx = 4.0;
    nodes[0].vy = -2.0;
    full_step(&mut nodes, &space, &constants);
    assert_relative_eq!(nodes[0].vx, 3.6);
    assert_relative_eq!(nodes[0].vy, -1.8);
    assert_relative_eq!(nodes[0].x, 11.8);
    assert_relative_eq!(nodes[0].y, 9.1);
}

#[test]
fn test_clamp_to_space() {
    let constants = OrbitalConstants::default();
    let space = SimulationSpace::new(100.0, 50.0).expect("valid space");
    let mut nodes = vec![
        OrbitalNode::new("a", 99.0, 1.0, 1.0),
        OrbitalNode::new("b", 1.0, 49.0, 1.0),
    ];
    nodes[0].vx = 500.0;
    nodes[0].vy = -500.0;
    nodes[1].vx = -500.0;
    nodes[1].vy = 500.0;
    full_step(&mut nodes, &space, &constants);
    assert_eq!((nodes[0].x, nodes[0].y), (100.0, 0.0));
    assert_eq!((nodes[1].x, nodes[1].y), (0.0, 50.0));
}

#[test]
fn test_non_finite_velocity_is_reset() {
    let constants = OrbitalConstants::default();
    let space = SimulationSpace::new(100.0, 100.0).expect("valid space");
    let mut nodes = vec![OrbitalNode::new("a", 50.0, 50.0, 1.0)];
    nodes[0].vx = f64::NAN;
    nodes[0].vy = f64::INFINITY;
    full_step(&mut nodes, &space, &constants);
    assert_eq!((nodes[0].x, nodes[0].y), (50.0, 50.0));
    assert_eq!((nodes[0].vx, nodes[0].vy), (0.0, 0.0));
}

#[test]
fn test_speed_is_capped_after_damping() {
    let constants = OrbitalConstants { max_speed: 10.0, ..OrbitalConstants::default() };
    let mut nodes = vec![OrbitalNode::new("a", 0.0, 0.0, 1.0), OrbitalNode::new("b", 0.0, 0.0, 1.0)];
    nodes[0].vx = 300.0;
    nodes[0].vy = 400.0;
    nodes[1].vx = 5.0;
    damp_velocities(&mut nodes, &constants);
    assert_relative_eq!(nodes[0].vx, 6.0);
    assert_relative_eq!(nodes[0].vy, 8.0);
    assert_relative_eq!(nodes[1].vx, 4.5);
}

#[test]
fn test_advance_leaves_velocity_alone() {
    let constants = OrbitalConstants::default();
    let space = SimulationSpace::new(100.0, 100.0).expect("valid space");
    let mut nodes = vec![OrbitalNode::new("a", 20.0, 20.0, 1.0)];
    nodes[0].vx = 2.0;
    advance_positions(&mut nodes, &space, &constants);
    assert_relative_eq!(nodes[0].x, 22.0);
    assert_relative_eq!(nodes[0].vx, 2.0);
}

#[test]
fn test_kinetic_energy() {
    let mut nodes = vec![OrbitalNode::new("a", 0.0, 0.0, 2.0), OrbitalNode::new("b", 0.0, 0.0, 1.0)];
    nodes[0].vx = 3.0;
    nodes[1].vy = 2.0;
    assert_relative_eq!(kinetic_energy(&nodes), 0.5 * 2.0 * 9.0 + 0.5 * 1.0 * 4.0);
}
