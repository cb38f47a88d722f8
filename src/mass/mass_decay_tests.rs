use std::collections::HashMap;

use approx::assert_relative_eq;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use crate::mass::{apply_mass_pass, compute_mass, decay_factor, refresh_link_counts};
use crate::models::{Link, OrbitalNode};
use crate::utils::{OrbitalConstants, HALF_LIFE_HOURS, MIN_MASS, MS_PER_HOUR};

const NOW: i64 = 1_700_000_000_000;

#[test]
fn test_mass_weights_without_decay() {
    assert_relative_eq!(compute_mass(3, 0, Some(NOW), NOW), 4.5);
    assert_relative_eq!(compute_mass(0, 5, Some(NOW), NOW), 2.5);
    assert_relative_eq!(compute_mass(2, 2, None, NOW), 4.0);
}

#[test]
fn test_mass_decays_over_one_half_life() {
    let week_ago = NOW - (HALF_LIFE_HOURS * MS_PER_HOUR) as i64;
    let mass = compute_mass(4, 0, Some(week_ago), NOW);
    assert_relative_eq!(mass, 6.0 * (-1.0f64).exp(), epsilon = 1e-9);
}

#[test]
fn test_future_access_does_not_amplify() {
    assert_relative_eq!(decay_factor(NOW + 10_000_000, NOW), 1.0);
    assert_relative_eq!(compute_mass(2, 0, Some(NOW + 10_000_000), NOW), 3.0);
}

#[test]
fn test_mass_floor_for_any_usage() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..500 {
        let links = rng.random_range(0..20);
        let accesses = rng.random_range(0..50);
        let age_ms = rng.random_range(0..(5 * 365 * 24 * 3_600_000i64));
        let mass = compute_mass(links, accesses, Some(NOW - age_ms), NOW);
        assert!(mass >= MIN_MASS, "mass {} below floor", mass);
    }
    assert_eq!(compute_mass(10, 10, Some(i64::MIN), NOW), MIN_MASS);
}

#[test]
fn test_mass_pass_respects_pinned_mass() {
    let constants = OrbitalConstants::default();
    let mut derived = OrbitalNode::new("a", 0.0, 0.0, 1.0);
    derived.links_count = 2;
    derived.last_accessed = NOW;
    let mut pinned = OrbitalNode::new("b", 0.0, 0.0, 1.0);
    pinned.pinned_mass = Some(0.01);
    let mut nodes = vec![derived, pinned];
    apply_mass_pass(&mut nodes, &constants, NOW);
    assert_relative_eq!(nodes[0].mass, 3.0);
    assert_relative_eq!(nodes[0].radius, constants.radius_for(3.0));
    assert_eq!(nodes[1].mass, MIN_MASS);
}

#[test]
fn test_refresh_link_counts_skips_dangling_and_pinned() {
    let mut nodes = vec![
        OrbitalNode::new("a", 0.0, 0.0, 1.0),
        OrbitalNode::new("b", 0.0, 0.0, 1.0),
        OrbitalNode::new("c", 0.0, 0.0, 1.0),
    ];
    nodes[2].links_count = 9;
    nodes[2].pinned_links = true;
    let index: HashMap<String, usize> = nodes.iter().enumerate().map(|(i, n)| (n.id.clone(), i)).collect();
    let links = vec![
        Link::new("a", "b", 1.0),
        Link::new("a", "ghost", 1.0),
        Link::new("b", "c", 0.5),
    ];
    refresh_link_counts(&mut nodes, &links, &index);
    assert_eq!(nodes[0].links_count, 1);
    assert_eq!(nodes[1].links_count, 2);
    assert_eq!(nodes[2].links_count, 9);
}
