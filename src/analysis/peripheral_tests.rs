use crate::analysis::{find_peripheral, PeripheralPolicy};
use crate::models::OrbitalNode;
use crate::utils::OrbitalError;

fn with_masses(masses: &[(&str, f64)]) -> Vec<OrbitalNode> {
    masses
        .iter()
        .map(|&(id, mass)| {
            let mut node = OrbitalNode::new(id, 0.0, 0.0, 1.0);
            node.mass = mass;
            node
        })
        .collect()
}

#[test]
fn test_absolute_threshold() {
    let nodes = with_masses(&[("A", 0.05), ("B", 5.0), ("C", 0.08)]);
    let ids = find_peripheral(&nodes, PeripheralPolicy::default()).expect("valid policy");
    assert_eq!(ids, vec!["A".to_string(), "C".to_string()]);
}

#[test]
fn test_threshold_is_strict() {
    let nodes = with_masses(&[("A", 0.1), ("B", 0.0999)]);
    let ids = find_peripheral(&nodes, PeripheralPolicy::AbsoluteThreshold(0.1)).expect("valid policy");
    assert_eq!(ids, vec!["B".to_string()]);
}

#[test]
fn test_percentile_takes_lightest_fraction() {
    let nodes = with_masses(&[("A", 3.0), ("B", 1.0), ("C", 9.0), ("D", 2.0), ("E", 5.0)]);
    let ids = find_peripheral(&nodes, PeripheralPolicy::Percentile(0.4)).expect("valid policy");
    assert_eq!(ids, vec!["B".to_string(), "D".to_string()]);
}

#[test]
fn test_percentile_ties_follow_node_order() {
    let nodes = with_masses(&[("A", 1.0), ("B", 1.0), ("C", 1.0)]);
    let ids = find_peripheral(&nodes, PeripheralPolicy::Percentile(0.5)).expect("valid policy");
    assert_eq!(ids, vec!["A".to_string(), "B".to_string()]);
}

#[test]
fn test_percentile_bounds() {
    let nodes = with_masses(&[("A", 1.0), ("B", 2.0)]);
    assert!(find_peripheral(&nodes, PeripheralPolicy::Percentile(0.0)).expect("valid policy").is_empty());
    assert_eq!(find_peripheral(&nodes, PeripheralPolicy::Percentile(1.0)).expect("valid policy").len(), 2);
    match find_peripheral(&nodes, PeripheralPolicy::Percentile(1.5)) {
        Err(OrbitalError::InvalidParameter(_)) => (),
        other => panic!("Expected InvalidParameter, got {:?}", other),
    }
}

#[test]
fn test_empty_population() {
    assert!(find_peripheral(&[], PeripheralPolicy::Percentile(0.5)).expect("valid policy").is_empty());
}
