use crate::models::{NodeId, OrbitalNode};
use crate::utils::{OrbitalError, DEFAULT_PERIPHERAL_THRESHOLD};

/// Rule deciding which nodes are low-importance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PeripheralPolicy {
    /// Nodes whose mass is strictly below the threshold.
    AbsoluteThreshold(f64),
    /// The lightest `fraction` of the population (rounded up), ties broken by node order.
    Percentile(f64),
}

/// `AbsoluteThreshold(DEFAULT_PERIPHERAL_THRESHOLD)`. The threshold equals
/// `MIN_MASS`, so against engine-computed masses this flags nothing.
impl Default for PeripheralPolicy {
    fn default() -> Self {
        PeripheralPolicy::AbsoluteThreshold(DEFAULT_PERIPHERAL_THRESHOLD)
    }
}

impl PeripheralPolicy {
    pub fn validate(&self) -> Result<(), OrbitalError> {
        match *self {
            PeripheralPolicy::AbsoluteThreshold(t) if t.is_nan() => {
                Err(OrbitalError::InvalidParameter("peripheral threshold is NaN".to_string()))
            }
            PeripheralPolicy::Percentile(p) if !(0.0..=1.0).contains(&p) => {
                Err(OrbitalError::InvalidParameter(format!("percentile {} outside [0, 1]", p)))
            }
            _ => Ok(()),
        }
    }
}

/// Ids of the peripheral nodes under `policy`, in node order.
///
/// # Example
/// ```
/// use stardust_orbital::analysis::{find_peripheral, PeripheralPolicy};
/// use stardust_orbital::models::OrbitalNode;
///
/// let nodes = vec![
///     OrbitalNode::new("hub", 0.0, 0.0, 8.0),
///     OrbitalNode::new("leaf", 0.0, 0.0, 0.5),
/// ];
/// let ids = find_peripheral(&nodes, PeripheralPolicy::AbsoluteThreshold(1.0)).expect("valid policy");
/// assert_eq!(ids, vec!["leaf".to_string()]);
/// ```
pub fn find_peripheral(nodes: &[OrbitalNode], policy: PeripheralPolicy) -> Result<Vec<NodeId>, OrbitalError> {
    policy.validate()?;
    let selected: Vec<bool> = match policy {
        PeripheralPolicy::AbsoluteThreshold(threshold) => {
            nodes.iter().map(|n| n.mass < threshold).collect()
        }
        PeripheralPolicy::Percentile(fraction) => {
            let count = (fraction * nodes.len() as f64).ceil() as usize;
            let mut order: Vec<usize> = (0..nodes.len()).collect();
            order.sort_by(|&a, &b| nodes[a].mass.total_cmp(&nodes[b].mass));
            let mut selected = vec![false; nodes.len()];
            for &i in order.iter().take(count) {
                selected[i] = true;
            }
            selected
        }
    };
    Ok(nodes.iter()
        .zip(selected)
        .filter(|(_, keep)| *keep)
        .map(|(n, _)| n.id.clone())
        .collect())
}
