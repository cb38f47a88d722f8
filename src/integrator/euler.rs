use rayon::prelude::*;

use crate::models::{OrbitalNode, SimulationSpace};
use crate::utils::OrbitalConstants;

/// Velocity half of a semi-implicit Euler step.
///
/// Forces have already been folded into the velocities for this tick. Here the
/// velocity is damped, then limited to `max_speed`. Non-finite components are
/// reset to zero so one bad force cannot poison a node.
///
/// # Example
/// ```
/// use stardust_orbital::integrator::{advance_positions, damp_velocities};
/// use stardust_orbital::models::{OrbitalNode, SimulationSpace};
/// use stardust_orbital::utils::OrbitalConstants;
///
/// let constants = OrbitalConstants::default();
/// let space = SimulationSpace::new(100.0, 100.0).expect("valid space");
/// let mut nodes = vec![OrbitalNode::new("a", 50.0, 50.0, 1.0)];
/// nodes[0].vx = 10.0;
/// damp_velocities(&mut nodes, &constants);
/// advance_positions(&mut nodes, &space, &constants);
/// assert_eq!(nodes[0].vx, 9.0);
/// assert_eq!(nodes[0].x, 59.0);
/// ```
pub fn damp_velocities(nodes: &mut [OrbitalNode], constants: &OrbitalConstants) {
    nodes.par_iter_mut().for_each(|node| {
        node.vx *= constants.damping;
        node.vy *= constants.damping;
        if !node.vx.is_finite() { node.vx = 0.0; }
        if !node.vy.is_finite() { node.vy = 0.0; }

        let speed = node.speed_squared().sqrt();
        if speed > constants.max_speed {
            let scale = constants.max_speed / speed;
            node.vx *= scale;
            node.vy *= scale;
        }
    });
}

/// Position half of the step: move by `v * time_step` and clamp into the space.
pub fn advance_positions(nodes: &mut [OrbitalNode], space: &SimulationSpace, constants: &OrbitalConstants) {
    nodes.par_iter_mut().for_each(|node| {
        let (x, y) = space.clamp(
            node.x + node.vx * constants.time_step,
            node.y + node.vy * constants.time_step,
        );
        node.x = x;
        node.y = y;
    });
}

/// Total kinetic energy, `Σ ½ m v²`.
pub fn kinetic_energy(nodes: &[OrbitalNode]) -> f64 {
    nodes.par_iter().map(|n| 0.5 * n.mass * n.speed_squared()).sum()
}
