use std::collections::HashMap;

use log::trace;
use rayon::prelude::*;

use crate::models::{Link, OrbitalNode, SimulationSpace, ToCoordinates, Vector2};
use crate::utils::OrbitalConstants;

/// The three force laws acting on a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ForceLaw {
    /// Pairwise push: `k_rep * m_a * m_b / d²`.
    Repulsion { mass_a: f64, mass_b: f64 },
    /// Link pull, decaying with distance: `k_att * strength / d`.
    Attraction { strength: f64 },
    /// Pull toward the center of the space: `gravity * mass * d`.
    CenterGravity { mass: f64 },
}

impl ForceLaw {
    /// Magnitude of the force at `distance`. The distance is floored at
    /// `constants.distance_floor` before dividing.
    ///
    /// # Example
    /// ```
    /// use stardust_orbital::forces::ForceLaw;
    /// use stardust_orbital::utils::OrbitalConstants;
    ///
    /// let constants = OrbitalConstants::new(Some(100.0), Some(2.0), None, None);
    /// let push = ForceLaw::Repulsion { mass_a: 1.0, mass_b: 2.0 }.magnitude(10.0, &constants);
    /// assert_eq!(push, 2.0);
    /// let pull = ForceLaw::Attraction { strength: 0.5 }.magnitude(4.0, &constants);
    /// assert_eq!(pull, 0.25);
    /// ```
    pub fn magnitude(&self, distance: f64, constants: &OrbitalConstants) -> f64 {
        let d = distance.max(constants.distance_floor);
        match *self {
            ForceLaw::Repulsion { mass_a, mass_b } => constants.repulsion_strength * mass_a * mass_b / (d * d),
            ForceLaw::Attraction { strength } => constants.attraction_strength * strength / d,
            ForceLaw::CenterGravity { mass } => constants.gravity * mass * distance,
        }
    }
}

/// Position and mass of one node, as seen by the repulsion kernels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub mass: f64,
}

impl Body {
    pub fn of(index: usize, node: &OrbitalNode) -> Self {
        Body { index, x: node.x, y: node.y, mass: node.mass }
    }
}

/// Repulsive force exerted on `target` by `source`, pointing from `source` to `target`.
///
/// Two bodies sharing a position are separated along the x axis, the lower index
/// going left, so the pair still receives equal and opposite pushes.
pub fn repulsion_on(target: &Body, source: &Body, constants: &OrbitalConstants) -> (f64, f64) {
    let dx = target.x - source.x;
    let dy = target.y - source.y;
    let dist = (dx * dx + dy * dy).sqrt();
    let force = ForceLaw::Repulsion { mass_a: target.mass, mass_b: source.mass }.magnitude(dist, constants);
    if dist == 0.0 {
        let sign = if target.index < source.index { -1.0 } else { 1.0 };
        return (sign * force, 0.0);
    }
    (force * dx / dist, force * dy / dist)
}

/// Repulsion from an aggregated point mass, used for distant quadtree cells.
pub fn repulsion_from_mass(target: &Body, com_x: f64, com_y: f64, mass: f64, constants: &OrbitalConstants) -> (f64, f64) {
    let dx = target.x - com_x;
    let dy = target.y - com_y;
    let dist = (dx * dx + dy * dy).sqrt();
    if dist == 0.0 {
        return (0.0, 0.0);
    }
    let force = ForceLaw::Repulsion { mass_a: target.mass, mass_b: mass }.magnitude(dist, constants);
    (force * dx / dist, force * dy / dist)
}

/// Adds `force * time_step` (or `force / mass * time_step` under Newtonian inertia) to a node.
pub fn apply_force(node: &mut OrbitalNode, fx: f64, fy: f64, constants: &OrbitalConstants) {
    node.vx += constants.velocity_delta(fx, node.mass);
    node.vy += constants.velocity_delta(fy, node.mass);
}

/// Exact all-pairs repulsion, O(n²). Each pair is visited once and both nodes
/// receive equal and opposite forces.
pub fn apply_exact_repulsion(nodes: &mut [OrbitalNode], constants: &OrbitalConstants) {
    let n = nodes.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let a = Body::of(i, &nodes[i]);
            let b = Body::of(j, &nodes[j]);
            let (fx, fy) = repulsion_on(&a, &b, constants);
            apply_force(&mut nodes[i], fx, fy, constants);
            apply_force(&mut nodes[j], -fx, -fy, constants);
        }
    }
}

/// Pulls the endpoints of every resolvable link toward each other.
///
/// Links naming a missing node and self-links are skipped. Returns the number of
/// links that contributed.
pub fn apply_attraction(
    nodes: &mut [OrbitalNode],
    links: &[Link],
    index: &HashMap<String, usize>,
    constants: &OrbitalConstants,
) -> usize {
    let mut applied = 0;
    for link in links {
        let (Some(&a), Some(&b)) = (index.get(&link.source_id), index.get(&link.target_id)) else {
            trace!("Skipping dangling link {} -> {}", link.source_id, link.target_id);
            continue;
        };
        if a == b {
            continue;
        }
        let delta = Vector2::between(nodes[a].to_coord(), nodes[b].to_coord());
        let dist = delta.length();
        if dist == 0.0 {
            continue;
        }
        let force = ForceLaw::Attraction { strength: link.strength }.magnitude(dist, constants);
        let (fx, fy) = (force * delta.x / dist, force * delta.y / dist);
        apply_force(&mut nodes[a], fx, fy, constants);
        apply_force(&mut nodes[b], -fx, -fy, constants);
        applied += 1;
    }
    applied
}

/// Keeps linked endpoints from closing past the point where their discs touch.
///
/// Runs on damped velocities, right before positions advance. For every resolvable
/// link, the part of the endpoints' approach speed that would bring them closer
/// than `radius_a + radius_b` within this tick is removed, split evenly between the
/// two. Endpoints already overlapping may separate but not close further. Returns
/// the number of links that had to be limited.
pub fn limit_link_closing(
    nodes: &mut [OrbitalNode],
    links: &[Link],
    index: &HashMap<String, usize>,
    constants: &OrbitalConstants,
) -> usize {
    let mut limited = 0;
    for link in links {
        let (Some(&a), Some(&b)) = (index.get(&link.source_id), index.get(&link.target_id)) else {
            continue;
        };
        if a == b {
            continue;
        }
        let delta = Vector2::between(nodes[a].to_coord(), nodes[b].to_coord());
        let dist = delta.length();
        if dist == 0.0 {
            continue;
        }
        let (nx, ny) = (delta.x / dist, delta.y / dist);
        let closing = ((nodes[a].vx - nodes[b].vx) * nx + (nodes[a].vy - nodes[b].vy) * ny) * constants.time_step;
        let allowed = (dist - nodes[a].radius - nodes[b].radius).max(0.0);
        if closing <= allowed {
            continue;
        }
        let excess = (closing - allowed) / (2.0 * constants.time_step);
        nodes[a].vx -= nx * excess;
        nodes[a].vy -= ny * excess;
        nodes[b].vx += nx * excess;
        nodes[b].vy += ny * excess;
        limited += 1;
    }
    limited
}

/// Pulls every node toward the center of `space`, proportionally to its mass and
/// its distance from the center.
pub fn apply_center_gravity(nodes: &mut [OrbitalNode], space: &SimulationSpace, constants: &OrbitalConstants) {
    let (cx, cy) = space.center();
    nodes.par_iter_mut().for_each(|node| {
        let delta = Vector2::between(node.to_coord(), (cx, cy));
        let dist = delta.length();
        if dist == 0.0 {
            return;
        }
        let force = ForceLaw::CenterGravity { mass: node.mass }.magnitude(dist, constants);
        let (fx, fy) = (force * delta.x / dist, force * delta.y / dist);
        apply_force(node, fx, fy, constants);
    });
}
