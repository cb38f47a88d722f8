//! Barnes–Hut quadtree for approximate O(n log n) repulsion.
//!
//! The tree is a snapshot of node positions: it has to be rebuilt every tick,
//! a tree built before positions moved yields wrong forces.
use log::trace;
use rayon::prelude::*;

use crate::forces::{apply_force, repulsion_from_mass, repulsion_on, Body};
use crate::models::OrbitalNode;
use crate::utils::OrbitalConstants;

/// Depth past which coincident or nearly coincident bodies share one leaf.
const MAX_DEPTH: usize = 48;

/// Padding added around the bodies' bounding box when sizing the root cell.
const ROOT_PADDING: f64 = 1.0;

/// Represents a square region in 2D space.
///
/// # Examples
///
/// ```
/// use stardust_orbital::spatial::Quad;
///
/// let quad = Quad { cx: 0.0, cy: 0.0, half_size: 1.0 };
/// assert!(quad.contains(0.5, 0.5));
/// assert!(!quad.contains(1.5, 0.5));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad {
    pub cx: f64,        // center x-coordinate
    pub cy: f64,        // center y-coordinate
    pub half_size: f64, // half the length of one side
}

impl Quad {
    /// Returns true if the point (x, y) is inside this quad.
    ///
    /// Lower bounds are inclusive and upper bounds exclusive.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.cx - self.half_size &&
            x <  self.cx + self.half_size &&
            y >= self.cy - self.half_size &&
            y <  self.cy + self.half_size
    }

    /// Side length of the cell.
    pub fn width(&self) -> f64 {
        self.half_size * 2.0
    }

    /// Subdivides the quad into four smaller quads (NW, NE, SW, SE).
    pub fn subdivide(&self) -> [Quad; 4] {
        let hs = self.half_size / 2.0;
        [
            Quad { cx: self.cx - hs, cy: self.cy + hs, half_size: hs }, // NW
            Quad { cx: self.cx + hs, cy: self.cy + hs, half_size: hs }, // NE
            Quad { cx: self.cx - hs, cy: self.cy - hs, half_size: hs }, // SW
            Quad { cx: self.cx + hs, cy: self.cy - hs, half_size: hs }, // SE
        ]
    }

    /// Index of the child quadrant a point falls in, matching `subdivide`'s order.
    pub fn quadrant_of(&self, x: f64, y: f64) -> usize {
        let is_east = x >= self.cx;
        let is_north = y >= self.cy;
        match (is_north, is_east) {
            (true, false) => 0,  // NW
            (true, true) => 1,   // NE
            (false, false) => 2, // SW
            (false, true) => 3,  // SE
        }
    }

    /// Smallest padded square enclosing every body.
    ///
    /// # Example
    /// ```
    /// use stardust_orbital::forces::Body;
    /// use stardust_orbital::spatial::Quad;
    ///
    /// let bodies = [
    ///     Body { index: 0, x: 0.0, y: 0.0, mass: 1.0 },
    ///     Body { index: 1, x: 100.0, y: 40.0, mass: 1.0 },
    /// ];
    /// let quad = Quad::bounding(&bodies);
    /// assert!(bodies.iter().all(|b| quad.contains(b.x, b.y)));
    /// ```
    pub fn bounding(bodies: &[Body]) -> Quad {
        if bodies.is_empty() {
            return Quad { cx: 0.0, cy: 0.0, half_size: ROOT_PADDING };
        }
        let (mut min_x, mut min_y) = (f64::MAX, f64::MAX);
        let (mut max_x, mut max_y) = (f64::MIN, f64::MIN);
        for b in bodies {
            min_x = min_x.min(b.x);
            min_y = min_y.min(b.y);
            max_x = max_x.max(b.x);
            max_y = max_y.max(b.y);
        }
        let half_size = (max_x - min_x).max(max_y - min_y) / 2.0 + ROOT_PADDING;
        Quad {
            cx: (min_x + max_x) / 2.0,
            cy: (min_y + max_y) / 2.0,
            half_size,
        }
    }
}

/// Barnes–Hut tree node.
///
/// - `Empty`: a region with no bodies
/// - `Leaf`: a region holding one body, or several bodies that share a position
///   once the depth limit is reached
/// - `Internal`: aggregated mass and center of mass plus four children (NW, NE, SW, SE)
#[derive(Debug, Clone)]
pub enum BarnesHutNode {
    Empty(Quad),
    Leaf(Quad, Vec<Body>),
    Internal {
        quad: Quad,
        mass: f64,
        com: (f64, f64),
        count: usize,
        children: [Box<BarnesHutNode>; 4],
    },
}

impl BarnesHutNode {
    pub fn new(quad: Quad) -> Self {
        BarnesHutNode::Empty(quad)
    }

    /// Total mass and center of mass of everything below this node.
    pub fn mass_com(&self) -> Option<(f64, f64, f64)> {
        match self {
            BarnesHutNode::Empty(_) => None,
            BarnesHutNode::Leaf(_, bodies) => {
                let mass: f64 = bodies.iter().map(|b| b.mass).sum();
                if mass <= 0.0 {
                    return None;
                }
                let x = bodies.iter().map(|b| b.x * b.mass).sum::<f64>() / mass;
                let y = bodies.iter().map(|b| b.y * b.mass).sum::<f64>() / mass;
                Some((mass, x, y))
            }
            BarnesHutNode::Internal { mass, com, .. } => Some((*mass, com.0, com.1)),
        }
    }

    pub fn count(&self) -> usize {
        match self {
            BarnesHutNode::Empty(_) => 0,
            BarnesHutNode::Leaf(_, bodies) => bodies.len(),
            BarnesHutNode::Internal { count, .. } => *count,
        }
    }

    /// Inserts a body, splitting leaves until bodies sit in separate cells.
    pub fn insert(&mut self, body: Body) {
        self.insert_at(body, 0);
    }

    fn insert_at(&mut self, body: Body, depth: usize) {
        match self {
            BarnesHutNode::Empty(quad) => {
                *self = BarnesHutNode::Leaf(*quad, vec![body]);
            }
            BarnesHutNode::Leaf(quad, bodies) => {
                let coincident = bodies.iter().all(|b| b.x == body.x && b.y == body.y);
                if depth >= MAX_DEPTH || coincident {
                    bodies.push(body);
                    return;
                }
                let [nw, ne, sw, se] = quad.subdivide();
                let existing = std::mem::take(bodies);
                let mut internal = BarnesHutNode::Internal {
                    quad: *quad,
                    mass: 0.0,
                    com: (0.0, 0.0),
                    count: 0,
                    children: [
                        Box::new(BarnesHutNode::Empty(nw)),
                        Box::new(BarnesHutNode::Empty(ne)),
                        Box::new(BarnesHutNode::Empty(sw)),
                        Box::new(BarnesHutNode::Empty(se)),
                    ],
                };
                for b in existing {
                    internal.insert_at(b, depth);
                }
                internal.insert_at(body, depth);
                *self = internal;
            }
            BarnesHutNode::Internal { quad, mass, com, count, children } => {
                let total_mass = *mass + body.mass;
                if total_mass > 0.0 {
                    com.0 = (com.0 * *mass + body.x * body.mass) / total_mass;
                    com.1 = (com.1 * *mass + body.y * body.mass) / total_mass;
                }
                *mass = total_mass;
                *count += 1;
                let child_index = quad.quadrant_of(body.x, body.y);
                children[child_index].insert_at(body, depth + 1);
            }
        }
    }

    /// Net repulsive force on `target` from every body below this node.
    ///
    /// A cell is treated as a single point mass once `width / distance < theta`
    /// and the cell does not contain `target`. With `theta == 0` every leaf is
    /// visited and the result equals the exact pairwise sum.
    pub fn compute_force(&self, target: &Body, theta: f64, constants: &OrbitalConstants) -> (f64, f64) {
        match self {
            BarnesHutNode::Empty(_) => (0.0, 0.0),
            BarnesHutNode::Leaf(_, bodies) => {
                bodies.iter()
                    .filter(|b| b.index != target.index)
                    .map(|b| repulsion_on(target, b, constants))
                    .fold((0.0, 0.0), |acc, f| (acc.0 + f.0, acc.1 + f.1))
            }
            BarnesHutNode::Internal { quad, mass, com, children, .. } => {
                let dx = com.0 - target.x;
                let dy = com.1 - target.y;
                let dist = (dx * dx + dy * dy).sqrt();
                if dist > 0.0 && !quad.contains(target.x, target.y) && quad.width() / dist < theta {
                    return repulsion_from_mass(target, com.0, com.1, *mass, constants);
                }
                children.iter()
                    .map(|child| child.compute_force(target, theta, constants))
                    .fold((0.0, 0.0), |acc, f| (acc.0 + f.0, acc.1 + f.1))
            }
        }
    }
}

/// Constructs a Barnes–Hut tree from a slice of bodies.
///
/// # Examples
///
/// ```
/// use stardust_orbital::forces::Body;
/// use stardust_orbital::spatial::{build_tree, Quad};
///
/// let bodies = vec![
///     Body { index: 0, x: 0.1, y: 0.1, mass: 1.0 },
///     Body { index: 1, x: -0.5, y: 0.5, mass: 2.0 },
/// ];
/// let tree = build_tree(&bodies, Quad { cx: 0.0, cy: 0.0, half_size: 1.0 });
/// assert_eq!(tree.count(), 2);
/// ```
pub fn build_tree(bodies: &[Body], bounds: Quad) -> BarnesHutNode {
    let mut root = BarnesHutNode::new(bounds);
    for &body in bodies {
        root.insert(body);
    }
    root
}

/// Quadtree over one tick's node positions.
pub struct BarnesHutTree {
    root: BarnesHutNode,
    theta: f64,
}

impl BarnesHutTree {
    pub fn build(bodies: &[Body], theta: f64) -> Self {
        let bounds = Quad::bounding(bodies);
        BarnesHutTree { root: build_tree(bodies, bounds), theta }
    }

    pub fn from_nodes(nodes: &[OrbitalNode], theta: f64) -> Self {
        let bodies: Vec<Body> = nodes.iter().enumerate().map(|(i, n)| Body::of(i, n)).collect();
        Self::build(&bodies, theta)
    }

    pub fn root(&self) -> &BarnesHutNode {
        &self.root
    }

    pub fn total_mass(&self) -> f64 {
        self.root.mass_com().map(|(m, _, _)| m).unwrap_or(0.0)
    }

    pub fn compute_force(&self, target: &Body, constants: &OrbitalConstants) -> (f64, f64) {
        self.root.compute_force(target, self.theta, constants)
    }
}

/// Approximate repulsion for every node, using a tree rebuilt from the current positions.
pub fn apply_barnes_hut_repulsion(nodes: &mut [OrbitalNode], constants: &OrbitalConstants) {
    if nodes.len() < 2 {
        return;
    }
    let tree = BarnesHutTree::from_nodes(nodes, constants.theta);
    trace!("Built quadtree over {} bodies (mass {:.3})", tree.root().count(), tree.total_mass());

    let forces: Vec<(f64, f64)> = nodes.par_iter()
        .enumerate()
        .map(|(i, node)| tree.compute_force(&Body::of(i, node), constants))
        .collect();

    for (node, (fx, fy)) in nodes.iter_mut().zip(forces) {
        apply_force(node, fx, fy, constants);
    }
}
