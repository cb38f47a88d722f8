use serde::{Deserialize, Serialize};

use crate::models::ToCoordinates;
use crate::utils::{DEFAULT_ORBITAL_CONSTANTS, MIN_MASS};

pub type NodeId = String;

/// A simulated particle standing in for one note.
///
/// `mass` and `radius` are derived; hosts change them through seeds and patches,
/// never by writing the fields of a live engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrbitalNode {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub mass: f64,
    pub radius: f64,
    pub links_count: u32,
    pub access_count: u32,
    /// Epoch milliseconds of the last access.
    pub last_accessed: i64,
    /// Host-supplied mass that overrides the link/access derivation.
    #[serde(skip)]
    pub(crate) pinned_mass: Option<f64>,
    /// Set when the host supplied `links_count` instead of letting the edge set decide.
    #[serde(skip)]
    pub(crate) pinned_links: bool,
}

impl OrbitalNode {
    /// Creates a resting node. The mass is floored at `MIN_MASS`.
    ///
    /// # Examples
    ///
    /// ```
    /// use stardust_orbital::models::OrbitalNode;
    ///
    /// let node = OrbitalNode::new("a", 10.0, 20.0, 0.0);
    /// assert_eq!(node.mass, 0.1);
    /// assert_eq!((node.vx, node.vy), (0.0, 0.0));
    /// ```
    pub fn new(id: impl Into<NodeId>, x: f64, y: f64, mass: f64) -> Self {
        let mass = mass.max(MIN_MASS);
        OrbitalNode {
            id: id.into(),
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            mass,
            radius: DEFAULT_ORBITAL_CONSTANTS.radius_for(mass),
            links_count: 0,
            access_count: 0,
            last_accessed: 0,
            pinned_mass: None,
            pinned_links: false,
        }
    }

    pub fn speed_squared(&self) -> f64 {
        self.vx * self.vx + self.vy * self.vy
    }

    pub fn position(&self) -> Position {
        Position { id: self.id.clone(), x: self.x, y: self.y }
    }
}

impl ToCoordinates<(f64, f64)> for OrbitalNode {
    fn to_coord(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

/// Inbound description of a node, used both for the initial load and for patches.
///
/// Every field except `id` is optional. On a new node, missing coordinates are
/// randomized inside the space; on an existing node, missing fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSeed {
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_accessed: Option<i64>,
}

pub type NodePatch = NodeSeed;

impl NodeSeed {
    pub fn new(id: impl Into<NodeId>) -> Self {
        NodeSeed { id: id.into(), ..Default::default() }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = Some(mass);
        self
    }

    pub fn with_usage(mut self, access_count: u32, last_accessed: i64) -> Self {
        self.access_count = Some(access_count);
        self.last_accessed = Some(last_accessed);
        self
    }

    pub fn with_links(mut self, links_count: u32) -> Self {
        self.links_count = Some(links_count);
        self
    }
}

/// Position snapshot handed to the rendering boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
}
