use serde::{Deserialize, Serialize};

use crate::models::NodeId;

/// Weighted relation between two notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub source_id: NodeId,
    pub target_id: NodeId,
    /// In `[0, 1]`; scales attraction and decides strong vs weak connectivity.
    #[serde(default = "default_strength")]
    pub strength: f64,
}

fn default_strength() -> f64 {
    1.0
}

impl Link {
    /// Creates a link, clamping `strength` into `[0, 1]`. NaN becomes 0.
    ///
    /// # Example
    /// ```
    /// use stardust_orbital::models::Link;
    ///
    /// let link = Link::new("a", "b", 1.7);
    /// assert_eq!(link.strength, 1.0);
    /// ```
    pub fn new(source_id: impl Into<NodeId>, target_id: impl Into<NodeId>, strength: f64) -> Self {
        Link {
            source_id: source_id.into(),
            target_id: target_id.into(),
            strength: clamp_strength(strength),
        }
    }

    pub fn touches(&self, id: &str) -> bool {
        self.source_id == id || self.target_id == id
    }

    /// The endpoint opposite to `id`, if `id` is an endpoint.
    pub fn other_end(&self, id: &str) -> Option<&str> {
        if self.source_id == id {
            Some(&self.target_id)
        } else if self.target_id == id {
            Some(&self.source_id)
        } else {
            None
        }
    }

    /// True when both links join the same pair of notes, in either direction.
    pub fn same_pair(&self, other: &Link) -> bool {
        (self.source_id == other.source_id && self.target_id == other.target_id)
            || (self.source_id == other.target_id && self.target_id == other.source_id)
    }

    pub(crate) fn normalized(mut self) -> Self {
        self.strength = clamp_strength(self.strength);
        self
    }
}

fn clamp_strength(strength: f64) -> f64 {
    if strength.is_nan() { 0.0 } else { strength.clamp(0.0, 1.0) }
}
