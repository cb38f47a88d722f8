//! Gravitational mass of a note, derived from how connected and how recently used it is.
//!
//! `mass = links * LINK_WEIGHT + accesses * ACCESS_WEIGHT`, decayed by
//! `exp(-hours_since_access / HALF_LIFE_HOURS)` and floored at `MIN_MASS`.
//! The decay is evaluated when the node set is loaded or refreshed, not per tick.
use std::collections::HashMap;

use rayon::prelude::*;

use crate::models::{Link, OrbitalNode};
use crate::utils::{OrbitalConstants, ACCESS_WEIGHT, HALF_LIFE_HOURS, LINK_WEIGHT, MIN_MASS, MS_PER_HOUR};

/// Computes the decayed, floored mass for a note.
///
/// A missing `last_accessed` counts as "accessed now" and a timestamp in the
/// future is treated the same way.
///
/// # Examples
///
/// ```
/// use stardust_orbital::mass::compute_mass;
///
/// let now = 1_700_000_000_000;
/// // Fresh note: 2 links and 4 accesses.
/// assert_eq!(compute_mass(2, 4, Some(now), now), 5.0);
/// // Unlinked, never used notes sit on the floor.
/// assert_eq!(compute_mass(0, 0, None, now), 0.1);
/// ```
pub fn compute_mass(links_count: u32, access_count: u32, last_accessed: Option<i64>, now_ms: i64) -> f64 {
    let raw = links_count as f64 * LINK_WEIGHT + access_count as f64 * ACCESS_WEIGHT;
    let decayed = raw * decay_factor(last_accessed.unwrap_or(now_ms), now_ms);
    if decayed.is_nan() {
        return MIN_MASS;
    }
    decayed.max(MIN_MASS)
}

/// `exp(-hours / HALF_LIFE_HOURS)` for the time elapsed since `last_accessed`.
pub fn decay_factor(last_accessed: i64, now_ms: i64) -> f64 {
    let hours = (now_ms.saturating_sub(last_accessed) as f64 / MS_PER_HOUR).max(0.0);
    (-hours / HALF_LIFE_HOURS).exp()
}

/// Re-derives mass and radius for every node.
///
/// Nodes with a host-pinned mass keep it (still floored); the rest use `compute_mass`.
pub fn apply_mass_pass(nodes: &mut [OrbitalNode], constants: &OrbitalConstants, now_ms: i64) {
    nodes.par_iter_mut().for_each(|node| {
        let mass = match node.pinned_mass {
            Some(pinned) if pinned.is_finite() => pinned.max(MIN_MASS),
            Some(_) => MIN_MASS,
            None => compute_mass(node.links_count, node.access_count, Some(node.last_accessed), now_ms),
        };
        node.mass = mass;
        node.radius = constants.radius_for(mass);
    });
}

/// Refreshes `links_count` from the edge set for nodes whose count was not supplied.
///
/// Only links whose endpoints both exist are counted; a self-link counts once.
pub fn refresh_link_counts(nodes: &mut [OrbitalNode], links: &[Link], index: &HashMap<String, usize>) {
    let mut counts = vec![0u32; nodes.len()];
    for link in links {
        let (Some(&a), Some(&b)) = (index.get(&link.source_id), index.get(&link.target_id)) else {
            continue;
        };
        counts[a] += 1;
        if b != a {
            counts[b] += 1;
        }
    }
    for (node, count) in nodes.iter_mut().zip(counts) {
        if !node.pinned_links {
            node.links_count = count;
        }
    }
}
