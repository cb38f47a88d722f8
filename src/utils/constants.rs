use crate::utils::{InertiaModel, OrbitalConstants};

/// Mass contributed by every link touching a note.
pub const LINK_WEIGHT: f64 = 1.5;
/// Mass contributed by every recorded access of a note.
pub const ACCESS_WEIGHT: f64 = 0.5;
/// Time constant of the exponential access decay, one week.
pub const HALF_LIFE_HOURS: f64 = 168.0;
/// Lower bound for every node mass.
pub const MIN_MASS: f64 = 0.1;
/// Edges at or above this strength count as "strong" when clustering.
pub const DEFAULT_CLUSTER_THRESHOLD: f64 = 0.7;
/// Nodes below this mass are peripheral under the absolute policy.
///
/// Equal to `MIN_MASS`, and the comparison is strict, so on a live engine the
/// default flags nothing: every mass is floored at `MIN_MASS`. Hosts that want
/// a useful answer pick a higher threshold or `PeripheralPolicy::Percentile`.
pub const DEFAULT_PERIPHERAL_THRESHOLD: f64 = 0.1;
/// Number of bridge candidates returned by default.
pub const DEFAULT_BRIDGE_COUNT: usize = 5;

pub const MS_PER_HOUR: f64 = 3_600_000.0;

/// Placement seed of a freshly built engine.
pub const DEFAULT_SEED: u64 = 0x5eed;

pub const DEFAULT_ORBITAL_CONSTANTS: OrbitalConstants = OrbitalConstants {
    repulsion_strength: 1000.0,
    attraction_strength: 5.0,
    damping: 0.9,
    gravity: 0.0005,
    time_step: 1.0,
    theta: 0.5,
    distance_floor: 0.01,
    max_speed: 50.0,
    radius_scale: 4.0,
    inertia: InertiaModel::MassIndependent,
};
