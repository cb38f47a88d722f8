// src/utils/constants_config.rs
use crate::utils::{
    DEFAULT_ORBITAL_CONSTANTS,
    errors::OrbitalError
};

/// How an accumulated force turns into a velocity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InertiaModel {
    /// Force is applied to velocity directly; mass only scales the forces a node exerts.
    #[default]
    MassIndependent,
    /// Force is divided by the node's own mass (F = ma).
    Newtonian,
}

/// Strategy used for the all-pairs repulsion term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepulsionMode {
    /// Every pair is visited, equal and opposite updates.
    #[default]
    Exact,
    /// Quadtree rebuilt every tick, distant cells approximated by their centroid.
    BarnesHut,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalConstants {
    pub repulsion_strength: f64,
    pub attraction_strength: f64,
    pub damping: f64,
    pub gravity: f64,
    pub time_step: f64,
    /// Barnes–Hut opening angle.
    pub theta: f64,
    pub distance_floor: f64,
    /// Upper bound on a node's speed after damping.
    pub max_speed: f64,
    pub radius_scale: f64,
    pub inertia: InertiaModel,
}

impl Default for OrbitalConstants {
    fn default() -> Self {
        DEFAULT_ORBITAL_CONSTANTS
    }
}

impl OrbitalConstants {
    /// Builds a set of constants, falling back to the defaults for every `None`.
    ///
    /// # Example
    /// ```
    /// use stardust_orbital::utils::OrbitalConstants;
    ///
    /// let constants = OrbitalConstants::new(Some(250.0), None, Some(0.8), None);
    /// assert_eq!(constants.repulsion_strength, 250.0);
    /// assert_eq!(constants.attraction_strength, 5.0);
    /// assert_eq!(constants.damping, 0.8);
    /// ```
    pub fn new(
        repulsion_strength: Option<f64>,
        attraction_strength: Option<f64>,
        damping: Option<f64>,
        gravity: Option<f64>,
    ) -> Self {
        let default = DEFAULT_ORBITAL_CONSTANTS;
        Self {
            repulsion_strength: repulsion_strength.unwrap_or(default.repulsion_strength),
            attraction_strength: attraction_strength.unwrap_or(default.attraction_strength),
            damping: damping.unwrap_or(default.damping),
            gravity: gravity.unwrap_or(default.gravity),
            ..default
        }
    }

    pub fn with_theta(mut self, theta: f64) -> Self {
        self.theta = theta;
        self
    }

    pub fn with_time_step(mut self, time_step: f64) -> Self {
        self.time_step = time_step;
        self
    }

    pub fn with_inertia(mut self, inertia: InertiaModel) -> Self {
        self.inertia = inertia;
        self
    }

    /// Rejects constants the integrator cannot run with.
    pub fn validate(&self) -> Result<(), OrbitalError> {
        let finite = [
            self.repulsion_strength,
            self.attraction_strength,
            self.damping,
            self.gravity,
            self.time_step,
            self.theta,
            self.distance_floor,
            self.max_speed,
            self.radius_scale,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(OrbitalError::InvalidParameter("constants must be finite".to_string()));
        }
        if self.repulsion_strength < 0.0 || self.attraction_strength < 0.0 || self.gravity < 0.0 {
            return Err(OrbitalError::InvalidParameter("force strengths must be non-negative".to_string()));
        }
        if self.damping <= 0.0 || self.damping > 1.0 {
            return Err(OrbitalError::InvalidParameter(format!("damping {} outside (0, 1]", self.damping)));
        }
        if self.time_step <= 0.0 { return Err(OrbitalError::InvalidParameter("time_step must be positive".to_string())); }
        if self.theta < 0.0 { return Err(OrbitalError::InvalidParameter("theta must be non-negative".to_string())); }
        if self.distance_floor <= 0.0 { return Err(OrbitalError::InvalidParameter("distance_floor must be positive".to_string())); }
        if self.max_speed <= 0.0 { return Err(OrbitalError::InvalidParameter("max_speed must be positive".to_string())); }
        Ok(())
    }

    /// Velocity change produced by `force` over one time step for a node of `mass`.
    pub fn velocity_delta(&self, force: f64, mass: f64) -> f64 {
        match self.inertia {
            InertiaModel::MassIndependent => force * self.time_step,
            InertiaModel::Newtonian => force / mass * self.time_step,
        }
    }

    /// Visual radius of a node of the given mass.
    pub fn radius_for(&self, mass: f64) -> f64 {
        mass.sqrt() * self.radius_scale
    }
}
