use crate::utils::OrbitalError;

/// The rectangle `[0, width] x [0, height]` every node is kept inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationSpace {
    pub width: f64,
    pub height: f64,
}

impl SimulationSpace {
    /// # Errors
    ///
    /// Returns `InvalidDimensions` unless both sides are finite and positive.
    ///
    /// # Example
    /// ```
    /// use stardust_orbital::models::SimulationSpace;
    ///
    /// let space = SimulationSpace::new(200.0, 100.0).expect("valid space");
    /// assert_eq!(space.center(), (100.0, 50.0));
    /// assert!(SimulationSpace::new(0.0, 100.0).is_err());
    /// ```
    pub fn new(width: f64, height: f64) -> Result<Self, OrbitalError> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(OrbitalError::InvalidDimensions { width, height });
        }
        Ok(SimulationSpace { width, height })
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        (0.0..=self.width).contains(&x) && (0.0..=self.height).contains(&y)
    }

    /// Clamps a point into the space. NaN coordinates collapse onto the center line.
    pub fn clamp(&self, x: f64, y: f64) -> (f64, f64) {
        let (cx, cy) = self.center();
        let x = if x.is_nan() { cx } else { x.clamp(0.0, self.width) };
        let y = if y.is_nan() { cy } else { y.clamp(0.0, self.height) };
        (x, y)
    }
}
