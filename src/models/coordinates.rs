pub trait ToCoordinates <T> {
    /// Converts the struct to a tuple of coordinates.
    fn to_coord(&self) -> T;
}

/// Plain 2D vector used for displacements and force accumulation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Vector from `from` to `to`.
    ///
    /// # Example
    /// ```
    /// use stardust_orbital::models::Vector2;
    ///
    /// let v = Vector2::between((1.0, 2.0), (4.0, 6.0));
    /// assert_eq!(v, Vector2::new(3.0, 4.0));
    /// assert_eq!(v.length(), 5.0);
    /// ```
    pub fn between(from: (f64, f64), to: (f64, f64)) -> Self {
        Self { x: to.0 - from.0, y: to.1 - from.1 }
    }
}
