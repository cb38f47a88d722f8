//! Orbital force-directed layout for a notes graph.
//!
//! Notes become particles whose mass grows with their links and recent use;
//! repulsion, link attraction and a weak pull toward the center settle them into
//! a readable 2D layout. The engine can be driven in-thread ([`engine`]) or on a
//! background thread that streams positions over a message protocol ([`worker`]).
pub mod utils;
pub mod models;
pub mod mass;
pub mod forces;
pub mod spatial;
pub mod integrator;
pub mod analysis;
pub mod protocol;
pub mod engine;
#[cfg(feature = "worker")]
pub mod worker;

/// ### General helper function
/// - Asserts that two floating point numbers are approximately equal.
///
/// ### Arguments
///
/// * `a` - The first floating point number.
/// * `b` - The second floating point number.
/// * `epsilon` - The maximum difference between `a` and `b` for them to be considered equal.
/// * `optional_message` - An optional message to display if the assertion fails.
///
pub fn assert_float_eq(a: f64, b: f64, epsilon: f64, optional_message: Option<&str>) {
    match optional_message {
        Some(message) => assert!((a - b).abs() < epsilon, "a: {:?},\nb: {:?},\nepsilon: {:?},\n message: {:?}", a, b, epsilon, message),
        None => assert!((a - b).abs() < epsilon, "Expected {} to be approximately equal to {} (epsilon: {})", a, b, epsilon),
    }
}
