/// Neural network layer primitives
///
/// The feature MLP is built from fully connected layers only.

pub mod dense;

pub use dense::{Activation, Dense};
