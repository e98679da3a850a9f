//! Trait for entities that occupy a circle in the dish.
//!
//! Cells, nutrients and immune cells all implement it, which lets the spatial
//! helpers and the collision resolver treat them uniformly.

use ndarray::Array1;

/// Trait for entities with a position, a radius and a lifecycle.
///
/// Any type that implements this trait:
/// - Has a position in 2D space
/// - Has a collision radius
/// - Can be deactivated, after which the driver drops it at the end of the tick
pub trait Locatable {
    /// Returns a reference to the entity's position.
    fn pos(&self) -> &Array1<f32>;

    /// Returns a mutable reference to the entity's position.
    fn pos_mut(&mut self) -> &mut Array1<f32>;

    /// Collision radius.
    fn radius(&self) -> f32;

    /// Whether the entity still takes part in the simulation.
    fn is_alive(&self) -> bool;

    /// Marks the entity for removal.
    fn deactivate(&mut self);
}
