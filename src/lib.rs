//! # Microbe - Bacteria Arcade Simulation
//!
//! The player steers a bacterium through a petri dish, eats nutrients to grow,
//! splits off autonomous children and dodges immune cells. Children forage on
//! their own, group into colonies for protection and share what they eat.
//!
//! ## Features
//!
//! - Three bacterium kinds with distinct speed, size, growth and visibility
//! - Enzyme-gated nutrients
//! - Hunting, engulfing and tagging immune cells with chase ramps
//! - Proximity colonies with damage protection and resource sharing
//! - Deterministic runs from a seed
//! - Real-time visualization with egui/macroquad
//!
//! ## Core Modules
//!
//! - [`simulation::game`] - Simulation driver and external interface
//! - [`simulation::steering`] - Foraging, fleeing, chasing and wandering
//! - [`simulation::collision`] - Feeding, splitting and immune contact
//! - [`simulation::colony`] - Colony records and the colony manager
//! - [`simulation::spawner`] - Nutrient and immune cell introduction
//! - [`simulation::spatial`] - Distance, collision and range queries

/// Core simulation logic and data structures.
pub mod simulation {
    /// Immune cells that hunt friendly cells.
    pub mod agent;
    /// Friendly cells: the player and its children.
    pub mod cell;
    /// Collision and consumption resolver.
    pub mod collision;
    /// Colonies and the colony manager pass.
    pub mod colony;
    /// Configuration errors.
    pub mod error;
    /// Human-readable log of recent gameplay events.
    pub mod event_log;
    /// Per-tick event queue.
    pub mod events;
    /// Simulation driver.
    pub mod game;
    /// Kind tags and per-kind configuration records.
    pub mod kinds;
    /// Trait for entities with a position and a radius.
    ///
    /// The [`locatable::Locatable`] trait is implemented by every entity in the
    /// dish (Cell, Nutrient, Agent).
    pub mod locatable;
    /// Nutrients.
    pub mod nutrient;
    /// Simulation parameters.
    pub mod params;
    /// Render snapshots.
    pub mod snapshot;
    /// Spatial queries.
    pub mod spatial;
    /// Stochastic spawning.
    pub mod spawner;
    /// Run statistics.
    pub mod stats;
    /// Movement and steering pass.
    pub mod steering;
    /// Entity storage.
    pub mod world;
}
