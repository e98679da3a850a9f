//! Nutrients that friendly cells consume for energy and growth.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::kinds::{NutrientKind, NutrientKindConfig};
use super::locatable::Locatable;

slotmap::new_key_type! {
    /// Generational key of a nutrient.
    pub struct NutrientId;
}

/// A nutrient particle.
///
/// Nutrients are immutable once created except for their consumed flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nutrient {
    /// Nutrient kind.
    pub kind: NutrientKind,
    /// Position in 2D space.
    pub pos: Array1<f32>,
    /// Collision radius.
    pub radius: f32,
    /// Energy granted to the eater and added to the score.
    pub energy_value: f32,
    /// Growth granted to the eater.
    pub growth_value: f32,
    /// Whether the eater needs the matching enzyme.
    pub requires_enzyme: bool,
    consumed: bool,
}

impl Nutrient {
    /// Creates a nutrient of the given kind at `pos`.
    pub fn new(cfg: &NutrientKindConfig, pos: Array1<f32>) -> Self {
        Self {
            kind: cfg.kind,
            pos,
            radius: cfg.radius,
            energy_value: cfg.energy_value,
            growth_value: cfg.growth_value,
            requires_enzyme: cfg.requires_enzyme,
            consumed: false,
        }
    }

    /// `true` once the nutrient has been eaten or removed.
    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Marks the nutrient as eaten.
    pub fn consume(&mut self) {
        self.consumed = true;
    }
}

impl Locatable for Nutrient {
    fn pos(&self) -> &Array1<f32> {
        &self.pos
    }

    fn pos_mut(&mut self) -> &mut Array1<f32> {
        &mut self.pos
    }

    fn radius(&self) -> f32 {
        self.radius
    }

    fn is_alive(&self) -> bool {
        !self.consumed
    }

    fn deactivate(&mut self) {
        self.consume();
    }
}
