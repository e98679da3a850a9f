//! Friendly cells: the player's bacterium and the children it splits off.

use std::collections::HashSet;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::colony::ColonyId;
use super::kinds::{CellKind, CellKindConfig, NutrientKind};
use super::locatable::Locatable;
use super::nutrient::{Nutrient, NutrientId};
use super::params::Params;
use super::spatial;

slotmap::new_key_type! {
    /// Generational key of a friendly cell.
    pub struct CellId;
}

/// Whether a cell is steered by the player or by its own foraging logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellRole {
    /// The root cell. Losing it ends the run.
    Player,
    /// An autonomous cell produced by a split.
    Child,
}

/// A friendly bacterium.
///
/// Cells can:
/// - Move along a unit heading at their own speed
/// - Eat nutrients to gain energy and grow
/// - Split once large enough
/// - Join a colony (by id, never by ownership)
/// - Be tagged by antibodies, which makes them easier to spot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    /// Bacterium kind.
    pub kind: CellKind,
    /// Player or child.
    pub role: CellRole,
    /// Position in 2D space.
    pub pos: Array1<f32>,
    /// Collision radius.
    pub size: f32,
    /// Unit heading, or zero until a heading was first chosen.
    pub dir: Array1<f32>,
    /// Distance per frame.
    pub speed: f32,
    /// Multiplier on every growth event.
    pub growth_rate: f32,
    /// Current energy (deactivates when it reaches 0).
    pub energy: f32,
    /// Visibility without tag boost.
    pub base_visibility: f32,
    /// Visibility as seen by immune cells.
    pub visibility: f32,
    /// Whether an antibody marked this cell.
    pub tagged: bool,
    /// Frames left until the tag wears off.
    pub tag_remaining: f32,
    /// Nutrient kinds this cell can digest even when gated.
    pub enzymes: HashSet<NutrientKind>,
    /// Colony this cell currently belongs to.
    pub colony: Option<ColonyId>,
    /// Frames left before a wandering cell picks a new heading.
    pub wander_timer: f32,
    /// Nutrient the cell is currently foraging for.
    pub target: Option<NutrientId>,
    active: bool,
}

impl Cell {
    /// Creates the player's cell from its kind record.
    pub fn new_player(cfg: &CellKindConfig, pos: Array1<f32>, energy: f32) -> Self {
        Self {
            kind: cfg.kind,
            role: CellRole::Player,
            pos,
            size: cfg.size,
            dir: Array1::zeros(2),
            speed: cfg.speed,
            growth_rate: cfg.growth_rate,
            energy,
            base_visibility: cfg.visibility,
            visibility: cfg.visibility,
            tagged: false,
            tag_remaining: 0.0,
            enzymes: cfg.enzymes.iter().copied().collect(),
            colony: None,
            wander_timer: 0.0,
            target: None,
            active: true,
        }
    }

    /// Creates a child split off `parent`, heading away from it at `angle`.
    ///
    /// The child inherits kind, speed, growth rate, base visibility and
    /// enzymes, but not the parent's tag or colony.
    pub fn new_child(parent: &Cell, pos: Array1<f32>, angle: f32, size: f32, energy: f32) -> Self {
        Self {
            kind: parent.kind,
            role: CellRole::Child,
            pos,
            size,
            dir: Array1::from_vec(vec![angle.cos(), angle.sin()]),
            speed: parent.speed,
            growth_rate: parent.growth_rate,
            energy,
            base_visibility: parent.base_visibility,
            visibility: parent.base_visibility,
            tagged: false,
            tag_remaining: 0.0,
            enzymes: parent.enzymes.clone(),
            colony: None,
            wander_timer: 0.0,
            target: None,
            active: true,
        }
    }

    /// `true` for the root cell.
    pub fn is_player(&self) -> bool {
        self.role == CellRole::Player
    }

    /// Advances energy decay and the tag countdown.
    ///
    /// # Arguments
    ///
    /// * `frames` - Elapsed frames, for the tag countdown
    /// * `dt` - Elapsed seconds, for energy decay
    /// * `params` - Simulation parameters
    pub fn update(&mut self, frames: f32, dt: f32, params: &Params) {
        self.energy = (self.energy - params.energy_decay * dt).max(0.0);
        if self.energy <= 0.0 {
            self.deactivate();
        }

        if self.tagged {
            self.tag_remaining -= frames;
            if self.tag_remaining <= 0.0 {
                self.tagged = false;
                self.tag_remaining = 0.0;
                self.visibility = self.base_visibility;
            }
        }
    }

    /// Grows the cell by `amount` scaled with its growth rate.
    ///
    /// # Returns
    ///
    /// The growth actually applied, which the caller may share with a colony.
    pub fn grow(&mut self, amount: f32) -> f32 {
        let applied = amount * self.growth_rate;
        self.size += applied;
        applied
    }

    /// Whether this cell is able to digest `nutrient`.
    pub fn can_digest(&self, nutrient: &Nutrient) -> bool {
        !nutrient.requires_enzyme || self.has_enzyme(nutrient.kind)
    }

    /// Eats `nutrient`, gaining its energy and growth.
    ///
    /// The nutrient itself is left untouched; the resolver deactivates it.
    ///
    /// # Returns
    ///
    /// `false` if the nutrient is already consumed or needs an enzyme this
    /// cell lacks.
    pub fn consume_nutrient(&mut self, nutrient: &Nutrient) -> bool {
        if nutrient.is_consumed() || !self.can_digest(nutrient) {
            return false;
        }
        self.energy += nutrient.energy_value;
        self.grow(nutrient.growth_value);
        true
    }

    /// Points the cell along `(dx, dy)`, normalized. Zero input is ignored.
    pub fn set_direction(&mut self, dx: f32, dy: f32) {
        let magnitude = dx.hypot(dy);
        if magnitude > 0.0 && magnitude.is_finite() {
            self.dir[0] = dx / magnitude;
            self.dir[1] = dy / magnitude;
        }
    }

    /// Marks the cell for immune cells for `duration` frames.
    ///
    /// Re-tagging refreshes the countdown without compounding the boost.
    pub fn tag(&mut self, duration: f32, boost: f32) {
        self.tagged = true;
        self.tag_remaining = self.tag_remaining.max(duration);
        self.visibility = self.base_visibility * boost;
    }

    /// Teaches the cell to digest `kind`.
    pub fn add_enzyme(&mut self, kind: NutrientKind) {
        self.enzymes.insert(kind);
    }

    /// Whether the cell carries the enzyme for `kind`.
    pub fn has_enzyme(&self, kind: NutrientKind) -> bool {
        self.enzymes.contains(&kind)
    }

    /// Records membership of `colony`.
    pub fn join_colony(&mut self, colony: ColonyId) {
        self.colony = Some(colony);
    }

    /// Clears colony membership.
    pub fn leave_colony(&mut self) {
        self.colony = None;
    }

    /// Moves the cell along its heading and bounces it off the walls.
    pub fn advance(&mut self, frames: f32, params: &Params) {
        spatial::normalize_mut(&mut self.dir);
        self.pos = &self.pos + &(&self.dir * (self.speed * frames));
        spatial::reflect_in_box(
            &mut self.pos,
            &mut self.dir,
            self.size,
            params.box_width,
            params.box_height,
        );
    }
}

impl Locatable for Cell {
    fn pos(&self) -> &Array1<f32> {
        &self.pos
    }

    fn pos_mut(&mut self) -> &mut Array1<f32> {
        &mut self.pos
    }

    fn radius(&self) -> f32 {
        self.size
    }

    fn is_alive(&self) -> bool {
        self.active
    }

    fn deactivate(&mut self) {
        self.active = false;
    }
}
