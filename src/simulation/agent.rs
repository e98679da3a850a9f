//! Hostile immune cells that hunt friendly cells.
//!
//! Agents travel along a unit heading like cells do, but their speed ramps up
//! while chasing and decays back while idle. Targets are stored as cell ids;
//! a target that no longer resolves is simply dropped.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::cell::{Cell, CellId};
use super::kinds::{AgentBehavior, AgentKind, AgentKindConfig};
use super::locatable::Locatable;
use super::params::Params;
use super::spatial;

slotmap::new_key_type! {
    /// Generational key of a hostile agent.
    pub struct AgentId;
}

/// Smallest lifespan decrement per update, so lifespans shrink even on a zero delta.
const MIN_LIFESPAN_STEP: f32 = 1e-3;

/// What kind of cell an agent is currently locked onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TargetRole {
    /// Not chasing anything.
    #[default]
    None,
    /// Locked onto the player cell.
    Player,
    /// Locked onto a child (the nearest target, for multi-target agents).
    Child,
}

/// An immune cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    /// Agent kind.
    pub kind: AgentKind,
    /// Contact behavior.
    pub behavior: AgentBehavior,
    /// Position in 2D space.
    pub pos: Array1<f32>,
    /// Collision radius.
    pub radius: f32,
    /// Current distance per frame.
    pub speed: f32,
    /// Speed decays toward this while idle.
    pub speed_floor: f32,
    /// Speed ramps toward this while chasing.
    pub speed_cap: f32,
    /// Unit heading.
    pub dir: Array1<f32>,
    /// Frames until expiry, if mortal.
    pub lifespan: Option<f32>,
    /// Size removed from a cell per attack.
    pub damage: f32,
    /// Cells currently locked onto, nearest first.
    pub targets: Vec<CellId>,
    /// Maximum number of simultaneous targets.
    pub max_targets: usize,
    /// Role of the nearest locked target.
    pub target_role: TargetRole,
    /// Whether the agent is chasing this tick.
    pub is_chasing: bool,
    /// Frames a touched cell stays tagged (taggers only).
    pub tag_duration: Option<f32>,
    /// Frames left before an idle agent picks a new heading.
    pub wander_timer: f32,
    active: bool,
}

impl Agent {
    /// Creates an agent of the given kind at `pos`, heading along `dir`.
    ///
    /// Speeds are scaled by the difficulty preset and the initial speed is
    /// clamped into `[speed_floor, speed_cap]`.
    pub fn new(cfg: &AgentKindConfig, pos: Array1<f32>, dir: Array1<f32>, params: &Params) -> Self {
        let scale = params.difficulty.speed_scale();
        let speed_cap = (cfg.max_speed * scale).max(params.agent_min_speed);
        let speed_floor = params.agent_min_speed.min(speed_cap);
        Self {
            kind: cfg.kind,
            behavior: cfg.behavior,
            pos,
            radius: cfg.radius,
            speed: (cfg.speed * scale).clamp(speed_floor, speed_cap),
            speed_floor,
            speed_cap,
            dir,
            lifespan: cfg.lifespan,
            damage: cfg.damage,
            targets: Vec::with_capacity(cfg.max_targets),
            max_targets: cfg.max_targets,
            target_role: TargetRole::None,
            is_chasing: false,
            tag_duration: cfg.tag_duration,
            wander_timer: 0.0,
            active: true,
        }
    }

    /// Counts down the lifespan; the agent deactivates when it runs out.
    pub fn update(&mut self, frames: f32) {
        if let Some(lifespan) = self.lifespan.as_mut() {
            *lifespan -= frames.max(MIN_LIFESPAN_STEP);
            if *lifespan <= 0.0 {
                self.deactivate();
            }
        }
    }

    /// Locks onto `targets` and accelerates toward the speed cap.
    pub fn engage(&mut self, targets: Vec<CellId>, role: TargetRole, acceleration: f32, frames: f32) {
        self.targets = targets;
        self.target_role = role;
        self.is_chasing = true;
        self.speed = (self.speed * acceleration.powf(frames)).min(self.speed_cap);
    }

    /// Drops every target and decelerates toward the speed floor.
    pub fn disengage(&mut self, deceleration: f32, frames: f32) {
        self.targets.clear();
        self.target_role = TargetRole::None;
        self.is_chasing = false;
        self.speed = (self.speed * deceleration.powf(frames)).max(self.speed_floor);
    }

    /// Damages `cell`, softened by its colony's protection bonus.
    ///
    /// The cell's size never drops below 1; reaching that floor deactivates it.
    ///
    /// # Returns
    ///
    /// The damage actually dealt.
    pub fn attack(&self, cell: &mut Cell, protection: f32) -> f32 {
        let dealt = self.damage * (1.0 - protection.clamp(0.0, 1.0));
        cell.size = (cell.size - dealt).max(1.0);
        if cell.size <= 1.0 {
            cell.deactivate();
        }
        dealt
    }

    /// Moves the agent along its heading and bounces it off the walls.
    pub fn advance(&mut self, frames: f32, params: &Params) {
        spatial::normalize_mut(&mut self.dir);
        self.pos = &self.pos + &(&self.dir * (self.speed * frames));
        spatial::reflect_in_box(
            &mut self.pos,
            &mut self.dir,
            self.radius,
            params.box_width,
            params.box_height,
        );
    }
}

impl Locatable for Agent {
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
        self.active
    }

    fn deactivate(&mut self) {
        self.active = false;
    }
}
