use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use super::kinds::{
    self, AgentKind, AgentKindConfig, CellKind, CellKindConfig, Difficulty, NutrientKind,
    NutrientKindConfig,
};
use super::spatial::SpatialBackend;

/// Size threshold and per-tick probability that gate a split.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SplitRule {
    /// Radius at which a cell becomes eligible to split.
    pub threshold: f32,
    /// Chance per eligible tick that the split actually happens.
    pub probability: f32,
}

/// Simulation parameters that control the dish.
///
/// Speeds, timers and lifespans are expressed per frame at
/// [`Params::reference_fps`]; energy decay is per second.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Dish width.
    pub box_width: f32,
    /// Dish height.
    pub box_height: f32,
    /// Frame rate the per-frame constants were tuned for.
    pub reference_fps: f32,
    /// Largest delta accepted by a single update, in seconds.
    pub max_delta: f32,
    /// Seed for the simulation RNG. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Immune pressure preset.
    pub difficulty: Difficulty,
    /// Backend used for communication-range queries.
    pub spatial_backend: SpatialBackend,

    /// Bacterium kind table.
    pub cell_kinds: Vec<CellKindConfig>,
    /// Nutrient kind table.
    pub nutrient_kinds: Vec<NutrientKindConfig>,
    /// Immune cell kind table.
    pub agent_kinds: Vec<AgentKindConfig>,

    /// Energy every new cell starts with.
    pub start_energy: f32,
    /// Energy lost per second.
    pub energy_decay: f32,
    /// Minimum idle frames before a wandering entity picks a new heading.
    pub wander_min: f32,
    /// Maximum idle frames before a wandering entity picks a new heading.
    pub wander_max: f32,
    /// Extra distance at which children start fleeing an immune cell.
    pub flee_margin: f32,
    /// Effective distance under which an immune cell locks onto a target.
    pub chase_radius: f32,
    /// An immune cell only chases children it is at least this fraction of.
    pub chase_size_ratio: f32,
    /// Multiplicative speed ramp per frame while chasing.
    pub chase_acceleration: f32,
    /// Multiplicative speed decay per frame while idle.
    pub idle_deceleration: f32,
    /// Speed floor for immune cells.
    pub agent_min_speed: f32,
    /// The run ends when an immune cell larger than this fraction of the player touches it.
    pub player_kill_ratio: f32,
    /// Visibility multiplier applied while a cell is tagged.
    pub tag_visibility_boost: f32,

    /// Split gate for the player.
    pub player_split: SplitRule,
    /// Split gate for children.
    pub child_split: SplitRule,
    /// Fraction of its size a parent keeps after splitting.
    pub split_retention: f32,
    /// Fraction of the parent's size handed to the child.
    pub split_ratio: f32,
    /// Gap between parent edge and child center.
    pub split_offset: f32,
    /// Maximum number of living children.
    pub max_children: usize,

    /// Minimum number of cells that form a colony.
    pub colony_formation_threshold: usize,
    /// Maximum number of members per colony.
    pub colony_max_size: usize,
    /// Damage reduction granted per member.
    pub colony_protection_per_member: f32,
    /// Upper bound of the damage reduction.
    pub colony_protection_cap: f32,
    /// Fraction of a member's growth spread across the colony.
    pub colony_growth_share: f32,
    /// Fraction of a member's energy gain paid into the shared pool.
    pub colony_resource_sharing: f32,
    /// Maximum distance between cooperating cells.
    pub communication_range: f32,

    /// Per-tick chance of introducing a nutrient.
    pub nutrient_spawn_probability: f32,
    /// Nutrient population cap.
    pub max_nutrients: usize,
    /// Distance from the walls kept free of new nutrients.
    pub nutrient_spawn_margin: f32,
    /// Per-tick chance of introducing an immune cell, before difficulty.
    pub agent_spawn_probability: f32,
    /// Immune cell population cap.
    pub max_agents: usize,
    /// Distance outside the walls at which immune cells appear.
    pub agent_spawn_offset: f32,
    /// Nutrients placed by `start`.
    pub initial_nutrients: usize,
    /// Immune cells placed by `start`.
    pub initial_agents: usize,
    /// Entries kept by the event log.
    pub event_log_size: usize,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            box_width: 800.0,
            box_height: 600.0,
            reference_fps: 60.0,
            max_delta: 0.1,
            seed: None,
            difficulty: Difficulty::Normal,
            spatial_backend: SpatialBackend::Linear,
            cell_kinds: kinds::default_cell_kinds(),
            nutrient_kinds: kinds::default_nutrient_kinds(),
            agent_kinds: kinds::default_agent_kinds(),
            start_energy: 100.0,
            energy_decay: 0.1,
            wander_min: 50.0,
            wander_max: 150.0,
            flee_margin: 30.0,
            chase_radius: 150.0,
            chase_size_ratio: 0.8,
            chase_acceleration: 1.005,
            idle_deceleration: 0.99,
            agent_min_speed: 1.0,
            player_kill_ratio: 0.8,
            tag_visibility_boost: 1.5,
            player_split: SplitRule {
                threshold: 20.0,
                probability: 0.4,
            },
            child_split: SplitRule {
                threshold: 20.0,
                probability: 0.3,
            },
            split_retention: 0.7,
            split_ratio: 0.5,
            split_offset: 5.0,
            max_children: 5,
            colony_formation_threshold: 3,
            colony_max_size: 10,
            colony_protection_per_member: 0.3,
            colony_protection_cap: 0.7,
            colony_growth_share: 0.3,
            colony_resource_sharing: 0.2,
            communication_range: 100.0,
            nutrient_spawn_probability: 0.05,
            max_nutrients: 50,
            nutrient_spawn_margin: 20.0,
            agent_spawn_probability: 0.02,
            max_agents: 10,
            agent_spawn_offset: 20.0,
            initial_nutrients: 10,
            initial_agents: 3,
            event_log_size: 20,
        }
    }
}

fn check(condition: bool, message: impl FnOnce() -> String) -> Result<(), ConfigError> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::Invalid(message()))
    }
}

fn check_probability(name: &str, value: f32) -> Result<(), ConfigError> {
    check((0.0..=1.0).contains(&value), || {
        format!("{name} must be within [0, 1], got {value}")
    })
}

/// `(0, 1]`: a share that must leave something behind.
fn check_fraction(name: &str, value: f32) -> Result<(), ConfigError> {
    check(value > 0.0 && value <= 1.0, || {
        format!("{name} must be within (0, 1], got {value}")
    })
}

fn check_positive(name: &str, value: f32) -> Result<(), ConfigError> {
    check(value.is_finite() && value > 0.0, || {
        format!("{name} must be positive, got {value}")
    })
}

impl Params {
    /// Parses parameters from a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// Loads parameters from a JSON file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Loads `path` if one is given, otherwise returns the validated defaults.
    ///
    /// A file that cannot be read or parsed is an error, never a silent
    /// fallback to the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => {
                let params = Self::default();
                params.validate()?;
                Ok(params)
            }
        }
    }

    /// Saves the parameters to a JSON file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Looks up the record of a bacterium kind.
    pub fn cell_kind(&self, kind: CellKind) -> Result<&CellKindConfig, ConfigError> {
        self.cell_kinds
            .iter()
            .find(|c| c.kind == kind)
            .ok_or_else(|| ConfigError::MissingKind {
                category: "cell",
                key: kind.to_string(),
            })
    }

    /// Looks up the record of a nutrient kind.
    pub fn nutrient_kind(&self, kind: NutrientKind) -> Result<&NutrientKindConfig, ConfigError> {
        self.nutrient_kinds
            .iter()
            .find(|c| c.kind == kind)
            .ok_or_else(|| ConfigError::MissingKind {
                category: "nutrient",
                key: kind.to_string(),
            })
    }

    /// Looks up the record of an immune cell kind.
    pub fn agent_kind(&self, kind: AgentKind) -> Result<&AgentKindConfig, ConfigError> {
        self.agent_kinds
            .iter()
            .find(|c| c.kind == kind)
            .ok_or_else(|| ConfigError::MissingKind {
                category: "agent",
                key: kind.to_string(),
            })
    }

    /// Number of simulation frames covered by `dt` seconds.
    pub fn frames(&self, dt: f32) -> f32 {
        dt * self.reference_fps
    }

    /// Checks every table and range. Called before a game is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("box_width", self.box_width)?;
        check_positive("box_height", self.box_height)?;
        check_positive("reference_fps", self.reference_fps)?;
        check_positive("max_delta", self.max_delta)?;
        check_positive("communication_range", self.communication_range)?;
        check_positive("chase_radius", self.chase_radius)?;
        check_positive("agent_min_speed", self.agent_min_speed)?;
        check(
            self.wander_min >= 0.0 && self.wander_min <= self.wander_max,
            || {
                format!(
                    "wander range [{}, {}] is empty",
                    self.wander_min, self.wander_max
                )
            },
        )?;

        check_probability("player_split.probability", self.player_split.probability)?;
        check_probability("child_split.probability", self.child_split.probability)?;
        check_fraction("split_retention", self.split_retention)?;
        check_fraction("split_ratio", self.split_ratio)?;
        check_probability("colony_growth_share", self.colony_growth_share)?;
        check_probability("colony_resource_sharing", self.colony_resource_sharing)?;
        check_probability("colony_protection_cap", self.colony_protection_cap)?;
        check_probability("nutrient_spawn_probability", self.nutrient_spawn_probability)?;
        check_probability("agent_spawn_probability", self.agent_spawn_probability)?;

        check(self.colony_formation_threshold >= 2, || {
            format!(
                "colony_formation_threshold must be at least 2, got {}",
                self.colony_formation_threshold
            )
        })?;
        check(
            self.colony_max_size >= self.colony_formation_threshold,
            || {
                format!(
                    "colony_max_size {} is below the formation threshold {}",
                    self.colony_max_size, self.colony_formation_threshold
                )
            },
        )?;

        for kind in CellKind::ALL {
            let cfg = self.cell_kind(*kind)?;
            check_positive("cell size", cfg.size)?;
            check(cfg.speed >= 0.0 && cfg.visibility > 0.0, || {
                format!("cell kind {kind} needs non-negative speed and positive visibility")
            })?;
        }

        let mut total_weight = 0.0;
        for kind in NutrientKind::ALL {
            let cfg = self.nutrient_kind(*kind)?;
            check_positive("nutrient radius", cfg.radius)?;
            check(cfg.spawn_weight >= 0.0, || {
                format!("nutrient kind {kind} has a negative spawn weight")
            })?;
            total_weight += cfg.spawn_weight;
        }
        check(total_weight > 0.0, || {
            "nutrient spawn weights sum to zero".to_string()
        })?;

        for kind in AgentKind::ALL {
            let cfg = self.agent_kind(*kind)?;
            check_positive("agent radius", cfg.radius)?;
            check(cfg.max_targets >= 1, || {
                format!("agent kind {kind} must track at least one target")
            })?;
            check(cfg.max_speed >= cfg.speed, || {
                format!("agent kind {kind} starts above its max speed")
            })?;
            if let Some(lifespan) = cfg.lifespan {
                check_positive("agent lifespan", lifespan)?;
            }
        }

        Ok(())
    }
}
