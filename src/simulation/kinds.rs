//! Enumerated entity kinds and their configuration records.
//!
//! Kinds are plain tags. Everything that differs between two kinds of the same
//! entity lives in a configuration record looked up from [`super::params::Params`],
//! and behavior that differs is dispatched with a `match` on the tag.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Shape of the player's bacterium, chosen at the start of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// Round bacteria with balanced stats.
    Coccus,
    /// Rod-shaped bacteria, fast but conspicuous.
    Bacillus,
    /// Spiral bacteria, small and hard to spot.
    Spirillum,
}

/// Nutrient varieties that float around the dish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NutrientKind {
    /// Common, cheap food.
    Carbohydrate,
    /// Mid-value food.
    Protein,
    /// Rich food that can only be digested with a matching enzyme.
    Lipid,
}

/// Immune cell varieties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    /// Fast single-target hunter.
    Neutrophil,
    /// Large, slow cell that tracks several targets at once.
    Macrophage,
    /// Small marker that tags a cell and is used up doing so.
    Antibody,
}

/// How a hostile agent treats the cell it touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentBehavior {
    /// Chases a single target and damages or engulfs it.
    Hunter,
    /// Chases up to `max_targets` cells, steering toward their centroid.
    Engulfer,
    /// Tags the touched cell (raising its visibility) and deactivates.
    Tagger,
}

/// Difficulty presets that scale immune pressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    /// Slow, rare immune cells.
    Easy,
    /// Default balance.
    #[default]
    Normal,
    /// Fast, frequent immune cells.
    Hard,
}

impl Difficulty {
    /// Multiplier applied to agent base and maximum speeds.
    pub fn speed_scale(self) -> f32 {
        match self {
            Self::Easy => 0.5,
            Self::Normal => 1.0,
            Self::Hard => 1.25,
        }
    }

    /// Multiplier applied to the per-tick agent spawn probability.
    pub fn spawn_scale(self) -> f32 {
        match self {
            Self::Easy => 0.5,
            Self::Normal => 1.0,
            Self::Hard => 1.5,
        }
    }
}

macro_rules! kind_table {
    ($ty:ident, $category:literal, [$($variant:ident => $key:literal),+ $(,)?]) => {
        impl $ty {
            /// Every variant, in table order.
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            /// Lower-case configuration key of this variant.
            pub fn key(self) -> &'static str {
                match self {
                    $($ty::$variant => $key),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.key())
            }
        }

        impl FromStr for $ty {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($key => Ok($ty::$variant),)+
                    _ => Err(ConfigError::UnknownKind {
                        category: $category,
                        key: s.to_string(),
                    }),
                }
            }
        }
    };
}

kind_table!(CellKind, "cell", [Coccus => "coccus", Bacillus => "bacillus", Spirillum => "spirillum"]);
kind_table!(NutrientKind, "nutrient", [Carbohydrate => "carbohydrate", Protein => "protein", Lipid => "lipid"]);
kind_table!(AgentKind, "agent", [Neutrophil => "neutrophil", Macrophage => "macrophage", Antibody => "antibody"]);
kind_table!(Difficulty, "difficulty", [Easy => "easy", Normal => "normal", Hard => "hard"]);

/// Stats of a bacterium kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellKindConfig {
    /// Kind this record describes.
    pub kind: CellKind,
    /// Distance travelled per frame at full speed.
    pub speed: f32,
    /// Starting radius.
    pub size: f32,
    /// Multiplier on every growth event.
    pub growth_rate: f32,
    /// How easily immune cells notice this kind.
    pub visibility: f32,
    /// Nutrients this kind can digest even when they require an enzyme.
    #[serde(default)]
    pub enzymes: Vec<NutrientKind>,
}

/// Stats of a nutrient kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutrientKindConfig {
    /// Kind this record describes.
    pub kind: NutrientKind,
    /// Energy granted to the eater, also added to the score.
    pub energy_value: f32,
    /// Growth granted to the eater, before its growth rate.
    pub growth_value: f32,
    /// Relative weight in the spawn draw.
    pub spawn_weight: f32,
    /// Collision radius.
    pub radius: f32,
    /// Whether the eater needs a matching enzyme.
    #[serde(default)]
    pub requires_enzyme: bool,
}

/// Stats of an immune cell kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentKindConfig {
    /// Kind this record describes.
    pub kind: AgentKind,
    /// Contact behavior.
    pub behavior: AgentBehavior,
    /// Initial speed, per frame.
    pub speed: f32,
    /// Speed cap reached while chasing.
    pub max_speed: f32,
    /// Collision radius.
    pub radius: f32,
    /// Frames until the agent expires; `None` lives forever.
    pub lifespan: Option<f32>,
    /// Size removed from a cell per attack.
    pub damage: f32,
    /// Number of simultaneous targets.
    pub max_targets: usize,
    /// Frames a tagged cell stays tagged (taggers only).
    #[serde(default)]
    pub tag_duration: Option<f32>,
}

pub(crate) fn default_cell_kinds() -> Vec<CellKindConfig> {
    vec![
        CellKindConfig {
            kind: CellKind::Coccus,
            speed: 2.0,
            size: 10.0,
            growth_rate: 1.0,
            visibility: 1.0,
            enzymes: Vec::new(),
        },
        CellKindConfig {
            kind: CellKind::Bacillus,
            speed: 3.0,
            size: 12.0,
            growth_rate: 0.8,
            visibility: 1.5,
            enzymes: vec![NutrientKind::Lipid],
        },
        CellKindConfig {
            kind: CellKind::Spirillum,
            speed: 2.5,
            size: 8.0,
            growth_rate: 0.9,
            visibility: 0.7,
            enzymes: Vec::new(),
        },
    ]
}

pub(crate) fn default_nutrient_kinds() -> Vec<NutrientKindConfig> {
    vec![
        NutrientKindConfig {
            kind: NutrientKind::Carbohydrate,
            energy_value: 10.0,
            growth_value: 0.5,
            spawn_weight: 0.03,
            radius: 3.0,
            requires_enzyme: false,
        },
        NutrientKindConfig {
            kind: NutrientKind::Protein,
            energy_value: 15.0,
            growth_value: 1.2,
            spawn_weight: 0.02,
            radius: 4.0,
            requires_enzyme: false,
        },
        NutrientKindConfig {
            kind: NutrientKind::Lipid,
            energy_value: 25.0,
            growth_value: 2.0,
            spawn_weight: 0.01,
            radius: 5.0,
            requires_enzyme: true,
        },
    ]
}

pub(crate) fn default_agent_kinds() -> Vec<AgentKindConfig> {
    vec![
        AgentKindConfig {
            kind: AgentKind::Neutrophil,
            behavior: AgentBehavior::Hunter,
            speed: 2.0,
            max_speed: 2.5,
            radius: 15.0,
            lifespan: Some(300.0),
            damage: 1.0,
            max_targets: 1,
            tag_duration: None,
        },
        AgentKindConfig {
            kind: AgentKind::Macrophage,
            behavior: AgentBehavior::Engulfer,
            speed: 1.5,
            max_speed: 2.0,
            radius: 25.0,
            lifespan: Some(900.0),
            damage: 2.0,
            max_targets: 3,
            tag_duration: None,
        },
        AgentKindConfig {
            kind: AgentKind::Antibody,
            behavior: AgentBehavior::Tagger,
            speed: 2.0,
            max_speed: 2.5,
            radius: 8.0,
            lifespan: Some(600.0),
            damage: 0.0,
            max_targets: 1,
            tag_duration: Some(300.0),
        },
    ]
}
