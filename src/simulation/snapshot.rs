//! Read-only views of the dish for rendering.

use serde::Serialize;
use slotmap::Key;

use super::agent::TargetRole;
use super::cell::CellRole;
use super::kinds::{AgentKind, CellKind, NutrientKind};
use super::locatable::Locatable;
use super::world::World;

/// A friendly cell as drawn.
#[derive(Debug, Clone, Serialize)]
pub struct CellView {
    /// Stable id for the lifetime of the cell.
    pub id: u64,
    /// Player or child.
    pub role: CellRole,
    /// Kind tag.
    pub kind: CellKind,
    /// Center x.
    pub x: f32,
    /// Center y.
    pub y: f32,
    /// Collision radius.
    pub radius: f32,
    /// Current energy.
    pub energy: f32,
    /// Whether an antibody marked it.
    pub tagged: bool,
    /// Index into [`Snapshot::colonies`].
    pub colony: Option<usize>,
    /// `false` only for a player that was just lost.
    pub alive: bool,
}

/// A nutrient as drawn.
#[derive(Debug, Clone, Serialize)]
pub struct NutrientView {
    /// Kind tag.
    pub kind: NutrientKind,
    /// Center x.
    pub x: f32,
    /// Center y.
    pub y: f32,
    /// Collision radius.
    pub radius: f32,
}

/// An immune cell as drawn.
#[derive(Debug, Clone, Serialize)]
pub struct AgentView {
    /// Kind tag.
    pub kind: AgentKind,
    /// Center x.
    pub x: f32,
    /// Center y.
    pub y: f32,
    /// Collision radius.
    pub radius: f32,
    /// Whether it is locked onto a target.
    pub chasing: bool,
    /// Role of the nearest locked target.
    pub target_role: TargetRole,
    /// Number of locked targets.
    pub target_count: usize,
}

/// Everything a frame needs.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// Friendly cells.
    pub cells: Vec<CellView>,
    /// Uneaten nutrients.
    pub nutrients: Vec<NutrientView>,
    /// Immune cells.
    pub agents: Vec<AgentView>,
    /// Member ids per colony, matching [`CellView::id`].
    pub colonies: Vec<Vec<u64>>,
    /// Current score.
    pub score: f32,
    /// Whether the run ended.
    pub game_over: bool,
    /// Elapsed simulated seconds.
    pub time: f32,
}

impl Snapshot {
    /// Captures the current state of `world`.
    pub fn capture(world: &World, score: f32, game_over: bool, time: f32) -> Self {
        let colony_ids: Vec<_> = world.colonies.keys().collect();
        let colonies = world
            .colonies
            .values()
            .map(|c| c.members().iter().map(|id| id.data().as_ffi()).collect())
            .collect();

        let cells = world
            .cells
            .iter()
            .map(|(id, c)| CellView {
                id: id.data().as_ffi(),
                role: c.role,
                kind: c.kind,
                x: c.pos[0],
                y: c.pos[1],
                radius: c.size,
                energy: c.energy,
                tagged: c.tagged,
                colony: c
                    .colony
                    .and_then(|colony| colony_ids.iter().position(|k| *k == colony)),
                alive: c.is_alive(),
            })
            .collect();

        let nutrients = world
            .nutrients
            .values()
            .filter(|n| n.is_alive())
            .map(|n| NutrientView {
                kind: n.kind,
                x: n.pos[0],
                y: n.pos[1],
                radius: n.radius,
            })
            .collect();

        let agents = world
            .agents
            .values()
            .filter(|a| a.is_alive())
            .map(|a| AgentView {
                kind: a.kind,
                x: a.pos[0],
                y: a.pos[1],
                radius: a.radius,
                chasing: a.is_chasing,
                target_role: a.target_role,
                target_count: a.targets.len(),
            })
            .collect();

        Self {
            cells,
            nutrients,
            agents,
            colonies,
            score,
            game_over,
            time,
        }
    }

    /// The player's view, if present.
    pub fn player(&self) -> Option<&CellView> {
        self.cells.iter().find(|c| c.role == CellRole::Player)
    }
}
