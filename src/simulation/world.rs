//! Authoritative entity storage.
//!
//! Every entity lives in a generational slot map. Colonies and target fields
//! hold keys into these maps, so removing an entity can only ever leave a key
//! that resolves to nothing.

use slotmap::SlotMap;

use super::agent::{Agent, AgentId};
use super::cell::{Cell, CellId, CellRole};
use super::colony::{Colony, ColonyId};
use super::locatable::Locatable;
use super::nutrient::{Nutrient, NutrientId};
use super::params::Params;
use super::spatial;

/// All entities of one run.
#[derive(Debug, Clone, Default)]
pub struct World {
    /// Player and child cells.
    pub cells: SlotMap<CellId, Cell>,
    /// Nutrients.
    pub nutrients: SlotMap<NutrientId, Nutrient>,
    /// Immune cells.
    pub agents: SlotMap<AgentId, Agent>,
    /// Colonies.
    pub colonies: SlotMap<ColonyId, Colony>,
    /// Key of the player cell, once the run has started.
    pub player: Option<CellId>,
}

impl World {
    /// Creates an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// The player cell, if it exists.
    pub fn player_cell(&self) -> Option<&Cell> {
        self.player.and_then(|id| self.cells.get(id))
    }

    /// Mutable access to the player cell.
    pub fn player_cell_mut(&mut self) -> Option<&mut Cell> {
        self.player.and_then(|id| self.cells.get_mut(id))
    }

    /// Number of living children.
    pub fn child_count(&self) -> usize {
        self.cells
            .values()
            .filter(|c| c.role == CellRole::Child && c.is_alive())
            .count()
    }

    /// Number of living friendly cells, player included.
    pub fn friendly_count(&self) -> usize {
        self.cells.values().filter(|c| c.is_alive()).count()
    }

    /// Damage reduction `cell` enjoys through its colony.
    pub fn protection_for(&self, cell: &Cell, params: &Params) -> f32 {
        cell.colony
            .and_then(|id| self.colonies.get(id))
            .map_or(0.0, |colony| colony.protection_bonus(params))
    }

    /// Drops deactivated entities and every reference to them.
    ///
    /// The player cell is kept even when inactive so the final state can
    /// still be rendered.
    pub fn remove_inactive(&mut self) {
        let player = self.player;
        self.nutrients.retain(|_, n| n.is_alive());
        self.agents.retain(|_, a| a.is_alive());
        self.cells.retain(|id, c| c.is_alive() || Some(id) == player);
        self.clear_stale_references();
    }

    /// Clears target and colony keys that no longer resolve.
    pub fn clear_stale_references(&mut self) {
        for cell in self.cells.values_mut() {
            if cell.target.is_some_and(|t| !self.nutrients.contains_key(t)) {
                cell.target = None;
            }
            if cell.colony.is_some_and(|c| !self.colonies.contains_key(c)) {
                cell.leave_colony();
            }
        }
        for agent in self.agents.values_mut() {
            agent.targets.retain(|t| self.cells.contains_key(*t));
        }
    }

    /// Pulls cells that grew into a wall back inside the dish.
    ///
    /// A growth correction, not a wall contact: headings are left alone. The
    /// clamped center sits exactly on the bound, which `reflect_in_box` does
    /// not treat as a contact, so only a heading into the wall bounces.
    pub fn confine_cells(&mut self, params: &Params) {
        for cell in self.cells.values_mut() {
            let radius = cell.size;
            spatial::clamp_in_box(cell.pos_mut(), radius, params.box_width, params.box_height);
        }
    }

    /// Removes everything.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.nutrients.clear();
        self.agents.clear();
        self.colonies.clear();
        self.player = None;
    }
}
