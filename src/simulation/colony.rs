//! Colonies: proximity-maintained groups of friendly cells.
//!
//! A colony only stores cell ids. The cells themselves are owned by the game,
//! so a colony never keeps a cell alive; members that disappear are pruned on
//! the next [`Colony::update`].

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use tracing::debug;

use super::cell::{Cell, CellId};
use super::locatable::Locatable;
use super::params::Params;
use super::spatial::{self, ProximityIndex, SpatialBackend};

slotmap::new_key_type! {
    /// Generational key of a colony.
    pub struct ColonyId;
}

/// A group of cooperating cells.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Colony {
    members: Vec<CellId>,
    /// Energy paid in by members and not yet handed out.
    pub shared_resources: f32,
}

/// Membership changes produced by one colony update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColonyUpdate {
    /// Members dropped because they died or drifted away.
    pub evicted: Vec<CellId>,
    /// Whether the colony fell below the formation threshold and dissolved.
    pub dissolved: bool,
}

impl Colony {
    /// Creates an empty colony.
    pub fn new() -> Self {
        Self::default()
    }

    /// Member ids, in joining order.
    pub fn members(&self) -> &[CellId] {
        &self.members
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// `true` if the colony has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether `id` is a member.
    pub fn contains(&self, id: CellId) -> bool {
        self.members.contains(&id)
    }

    /// Adds `cell` to the colony unless it is full or already a member.
    pub fn add_member(&mut self, colony_id: ColonyId, id: CellId, cell: &mut Cell, max_size: usize) -> bool {
        if self.members.len() >= max_size || self.contains(id) {
            return false;
        }
        self.members.push(id);
        cell.join_colony(colony_id);
        true
    }

    /// Removes `id` from the colony and clears the cell's back-reference.
    pub fn remove_member(&mut self, id: CellId, cells: &mut SlotMap<CellId, Cell>) {
        self.members.retain(|m| *m != id);
        if let Some(cell) = cells.get_mut(id) {
            cell.leave_colony();
        }
    }

    /// Releases every member.
    pub fn dissolve(&mut self, cells: &mut SlotMap<CellId, Cell>) {
        for id in self.members.drain(..) {
            if let Some(cell) = cells.get_mut(id) {
                cell.leave_colony();
            }
        }
    }

    /// A cell may join if there is room and it is within communication range
    /// of at least one member.
    pub fn can_accept(&self, cell: &Cell, cells: &SlotMap<CellId, Cell>, params: &Params) -> bool {
        if self.members.len() >= params.colony_max_size {
            return false;
        }
        self.members
            .iter()
            .filter_map(|id| cells.get(*id))
            .any(|member| spatial::distance(cell, member) <= params.communication_range)
    }

    /// Damage reduction enjoyed by every member.
    pub fn protection_bonus(&self, params: &Params) -> f32 {
        (params.colony_protection_per_member * self.members.len() as f32)
            .min(params.colony_protection_cap)
    }

    /// Spreads `amount` of size evenly across all members.
    pub fn distribute_growth(&self, amount: f32, cells: &mut SlotMap<CellId, Cell>) {
        if self.members.is_empty() {
            return;
        }
        let share = amount / self.members.len() as f32;
        for id in &self.members {
            if let Some(cell) = cells.get_mut(*id) {
                cell.size += share;
            }
        }
    }

    /// Pays a fraction of `amount` into the shared pool and hands out whole
    /// units of it as energy. The fractional remainder carries over.
    pub fn share_resources(&mut self, amount: f32, cells: &mut SlotMap<CellId, Cell>, params: &Params) {
        self.shared_resources += amount * params.colony_resource_sharing;
        if self.shared_resources < 1.0 || self.members.is_empty() {
            return;
        }
        let whole = self.shared_resources.floor();
        let share = whole / self.members.len() as f32;
        for id in &self.members {
            if let Some(cell) = cells.get_mut(*id) {
                cell.energy += share;
            }
        }
        self.shared_resources -= whole;
    }

    /// Prunes dead members, evicts isolated ones and dissolves the colony if
    /// it shrinks below the formation threshold.
    pub fn update(&mut self, cells: &mut SlotMap<CellId, Cell>, params: &Params) -> ColonyUpdate {
        let mut report = ColonyUpdate::default();

        let dead: Vec<CellId> = self
            .members
            .iter()
            .copied()
            .filter(|id| cells.get(*id).is_none_or(|c| !c.is_alive()))
            .collect();
        for id in dead {
            self.remove_member(id, cells);
            report.evicted.push(id);
        }

        let isolated: Vec<CellId> = self
            .members
            .iter()
            .copied()
            .filter(|id| {
                let Some(cell) = cells.get(*id) else {
                    return true;
                };
                !self.members.iter().any(|other| {
                    other != id
                        && cells
                            .get(*other)
                            .is_some_and(|o| spatial::distance(cell, o) <= params.communication_range)
                })
            })
            .collect();
        for id in isolated {
            self.remove_member(id, cells);
            report.evicted.push(id);
        }

        if self.members.len() < params.colony_formation_threshold {
            self.dissolve(cells);
            report.dissolved = true;
        }
        report
    }
}

/// Outcome of one colony manager pass.
#[derive(Debug, Clone, Default)]
pub struct ColonyPass {
    /// Colonies created this pass.
    pub formed: Vec<ColonyId>,
    /// Colonies dissolved this pass.
    pub dissolved: usize,
    /// Cells that joined an existing colony.
    pub joined: usize,
}

/// Runs the colony manager: maintenance, joining, then formation.
pub fn manage_colonies(
    colonies: &mut SlotMap<ColonyId, Colony>,
    cells: &mut SlotMap<CellId, Cell>,
    params: &Params,
) -> ColonyPass {
    let mut pass = ColonyPass::default();

    let ids: Vec<ColonyId> = colonies.keys().collect();
    for colony_id in ids {
        let Some(colony) = colonies.get_mut(colony_id) else {
            continue;
        };
        let report = colony.update(cells, params);
        if report.dissolved {
            colonies.remove(colony_id);
            pass.dissolved += 1;
            debug!(?colony_id, "colony dissolved");
        }
    }

    pass.joined = join_colonies(colonies, cells, params);
    pass.formed = form_colonies(colonies, cells, params);
    pass
}

/// Lets every unaffiliated cell join the first colony that accepts it.
///
/// # Returns
///
/// The number of cells that joined.
pub fn join_colonies(
    colonies: &mut SlotMap<ColonyId, Colony>,
    cells: &mut SlotMap<CellId, Cell>,
    params: &Params,
) -> usize {
    let loners: Vec<CellId> = cells
        .iter()
        .filter(|(_, c)| c.is_alive() && c.colony.is_none())
        .map(|(id, _)| id)
        .collect();

    let mut joined = 0;
    for id in loners {
        let Some(cell) = cells.get(id) else {
            continue;
        };
        let Some(colony_id) = colonies
            .iter()
            .find(|(_, colony)| colony.can_accept(cell, cells, params))
            .map(|(colony_id, _)| colony_id)
        else {
            continue;
        };
        if let (Some(colony), Some(cell)) = (colonies.get_mut(colony_id), cells.get_mut(id)) {
            if colony.add_member(colony_id, id, cell, params.colony_max_size) {
                joined += 1;
            }
        }
    }
    joined
}

/// Groups unaffiliated cells that are within communication range of each
/// other into new colonies.
///
/// # Returns
///
/// Ids of the colonies created.
pub fn form_colonies(
    colonies: &mut SlotMap<ColonyId, Colony>,
    cells: &mut SlotMap<CellId, Cell>,
    params: &Params,
) -> Vec<ColonyId> {
    let mut formed = Vec::new();
    let index = match ProximityIndex::build(
        params.spatial_backend,
        cells.iter().filter(|(_, c)| c.is_alive()),
    ) {
        Ok(index) => index,
        Err(err) => {
            tracing::warn!(%err, "spatial index unavailable, falling back to a linear scan");
            match ProximityIndex::build(
                SpatialBackend::Linear,
                cells.iter().filter(|(_, c)| c.is_alive()),
            ) {
                Ok(index) => index,
                Err(_) => return formed,
            }
        }
    };

    let ids: Vec<CellId> = cells.keys().collect();
    for id in ids {
        let Some(cell) = cells.get(id) else {
            continue;
        };
        if !cell.is_alive() || cell.colony.is_some() {
            continue;
        }

        let neighbors: Vec<CellId> = index
            .within(cell.pos(), params.communication_range)
            .into_iter()
            .map(|(_, other)| other)
            .filter(|other| {
                *other != id
                    && cells
                        .get(*other)
                        .is_some_and(|o| o.is_alive() && o.colony.is_none())
            })
            .collect();

        if neighbors.len() + 1 < params.colony_formation_threshold {
            continue;
        }

        let colony_id = colonies.insert(Colony::new());
        let Some(colony) = colonies.get_mut(colony_id) else {
            continue;
        };
        for member in std::iter::once(id).chain(neighbors) {
            if let Some(cell) = cells.get_mut(member) {
                colony.add_member(colony_id, member, cell, params.colony_max_size);
            }
        }
        debug!(?colony_id, members = colony.len(), "colony formed");
        formed.push(colony_id);
    }
    formed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::kinds;
    use ndarray::Array1;

    fn spawn(cells: &mut SlotMap<CellId, Cell>, x: f32, y: f32) -> CellId {
        let cfg = &kinds::default_cell_kinds()[0];
        cells.insert(Cell::new_player(cfg, Array1::from_vec(vec![x, y]), 100.0))
    }

    #[test]
    fn three_neighbors_form_a_colony() {
        let params = Params::default();
        let mut cells = SlotMap::with_key();
        let mut colonies = SlotMap::with_key();
        let a = spawn(&mut cells, 100.0, 100.0);
        let b = spawn(&mut cells, 130.0, 100.0);
        let c = spawn(&mut cells, 115.0, 130.0);

        let formed = form_colonies(&mut colonies, &mut cells, &params);
        assert_eq!(formed.len(), 1);
        let colony = &colonies[formed[0]];
        assert_eq!(colony.len(), 3);
        for id in [a, b, c] {
            assert!(colony.contains(id));
            assert_eq!(cells[id].colony, Some(formed[0]));
        }
    }

    #[test]
    fn two_neighbors_are_not_enough() {
        let params = Params::default();
        let mut cells = SlotMap::with_key();
        let mut colonies = SlotMap::with_key();
        spawn(&mut cells, 100.0, 100.0);
        spawn(&mut cells, 130.0, 100.0);
        spawn(&mut cells, 500.0, 500.0);

        assert!(form_colonies(&mut colonies, &mut cells, &params).is_empty());
        assert!(cells.values().all(|c| c.colony.is_none()));
    }

    #[test]
    fn membership_never_exceeds_max_size() {
        let params = Params {
            colony_max_size: 4,
            ..Params::default()
        };
        let mut cells = SlotMap::with_key();
        let mut colonies = SlotMap::with_key();
        for i in 0..8 {
            spawn(&mut cells, 100.0 + i as f32 * 5.0, 100.0);
        }

        manage_colonies(&mut colonies, &mut cells, &params);
        for colony in colonies.values() {
            assert!(colony.len() <= 4);
        }
        let affiliated = cells.values().filter(|c| c.colony.is_some()).count();
        assert_eq!(
            affiliated,
            colonies.values().map(Colony::len).sum::<usize>()
        );
    }

    #[test]
    fn loner_joins_existing_colony_in_range() {
        let params = Params::default();
        let mut cells = SlotMap::with_key();
        let mut colonies = SlotMap::with_key();
        spawn(&mut cells, 100.0, 100.0);
        spawn(&mut cells, 130.0, 100.0);
        spawn(&mut cells, 115.0, 130.0);
        form_colonies(&mut colonies, &mut cells, &params);

        let late = spawn(&mut cells, 190.0, 100.0);
        assert_eq!(join_colonies(&mut colonies, &mut cells, &params), 1);
        assert!(cells[late].colony.is_some());
    }

    #[test]
    fn drifting_member_is_evicted_and_colony_dissolves() {
        let params = Params::default();
        let mut cells = SlotMap::with_key();
        let mut colonies = SlotMap::with_key();
        let a = spawn(&mut cells, 100.0, 100.0);
        let b = spawn(&mut cells, 130.0, 100.0);
        let c = spawn(&mut cells, 115.0, 130.0);
        let id = form_colonies(&mut colonies, &mut cells, &params)[0];

        cells[c].pos = Array1::from_vec(vec![700.0, 500.0]);
        let report = colonies[id].update(&mut cells, &params);
        assert_eq!(report.evicted, vec![c]);
        assert!(report.dissolved);
        for member in [a, b, c] {
            assert!(cells[member].colony.is_none());
        }
    }

    #[test]
    fn dead_members_are_pruned() {
        let params = Params::default();
        let mut cells = SlotMap::with_key();
        let mut colonies = SlotMap::with_key();
        for i in 0..4 {
            spawn(&mut cells, 100.0 + i as f32 * 10.0, 100.0);
        }
        let id = form_colonies(&mut colonies, &mut cells, &params)[0];
        let victim = colonies[id].members()[3];
        cells.remove(victim);

        let report = colonies[id].update(&mut cells, &params);
        assert_eq!(report.evicted, vec![victim]);
        assert!(!report.dissolved);
        assert_eq!(colonies[id].len(), 3);
        assert!(colonies[id].members().iter().all(|m| cells.contains_key(*m)));
    }

    #[test]
    fn resources_carry_fractional_remainder() {
        let params = Params::default();
        let mut cells = SlotMap::with_key();
        let mut colony = Colony::new();
        let colony_id = ColonyId::default();
        for i in 0..2 {
            let id = spawn(&mut cells, 100.0 + i as f32, 100.0);
            colony.add_member(colony_id, id, &mut cells[id], params.colony_max_size);
        }

        colony.share_resources(12.5, &mut cells, &params);
        assert!((colony.shared_resources - 0.5).abs() < 1e-5);
        for cell in cells.values() {
            assert!((cell.energy - 101.0).abs() < 1e-5);
        }
    }

    #[test]
    fn protection_is_capped() {
        let params = Params::default();
        let mut cells = SlotMap::with_key();
        let mut colony = Colony::new();
        let colony_id = ColonyId::default();
        for i in 0..2 {
            let id = spawn(&mut cells, 100.0 + i as f32, 100.0);
            colony.add_member(colony_id, id, &mut cells[id], params.colony_max_size);
        }
        assert!((colony.protection_bonus(&params) - 0.6).abs() < 1e-6);

        let id = spawn(&mut cells, 103.0, 100.0);
        colony.add_member(colony_id, id, &mut cells[id], params.colony_max_size);
        assert!((colony.protection_bonus(&params) - 0.7).abs() < 1e-6);
    }
}
