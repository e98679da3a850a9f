//! Collision and consumption resolver.
//!
//! Runs once per tick after movement, in four steps: feeding, splitting,
//! immune contact and removal of everything deactivated along the way.

use std::f32::consts::TAU;

use ndarray::Array1;
use rand::Rng;
use tracing::debug;

use super::agent::AgentId;
use super::cell::{Cell, CellId};
use super::events::{EventQueue, SimulationEvent};
use super::kinds::AgentBehavior;
use super::locatable::Locatable;
use super::nutrient::NutrientId;
use super::params::Params;
use super::spatial;
use super::world::World;

/// Runs all four resolver steps.
///
/// Stops right after the contact step if the player was lost; removal is
/// skipped so the final state stays intact.
pub fn resolve(world: &mut World, params: &Params, rng: &mut impl Rng, events: &mut EventQueue) {
    feed(world, params, events);
    split_eligible(world, params, rng, events);
    contact(world, params, events);
    if events.player_lost() {
        return;
    }
    world.remove_inactive();
}

/// Step 1: every friendly cell eats the nutrients it overlaps.
pub fn feed(world: &mut World, params: &Params, events: &mut EventQueue) {
    let cell_ids: Vec<CellId> = world.cells.keys().collect();
    let nutrient_ids: Vec<NutrientId> = world.nutrients.keys().collect();

    for cell_id in cell_ids {
        for &nutrient_id in &nutrient_ids {
            let (Some(cell), Some(nutrient)) = (
                world.cells.get_mut(cell_id),
                world.nutrients.get_mut(nutrient_id),
            ) else {
                continue;
            };
            if !cell.is_alive() || !nutrient.is_alive() || !spatial::collides(&*cell, &*nutrient) {
                continue;
            }

            let size_before = cell.size;
            if !cell.consume_nutrient(nutrient) {
                continue;
            }
            nutrient.consume();
            cell.target = None;
            let applied = cell.size - size_before;
            let colony_id = cell.colony;
            events.push(SimulationEvent::NutrientConsumed {
                cell: cell_id,
                kind: nutrient.kind,
                energy: nutrient.energy_value,
            });
            let energy = nutrient.energy_value;

            if let Some(colony) = colony_id.and_then(|id| world.colonies.get_mut(id)) {
                colony.distribute_growth(applied * params.colony_growth_share, &mut world.cells);
                colony.share_resources(energy, &mut world.cells, params);
            }
        }
    }
}

/// Step 2: cells past their split threshold may split, subject to the child cap
/// and a per-tick roll.
pub fn split_eligible(world: &mut World, params: &Params, rng: &mut impl Rng, events: &mut EventQueue) {
    let ids: Vec<CellId> = world.cells.keys().collect();
    for id in ids {
        let Some(cell) = world.cells.get(id) else {
            continue;
        };
        let rule = if cell.is_player() {
            params.player_split
        } else {
            params.child_split
        };
        if !cell.is_alive() || cell.size < rule.threshold {
            continue;
        }
        if world.child_count() >= params.max_children {
            return;
        }
        if rng.random::<f32>() >= rule.probability {
            continue;
        }
        let angle = rng.random_range(0.0..TAU);
        if let Some(child) = split(world, id, angle, params) {
            events.push(SimulationEvent::CellSplit { parent: id, child });
        }
    }
}

/// Splits `parent` unconditionally, placing the child along `angle`.
///
/// The child gets `split_ratio` of the parent's size and starts just outside
/// its edge; the parent keeps `split_retention` of its size.
///
/// # Returns
///
/// The child's id, or `None` if `parent` does not resolve to a living cell.
pub fn split(world: &mut World, parent: CellId, angle: f32, params: &Params) -> Option<CellId> {
    let cell = world.cells.get_mut(parent)?;
    if !cell.is_alive() {
        return None;
    }

    let offset = cell.size + params.split_offset;
    let heading = Array1::from_vec(vec![angle.cos(), angle.sin()]);
    let mut pos = &cell.pos + &(&heading * offset);
    let child_size = cell.size * params.split_ratio;
    cell.size *= params.split_retention;

    let mut child = Cell::new_child(cell, pos.clone(), angle, child_size, params.start_energy);
    spatial::reflect_in_box(
        &mut pos,
        &mut child.dir,
        child_size,
        params.box_width,
        params.box_height,
    );
    child.pos = pos;

    let child_id = world.cells.insert(child);
    debug!(?parent, child = ?child_id, size = child_size, "cell split");
    Some(child_id)
}

/// Step 3: immune cells act on every friendly cell they touch.
pub fn contact(world: &mut World, params: &Params, events: &mut EventQueue) {
    let agent_ids: Vec<AgentId> = world.agents.keys().collect();
    let cell_ids: Vec<CellId> = world.cells.keys().collect();

    for agent_id in agent_ids {
        for &cell_id in &cell_ids {
            let (Some(agent), Some(cell)) = (world.agents.get(agent_id), world.cells.get(cell_id)) else {
                continue;
            };
            if !agent.is_alive() {
                break;
            }
            if !cell.is_alive() || !spatial::collides(agent, cell) {
                continue;
            }

            if agent.behavior == AgentBehavior::Tagger {
                if cell.tagged {
                    continue;
                }
                let duration = agent.tag_duration.unwrap_or_default();
                if let Some(cell) = world.cells.get_mut(cell_id) {
                    cell.tag(duration, params.tag_visibility_boost);
                }
                if let Some(agent) = world.agents.get_mut(agent_id) {
                    agent.deactivate();
                }
                events.push(SimulationEvent::CellTagged { cell: cell_id });
                break;
            }

            let protection = world.protection_for(cell, params);
            let overwhelms = if cell.is_player() {
                agent.radius > params.player_kill_ratio * cell.size
            } else {
                agent.radius > cell.size
            };
            let is_player = cell.is_player();

            let Some(cell) = world.cells.get_mut(cell_id) else {
                continue;
            };
            if overwhelms {
                cell.deactivate();
            } else {
                let dealt = agent.attack(cell, protection);
                events.push(SimulationEvent::CellDamaged {
                    agent: agent_id,
                    cell: cell_id,
                    damage: dealt,
                });
            }

            if !cell.is_alive() {
                if is_player {
                    events.push(SimulationEvent::PlayerLost);
                    return;
                }
                events.push(SimulationEvent::CellLost { cell: cell_id });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::agent::Agent;
    use crate::simulation::colony::Colony;
    use crate::simulation::kinds::{self, AgentKind, NutrientKind};
    use crate::simulation::nutrient::Nutrient;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn at(x: f32, y: f32) -> Array1<f32> {
        Array1::from_vec(vec![x, y])
    }

    fn with_player(x: f32, y: f32) -> (World, CellId) {
        let mut world = World::new();
        let cfg = &kinds::default_cell_kinds()[0];
        let id = world.cells.insert(Cell::new_player(cfg, at(x, y), 100.0));
        world.player = Some(id);
        (world, id)
    }

    fn add_agent(world: &mut World, kind: AgentKind, x: f32, y: f32) -> AgentId {
        let params = Params::default();
        let cfg = params.agent_kind(kind).unwrap();
        world.agents.insert(Agent::new(cfg, at(x, y), at(1.0, 0.0), &params))
    }

    #[test]
    fn feeding_scores_and_grows() {
        let params = Params::default();
        let (mut world, id) = with_player(300.0, 200.0);
        let cfg = params.nutrient_kind(NutrientKind::Carbohydrate).unwrap();
        let nutrient = world.nutrients.insert(Nutrient::new(cfg, at(305.0, 200.0)));
        let mut events = EventQueue::new();

        feed(&mut world, &params, &mut events);

        assert!(world.nutrients[nutrient].is_consumed());
        assert!((world.cells[id].size - 10.5).abs() < 1e-6);
        assert!((world.cells[id].energy - 110.0).abs() < 1e-6);
        assert_eq!(events.events().len(), 1);
    }

    #[test]
    fn enzyme_gated_nutrients_stay_put() {
        let params = Params::default();
        let (mut world, id) = with_player(300.0, 200.0);
        let cfg = params.nutrient_kind(NutrientKind::Lipid).unwrap();
        let nutrient = world.nutrients.insert(Nutrient::new(cfg, at(305.0, 200.0)));
        let mut events = EventQueue::new();

        feed(&mut world, &params, &mut events);

        assert!(!world.nutrients[nutrient].is_consumed());
        assert_eq!(world.cells[id].size, 10.0);
        assert!(events.events().is_empty());
    }

    #[test]
    fn colony_members_share_growth_and_energy() {
        let params = Params::default();
        let (mut world, id) = with_player(300.0, 200.0);
        let parent = world.cells[id].clone();
        let a = world.cells.insert(Cell::new_child(&parent, at(330.0, 200.0), 0.0, 5.0, 100.0));
        let b = world.cells.insert(Cell::new_child(&parent, at(360.0, 200.0), 0.0, 5.0, 100.0));

        let colony_id = world.colonies.insert(Colony::new());
        for member in [id, a, b] {
            let cell = &mut world.cells[member];
            world.colonies[colony_id].add_member(colony_id, member, cell, params.colony_max_size);
        }

        let cfg = params.nutrient_kind(NutrientKind::Lipid).unwrap().clone();
        let mut edible = cfg;
        edible.requires_enzyme = false;
        world.nutrients.insert(Nutrient::new(&edible, at(305.0, 200.0)));
        let mut events = EventQueue::new();

        feed(&mut world, &params, &mut events);

        // 2.0 growth, 0.6 shared three ways; 25 energy pays 5 into the pool.
        assert!((world.cells[id].size - 12.2).abs() < 1e-5);
        assert!((world.cells[a].size - 5.2).abs() < 1e-5);
        assert!((world.cells[a].energy - 100.0 - 5.0 / 3.0).abs() < 1e-4);
        assert!(world.colonies[colony_id].shared_resources.abs() < 1e-5);
    }

    #[test]
    fn split_halves_into_child_and_keeps_retention() {
        let params = Params::default();
        let (mut world, id) = with_player(400.0, 300.0);
        world.cells[id].size = 22.0;

        let child = split(&mut world, id, 0.0, &params).unwrap();

        assert!((world.cells[child].size - 11.0).abs() < 1e-5);
        assert!((world.cells[id].size - 15.4).abs() < 1e-5);
        assert!((world.cells[child].pos[0] - 427.0).abs() < 1e-4);
        assert_eq!(world.cells[child].dir.to_vec(), vec![1.0, 0.0]);
    }

    #[test]
    fn splits_respect_child_cap() {
        let params = Params {
            player_split: crate::simulation::params::SplitRule {
                threshold: 20.0,
                probability: 1.0,
            },
            max_children: 2,
            ..Params::default()
        };
        let mut rng = SmallRng::seed_from_u64(11);
        let (mut world, id) = with_player(400.0, 300.0);
        let mut events = EventQueue::new();

        for _ in 0..5 {
            world.cells[id].size = 40.0;
            split_eligible(&mut world, &params, &mut rng, &mut events);
        }

        assert_eq!(world.child_count(), 2);
    }

    #[test]
    fn large_agent_ends_the_run() {
        let params = Params::default();
        let (mut world, id) = with_player(400.0, 300.0);
        add_agent(&mut world, AgentKind::Macrophage, 420.0, 300.0);
        let mut events = EventQueue::new();

        contact(&mut world, &params, &mut events);

        assert!(events.player_lost());
        assert!(!world.cells[id].is_alive());
    }

    #[test]
    fn small_agents_wear_cells_down() {
        let params = Params::default();
        let (mut world, id) = with_player(400.0, 300.0);
        world.cells[id].size = 30.0;
        add_agent(&mut world, AgentKind::Neutrophil, 420.0, 300.0);
        let mut events = EventQueue::new();

        contact(&mut world, &params, &mut events);

        assert!((world.cells[id].size - 29.0).abs() < 1e-5);
        assert!(!events.player_lost());
    }

    #[test]
    fn antibodies_tag_and_expire() {
        let params = Params::default();
        let (mut world, id) = with_player(400.0, 300.0);
        let antibody = add_agent(&mut world, AgentKind::Antibody, 410.0, 300.0);
        let mut rng = SmallRng::seed_from_u64(12);
        let mut events = EventQueue::new();

        resolve(&mut world, &params, &mut rng, &mut events);

        assert!(world.cells[id].tagged);
        assert!((world.cells[id].visibility - 1.5).abs() < 1e-6);
        assert_eq!(world.cells[id].size, 10.0);
        assert!(!world.agents.contains_key(antibody));
    }

    #[test]
    fn children_are_engulfed_and_removed() {
        let params = Params::default();
        let (mut world, id) = with_player(100.0, 100.0);
        let parent = world.cells[id].clone();
        let child = world.cells.insert(Cell::new_child(&parent, at(400.0, 300.0), 0.0, 6.0, 100.0));
        add_agent(&mut world, AgentKind::Neutrophil, 410.0, 300.0);
        let mut rng = SmallRng::seed_from_u64(13);
        let mut events = EventQueue::new();

        resolve(&mut world, &params, &mut rng, &mut events);

        assert!(!world.cells.contains_key(child));
        assert!(events.events().contains(&SimulationEvent::CellLost { cell: child }));
        assert!(world.cells.contains_key(id));
    }
}
