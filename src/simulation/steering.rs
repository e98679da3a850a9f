//! Movement and steering pass.
//!
//! Children forage for the nearest nutrient they can digest and flee nearby
//! immune cells. The player only moves where input points it. Immune cells
//! chase the most visible friendly cell in range and wander otherwise.

use std::f32::consts::TAU;

use ndarray::Array1;
use rand::Rng;
use tracing::warn;

use super::agent::{Agent, TargetRole};
use super::cell::{Cell, CellId};
use super::kinds::AgentBehavior;
use super::locatable::Locatable;
use super::params::Params;
use super::spatial::{self, direction_to, find_nearest};
use super::world::World;

/// Steers and moves every living entity by `frames`.
pub fn steer(world: &mut World, params: &Params, rng: &mut impl Rng, frames: f32) {
    steer_cells(world, params, rng, frames);
    steer_agents(world, params, rng, frames);
}

/// Picks a new random heading whenever the idle timer runs out.
fn wander(dir: &mut Array1<f32>, timer: &mut f32, params: &Params, rng: &mut impl Rng, frames: f32) {
    if *timer <= 0.0 {
        let angle = rng.random_range(0.0..TAU);
        dir[0] = angle.cos();
        dir[1] = angle.sin();
        *timer = rng.random_range(params.wander_min..=params.wander_max);
    } else {
        *timer -= frames;
    }
}

/// Friendly cells: foraging, wandering and fleeing for children, plain
/// integration for the player.
pub fn steer_cells(world: &mut World, params: &Params, rng: &mut impl Rng, frames: f32) {
    let World {
        cells,
        nutrients,
        agents,
        ..
    } = world;

    for (id, cell) in cells.iter_mut() {
        if !cell.is_alive() {
            continue;
        }
        if cell.is_player() {
            cell.advance(frames, params);
            continue;
        }

        if let Some(target) = cell.target {
            if nutrients.get(target).is_none_or(|n| !n.is_alive()) {
                warn!(cell = ?id, "dropping stale forage target");
                cell.target = None;
            }
        }
        if cell.target.is_none() {
            cell.target = find_nearest(
                &cell.pos,
                nutrients.iter().filter(|(_, n)| n.is_alive()),
                |n| cell.can_digest(n),
            )
            .map(|(nutrient, _)| nutrient);
        }

        let heading = cell
            .target
            .and_then(|t| nutrients.get(t))
            .and_then(|n| direction_to(&cell.pos, &n.pos));
        match heading {
            Some(dir) => cell.dir = dir,
            None => {
                let Cell {
                    dir, wander_timer, ..
                } = cell;
                wander(dir, wander_timer, params, rng, frames);
            }
        }

        let threat = agents.values().find(|a| {
            a.is_alive()
                && spatial::distance(&*cell, *a) < cell.size + a.radius + params.flee_margin
        });
        if let Some(away) = threat.and_then(|a| direction_to(&a.pos, &cell.pos)) {
            cell.dir = away;
        }

        cell.advance(frames, params);
    }
}

/// Whether `agent` may lock onto `cell`.
fn qualifies(agent: &Agent, cell: &Cell, params: &Params) -> bool {
    if !cell.is_alive() {
        return false;
    }
    if agent.behavior == AgentBehavior::Tagger && cell.tagged {
        return false;
    }
    cell.is_player() || agent.radius >= params.chase_size_ratio * cell.size
}

/// Targets `agent` should lock onto, nearest effective distance first.
///
/// Effective distance is the real distance divided by the target's
/// visibility, so tagged and conspicuous cells are noticed from further off.
fn select_targets(agent: &Agent, cells: &slotmap::SlotMap<CellId, Cell>, params: &Params) -> Vec<(CellId, f32)> {
    let mut candidates: Vec<(CellId, f32)> = cells
        .iter()
        .filter(|(_, c)| qualifies(agent, c, params))
        .map(|(id, c)| {
            let visibility = c.visibility.max(f32::EPSILON);
            (id, spatial::distance(agent, c) / visibility)
        })
        .filter(|(_, effective)| *effective < params.chase_radius)
        .collect();
    candidates.sort_by(|a, b| a.1.total_cmp(&b.1));
    candidates.truncate(agent.max_targets.max(1));
    candidates
}

/// Immune cells: chase or wander, then move.
pub fn steer_agents(world: &mut World, params: &Params, rng: &mut impl Rng, frames: f32) {
    let World { cells, agents, .. } = world;

    for agent in agents.values_mut() {
        if !agent.is_alive() {
            continue;
        }

        let locked = select_targets(agent, cells, params);
        if let Some(&(nearest, _)) = locked.first() {
            let role = if cells.get(nearest).is_some_and(Cell::is_player) {
                TargetRole::Player
            } else {
                TargetRole::Child
            };

            let mut aim = Array1::<f32>::zeros(2);
            let mut count = 0.0;
            for cell in locked.iter().filter_map(|(id, _)| cells.get(*id)) {
                aim += &cell.pos;
                count += 1.0;
            }
            aim /= count;
            if let Some(dir) = direction_to(&agent.pos, &aim) {
                agent.dir = dir;
            }

            let targets = locked.into_iter().map(|(id, _)| id).collect();
            agent.engage(targets, role, params.chase_acceleration, frames);
        } else {
            agent.disengage(params.idle_deceleration, frames);
            let Agent {
                dir, wander_timer, ..
            } = agent;
            wander(dir, wander_timer, params, rng, frames);
        }

        agent.advance(frames, params);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::kinds::{self, AgentKind, NutrientKind};
    use crate::simulation::nutrient::Nutrient;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn at(x: f32, y: f32) -> Array1<f32> {
        Array1::from_vec(vec![x, y])
    }

    fn child(world: &mut World, x: f32, y: f32) -> CellId {
        let cfg = &kinds::default_cell_kinds()[0];
        let parent = Cell::new_player(cfg, at(0.0, 0.0), 100.0);
        world
            .cells
            .insert(Cell::new_child(&parent, at(x, y), 0.0, 6.0, 100.0))
    }

    fn nutrient(world: &mut World, kind: NutrientKind, x: f32, y: f32) {
        let params = Params::default();
        let cfg = params.nutrient_kind(kind).unwrap();
        world.nutrients.insert(Nutrient::new(cfg, at(x, y)));
    }

    fn agent(world: &mut World, kind: AgentKind, x: f32, y: f32) -> crate::simulation::agent::AgentId {
        let params = Params::default();
        let cfg = params.agent_kind(kind).unwrap();
        world
            .agents
            .insert(Agent::new(cfg, at(x, y), at(1.0, 0.0), &params))
    }

    #[test]
    fn children_forage_only_digestible_nutrients() {
        let params = Params::default();
        let mut rng = SmallRng::seed_from_u64(1);
        let mut world = World::new();
        let id = child(&mut world, 400.0, 300.0);
        nutrient(&mut world, NutrientKind::Lipid, 410.0, 300.0);
        nutrient(&mut world, NutrientKind::Protein, 400.0, 360.0);

        steer_cells(&mut world, &params, &mut rng, 1.0);

        let cell = &world.cells[id];
        assert!(cell.target.is_some());
        assert!(cell.dir[1] > 0.99);
        assert!((cell.pos[1] - 302.0).abs() < 1e-4);
    }

    #[test]
    fn children_flee_nearby_agents() {
        let params = Params::default();
        let mut rng = SmallRng::seed_from_u64(2);
        let mut world = World::new();
        let id = child(&mut world, 400.0, 300.0);
        nutrient(&mut world, NutrientKind::Carbohydrate, 300.0, 300.0);
        agent(&mut world, AgentKind::Neutrophil, 350.0, 300.0);

        steer_cells(&mut world, &params, &mut rng, 1.0);

        assert_eq!(world.cells[id].dir.to_vec(), vec![1.0, 0.0]);
    }

    #[test]
    fn player_keeps_still_without_input() {
        let params = Params::default();
        let mut rng = SmallRng::seed_from_u64(3);
        let mut world = World::new();
        let cfg = &kinds::default_cell_kinds()[0];
        let id = world.cells.insert(Cell::new_player(cfg, at(400.0, 300.0), 100.0));
        agent(&mut world, AgentKind::Neutrophil, 420.0, 300.0);

        steer_cells(&mut world, &params, &mut rng, 1.0);

        assert_eq!(world.cells[id].pos.to_vec(), vec![400.0, 300.0]);
    }

    #[test]
    fn wandering_keeps_unit_headings() {
        let params = Params::default();
        let mut rng = SmallRng::seed_from_u64(4);
        let mut world = World::new();
        let cell = child(&mut world, 400.0, 300.0);
        let hunter = agent(&mut world, AgentKind::Macrophage, 100.0, 100.0);

        for _ in 0..500 {
            steer(&mut world, &params, &mut rng, 1.0);
            let len = world.cells[cell].dir.mapv(|x| x * x).sum().sqrt();
            assert!((len - 1.0).abs() < 1e-4);
            let len = world.agents[hunter].dir.mapv(|x| x * x).sum().sqrt();
            assert!((len - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn hunters_chase_the_player() {
        let params = Params::default();
        let mut rng = SmallRng::seed_from_u64(5);
        let mut world = World::new();
        let cfg = &kinds::default_cell_kinds()[0];
        let player = world.cells.insert(Cell::new_player(cfg, at(400.0, 300.0), 100.0));
        let hunter = agent(&mut world, AgentKind::Neutrophil, 300.0, 300.0);

        steer_agents(&mut world, &params, &mut rng, 1.0);

        let agent = &world.agents[hunter];
        assert!(agent.is_chasing);
        assert_eq!(agent.targets, vec![player]);
        assert_eq!(agent.target_role, TargetRole::Player);
        assert!(agent.dir[0] > 0.99);
    }

    #[test]
    fn small_agents_ignore_large_children() {
        let params = Params::default();
        let mut rng = SmallRng::seed_from_u64(6);
        let mut world = World::new();
        let id = child(&mut world, 400.0, 300.0);
        world.cells[id].size = 30.0;
        let hunter = agent(&mut world, AgentKind::Neutrophil, 380.0, 300.0);

        steer_agents(&mut world, &params, &mut rng, 1.0);

        assert!(!world.agents[hunter].is_chasing);
    }

    #[test]
    fn engulfers_lock_several_targets() {
        let params = Params::default();
        let mut rng = SmallRng::seed_from_u64(7);
        let mut world = World::new();
        for y in [280.0, 300.0, 320.0, 340.0] {
            child(&mut world, 400.0, y);
        }
        let engulfer = agent(&mut world, AgentKind::Macrophage, 300.0, 310.0);

        steer_agents(&mut world, &params, &mut rng, 1.0);

        let agent = &world.agents[engulfer];
        assert_eq!(agent.targets.len(), 3);
        assert_eq!(agent.target_role, TargetRole::Child);
    }

    #[test]
    fn tagging_extends_detection_range() {
        let params = Params::default();
        let mut rng = SmallRng::seed_from_u64(8);
        let mut world = World::new();
        let id = child(&mut world, 560.0, 300.0);
        let hunter = agent(&mut world, AgentKind::Neutrophil, 400.0, 300.0);

        steer_agents(&mut world, &params, &mut rng, 0.0);
        assert!(!world.agents[hunter].is_chasing);

        world.agents[hunter].pos = at(400.0, 300.0);
        world.cells[id].tag(300.0, params.tag_visibility_boost);
        steer_agents(&mut world, &params, &mut rng, 0.0);
        assert!(world.agents[hunter].is_chasing);
    }
}
