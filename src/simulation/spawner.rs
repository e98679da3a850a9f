//! Stochastic introduction of nutrients and immune cells.

use ndarray::Array1;
use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use tracing::{debug, trace};

use super::agent::{Agent, AgentId};
use super::events::{EventQueue, SimulationEvent};
use super::kinds::AgentKind;
use super::nutrient::{Nutrient, NutrientId};
use super::params::Params;
use super::world::World;

/// Per-tick spawn rolls for nutrients and immune cells.
pub fn spawn(world: &mut World, params: &Params, rng: &mut impl Rng, events: &mut EventQueue) {
    if world.nutrients.len() < params.max_nutrients
        && rng.random::<f32>() < params.nutrient_spawn_probability
    {
        let id = spawn_nutrient(world, params, rng);
        trace!(?id, "nutrient spawn roll succeeded");
    }

    let agent_probability =
        (params.agent_spawn_probability * params.difficulty.spawn_scale()).min(1.0);
    if world.agents.len() < params.max_agents && rng.random::<f32>() < agent_probability {
        if let Some(agent) = spawn_agent(world, params, rng) {
            let kind = world.agents[agent].kind;
            events.push(SimulationEvent::AgentSpawned { agent, kind });
        }
    }
}

/// Places the initial nutrients and immune cells of a run.
pub fn spawn_initial(world: &mut World, params: &Params, rng: &mut impl Rng, events: &mut EventQueue) {
    for _ in 0..params.initial_nutrients {
        spawn_nutrient(world, params, rng);
    }
    for _ in 0..params.initial_agents {
        if let Some(agent) = spawn_agent(world, params, rng) {
            let kind = world.agents[agent].kind;
            events.push(SimulationEvent::AgentSpawned { agent, kind });
        }
    }
}

/// Adds one nutrient at a random interior position.
///
/// The kind is drawn with probability proportional to its spawn weight.
///
/// # Returns
///
/// The new nutrient's id, or `None` if the cap is reached or no kind has
/// a positive weight.
pub fn spawn_nutrient(world: &mut World, params: &Params, rng: &mut impl Rng) -> Option<NutrientId> {
    if world.nutrients.len() >= params.max_nutrients {
        return None;
    }
    let weights = params.nutrient_kinds.iter().map(|k| k.spawn_weight);
    let index = WeightedIndex::new(weights).ok()?;
    let cfg = &params.nutrient_kinds[index.sample(rng)];

    let margin = params.nutrient_spawn_margin;
    let x = random_between(rng, margin, params.box_width - margin);
    let y = random_between(rng, margin, params.box_height - margin);
    Some(world.nutrients.insert(Nutrient::new(cfg, Array1::from_vec(vec![x, y]))))
}

/// Adds one immune cell of a uniformly chosen kind at a random wall, heading
/// into the dish.
///
/// # Returns
///
/// The new agent's id, or `None` if the cap is reached or the kind table is
/// incomplete.
pub fn spawn_agent(world: &mut World, params: &Params, rng: &mut impl Rng) -> Option<AgentId> {
    if world.agents.len() >= params.max_agents {
        return None;
    }
    let kind = AgentKind::ALL[rng.random_range(0..AgentKind::ALL.len())];
    let cfg = params.agent_kind(kind).ok()?;

    let (w, h, offset) = (params.box_width, params.box_height, params.agent_spawn_offset);
    let (pos, dir) = match rng.random_range(0..4) {
        0 => ([rng.random_range(0.0..=w), -offset], [0.0, 1.0]),
        1 => ([w + offset, rng.random_range(0.0..=h)], [-1.0, 0.0]),
        2 => ([rng.random_range(0.0..=w), h + offset], [0.0, -1.0]),
        _ => ([-offset, rng.random_range(0.0..=h)], [1.0, 0.0]),
    };
    // Entry point lies `agent_spawn_offset` outside the wall; clamp it back in.
    let r = cfg.radius;
    let pos = Array1::from_vec(vec![
        pos[0].max(r).min((w - r).max(r)),
        pos[1].max(r).min((h - r).max(r)),
    ]);
    let dir = Array1::from_vec(dir.to_vec());

    let id = world.agents.insert(Agent::new(cfg, pos, dir, params));
    debug!(?id, %kind, "immune cell spawned");
    Some(id)
}

fn random_between(rng: &mut impl Rng, lo: f32, hi: f32) -> f32 {
    if lo < hi {
        rng.random_range(lo..hi)
    } else {
        (lo + hi) / 2.0
    }
}
