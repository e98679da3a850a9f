//! Simulation driver.
//!
//! [`Game`] owns every entity, the RNG and the run bookkeeping. Each call to
//! [`Game::update`] runs one tick in a fixed order:
//!
//! 1. clamp the delta
//! 2. entity lifecycle (energy decay, tag and lifespan countdowns)
//! 3. steering and movement
//! 4. collision and consumption
//! 5. spawning
//! 6. colony management
//! 7. stale reference sweep and wall confinement, then statistics and the clock

use ndarray::Array1;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, info};

use super::cell::{Cell, CellRole};
use super::collision;
use super::colony;
use super::error::ConfigError;
use super::event_log::{EventCategory, EventLog};
use super::events::{EventQueue, SimulationEvent};
use super::kinds::CellKind;
use super::locatable::Locatable;
use super::params::Params;
use super::snapshot::Snapshot;
use super::spawner;
use super::stats::RunStats;
use super::steering;
use super::world::World;

/// One run of the game.
#[derive(Debug, Clone)]
pub struct Game {
    params: Params,
    rng: SmallRng,
    world: World,
    score: f32,
    time: f32,
    running: bool,
    game_over: bool,
    kind: Option<CellKind>,
    event_log: EventLog,
    stats: RunStats,
}

fn seeded_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    }
}

/// Clamps a frame delta into `[0, max_delta]`. NaN becomes 0; an infinite
/// pause counts as one maximum step.
pub fn clamp_delta(dt: f32, max_delta: f32) -> f32 {
    if dt.is_nan() { 0.0 } else { dt.clamp(0.0, max_delta) }
}

impl Game {
    /// Validates `params` and creates an idle game.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] reported by [`Params::validate`].
    pub fn new(params: Params) -> Result<Self, ConfigError> {
        params.validate()?;
        Ok(Self {
            rng: seeded_rng(params.seed),
            event_log: EventLog::new(params.event_log_size),
            params,
            world: World::new(),
            score: 0.0,
            time: 0.0,
            running: false,
            game_over: false,
            kind: None,
            stats: RunStats::default(),
        })
    }

    /// Starts a run with a player of `kind` at the center of the dish.
    ///
    /// Any previous run is discarded first.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingKind`] if the kind table has no entry for `kind`.
    pub fn start(&mut self, kind: CellKind) -> Result<(), ConfigError> {
        self.reset();
        let cfg = self.params.cell_kind(kind)?;
        let center = Array1::from_vec(vec![self.params.box_width / 2.0, self.params.box_height / 2.0]);
        let player = self
            .world
            .cells
            .insert(Cell::new_player(cfg, center, self.params.start_energy));
        self.world.player = Some(player);

        let mut events = EventQueue::new();
        spawner::spawn_initial(&mut self.world, &self.params, &mut self.rng, &mut events);
        self.apply_events(&mut events);

        self.kind = Some(kind);
        self.running = true;
        info!(%kind, seed = ?self.params.seed, "run started");
        Ok(())
    }

    /// Advances the run by `dt` seconds.
    ///
    /// Does nothing before [`Game::start`] or after the run ended.
    pub fn update(&mut self, dt: f32) {
        if !self.running || self.game_over {
            return;
        }
        let dt = clamp_delta(dt, self.params.max_delta);
        let frames = self.params.frames(dt);
        let mut events = EventQueue::new();

        self.update_lifecycle(frames, dt, &mut events);
        if !events.player_lost() {
            steering::steer(&mut self.world, &self.params, &mut self.rng, frames);
            collision::resolve(&mut self.world, &self.params, &mut self.rng, &mut events);
        }
        if !events.player_lost() {
            spawner::spawn(&mut self.world, &self.params, &mut self.rng, &mut events);
            self.manage_colonies(&mut events);
            self.world.clear_stale_references();
            self.world.confine_cells(&self.params);
        }

        self.time += dt;
        if events.player_lost() {
            self.game_over = true;
        }
        self.apply_events(&mut events);

        if let Some(player) = self.world.player_cell() {
            self.stats.observe_player_size(player.size);
        }
        self.stats
            .sample(self.time, self.score, self.world.friendly_count());

        if self.game_over {
            info!(score = self.score, final_score = self.final_score(), time = self.time, "game over");
        }
    }

    fn update_lifecycle(&mut self, frames: f32, dt: f32, events: &mut EventQueue) {
        for (id, cell) in &mut self.world.cells {
            if !cell.is_alive() {
                continue;
            }
            cell.update(frames, dt, &self.params);
            if !cell.is_alive() {
                events.push(match cell.role {
                    CellRole::Player => SimulationEvent::PlayerLost,
                    CellRole::Child => SimulationEvent::CellLost { cell: id },
                });
            }
        }
        for agent in self.world.agents.values_mut() {
            agent.update(frames);
        }
    }

    fn manage_colonies(&mut self, events: &mut EventQueue) {
        let pass = colony::manage_colonies(&mut self.world.colonies, &mut self.world.cells, &self.params);
        for _ in 0..pass.dissolved {
            events.push(SimulationEvent::ColonyDissolved);
        }
        for id in pass.formed {
            let members = self.world.colonies.get(id).map_or(0, colony::Colony::len);
            events.push(SimulationEvent::ColonyFormed { colony: id, members });
        }
        if pass.joined > 0 {
            debug!(joined = pass.joined, "cells joined existing colonies");
        }
    }

    /// Folds the tick's events into score, statistics and the event log.
    fn apply_events(&mut self, events: &mut EventQueue) {
        let time = self.time;
        for event in events.drain() {
            match event {
                SimulationEvent::NutrientConsumed { kind, energy, .. } => {
                    self.score += energy;
                    self.stats.nutrients_consumed += 1;
                    self.event_log
                        .log(time, format!("Ate {kind} (+{energy:.0})"), EventCategory::Feeding);
                }
                SimulationEvent::CellSplit { .. } => {
                    self.stats.splits += 1;
                    self.event_log.log(time, "Cell split", EventCategory::Split);
                }
                SimulationEvent::CellDamaged { .. } => {}
                SimulationEvent::CellTagged { cell } => {
                    debug!(?cell, "cell tagged");
                    self.event_log
                        .log(time, "Antibody tagged a cell", EventCategory::Combat);
                }
                SimulationEvent::CellLost { cell } => {
                    debug!(?cell, "cell lost");
                    self.stats.cells_lost += 1;
                    self.event_log.log(time, "Lost a child cell", EventCategory::Loss);
                }
                SimulationEvent::PlayerLost => {
                    self.stats.cells_lost += 1;
                    self.event_log.log(time, "Player cell lost", EventCategory::Loss);
                }
                SimulationEvent::AgentSpawned { kind, .. } => {
                    self.stats.agents_spawned += 1;
                    self.event_log
                        .log(time, format!("{kind} entered the dish"), EventCategory::Combat);
                }
                SimulationEvent::ColonyFormed { members, .. } => {
                    self.stats.colonies_formed += 1;
                    self.event_log.log(
                        time,
                        format!("Colony formed ({members} cells)"),
                        EventCategory::Colony,
                    );
                }
                SimulationEvent::ColonyDissolved => {
                    self.stats.colonies_dissolved += 1;
                    self.event_log.log(time, "Colony dissolved", EventCategory::Colony);
                }
            }
        }
    }

    /// Points the player along `(dx, dy)`. Zero input keeps the current heading.
    pub fn handle_input(&mut self, dx: f32, dy: f32) {
        if !self.running || self.game_over {
            return;
        }
        if let Some(player) = self.world.player_cell_mut() {
            if player.is_alive() {
                player.set_direction(dx, dy);
            }
        }
    }

    /// Discards the current run. The game is idle until the next
    /// [`Game::start`].
    pub fn reset(&mut self) {
        self.world.clear();
        self.rng = seeded_rng(self.params.seed);
        self.score = 0.0;
        self.time = 0.0;
        self.running = false;
        self.game_over = false;
        self.kind = None;
        self.event_log.clear();
        self.stats = RunStats::default();
        info!("game reset");
    }

    /// `true` once the player was lost.
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// `true` between [`Game::start`] and [`Game::reset`].
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Sum of the energy values of every nutrient eaten.
    pub fn score(&self) -> f32 {
        self.score
    }

    /// Score plus one point per living child, as shown on the game-over screen.
    pub fn final_score(&self) -> f32 {
        self.score + self.world.child_count() as f32
    }

    /// Elapsed simulated seconds.
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Kind chosen for the current run.
    pub fn kind(&self) -> Option<CellKind> {
        self.kind
    }

    /// The player cell, if a run was started.
    pub fn player(&self) -> Option<&Cell> {
        self.world.player_cell()
    }

    /// Read-only render state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.world, self.score, self.game_over, self.time)
    }

    /// Parameters in use.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// All entities.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to all entities, for scripted setups.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Recent gameplay events, newest first.
    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    /// Counters and history of the current run.
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }
}
