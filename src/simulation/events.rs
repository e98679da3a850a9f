//! Event system for per-tick bookkeeping.
//!
//! The passes mutate entities directly, in a fixed order. Everything that only
//! feeds the score, the run statistics or the HUD log is queued as an event
//! and applied by the game once the tick's passes are done.

use super::agent::AgentId;
use super::cell::CellId;
use super::colony::ColonyId;
use super::kinds::{AgentKind, NutrientKind};

/// Events produced by the simulation passes.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationEvent {
    /// A friendly cell ate a nutrient.
    NutrientConsumed {
        /// The eater.
        cell: CellId,
        /// Kind of the nutrient eaten.
        kind: NutrientKind,
        /// Energy value, added to the score.
        energy: f32,
    },
    /// A friendly cell split off a child.
    CellSplit {
        /// The cell that split.
        parent: CellId,
        /// The new child.
        child: CellId,
    },
    /// An immune cell damaged a friendly cell.
    CellDamaged {
        /// The attacker.
        agent: AgentId,
        /// The victim.
        cell: CellId,
        /// Size removed.
        damage: f32,
    },
    /// An antibody tagged a friendly cell.
    CellTagged {
        /// The victim.
        cell: CellId,
    },
    /// A child cell was engulfed, starved or worn down.
    CellLost {
        /// The lost cell.
        cell: CellId,
    },
    /// The player cell was caught or died. Ends the run.
    PlayerLost,
    /// A new immune cell entered the dish.
    AgentSpawned {
        /// The new agent.
        agent: AgentId,
        /// Its kind.
        kind: AgentKind,
    },
    /// Cells grouped into a new colony.
    ColonyFormed {
        /// The new colony.
        colony: ColonyId,
        /// Number of founding members.
        members: usize,
    },
    /// A colony fell apart.
    ColonyDissolved,
}

/// Queue for collecting simulation events during a tick.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<SimulationEvent>,
}

impl EventQueue {
    /// Creates an empty event queue.
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Adds an event to the queue.
    pub fn push(&mut self, event: SimulationEvent) {
        self.events.push(event);
    }

    /// Queued events, oldest first.
    pub fn events(&self) -> &[SimulationEvent] {
        &self.events
    }

    /// `true` if the player was lost during this tick.
    pub fn player_lost(&self) -> bool {
        self.events.contains(&SimulationEvent::PlayerLost)
    }

    /// Drains all events from the queue.
    pub fn drain(&mut self) -> std::vec::Drain<'_, SimulationEvent> {
        self.events.drain(..)
    }
}
