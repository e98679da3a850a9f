//! Event logging system for displaying recent gameplay events.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A logged event for display in the HUD.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggedEvent {
    /// Simulation time when the event occurred
    pub time: f32,
    /// Human-readable description of the event
    pub description: String,
    /// Category of the event (drives the HUD color)
    pub category: EventCategory,
}

/// Event categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventCategory {
    /// A nutrient was eaten
    Feeding,
    /// A cell split off a child
    Split,
    /// A colony formed or dissolved
    Colony,
    /// An immune cell attacked or tagged a cell
    Combat,
    /// A friendly cell was lost
    Loss,
}

/// Event log that tracks recent gameplay events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLog {
    /// Recent events, newest first
    events: VecDeque<LoggedEvent>,
    /// Maximum number of events to keep
    max_events: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(20)
    }
}

impl EventLog {
    /// Creates a new event log with specified capacity
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_events),
            max_events,
        }
    }

    /// Adds a new event to the log
    pub fn log(&mut self, time: f32, description: impl Into<String>, category: EventCategory) {
        self.events.push_front(LoggedEvent {
            time,
            description: description.into(),
            category,
        });

        while self.events.len() > self.max_events {
            self.events.pop_back();
        }
    }

    /// Returns all events, newest first
    pub fn events(&self) -> &VecDeque<LoggedEvent> {
        &self.events
    }

    /// Counts retained events of one category
    pub fn count(&self, category: EventCategory) -> usize {
        self.events.iter().filter(|e| e.category == category).count()
    }

    /// Clears all events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
