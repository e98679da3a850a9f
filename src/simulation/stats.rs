use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Counters and bounded history for a single run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStats {
    /// Nutrients eaten by any friendly cell.
    pub nutrients_consumed: u32,
    /// Successful splits.
    pub splits: u32,
    /// Colonies created.
    pub colonies_formed: u32,
    /// Colonies dissolved.
    pub colonies_dissolved: u32,
    /// Friendly cells lost to immune cells or starvation.
    pub cells_lost: u32,
    /// Immune cells introduced, including the initial ones.
    pub agents_spawned: u32,
    /// Largest radius the player reached.
    pub peak_player_size: f32,
    /// Recent `(time, score)` samples
    pub score_history: VecDeque<(f64, f64)>,
    /// Recent `(time, friendly cell count)` samples
    pub population_history: VecDeque<(f64, f64)>,
    /// Maximum number of samples kept per history
    pub max_history: usize,
    /// Seconds between samples
    pub sample_interval: f32,
    last_sample: Option<f32>,
}

impl Default for RunStats {
    fn default() -> Self {
        Self {
            nutrients_consumed: 0,
            splits: 0,
            colonies_formed: 0,
            colonies_dissolved: 0,
            cells_lost: 0,
            agents_spawned: 0,
            peak_player_size: 0.0,
            score_history: VecDeque::new(),
            population_history: VecDeque::new(),
            max_history: 500,
            sample_interval: 0.5,
            last_sample: None,
        }
    }
}

impl RunStats {
    /// Records the latest score and population if a sample is due.
    pub fn sample(&mut self, time: f32, score: f32, population: usize) {
        if self
            .last_sample
            .is_some_and(|last| time - last < self.sample_interval)
        {
            return;
        }
        self.last_sample = Some(time);

        self.score_history.push_back((time as f64, score as f64));
        self.population_history
            .push_back((time as f64, population as f64));

        if self.score_history.len() > self.max_history {
            self.score_history.pop_front();
        }
        if self.population_history.len() > self.max_history {
            self.population_history.pop_front();
        }
    }

    /// Raises the recorded peak player size if `size` exceeds it.
    pub fn observe_player_size(&mut self, size: f32) {
        self.peak_player_size = self.peak_player_size.max(size);
    }
}
