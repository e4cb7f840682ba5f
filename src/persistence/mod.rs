//! End-of-run summaries and the local leaderboard
//!
//! The simulation hands a `RunSummary` to `SimHooks::run_finished` when a run
//! ends. `HighScores` is the stock sink: a top-10 table with JSON import and
//! export.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PersistError;
use crate::settings::Difficulty;
use crate::sim::scoring::KillStats;
use crate::sim::state::GameState;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// Final record of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub score: u64,
    /// Wave the run ended on (1-based)
    pub wave: u32,
    pub difficulty: Difficulty,
    pub seed: u64,
    pub stats: KillStats,
    /// Sim ticks elapsed
    pub ticks: u64,
    /// Ticks from wave start to last spawn, per completed wave
    pub spawn_durations: Vec<u64>,
}

impl RunSummary {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            score: state.score(),
            wave: state.wave_number(),
            difficulty: state.settings.difficulty,
            seed: state.seed,
            stats: state.run.board.stats.clone(),
            ticks: state.time_ticks,
            spawn_durations: state.run.spawn_durations.clone(),
        }
    }
}

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Wave reached
    pub wave: u32,
    pub difficulty: Difficulty,
    /// Enemies destroyed over the run
    pub kills: u32,
}

/// High score leaderboard, sorted by descending score
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Slot a score would take in the table, None if it doesn't place
    fn slot_for(&self, score: u64) -> Option<usize> {
        if score == 0 {
            return None;
        }
        let slot = self
            .entries
            .iter()
            .position(|e| score > e.score)
            .unwrap_or(self.entries.len());
        (slot < MAX_HIGH_SCORES).then_some(slot)
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        self.slot_for(score).is_some()
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        self.slot_for(score).map(|slot| slot + 1)
    }

    /// Insert an entry if it qualifies; returns the rank achieved
    pub fn add(&mut self, entry: HighScoreEntry) -> Option<usize> {
        let slot = self.slot_for(entry.score)?;
        self.entries.insert(slot, entry);
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(slot + 1)
    }

    /// Record a finished run
    pub fn add_summary(&mut self, summary: &RunSummary) -> Option<usize> {
        self.add(HighScoreEntry {
            score: summary.score,
            wave: summary.wave,
            difficulty: summary.difficulty,
            kills: summary.stats.total_destroyed(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a table, re-sorting and trimming whatever was stored
    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        let mut scores: HighScores = serde_json::from_str(json)?;
        scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
        scores.entries.truncate(MAX_HIGH_SCORES);
        Ok(scores)
    }

    /// Load from disk, starting fresh if the file is missing or unreadable
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(scores) => {
                    log::info!("Loaded {} high scores", scores.entries.len());
                    scores
                }
                Err(err) => {
                    log::warn!("Ignoring corrupt high score file {}: {err}", path.display());
                    Self::new()
                }
            },
            Err(_) => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), PersistError> {
        std::fs::write(path, self.to_json()?)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}
