//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically. Per tick:
//! commands, spawn scheduler, update pass (collisions and scoring happen
//! inside it), deferred kill accounting, compaction, lifecycle, then the
//! event flush to the host.

use glam::Vec2;

use super::state::{GamePhase, GameState};
use super::{commands, lifecycle, scoring, spawner, update};
use crate::audio::{SoundEvent, cue_for};
use crate::error::PersistError;
use crate::persistence::RunSummary;
use crate::settings::KillAccounting;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Fire interceptors at this point
    pub fire_at: Option<Vec2>,
    /// Spend a bomb charge here
    pub detonate_bomb_at: Option<Vec2>,
    /// Spend an area denial charge here
    pub area_denial_at: Option<Vec2>,
    /// Pause toggle
    pub pause: bool,
    /// Leave the between-wave store
    pub close_store: bool,
}

/// Host collaborators notified by the tick
///
/// Both methods have no-op defaults. Errors from `run_finished` are logged
/// and never reach the simulation.
pub trait SimHooks {
    fn sound(&mut self, _cue: SoundEvent) {}

    fn run_finished(&mut self, _summary: &RunSummary) -> Result<(), PersistError> {
        Ok(())
    }
}

impl SimHooks for () {}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, hooks: &mut dyn SimHooks) {
    if state.halted || state.phase == GamePhase::GameOver {
        return;
    }
    if input.pause {
        state.paused = !state.paused;
        log::debug!("Paused: {}", state.paused);
    }
    if state.paused {
        return;
    }

    // Events raised while building the state are still unflushed on tick one
    if state.time_ticks > 0 {
        state.events.clear();
    }
    state.callout = None;
    state.time_ticks += 1;

    apply_commands(state, input);

    if state.phase == GamePhase::Spawning {
        spawner::run(state);
    }

    update::run(state);

    if state.settings.kill_accounting == KillAccounting::Deferred {
        scoring::count_deferred_kills(
            &mut state.run.board,
            &mut state.projectiles,
            &mut state.planes,
        );
    }

    state.compact();
    lifecycle::step(state);

    for cue in state.events.iter().filter_map(cue_for) {
        hooks.sound(cue);
    }

    if state.phase == GamePhase::GameOver {
        let summary = RunSummary::from_state(state);
        if let Err(err) = hooks.run_finished(&summary) {
            log::warn!("Run summary not recorded: {err}");
        }
    }
}

fn apply_commands(state: &mut GameState, input: &TickInput) {
    if input.close_store {
        if let Err(err) = lifecycle::close_store(state) {
            log::debug!("Close store ignored: {err}");
        }
    }
    if let Some(target) = input.fire_at {
        if let Err(err) = commands::fire_at(state, target) {
            log::debug!("Fire rejected: {err}");
        }
    }
    if let Some(at) = input.detonate_bomb_at {
        if let Err(err) = commands::detonate_bomb_at(state, at) {
            log::debug!("Bomb rejected: {err}");
        }
    }
    if let Some(at) = input.area_denial_at {
        if let Err(err) = commands::deploy_area_denial(state, at) {
            log::debug!("Area denial rejected: {err}");
        }
    }
}
