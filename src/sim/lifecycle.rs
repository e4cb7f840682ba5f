//! Wave and game lifecycle
//!
//! `Spawning -> Draining -> (Store | AutoAdvance) -> Spawning`, with
//! `GameOver` reachable from either active phase.

use glam::Vec2;

use super::entities::{Fate, Satellite, Shield};
use super::state::{Completion, GameEvent, GamePhase, GameState};
use super::waves::WaveProgress;
use crate::consts::*;
use crate::error::SimError;
use crate::in_field;

/// Start the current wave, halting the run if it cannot be set up
pub fn begin_wave_or_halt(state: &mut GameState) {
    if let Err(err) = start_wave(state) {
        log::error!("{err}; halting run");
        state.halted = true;
        state.phase = GamePhase::GameOver;
    }
}

/// Set up the wave at `run.wave_index`: refill, apply the inventory and
/// reset per-wave bookkeeping
pub fn start_wave(state: &mut GameState) -> Result<(), SimError> {
    let number = state.wave_number();
    let descriptor = state
        .waves
        .wave(state.run.wave_index)
        .map_err(|err| SimError::WaveInit {
            wave: number,
            reason: err.to_string(),
        })?;

    refill_ammo(state);
    apply_inventory(state);

    state.wave = WaveProgress::new(number, descriptor, state.time_ticks);
    state.run.cities_at_wave_start = state.structures.cities_alive() as u32;
    state.run.board.reset_round();
    state.phase = GamePhase::Spawning;
    state.events.push(GameEvent::WaveStarted { wave: number });
    log::info!(
        "Wave {number} started: {} enemies, {} cities standing",
        state.wave.required,
        state.run.cities_at_wave_start
    );
    Ok(())
}

fn refill_ammo(state: &mut GameState) {
    let base_ammo = state.run.upgrades.base_ammo();
    let satellite_ammo = state.run.upgrades.satellite_ammo();
    for base in state.structures.bases.iter_mut().filter(|b| b.alive) {
        base.ammo = base_ammo;
    }
    for sat in state.structures.satellites.iter_mut().filter(|s| s.alive) {
        sat.ammo = satellite_ammo;
    }
}

/// Move purchased items onto the field; anything without room stays in stock
fn apply_inventory(state: &mut GameState) {
    let inventory = &mut state.run.inventory;
    let structures = &mut state.structures;

    for base in structures.bases.iter_mut().filter(|b| b.alive && b.shield.is_none()) {
        if inventory.base_shields == 0 {
            break;
        }
        base.shield = Some(Shield::default());
        inventory.base_shields -= 1;
    }

    let satellite_ammo = state.run.upgrades.satellite_ammo();
    for &(x, y) in SATELLITE_SLOTS.iter() {
        if inventory.satellites == 0 {
            break;
        }
        let slot = Vec2::new(x, y);
        match structures.satellites.iter_mut().find(|s| s.pos == slot) {
            Some(sat) if sat.alive => continue,
            // Rebuild in place so structure indices stay stable
            Some(sat) => *sat = Satellite::new(slot, satellite_ammo),
            None => structures.satellites.push(Satellite::new(slot, satellite_ammo)),
        }
        inventory.satellites -= 1;
        log::debug!("Satellite deployed at ({x:.0}, {y:.0})");
    }

    for city in structures.cities.iter_mut().filter(|c| !c.alive) {
        if inventory.city_rebuilds == 0 {
            break;
        }
        city.alive = true;
        inventory.city_rebuilds -= 1;
    }
}

/// Cities and launch capability are independently fatal
pub fn is_game_over(state: &GameState) -> bool {
    let s = &state.structures;
    s.cities_alive() == 0 || (s.bases_alive() == 0 && s.satellites_alive() == 0)
}

/// Whether the wave is over, and why
pub fn wave_completion(state: &GameState) -> Option<Completion> {
    if !state.wave.all_spawned() {
        return None;
    }

    let live_explosions = state.explosions.iter().filter(|e| !e.is_done()).count();
    if state.live_enemies() == 0 && live_explosions == 0 && state.area_denial.is_none() {
        return Some(Completion::Cleared);
    }

    let onscreen = |pos: Vec2| in_field(pos, OFFSCREEN_MARGIN);
    let stuck_offscreen = state.area_denial.is_none()
        && !state.projectiles.iter().any(|p| p.alive && onscreen(p.pos))
        && !state.planes.iter().any(|p| p.alive && onscreen(p.pos))
        && !state.explosions.iter().any(|e| !e.is_done() && onscreen(e.center));
    if stuck_offscreen {
        return Some(Completion::Offscreen);
    }

    let since_last = state
        .wave
        .last_spawn_tick
        .map(|tick| state.time_ticks.saturating_sub(tick))?;
    (since_last >= WAVE_TIMEOUT_TICKS).then_some(Completion::Timeout)
}

/// Close out the current wave: clear leftovers, score the bonus and move to
/// the between-wave phase
pub fn finish_wave(state: &mut GameState, completion: Completion) {
    let wave = state.wave_number();

    for p in state.projectiles.iter_mut().filter(|p| p.alive) {
        p.kill(Fate::Cleared);
    }
    for plane in state.planes.iter_mut().filter(|p| p.alive) {
        plane.kill(Fate::Cleared);
    }
    state.player_missiles.clear();
    state.explosions.clear();
    state.area_denial = None;
    state.compact();

    let cities = state.structures.cities_alive() as u32;
    let ammo: u32 = state
        .structures
        .bases
        .iter()
        .filter(|b| b.alive)
        .map(|b| b.ammo)
        .chain(state.structures.satellites.iter().filter(|s| s.alive).map(|s| s.ammo))
        .sum();
    let bonus = state
        .run
        .board
        .award(cities * CITY_SURVIVAL_BONUS + ammo * AMMO_BONUS);

    let lost = state.run.cities_at_wave_start.saturating_sub(cities);
    if lost > 0 && state.run.bonus_missiles > 0 {
        state.run.bonus_missiles = state.run.bonus_missiles.saturating_sub(lost);
        log::debug!("Lost {lost} cities, bonus missiles down to {}", state.run.bonus_missiles);
    }

    if let Some(last) = state.wave.last_spawn_tick {
        state
            .run
            .spawn_durations
            .push(last.saturating_sub(state.wave.started_tick));
    }

    state.events.push(GameEvent::WaveCompleted {
        wave,
        completion,
        bonus,
    });
    log::info!(
        "Wave {wave} complete ({completion:?}): round score {}, bonus {bonus}",
        state.run.board.round_score
    );

    state.run.wave_index += 1;
    if state.settings.store_between_waves {
        state.phase = GamePhase::Store;
    } else {
        state.phase = GamePhase::AutoAdvance;
        state.advance_ticks = AUTO_ADVANCE_TICKS;
    }
}

/// Leave the store and start the next wave
pub fn close_store(state: &mut GameState) -> Result<(), SimError> {
    if state.phase != GamePhase::Store {
        return Err(SimError::NotAccepting("the store is closed"));
    }
    begin_wave_or_halt(state);
    Ok(())
}

fn end_run(state: &mut GameState) {
    state.phase = GamePhase::GameOver;
    let wave = state.wave_number();
    let score = state.score();
    state.events.push(GameEvent::GameOver { wave, score });
    log::info!("Game over on wave {wave} with {score} points");
}

/// Advance the state machine after the update pass
pub fn step(state: &mut GameState) {
    match state.phase {
        GamePhase::GameOver | GamePhase::Store => {}
        GamePhase::AutoAdvance => {
            state.advance_ticks = state.advance_ticks.saturating_sub(1);
            if state.advance_ticks == 0 {
                begin_wave_or_halt(state);
            }
        }
        GamePhase::Spawning | GamePhase::Draining => {
            if is_game_over(state) {
                end_run(state);
                return;
            }
            if state.phase == GamePhase::Spawning && state.wave.all_spawned() {
                state.phase = GamePhase::Draining;
            }
            if state.phase == GamePhase::Draining {
                if let Some(completion) = wave_completion(state) {
                    finish_wave(state, completion);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::entities::{AreaDenial, EnemyKind, Explosion};
    use crate::sim::waves::WaveTable;

    /// State with every enemy of wave 1 already spawned
    fn drained_state(settings: Settings) -> GameState {
        let mut state = GameState::new(3, settings);
        state.wave.spawned_total = state.wave.required;
        state.wave.last_spawn_tick = Some(0);
        state.phase = GamePhase::Draining;
        state.events.clear();
        state
    }

    fn completed(state: &GameState) -> Option<(Completion, u64)> {
        state.events.iter().find_map(|e| match e {
            GameEvent::WaveCompleted {
                completion, bonus, ..
            } => Some((*completion, *bonus)),
            _ => None,
        })
    }

    #[test]
    fn test_cleared_wave_scores_bonus() {
        let mut state = drained_state(Settings::default());
        step(&mut state);
        // 6 cities * 100 + 30 ammo * 5
        assert_eq!(completed(&state), Some((Completion::Cleared, 750)));
        assert_eq!(state.phase, GamePhase::AutoAdvance);
        assert_eq!(state.run.wave_index, 1);
        assert_eq!(state.run.spawn_durations, vec![0]);
    }

    #[test]
    fn test_live_explosion_blocks_completion() {
        let mut state = drained_state(Settings::default());
        state.add_explosion(Explosion::new(500, Vec2::new(300.0, 300.0), 30.0, 40));
        assert_eq!(wave_completion(&state), None);
        state.explosions.clear();
        state.area_denial = Some(AreaDenial {
            center: Vec2::new(300.0, 300.0),
            radius: AREA_DENIAL_RADIUS,
            ticks_left: 10,
        });
        assert_eq!(wave_completion(&state), None);
    }

    #[test]
    fn test_force_completion_offscreen() {
        let mut state = drained_state(Settings::default());
        state.time_ticks = 50;
        state.add_projectile(
            EnemyKind::Missile,
            Vec2::new(-500.0, 300.0),
            Vec2::new(-500.0, 310.0),
            0.0,
        );
        step(&mut state);
        assert_eq!(completed(&state).map(|(c, _)| c), Some(Completion::Offscreen));
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_force_completion_timeout() {
        let mut state = drained_state(Settings::default());
        state.add_projectile(
            EnemyKind::Missile,
            Vec2::new(400.0, 300.0),
            Vec2::new(400.0, 310.0),
            0.0,
        );
        state.time_ticks = WAVE_TIMEOUT_TICKS - 1;
        step(&mut state);
        assert_eq!(completed(&state), None);
        state.time_ticks = WAVE_TIMEOUT_TICKS;
        step(&mut state);
        assert_eq!(completed(&state).map(|(c, _)| c), Some(Completion::Timeout));
    }

    #[test]
    fn test_auto_advance_starts_next_wave() {
        let mut state = drained_state(Settings::default());
        step(&mut state);
        for _ in 0..AUTO_ADVANCE_TICKS - 1 {
            step(&mut state);
        }
        assert_eq!(state.phase, GamePhase::AutoAdvance);
        step(&mut state);
        assert_eq!(state.phase, GamePhase::Spawning);
        assert_eq!(state.wave.number, 2);
        assert_eq!(state.wave.required, 12);
        assert!(state.events.contains(&GameEvent::WaveStarted { wave: 2 }));
    }

    #[test]
    fn test_store_waits_for_close() {
        let settings = Settings {
            store_between_waves: true,
            ..Settings::default()
        };
        let mut state = drained_state(settings);
        assert!(close_store(&mut state).is_err());
        step(&mut state);
        assert_eq!(state.phase, GamePhase::Store);
        for _ in 0..500 {
            step(&mut state);
        }
        assert_eq!(state.phase, GamePhase::Store);
        assert!(close_store(&mut state).is_ok());
        assert_eq!(state.phase, GamePhase::Spawning);
        assert_eq!(state.wave_number(), 2);
    }

    #[test]
    fn test_inventory_applied_at_wave_start() {
        let mut state = drained_state(Settings::default());
        state.structures.cities[2].alive = false;
        state.structures.bases[0].ammo = 0;
        state.run.inventory.base_shields = 5;
        state.run.inventory.satellites = 1;
        state.run.inventory.city_rebuilds = 2;
        state.run.upgrades.ammo_level = 1;
        state.run.wave_index = 1;
        begin_wave_or_halt(&mut state);

        assert!(state.structures.bases.iter().all(|b| b.shield.is_some()));
        assert_eq!(state.run.inventory.base_shields, 2);
        assert_eq!(state.structures.satellites_alive(), 1);
        assert_eq!(state.structures.satellites[0].ammo, SATELLITE_AMMO + AMMO_PER_LEVEL);
        assert_eq!(state.structures.cities_alive(), 6);
        assert_eq!(state.run.inventory.city_rebuilds, 1);
        assert_eq!(state.structures.bases[0].ammo, BASE_AMMO + AMMO_PER_LEVEL);
        assert_eq!(state.run.cities_at_wave_start, 6);
    }

    #[test]
    fn test_dead_satellite_rebuilt_in_place() {
        let mut state = drained_state(Settings::default());
        state.run.inventory.satellites = 1;
        begin_wave_or_halt(&mut state);
        state.structures.satellites[0].alive = false;
        state.run.inventory.satellites = 1;
        begin_wave_or_halt(&mut state);
        assert_eq!(state.structures.satellites.len(), 1);
        assert!(state.structures.satellites[0].alive);
    }

    #[test]
    fn test_bonus_missiles_erode_with_city_losses() {
        let mut state = drained_state(Settings::default());
        state.run.bonus_missiles = 3;
        state.structures.cities[0].alive = false;
        state.structures.cities[1].alive = false;
        step(&mut state);
        assert_eq!(state.run.bonus_missiles, 1);
    }

    #[test]
    fn test_terminal_conditions() {
        let mut state = drained_state(Settings::default());
        for city in &mut state.structures.cities {
            city.alive = false;
        }
        assert!(is_game_over(&state));

        let mut state = drained_state(Settings::default());
        for base in &mut state.structures.bases {
            base.alive = false;
        }
        assert!(is_game_over(&state));
        state.structures.satellites.push(Satellite::new(Vec2::new(220.0, 140.0), 6));
        assert!(!is_game_over(&state));
        state.structures.satellites[0].alive = false;

        step(&mut state);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.events.contains(&GameEvent::GameOver { wave: 1, score: 0 }));
        // No completion once the run is over
        assert_eq!(completed(&state), None);
    }

    #[test]
    fn test_wave_init_failure_halts() {
        let state = GameState::with_waves(1, Settings::default(), WaveTable::empty());
        assert!(state.halted);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(!state.accepting_fire());
    }
}
