//! Per-tick enemy spawning
//!
//! Two-stage selection: pick one eligible category uniformly, then roll that
//! category's spawn chance. At most one enemy enters per tick.

use glam::Vec2;
use rand::Rng;

use super::entities::{EnemyKind, Plane, Projectile, TargetPreference};
use super::state::GameState;
use crate::consts::*;

/// Per-tick base spawn chance for a category
pub fn base_chance(kind: EnemyKind) -> f32 {
    match kind {
        EnemyKind::Missile => 0.020,
        EnemyKind::Mirv => 0.010,
        EnemyKind::SmartBomb => 0.010,
        EnemyKind::Plane => 0.005,
        EnemyKind::ShieldBomb => 0.004,
        EnemyKind::PlaneBomb => 0.0,
    }
}

/// Spawn probability for a category on a given (1-based) wave
pub fn spawn_probability(kind: EnemyKind, wave: u32, speed_factor: f32) -> f32 {
    let wave_scale = (1.0 + wave as f32 * 0.15).min(5.0);
    (base_chance(kind) * wave_scale * speed_factor.min(3.0)).min(0.75)
}

/// Choose a candidate with draw `pick` and spawn it if `roll` beats its chance
///
/// `eligible` pairs each part index with its probability. Both draws are
/// uniform in [0, 1).
pub fn choose(eligible: &[(usize, f32)], pick: f32, roll: f32) -> Option<usize> {
    if eligible.is_empty() {
        return None;
    }
    let slot = ((pick * eligible.len() as f32) as usize).min(eligible.len() - 1);
    let (index, chance) = eligible[slot];
    (roll < chance).then_some(index)
}

/// Run the scheduler for one tick; returns the category spawned, if any
pub fn run(state: &mut GameState) -> Option<EnemyKind> {
    if state.wave.all_spawned() {
        return None;
    }
    let wave = state.wave.number;
    let eligible: Vec<(usize, f32)> = state
        .wave
        .eligible()
        .map(|(i, p)| (i, spawn_probability(p.kind, wave, p.speed_factor)))
        .collect();

    let pick: f32 = state.rng.random();
    let roll: f32 = state.rng.random();
    let index = choose(&eligible, pick, roll)?;
    let part = state.wave.descriptor.parts()[index];

    spawn_enemy(state, part.kind, part.speed_factor);
    state.wave.record_spawn(index, state.time_ticks);
    if let Some(last) = state.wave.last_spawn_tick {
        let took = last.saturating_sub(state.wave.started_tick);
        log::info!("Wave {wave}: all {} enemies spawned after {took} ticks", state.wave.required);
    }
    Some(part.kind)
}

/// Create one enemy of `kind` at its entry point
pub fn spawn_enemy(state: &mut GameState, kind: EnemyKind, speed_factor: f32) {
    let speed = ENEMY_BASE_SPEED * speed_factor * state.settings.difficulty.enemy_speed();
    let id = state.ids.next_id();
    match kind {
        EnemyKind::Plane => {
            let from_left = state.rng.random_bool(0.5);
            let altitude = state.rng.random_range(PLANE_MIN_ALTITUDE..PLANE_MAX_ALTITUDE);
            let drop_timer = state
                .rng
                .random_range(PLANE_DROP_MIN_TICKS..=PLANE_DROP_MAX_TICKS);
            let plane_speed =
                PLANE_SPEED * speed_factor.min(3.0) * state.settings.difficulty.enemy_speed();
            state
                .planes
                .push(Plane::new(id, from_left, altitude, plane_speed, drop_timer));
        }
        _ => {
            let start = Vec2::new(state.rng.random_range(0.0..FIELD_WIDTH), 0.0);
            let target = state
                .structures
                .pick_target(TargetPreference::Any, &mut state.rng);
            let speed = if kind == EnemyKind::ShieldBomb {
                speed * SHIELD_BOMB_SPEED_SCALE
            } else {
                speed
            };
            state
                .projectiles
                .push(Projectile::new(id, kind, start, target, speed));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::waves::{WaveDescriptor, WavePart, WaveProgress};
    use proptest::prelude::*;

    #[test]
    fn test_probability_caps() {
        // 0.02 * min(5, 1 + 1*0.15) * 1.0
        assert!((spawn_probability(EnemyKind::Missile, 1, 1.0) - 0.023).abs() < 1e-6);
        // Wave scale tops out at 5, speed at 3
        assert!((spawn_probability(EnemyKind::Plane, 500, 10.0) - 0.075).abs() < 1e-6);
        // Overall cap
        assert!(spawn_probability(EnemyKind::Missile, 500, 100.0) <= 0.75);
        assert!(
            spawn_probability(EnemyKind::ShieldBomb, 5, 1.0)
                < spawn_probability(EnemyKind::Missile, 5, 1.0)
        );
    }

    #[test]
    fn test_choose_two_stage() {
        let eligible = [(0, 0.5), (3, 0.1)];
        // First candidate, roll succeeds
        assert_eq!(choose(&eligible, 0.2, 0.4), Some(0));
        // Second candidate, roll fails against its own chance
        assert_eq!(choose(&eligible, 0.7, 0.4), None);
        assert_eq!(choose(&eligible, 0.99, 0.05), Some(3));
        assert_eq!(choose(&[], 0.5, 0.0), None);
    }

    #[test]
    fn test_spawned_entities_enter_from_edges() {
        let mut state = GameState::new(5, Settings::default());
        spawn_enemy(&mut state, EnemyKind::Missile, 1.0);
        spawn_enemy(&mut state, EnemyKind::Plane, 1.0);
        spawn_enemy(&mut state, EnemyKind::ShieldBomb, 1.0);
        assert_eq!(state.projectiles[0].pos.y, 0.0);
        assert!(state.planes[0].pos.x < 0.0 || state.planes[0].pos.x > FIELD_WIDTH);
        assert_eq!(state.planes[0].vel.y, 0.0);
        let bomb = &state.projectiles[1];
        assert!(bomb.armor.is_some());
        assert!((bomb.speed - ENEMY_BASE_SPEED * SHIELD_BOMB_SPEED_SCALE).abs() < 1e-5);
    }

    #[test]
    fn test_records_last_spawn_tick() {
        let mut state = GameState::new(11, Settings::default());
        state.wave = WaveProgress::new(
            1,
            WaveDescriptor::new([WavePart::new(EnemyKind::Missile, 2, 3.0)]),
            0,
        );
        let mut ticks = 0;
        while !state.wave.all_spawned() && ticks < 10_000 {
            state.time_ticks += 1;
            run(&mut state);
            ticks += 1;
        }
        assert!(state.wave.all_spawned());
        assert_eq!(state.wave.last_spawn_tick, Some(state.time_ticks));
        assert_eq!(run(&mut state), None);
    }

    proptest! {
        #[test]
        fn prop_quota_never_exceeded(seed in any::<u64>(), wave_index in 0u32..30) {
            let mut state = GameState::new(seed, Settings::default());
            let desc = state.waves.wave(wave_index).unwrap();
            state.wave = WaveProgress::new(wave_index + 1, desc.clone(), 0);
            for _ in 0..3_000 {
                state.time_ticks += 1;
                run(&mut state);
            }
            for part in desc.parts() {
                prop_assert!(state.wave.spawned_of(part.kind) <= part.count);
            }
            let planes = state.planes.len() as u32;
            prop_assert!(planes <= desc.part(EnemyKind::Plane).map_or(0, |p| p.count));
        }
    }
}
