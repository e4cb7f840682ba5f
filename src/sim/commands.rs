//! Defender commands
//!
//! Each command validates against the current state and either applies
//! itself or returns a `SimError` explaining the rejection. Nothing here runs
//! mid-pass, so entities are pushed straight into the live arrays.

use glam::Vec2;

use super::entities::{AreaDenial, Explosion, PlayerMissile};
use super::geometry::nearest;
use super::state::{GameEvent, GameState, LaunchSite};
use crate::consts::*;
use crate::distance;
use crate::error::SimError;

fn ensure_accepting(state: &GameState) -> Result<(), SimError> {
    if state.accepting_fire() {
        Ok(())
    } else {
        Err(SimError::NotAccepting("no wave is in progress"))
    }
}

/// Alive launch sites with ammo that can reach `target`, with their muzzles
fn launch_candidates(state: &GameState, target: Vec2) -> Vec<(LaunchSite, Vec2)> {
    let bases = state
        .structures
        .bases
        .iter()
        .enumerate()
        .filter(|(_, b)| b.alive && b.ammo > 0)
        .map(|(i, b)| (LaunchSite::Base(i), b.muzzle()));
    let satellites = state
        .structures
        .satellites
        .iter()
        .enumerate()
        .filter(|(_, s)| s.alive && s.ammo > 0 && distance(s.pos, target) <= SATELLITE_RANGE)
        .map(|(i, s)| (LaunchSite::Satellite(i), s.pos));
    bases.chain(satellites).collect()
}

/// Fire from the nearest eligible site toward `target`
///
/// Launches `1 + bonus_missiles` interceptors spread horizontally by
/// `FAN_SPREAD` around the target, for one unit of ammo.
pub fn fire_at(state: &mut GameState, target: Vec2) -> Result<LaunchSite, SimError> {
    ensure_accepting(state)?;
    if target.y >= GROUND_Y {
        return Err(SimError::BelowGround {
            x: target.x,
            y: target.y,
        });
    }

    let candidates = launch_candidates(state, target);
    let pick = nearest(target, candidates.iter().map(|c| c.1).enumerate()).ok_or(
        SimError::NoLaunchSite {
            x: target.x,
            y: target.y,
        },
    )?;
    let (site, origin) = candidates[pick];

    match site {
        LaunchSite::Base(i) => state.structures.bases[i].ammo -= 1,
        LaunchSite::Satellite(i) => state.structures.satellites[i].ammo -= 1,
    }

    let count = 1 + state.run.bonus_missiles;
    let speed = state.run.upgrades.missile_speed();
    let radius = state.run.upgrades.blast_radius();
    let center = (count - 1) as f32 / 2.0;
    for k in 0..count {
        let aim = target + Vec2::new((k as f32 - center) * FAN_SPREAD, 0.0);
        let id = state.next_entity_id();
        state
            .player_missiles
            .push(PlayerMissile::new(id, origin, aim, speed, radius));
    }
    state.run.board.stats.missiles_fired += count;
    state.events.push(GameEvent::MissileLaunched { site, count });
    Ok(site)
}

/// Spend a bomb charge: an oversized player blast at `at`, starting this tick
pub fn detonate_bomb_at(state: &mut GameState, at: Vec2) -> Result<(), SimError> {
    ensure_accepting(state)?;
    if state.run.inventory.bombs == 0 {
        return Err(SimError::NoBombs);
    }
    state.run.inventory.bombs -= 1;
    state.run.board.stats.bombs_used += 1;

    let id = state.next_entity_id();
    state.explosions.push(Explosion::player(
        id,
        at,
        BOMB_BLAST_RADIUS,
        BOMB_BLAST_DURATION,
    ));
    state.events.push(GameEvent::ExplosionTriggered {
        pos: at,
        radius: BOMB_BLAST_RADIUS,
        player: true,
    });
    log::debug!("Bomb detonated at ({:.0}, {:.0})", at.x, at.y);
    Ok(())
}

/// Spend an area denial charge; replaces any field already active
pub fn deploy_area_denial(state: &mut GameState, at: Vec2) -> Result<(), SimError> {
    ensure_accepting(state)?;
    if state.run.inventory.area_denials == 0 {
        return Err(SimError::NoAreaDenial);
    }
    state.run.inventory.area_denials -= 1;
    state.area_denial = Some(AreaDenial {
        center: at,
        radius: AREA_DENIAL_RADIUS,
        ticks_left: AREA_DENIAL_TICKS,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::entities::Satellite;
    use crate::sim::state::GamePhase;

    fn state() -> GameState {
        let mut state = GameState::new(9, Settings::default());
        state.events.clear();
        state
    }

    #[test]
    fn test_fire_uses_nearest_base() {
        let mut state = state();
        let site = fire_at(&mut state, Vec2::new(100.0, 300.0)).unwrap();
        assert_eq!(site, LaunchSite::Base(0));
        assert_eq!(state.structures.bases[0].ammo, BASE_AMMO - 1);
        assert_eq!(state.player_missiles.len(), 1);
        assert_eq!(state.run.board.stats.missiles_fired, 1);
        assert!(state.events.contains(&GameEvent::MissileLaunched {
            site: LaunchSite::Base(0),
            count: 1
        }));
    }

    #[test]
    fn test_bonus_missiles_fan_out() {
        let mut state = state();
        state.run.bonus_missiles = 2;
        fire_at(&mut state, Vec2::new(400.0, 200.0)).unwrap();
        let xs: Vec<f32> = state.player_missiles.iter().map(|m| m.target.x).collect();
        assert_eq!(xs, vec![370.0, 400.0, 430.0]);
        // One round of ammo regardless of the fan size
        assert_eq!(state.structures.bases[1].ammo, BASE_AMMO - 1);
        assert_eq!(state.run.board.stats.missiles_fired, 3);
    }

    #[test]
    fn test_dead_or_empty_sites_skipped() {
        let mut state = state();
        state.structures.bases[0].alive = false;
        state.structures.bases[1].ammo = 0;
        let site = fire_at(&mut state, Vec2::new(60.0, 300.0)).unwrap();
        assert_eq!(site, LaunchSite::Base(2));
    }

    #[test]
    fn test_satellite_range() {
        let mut state = state();
        state
            .structures
            .satellites
            .push(Satellite::new(Vec2::new(220.0, 140.0), SATELLITE_AMMO));
        assert_eq!(
            fire_at(&mut state, Vec2::new(230.0, 180.0)).unwrap(),
            LaunchSite::Satellite(0)
        );

        for base in &mut state.structures.bases {
            base.ammo = 0;
        }
        // 360px from the satellite, past its reach
        let err = fire_at(&mut state, Vec2::new(220.0, 500.0)).unwrap_err();
        assert!(matches!(err, SimError::NoLaunchSite { .. }));
    }

    #[test]
    fn test_fire_rejections() {
        let mut state = state();
        assert!(matches!(
            fire_at(&mut state, Vec2::new(300.0, 575.0)),
            Err(SimError::BelowGround { .. })
        ));
        state.phase = GamePhase::Store;
        assert!(matches!(
            fire_at(&mut state, Vec2::new(300.0, 300.0)),
            Err(SimError::NotAccepting(_))
        ));
        assert!(state.player_missiles.is_empty());
    }

    #[test]
    fn test_bomb_detonation() {
        let mut state = state();
        assert_eq!(detonate_bomb_at(&mut state, Vec2::new(300.0, 200.0)), Err(SimError::NoBombs));
        state.run.inventory.bombs = 1;
        detonate_bomb_at(&mut state, Vec2::new(300.0, 200.0)).unwrap();
        assert_eq!(state.run.inventory.bombs, 0);
        assert_eq!(state.run.board.stats.bombs_used, 1);
        let blast = state.explosions.last().unwrap();
        assert!(blast.player);
        assert_eq!(blast.max_radius, BOMB_BLAST_RADIUS);
    }

    #[test]
    fn test_area_denial_charges() {
        let mut state = state();
        assert_eq!(
            deploy_area_denial(&mut state, Vec2::new(400.0, 300.0)),
            Err(SimError::NoAreaDenial)
        );
        state.run.inventory.area_denials = 1;
        deploy_area_denial(&mut state, Vec2::new(400.0, 300.0)).unwrap();
        assert_eq!(state.area_denial.as_ref().map(|z| z.ticks_left), Some(AREA_DENIAL_TICKS));
    }
}
