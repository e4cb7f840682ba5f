//! Collision and damage resolution
//!
//! Two entry points: `sweep_explosion` resolves a blast against every live
//! enemy, `resolve_impact` decides which structure (if any) absorbs an enemy
//! detonation. Both run inside the update pass; anything they create goes to
//! the staging buffer.

use glam::Vec2;

use super::entities::{
    ArmorHit, EnemyKind, Explosion, Fate, Projectile, Structures, TargetPreference,
};
use super::geometry::{in_circle, in_ellipse};
use super::scoring::Scoreboard;
use super::state::{Callout, GameEvent, GameState, StructureRef};
use crate::consts::*;
use crate::{distance, rotate};

/// Shield bomb reinforcement fan: kind and angle (degrees from straight down)
const REINFORCEMENTS: [(EnemyKind, f32); 4] = [
    (EnemyKind::SmartBomb, 45.0),
    (EnemyKind::SmartBomb, -45.0),
    (EnemyKind::Mirv, 135.0),
    (EnemyKind::Mirv, -135.0),
];

/// What one explosion did to one projectile
enum Hit {
    /// Armor took it
    Absorbed,
    LayerBroken { id: u32, pos: Vec2, layers_left: u8 },
    /// Terminal shield bomb kill
    Depleted { pos: Vec2, speed: f32 },
    Killed { kind: EnemyKind, pos: Vec2 },
}

/// Award points for one kill and raise the event
///
/// Base points go through the multiplier for every credited kill; only
/// defender kills extend the streak.
pub(crate) fn credit_kill(
    state: &mut GameState,
    kind: EnemyKind,
    pos: Vec2,
    base: u32,
    by_player: bool,
) -> u64 {
    let points = state.run.board.award(base);
    if by_player {
        state.run.board.extend_streak();
    }
    state.events.push(GameEvent::EnemyDestroyed { kind, pos, points });
    points
}

/// Resolve one explosion frame against live enemies
///
/// Returns the number of kills made by this sweep.
pub fn sweep_explosion(state: &mut GameState, ex: &mut Explosion) -> u32 {
    if ex.ignore_defenders || ex.radius <= 0.0 {
        return 0;
    }
    let by_player = ex.player;
    let mut kills = 0;

    for i in 0..state.projectiles.len() {
        let hit = {
            let p = &mut state.projectiles[i];
            if !p.alive
                || ex.hit_projectiles.contains(&p.id)
                || !in_circle(p.pos, ex.center, ex.radius)
            {
                continue;
            }
            ex.hit_projectiles.insert(p.id);
            match p.armor.as_mut().map(|armor| armor.hit()) {
                Some(ArmorHit::Absorbed) => Hit::Absorbed,
                Some(ArmorHit::LayerBroken { layers_left }) => Hit::LayerBroken {
                    id: p.id,
                    pos: p.pos,
                    layers_left,
                },
                Some(ArmorHit::Depleted) => {
                    p.kill(Fate::Intercepted { by_player });
                    state.run.board.record_kill(p.kind, &mut p.counted_as_destroyed);
                    Hit::Depleted {
                        pos: p.pos,
                        speed: p.speed,
                    }
                }
                None => {
                    p.kill(Fate::Intercepted { by_player });
                    state.run.board.record_kill(p.kind, &mut p.counted_as_destroyed);
                    Hit::Killed {
                        kind: p.kind,
                        pos: p.pos,
                    }
                }
            }
        };

        match hit {
            Hit::Absorbed => {}
            Hit::LayerBroken { id, pos, layers_left } => {
                log::debug!("Shield bomb {id} lost a layer, {layers_left} left");
                let puff_id = state.ids.next_id();
                let radius = SPLIT_PUFF_RADIUS * (1.0 + 0.5 * layers_left as f32);
                state
                    .staged
                    .explosions
                    .push(Explosion::cosmetic(puff_id, pos, radius, SPLIT_PUFF_DURATION));
                state.events.push(GameEvent::ArmorLayerBroken { id, layers_left });
            }
            Hit::Depleted { pos, speed } => {
                let base = EnemyKind::ShieldBomb.base_points() * SHIELD_BOMB_MULTIPLIER;
                credit_kill(state, EnemyKind::ShieldBomb, pos, base, by_player);
                reinforce(state, pos, speed / SHIELD_BOMB_SPEED_SCALE);
                kills += 1;
            }
            Hit::Killed { kind, pos } => {
                credit_kill(state, kind, pos, kind.base_points(), by_player);
                if by_player && distance(pos, ex.center) <= ACCURACY_THRESHOLD {
                    award_accuracy(state);
                }
                kills += 1;
            }
        }
    }

    for i in 0..state.planes.len() {
        let pos = {
            let plane = &mut state.planes[i];
            if !plane.alive
                || ex.hit_planes.contains(&plane.id)
                || !in_circle(plane.pos, ex.center, ex.radius)
            {
                continue;
            }
            ex.hit_planes.insert(plane.id);
            plane.kill(Fate::Intercepted { by_player });
            state
                .run
                .board
                .record_kill(EnemyKind::Plane, &mut plane.counted_as_destroyed);
            plane.pos
        };
        credit_kill(state, EnemyKind::Plane, pos, PLANE_POINTS, by_player);
        if by_player && distance(pos, ex.center) <= ACCURACY_THRESHOLD {
            award_accuracy(state);
        }
        kills += 1;
    }

    if by_player {
        ex.kill_count += kills;
        if kills > 1 {
            let points = state.run.board.award((kills - 1) * COMBO_POINTS);
            state.callout = Some(Callout::Combo { kills, points });
        }
    }
    kills
}

fn award_accuracy(state: &mut GameState) {
    let points = state.run.board.award(ACCURACY_BONUS);
    // A combo from this tick keeps the callout
    if !matches!(state.callout, Some(Callout::Combo { .. })) {
        state.callout = Some(Callout::Accuracy { points });
    }
}

/// Stage the four reinforcements released by a destroyed shield bomb
fn reinforce(state: &mut GameState, pos: Vec2, speed: f32) {
    for (kind, degrees) in REINFORCEMENTS {
        let offset = rotate(Vec2::new(0.0, REINFORCEMENT_OFFSET), degrees.to_radians());
        let target = state
            .structures
            .pick_target(TargetPreference::Ground, &mut state.rng);
        let id = state.ids.next_id();
        state
            .staged
            .projectiles
            .push(Projectile::new(id, kind, pos + offset, target, speed));
    }
    log::debug!("Shield bomb destroyed at ({:.0}, {:.0}), 4 reinforcements released", pos.x, pos.y);
}

/// Resolve an enemy detonation against the structures
///
/// Absorbers are checked in a fixed order and the first one wins: base shield
/// dome, satellite shield, satellite body, city, base. Returns the structure
/// that took the hit, or None when it hit open ground.
pub fn resolve_impact(
    point: Vec2,
    structures: &mut Structures,
    board: &mut Scoreboard,
    events: &mut Vec<GameEvent>,
) -> Option<StructureRef> {
    for (i, base) in structures.bases.iter_mut().enumerate() {
        if !base.alive || !base.dome().contains(point) {
            continue;
        }
        if let Some(shield) = base.shield.as_mut() {
            let structure = StructureRef::Base(i);
            if shield.absorb(SHIELD_HIT_DAMAGE) {
                base.shield = None;
                log::debug!("Base {i} shield broken");
                events.push(GameEvent::ShieldBroken { structure });
            } else {
                events.push(GameEvent::ShieldHit {
                    structure,
                    strength_left: shield.strength,
                });
            }
            return Some(structure);
        }
    }

    for (i, sat) in structures.satellites.iter_mut().enumerate() {
        if !sat.alive || !in_ellipse(point, sat.pos, SATELLITE_SHIELD_RX, SATELLITE_SHIELD_RY) {
            continue;
        }
        if let Some(shield) = sat.shield.as_mut() {
            let structure = StructureRef::Satellite(i);
            if shield.absorb(SHIELD_HIT_DAMAGE) {
                sat.shield = None;
                log::debug!("Satellite {i} shield broken");
                events.push(GameEvent::ShieldBroken { structure });
            } else {
                events.push(GameEvent::ShieldHit {
                    structure,
                    strength_left: shield.strength,
                });
            }
            return Some(structure);
        }
    }

    for (i, sat) in structures.satellites.iter_mut().enumerate() {
        if sat.alive && sat.hitbox().contains(point) {
            sat.alive = false;
            board.stats.satellites_lost += 1;
            let structure = StructureRef::Satellite(i);
            events.push(GameEvent::StructureDestroyed { structure });
            return Some(structure);
        }
    }

    if point.y >= GROUND_Y - CITY_HEIGHT - IMPACT_MARGIN {
        for (i, city) in structures.cities.iter_mut().enumerate() {
            if city.alive && city.hitbox().contains(point) {
                city.alive = false;
                board.stats.cities_lost += 1;
                board.structure_lost();
                let structure = StructureRef::City(i);
                events.push(GameEvent::StructureDestroyed { structure });
                return Some(structure);
            }
        }
    }

    if point.y >= GROUND_Y - BASE_HEIGHT - IMPACT_MARGIN {
        for (i, base) in structures.bases.iter_mut().enumerate() {
            if base.alive && base.hitbox().contains(point) {
                base.alive = false;
                base.ammo = 0;
                board.stats.bases_lost += 1;
                board.structure_lost();
                let structure = StructureRef::Base(i);
                events.push(GameEvent::StructureDestroyed { structure });
                return Some(structure);
            }
        }
    }

    None
}
