//! Per-tick entity update pass
//!
//! Order matters: projectiles (integrate, split, impact), planes, player
//! missiles, explosions (which resolve collisions), the area denial field,
//! then shield flash decay. Everything created along the way is staged and
//! appended once the pass is over.

use rand::Rng;

use super::collision;
use super::entities::{EnemyKind, Explosion, Fate, Projectile, TargetPreference};
use super::geometry::in_circle;
use super::state::{GameEvent, GameState};
use crate::consts::*;
use crate::in_field;

/// Planes count as escaped once this far outside the field
const PLANE_ESCAPE_MARGIN: f32 = 40.0;
/// Plane bombs fall faster than plain missiles
const PLANE_BOMB_SPEED_SCALE: f32 = 1.5;

/// Run the full update pass for one tick
pub fn run(state: &mut GameState) {
    update_projectiles(state);
    update_planes(state);
    update_player_missiles(state);
    update_explosions(state);
    update_area_denial(state);
    decay_shield_flash(state);
    state.commit_staged();
}

fn update_projectiles(state: &mut GameState) {
    for i in 0..state.projectiles.len() {
        {
            let p = &mut state.projectiles[i];
            if !p.alive {
                continue;
            }
            p.pos += p.vel;
            p.record_trail();
        }

        if let Some(children) = split_due(state, i) {
            split(state, i, children);
            continue;
        }

        let p = &state.projectiles[i];
        if p.pos.distance(p.target) <= p.speed || p.pos.y >= GROUND_Y {
            detonate(state, i);
        }
    }
}

/// Number of warheads to release if projectile `i` splits this tick
fn split_due(state: &mut GameState, i: usize) -> Option<usize> {
    let p = &state.projectiles[i];
    if p.has_split {
        return None;
    }
    match p.kind {
        EnemyKind::Mirv if p.pos.y >= MIRV_SPLIT_Y => Some(MIRV_CHILDREN),
        EnemyKind::SmartBomb => {
            let y = p.pos.y;
            let threshold = state.rng.random_range(SMART_SPLIT_MIN_Y..=SMART_SPLIT_MAX_Y);
            (y >= threshold).then_some(SMART_BOMB_CHILDREN)
        }
        _ => None,
    }
}

fn split(state: &mut GameState, i: usize, children: usize) {
    let (kind, pos, speed) = {
        let p = &mut state.projectiles[i];
        p.has_split = true;
        p.kill(Fate::Split);
        (p.kind, p.pos, p.speed)
    };
    log::debug!("{} split into {children} at ({:.0}, {:.0})", kind.as_str(), pos.x, pos.y);

    let puff_id = state.ids.next_id();
    state.staged.explosions.push(Explosion::cosmetic(
        puff_id,
        pos,
        SPLIT_PUFF_RADIUS,
        SPLIT_PUFF_DURATION,
    ));
    for _ in 0..children {
        let target = state
            .structures
            .pick_target(TargetPreference::Ground, &mut state.rng);
        let id = state.ids.next_id();
        state
            .staged
            .projectiles
            .push(Projectile::split_child(id, pos, target, speed));
    }
    state.events.push(GameEvent::Split {
        kind,
        pos,
        children: children as u32,
    });
}

/// Ground impact: detonation blast plus structure damage
fn detonate(state: &mut GameState, i: usize) {
    let (pos, split_child, ignore) = {
        let p = &mut state.projectiles[i];
        p.kill(Fate::Impacted);
        (p.pos, p.split_child, p.ignore_defenders_on_detonate)
    };
    let scale = if split_child { SPLIT_CHILD_BLAST_SCALE } else { 1.0 };
    let radius = ENEMY_BLAST_RADIUS * scale;
    let id = state.ids.next_id();
    let mut blast = Explosion::new(id, pos, radius, ENEMY_BLAST_DURATION);
    blast.ignore_defenders = ignore;
    state.staged.explosions.push(blast);
    state.events.push(GameEvent::ExplosionTriggered {
        pos,
        radius,
        player: false,
    });

    collision::resolve_impact(
        pos,
        &mut state.structures,
        &mut state.run.board,
        &mut state.events,
    );
}

fn update_planes(state: &mut GameState) {
    let bomb_speed =
        ENEMY_BASE_SPEED * PLANE_BOMB_SPEED_SCALE * state.settings.difficulty.enemy_speed();
    for i in 0..state.planes.len() {
        let drop_from = {
            let plane = &mut state.planes[i];
            if !plane.alive {
                continue;
            }
            plane.pos += plane.vel;
            if !in_field(plane.pos, PLANE_ESCAPE_MARGIN) {
                plane.kill(Fate::Escaped);
                continue;
            }
            let over_field = (0.0..=FIELD_WIDTH).contains(&plane.pos.x);
            if plane.bombs_left == 0 || !over_field {
                continue;
            }
            plane.drop_timer = plane.drop_timer.saturating_sub(1);
            if plane.drop_timer > 0 {
                continue;
            }
            plane.bombs_left -= 1;
            plane.pos
        };

        let target = state
            .structures
            .pick_target(TargetPreference::Ground, &mut state.rng);
        let id = state.ids.next_id();
        state.staged.projectiles.push(Projectile::new(
            id,
            EnemyKind::PlaneBomb,
            drop_from,
            target,
            bomb_speed,
        ));
        state.planes[i].drop_timer = state
            .rng
            .random_range(PLANE_DROP_MIN_TICKS..=PLANE_DROP_MAX_TICKS);
    }
}

fn update_player_missiles(state: &mut GameState) {
    for i in 0..state.player_missiles.len() {
        let (pos, radius) = {
            let m = &mut state.player_missiles[i];
            if !m.alive {
                continue;
            }
            if m.pos.distance(m.target) <= m.vel.length() {
                m.pos = m.target;
            } else {
                m.pos += m.vel;
                // Still closing on the target
                if m.vel.dot(m.target - m.pos) >= 0.0 {
                    continue;
                }
            }
            m.alive = false;
            (m.pos, m.blast_radius)
        };
        let id = state.ids.next_id();
        state
            .staged
            .explosions
            .push(Explosion::player(id, pos, radius, PLAYER_BLAST_DURATION));
        state.events.push(GameEvent::ExplosionTriggered {
            pos,
            radius,
            player: true,
        });
    }
}

fn update_explosions(state: &mut GameState) {
    let mut explosions = std::mem::take(&mut state.explosions);
    for ex in explosions.iter_mut().filter(|e| !e.is_done()) {
        ex.advance();
        collision::sweep_explosion(state, ex);
    }
    state.explosions = explosions;
}

/// Destroy unshielded enemy projectiles inside the field; no combo credit
fn update_area_denial(state: &mut GameState) {
    let Some((center, radius)) = state.area_denial.as_ref().map(|z| (z.center, z.radius)) else {
        return;
    };

    for i in 0..state.projectiles.len() {
        let (kind, pos) = {
            let p = &mut state.projectiles[i];
            if !p.alive || p.armor.is_some() || !in_circle(p.pos, center, radius) {
                continue;
            }
            p.kill(Fate::Intercepted { by_player: true });
            state.run.board.record_kill(p.kind, &mut p.counted_as_destroyed);
            (p.kind, p.pos)
        };
        collision::credit_kill(state, kind, pos, kind.base_points(), true);
    }

    if let Some(zone) = state.area_denial.as_mut() {
        zone.ticks_left = zone.ticks_left.saturating_sub(1);
        if zone.ticks_left == 0 {
            state.area_denial = None;
        }
    }
}

fn decay_shield_flash(state: &mut GameState) {
    let shields = state
        .structures
        .bases
        .iter_mut()
        .filter_map(|b| b.shield.as_mut())
        .chain(
            state
                .structures
                .satellites
                .iter_mut()
                .filter_map(|s| s.shield.as_mut()),
        );
    for shield in shields {
        shield.flash_ticks = shield.flash_ticks.saturating_sub(1);
    }
}
