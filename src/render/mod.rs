//! Draw-list adapter
//!
//! Pull-only: `build_frame` reads the simulation state and produces a
//! triangle list ready for a vertex buffer. It never mutates the state.

pub mod shapes;
pub mod vertex;

pub use vertex::{Vertex, as_bytes, colors};

use glam::Vec2;

use crate::consts::*;
use crate::sim::entities::{EnemyKind, Shield};
use crate::sim::state::GameState;
use vertex::fade;

const CIRCLE_SEGMENTS: u32 = 24;
const HEAD_RADIUS: f32 = 2.5;
const TRAIL_WIDTH: f32 = 1.5;

fn enemy_color(kind: EnemyKind) -> [f32; 4] {
    match kind {
        EnemyKind::Missile => colors::MISSILE,
        EnemyKind::Mirv => colors::MIRV,
        EnemyKind::SmartBomb => colors::SMART_BOMB,
        EnemyKind::Plane => colors::PLANE,
        EnemyKind::PlaneBomb => colors::PLANE_BOMB,
        EnemyKind::ShieldBomb => colors::SHIELD_BOMB,
    }
}

fn shield_color(shield: &Shield) -> [f32; 4] {
    if shield.flash_ticks > 0 {
        colors::SHIELD_FLASH
    } else {
        fade(colors::SHIELD, shield.strength / SHIELD_STRENGTH)
    }
}

/// Build the triangle list for the current state, back to front
pub fn build_frame(state: &GameState) -> Vec<Vertex> {
    let mut out = Vec::with_capacity(4096);

    out.extend(shapes::rect(
        Vec2::new(FIELD_WIDTH / 2.0, (GROUND_Y + FIELD_HEIGHT) / 2.0),
        Vec2::new(FIELD_WIDTH, FIELD_HEIGHT - GROUND_Y),
        colors::GROUND,
    ));

    if let Some(zone) = &state.area_denial {
        let alpha = (zone.ticks_left as f32 / AREA_DENIAL_TICKS as f32).max(0.3);
        out.extend(shapes::circle(
            zone.center,
            zone.radius,
            fade(colors::AREA_DENIAL, alpha),
            CIRCLE_SEGMENTS,
        ));
    }

    let s = &state.structures;
    for city in &s.cities {
        if city.alive {
            out.extend(shapes::rect(city.pos, Vec2::new(CITY_WIDTH, CITY_HEIGHT), colors::CITY));
        } else {
            let rubble = city.pos + Vec2::new(0.0, CITY_HEIGHT / 4.0);
            out.extend(
                shapes::rect(rubble, Vec2::new(CITY_WIDTH, CITY_HEIGHT / 2.0), colors::RUBBLE),
            );
        }
    }
    for base in s.bases.iter().filter(|b| b.alive) {
        out.extend(shapes::rect(base.pos, Vec2::new(BASE_WIDTH, BASE_HEIGHT), colors::BASE));
        if let Some(shield) = &base.shield {
            out.extend(shapes::dome(&base.dome(), shield_color(shield), 16));
        }
    }
    for sat in s.satellites.iter().filter(|s| s.alive) {
        out.extend(shapes::rect(
            sat.pos,
            Vec2::new(SATELLITE_WIDTH, SATELLITE_HEIGHT),
            colors::SATELLITE,
        ));
        if let Some(shield) = &sat.shield {
            out.extend(shapes::ellipse_ring(
                sat.pos,
                Vec2::new(SATELLITE_SHIELD_RX, SATELLITE_SHIELD_RY),
                2.0,
                shield_color(shield),
                CIRCLE_SEGMENTS,
            ));
        }
    }

    for p in state.projectiles.iter().filter(|p| p.alive) {
        let color = enemy_color(p.kind);
        out.extend(shapes::trail(&p.trail, TRAIL_WIDTH, fade(color, 0.6)));
        out.extend(shapes::circle(p.pos, HEAD_RADIUS, color, 8));
        if let Some(armor) = p.armor {
            for layer in 0..armor.layers {
                let r = HEAD_RADIUS + 2.0 + layer as f32 * 2.0;
                out.extend(shapes::ring(p.pos, r, r + 1.0, colors::SHIELD, 12));
            }
        }
    }

    for plane in state.planes.iter().filter(|p| p.alive) {
        out.extend(shapes::rect(plane.pos, Vec2::new(24.0, 6.0), colors::PLANE));
    }

    for m in state.player_missiles.iter().filter(|m| m.alive) {
        out.extend(shapes::circle(m.pos, HEAD_RADIUS, colors::INTERCEPTOR, 8));
    }

    for ex in state.explosions.iter().filter(|e| !e.is_done() && e.radius > 0.0) {
        let base = if ex.player {
            colors::PLAYER_BLAST
        } else {
            colors::ENEMY_BLAST
        };
        let life = 1.0 - ex.frame as f32 / ex.duration as f32;
        out.extend(shapes::circle(ex.center, ex.radius, fade(base, life), CIRCLE_SEGMENTS));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::entities::Explosion;

    #[test]
    fn test_frame_is_triangle_list() {
        let state = GameState::new(1, Settings::default());
        let frame = build_frame(&state);
        assert!(!frame.is_empty());
        assert_eq!(frame.len() % 3, 0);
        assert_eq!(as_bytes(&frame).len(), frame.len() * std::mem::size_of::<Vertex>());
    }

    #[test]
    fn test_frame_tracks_entities() {
        let mut state = GameState::new(1, Settings::default());
        let before = build_frame(&state).len();
        state.add_projectile(
            EnemyKind::ShieldBomb,
            Vec2::new(100.0, 100.0),
            Vec2::new(100.0, 570.0),
            1.0,
        );
        let mut ex = Explosion::player(500, Vec2::new(300.0, 300.0), 40.0, 60);
        ex.advance();
        state.add_explosion(ex);
        let after = build_frame(&state);
        // Head, three armor rings, blast
        assert_eq!(after.len() - before, 8 * 3 + 3 * 72 + CIRCLE_SEGMENTS as usize * 3);
    }

    #[test]
    fn test_dead_city_draws_rubble() {
        let mut state = GameState::new(1, Settings::default());
        state.structures.cities[0].alive = false;
        let frame = build_frame(&state);
        assert!(frame.iter().any(|v| v.color == colors::RUBBLE));
    }
}
