//! Skyguard - A wave-based missile defense simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (waves, physics, collisions, scoring)
//! - `render`: Pure draw-list adapter over the simulation state
//! - `audio`: Sound cue notifications emitted by the simulation
//! - `persistence`: End-of-run summaries and the local leaderboard
//! - `settings`: Difficulty and rule configuration

pub mod audio;
pub mod error;
pub mod persistence;
pub mod render;
pub mod settings;
pub mod sim;

pub use error::{PersistError, SimError};
pub use persistence::{HighScores, RunSummary};
pub use settings::{Difficulty, KillAccounting, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Simulation ticks per second (one tick per animation frame)
    pub const TICK_RATE: u32 = 60;

    /// Logical field dimensions
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;
    /// Ground line (y grows downward)
    pub const GROUND_Y: f32 = 570.0;
    /// Margin outside the field before an entity counts as stuck off-screen
    pub const OFFSCREEN_MARGIN: f32 = 100.0;

    /// Trail points kept per projectile
    pub const TRAIL_LENGTH: usize = 12;

    /// Enemy projectile speed at speed factor 1.0 (pixels/tick)
    pub const ENEMY_BASE_SPEED: f32 = 0.9;
    /// Shield bombs fly slower than plain missiles
    pub const SHIELD_BOMB_SPEED_SCALE: f32 = 0.6;
    /// Blast radius of an enemy ground detonation
    pub const ENEMY_BLAST_RADIUS: f32 = 30.0;
    pub const ENEMY_BLAST_DURATION: u32 = 40;
    /// Split children detonate at reduced size
    pub const SPLIT_CHILD_BLAST_SCALE: f32 = 0.6;

    /// MIRVs split when crossing this altitude
    pub const MIRV_SPLIT_Y: f32 = 250.0;
    pub const MIRV_CHILDREN: usize = 3;
    /// Smart bombs split somewhere in this band (re-rolled each check)
    pub const SMART_SPLIT_MIN_Y: f32 = 200.0;
    pub const SMART_SPLIT_MAX_Y: f32 = 350.0;
    pub const SMART_BOMB_CHILDREN: usize = 2;
    /// Cosmetic puff at a split point
    pub const SPLIT_PUFF_RADIUS: f32 = 15.0;
    pub const SPLIT_PUFF_DURATION: u32 = 20;

    /// Shielded bomb armor
    pub const SHIELD_BOMB_LAYERS: u8 = 3;
    pub const SHIELD_BOMB_HITS_PER_LAYER: u8 = 3;
    /// Distance of shield bomb reinforcements from the kill point
    pub const REINFORCEMENT_OFFSET: f32 = 20.0;

    /// Planes
    pub const PLANE_SPEED: f32 = 1.2;
    pub const PLANE_BOMBS: u8 = 3;
    pub const PLANE_MIN_ALTITUDE: f32 = 60.0;
    pub const PLANE_MAX_ALTITUDE: f32 = 180.0;
    pub const PLANE_DROP_MIN_TICKS: u32 = 60;
    pub const PLANE_DROP_MAX_TICKS: u32 = 120;

    /// Player missiles
    pub const PLAYER_MISSILE_BASE_SPEED: f32 = 8.0;
    pub const PLAYER_MISSILE_SPEED_PER_LEVEL: f32 = 1.5;
    pub const PLAYER_BLAST_BASE_RADIUS: f32 = 45.0;
    pub const PLAYER_BLAST_RADIUS_PER_LEVEL: f32 = 10.0;
    pub const PLAYER_BLAST_DURATION: u32 = 60;
    /// Horizontal spacing between fanned bonus missiles
    pub const FAN_SPREAD: f32 = 30.0;
    /// Oversized explosion from a smart-bomb charge
    pub const BOMB_BLAST_RADIUS: f32 = 120.0;
    pub const BOMB_BLAST_DURATION: u32 = 90;

    /// Scoring
    pub const MISSILE_POINTS: u32 = 100;
    pub const PLANE_POINTS: u32 = 2000;
    pub const PLANE_BOMB_POINTS: u32 = 10;
    pub const SHIELD_BOMB_MULTIPLIER: u32 = 3;
    pub const ACCURACY_BONUS: u32 = 25;
    pub const ACCURACY_THRESHOLD: f32 = 20.0;
    pub const COMBO_POINTS: u32 = 15;
    pub const STREAK_PER_MULTIPLIER: u32 = 5;
    pub const MAX_MULTIPLIER: f32 = 5.0;
    pub const CITY_SURVIVAL_BONUS: u32 = 100;
    pub const AMMO_BONUS: u32 = 5;

    /// Structures
    pub const CITY_WIDTH: f32 = 40.0;
    pub const CITY_HEIGHT: f32 = 20.0;
    pub const BASE_WIDTH: f32 = 50.0;
    pub const BASE_HEIGHT: f32 = 25.0;
    pub const SATELLITE_WIDTH: f32 = 30.0;
    pub const SATELLITE_HEIGHT: f32 = 14.0;
    /// Extra horizontal slack on structure hit boxes
    pub const IMPACT_MARGIN: f32 = 10.0;
    pub const CITY_XS: [f32; 6] = [120.0, 190.0, 260.0, 540.0, 610.0, 680.0];
    pub const BASE_XS: [f32; 3] = [40.0, 400.0, 760.0];
    pub const SATELLITE_SLOTS: [(f32, f32); 2] = [(220.0, 140.0), (580.0, 140.0)];
    pub const SATELLITE_RANGE: f32 = 320.0;

    /// Ammo per launch site at upgrade level 0
    pub const BASE_AMMO: u32 = 10;
    pub const AMMO_PER_LEVEL: u32 = 2;
    pub const SATELLITE_AMMO: u32 = 6;

    /// Shields
    pub const SHIELD_STRENGTH: f32 = 100.0;
    pub const SHIELD_HIT_DAMAGE: f32 = 25.0;
    pub const SHIELD_FLASH_TICKS: u32 = 15;
    pub const BASE_SHIELD_RADIUS: f32 = 45.0;
    pub const BASE_SHIELD_HEIGHT: f32 = 38.0;
    pub const SATELLITE_SHIELD_RX: f32 = 40.0;
    pub const SATELLITE_SHIELD_RY: f32 = 26.0;

    /// Area denial field
    pub const AREA_DENIAL_RADIUS: f32 = 70.0;
    pub const AREA_DENIAL_TICKS: u32 = 5 * TICK_RATE;

    /// Wave lifecycle
    pub const WAVE_TIMEOUT_TICKS: u64 = 120 * TICK_RATE as u64;
    pub const AUTO_ADVANCE_TICKS: u32 = 2 * TICK_RATE;
    pub const DEFAULT_REQUIRED_COUNT: u32 = 20;
}

/// Distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}

/// Whether a point lies inside the visible field expanded by `margin`
#[inline]
pub fn in_field(pos: Vec2, margin: f32) -> bool {
    pos.x >= -margin
        && pos.x <= consts::FIELD_WIDTH + margin
        && pos.y >= -margin
        && pos.y <= consts::FIELD_HEIGHT + margin
}

/// Rotate a vector by `angle` radians
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}
