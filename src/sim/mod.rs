//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one tick per frame, time measured in ticks)
//! - Seeded RNG only
//! - Stable iteration order (entity arrays are append-only within a tick)
//! - No rendering or platform dependencies

pub mod collision;
pub mod commands;
pub mod entities;
pub mod geometry;
pub mod lifecycle;
pub mod scoring;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod update;
pub mod waves;

pub use commands::{deploy_area_denial, detonate_bomb_at, fire_at};
pub use entities::{
    AreaDenial, Base, City, EnemyKind, Explosion, Fate, Plane, PlayerMissile, Projectile,
    Satellite, Shield, ShieldArmor, Structures,
};
pub use scoring::{KillStats, Scoreboard};
pub use state::{
    Callout, Completion, GameEvent, GamePhase, GameState, Inventory, LaunchSite, StructureRef,
    Upgrades,
};
pub use tick::{SimHooks, TickInput, tick};
pub use waves::{WaveDescriptor, WavePart, WaveTable};
