//! Game state and core simulation types
//!
//! One `GameState` holds the run record, every entity array and the RNG.
//! Simulation functions take it explicitly; nothing is global.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entities::{
    AreaDenial, EnemyKind, Explosion, Plane, PlayerMissile, Projectile, Structures,
};
use super::scoring::Scoreboard;
use super::waves::{WaveProgress, WaveTable};
use crate::consts::*;
use crate::settings::Settings;

/// Wave/game lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Scheduler still owes enemies for this wave
    Spawning,
    /// Everything spawned; waiting for the field to clear
    Draining,
    /// Between waves, waiting for the store to close
    Store,
    /// Between waves, counting down to the next one
    AutoAdvance,
    /// Run ended
    GameOver,
}

/// How a wave ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Completion {
    /// Field fully cleared
    Cleared,
    /// Only off-screen leftovers remained
    Offscreen,
    /// Hard timeout after the last spawn
    Timeout,
}

/// Launch site reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaunchSite {
    Base(usize),
    Satellite(usize),
}

/// Structure reference for impact events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructureRef {
    City(usize),
    Base(usize),
    Satellite(usize),
}

/// Transient on-screen message for the current tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Callout {
    Accuracy { points: u64 },
    Combo { kills: u32, points: u64 },
}

/// Things that happened during a tick, drained by collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    MissileLaunched { site: LaunchSite, count: u32 },
    ExplosionTriggered { pos: Vec2, radius: f32, player: bool },
    EnemyDestroyed { kind: EnemyKind, pos: Vec2, points: u64 },
    ArmorLayerBroken { id: u32, layers_left: u8 },
    Split { kind: EnemyKind, pos: Vec2, children: u32 },
    ShieldHit { structure: StructureRef, strength_left: f32 },
    ShieldBroken { structure: StructureRef },
    StructureDestroyed { structure: StructureRef },
    WaveStarted { wave: u32 },
    WaveCompleted { wave: u32, completion: Completion, bonus: u64 },
    GameOver { wave: u32, score: u64 },
}

/// Purchased items waiting to be used
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    /// Smart-bomb charges for `detonate_bomb_at`
    pub bombs: u32,
    /// Shields to attach to bases at the next wave start
    pub base_shields: u32,
    /// Satellites to deploy at the next wave start
    pub satellites: u32,
    /// Destroyed cities to rebuild at the next wave start
    pub city_rebuilds: u32,
    /// Area denial charges
    pub area_denials: u32,
}

/// Upgrade levels bought in the store, read at time of use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upgrades {
    pub ammo_level: u32,
    pub radius_level: u32,
    pub speed_level: u32,
}

impl Upgrades {
    /// Ammo per ground base after a refill
    pub fn base_ammo(&self) -> u32 {
        BASE_AMMO + self.ammo_level * AMMO_PER_LEVEL
    }

    pub fn satellite_ammo(&self) -> u32 {
        SATELLITE_AMMO + self.ammo_level * AMMO_PER_LEVEL
    }

    pub fn blast_radius(&self) -> f32 {
        PLAYER_BLAST_BASE_RADIUS + self.radius_level as f32 * PLAYER_BLAST_RADIUS_PER_LEVEL
    }

    pub fn missile_speed(&self) -> f32 {
        PLAYER_MISSILE_BASE_SPEED + self.speed_level as f32 * PLAYER_MISSILE_SPEED_PER_LEVEL
    }
}

/// The run record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    /// Current wave index (0-based)
    pub wave_index: u32,
    pub board: Scoreboard,
    /// Extra interceptors fired with every shot
    pub bonus_missiles: u32,
    pub inventory: Inventory,
    pub upgrades: Upgrades,
    /// Cities alive when the current wave began
    pub cities_at_wave_start: u32,
    /// Ticks from wave start to its last spawn, per finished wave
    pub spawn_durations: Vec<u64>,
}

/// Monotonic entity ID source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Entities created mid-pass, appended after iteration finishes
#[derive(Debug, Clone, Default)]
pub struct Staging {
    pub projectiles: Vec<Projectile>,
    pub explosions: Vec<Explosion>,
}

impl Staging {
    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty() && self.explosions.is_empty()
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    pub seed: u64,
    pub settings: Settings,
    pub run: RunState,
    pub phase: GamePhase,
    pub paused: bool,
    /// Set when wave initialisation failed; no further ticks run
    pub halted: bool,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Countdown for `GamePhase::AutoAdvance`
    pub advance_ticks: u32,
    pub waves: WaveTable,
    pub wave: WaveProgress,
    pub structures: Structures,
    pub projectiles: Vec<Projectile>,
    pub planes: Vec<Plane>,
    pub player_missiles: Vec<PlayerMissile>,
    pub explosions: Vec<Explosion>,
    pub area_denial: Option<AreaDenial>,
    pub callout: Option<Callout>,
    /// Events raised this tick
    pub events: Vec<GameEvent>,
    pub(crate) staged: Staging,
    pub(crate) ids: IdAllocator,
    pub(crate) rng: Pcg32,
}

impl GameState {
    /// New run with the default wave table, starting wave 1
    pub fn new(seed: u64, settings: Settings) -> Self {
        Self::with_waves(seed, settings, WaveTable::default())
    }

    /// New run with a custom wave table
    pub fn with_waves(seed: u64, settings: Settings, waves: WaveTable) -> Self {
        let upgrades = Upgrades::default();
        let board = Scoreboard::new(settings.difficulty.score_factor(), settings.kill_accounting);
        let structures = Structures::standard(upgrades.base_ammo());
        let mut state = Self {
            seed,
            run: RunState {
                wave_index: 0,
                board,
                bonus_missiles: 0,
                inventory: Inventory::default(),
                upgrades,
                cities_at_wave_start: structures.cities_alive() as u32,
                spawn_durations: Vec::new(),
            },
            settings,
            phase: GamePhase::Spawning,
            paused: false,
            halted: false,
            time_ticks: 0,
            advance_ticks: 0,
            waves,
            wave: WaveProgress::empty(1),
            structures,
            projectiles: Vec::new(),
            planes: Vec::new(),
            player_missiles: Vec::new(),
            explosions: Vec::new(),
            area_denial: None,
            callout: None,
            events: Vec::new(),
            staged: Staging::default(),
            ids: IdAllocator::default(),
            rng: Pcg32::seed_from_u64(seed),
        };
        super::lifecycle::begin_wave_or_halt(&mut state);
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        self.ids.next_id()
    }

    /// Mutable access to the RNG (hosts and tests may draw from it)
    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    /// Add an enemy projectile directly (scripted scenarios and tests)
    pub fn add_projectile(&mut self, kind: EnemyKind, pos: Vec2, target: Vec2, speed: f32) -> u32 {
        let id = self.next_entity_id();
        self.projectiles
            .push(Projectile::new(id, kind, pos, target, speed));
        id
    }

    /// Add an explosion directly (scripted scenarios and tests)
    pub fn add_explosion(&mut self, explosion: Explosion) {
        self.explosions.push(explosion);
    }

    /// Append entities staged during the update pass
    pub fn commit_staged(&mut self) {
        self.projectiles.append(&mut self.staged.projectiles);
        self.explosions.append(&mut self.staged.explosions);
    }

    /// Drop dead entities in a single pass
    pub fn compact(&mut self) {
        self.projectiles.retain(|p| p.alive);
        self.planes.retain(|p| p.alive);
        self.player_missiles.retain(|m| m.alive);
        self.explosions.retain(|e| !e.is_done());
    }

    /// Live enemies of any category
    pub fn live_enemies(&self) -> usize {
        self.projectiles.iter().filter(|p| p.alive).count()
            + self.planes.iter().filter(|p| p.alive).count()
    }

    /// Live enemies of one category
    pub fn live_of(&self, kind: EnemyKind) -> usize {
        match kind {
            EnemyKind::Plane => self.planes.iter().filter(|p| p.alive).count(),
            _ => self
                .projectiles
                .iter()
                .filter(|p| p.alive && p.kind == kind)
                .count(),
        }
    }

    /// Current 1-based wave number
    pub fn wave_number(&self) -> u32 {
        self.run.wave_index + 1
    }

    /// Run score
    pub fn score(&self) -> u64 {
        self.run.board.total_score
    }

    /// Whether commands that launch ordnance are accepted
    pub fn accepting_fire(&self) -> bool {
        matches!(self.phase, GamePhase::Spawning | GamePhase::Draining) && !self.halted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_run_starts_wave_one() {
        let state = GameState::new(1, Settings::default());
        assert_eq!(state.phase, GamePhase::Spawning);
        assert_eq!(state.wave_number(), 1);
        assert_eq!(state.wave.required, 10);
        assert_eq!(state.structures.cities_alive(), 6);
        assert_eq!(state.structures.bases_alive(), 3);
        assert!(state.events.contains(&GameEvent::WaveStarted { wave: 1 }));
    }

    #[test]
    fn test_compact_removes_dead() {
        let mut state = GameState::new(1, Settings::default());
        let a = state.add_projectile(EnemyKind::Missile, Vec2::ZERO, Vec2::Y, 1.0);
        state.add_projectile(EnemyKind::Missile, Vec2::ZERO, Vec2::Y, 1.0);
        state.projectiles[0].alive = false;
        state.compact();
        assert_eq!(state.projectiles.len(), 1);
        assert_ne!(state.projectiles[0].id, a);
    }

    #[test]
    fn test_upgrades_feed_launch_parameters() {
        let upgrades = Upgrades {
            ammo_level: 2,
            radius_level: 1,
            speed_level: 2,
        };
        assert_eq!(upgrades.base_ammo(), 14);
        assert_eq!(upgrades.blast_radius(), 55.0);
        assert_eq!(upgrades.missile_speed(), 11.0);
    }
}
