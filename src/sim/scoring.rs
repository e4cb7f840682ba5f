//! Score, streak multiplier and kill bookkeeping

use serde::{Deserialize, Serialize};

use super::entities::{EnemyKind, Plane, Projectile};
use crate::consts::*;
use crate::settings::KillAccounting;

/// Lifetime per-category counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillStats {
    pub missiles: u32,
    pub mirvs: u32,
    pub smart_bombs: u32,
    pub planes: u32,
    pub plane_bombs: u32,
    pub shield_bombs: u32,
    pub missiles_fired: u32,
    pub bombs_used: u32,
    pub cities_lost: u32,
    pub bases_lost: u32,
    pub satellites_lost: u32,
}

impl KillStats {
    fn slot(&mut self, kind: EnemyKind) -> &mut u32 {
        match kind {
            EnemyKind::Missile => &mut self.missiles,
            EnemyKind::Mirv => &mut self.mirvs,
            EnemyKind::SmartBomb => &mut self.smart_bombs,
            EnemyKind::Plane => &mut self.planes,
            EnemyKind::PlaneBomb => &mut self.plane_bombs,
            EnemyKind::ShieldBomb => &mut self.shield_bombs,
        }
    }

    pub fn bump(&mut self, kind: EnemyKind) {
        *self.slot(kind) += 1;
    }

    pub fn destroyed(&self, kind: EnemyKind) -> u32 {
        match kind {
            EnemyKind::Missile => self.missiles,
            EnemyKind::Mirv => self.mirvs,
            EnemyKind::SmartBomb => self.smart_bombs,
            EnemyKind::Plane => self.planes,
            EnemyKind::PlaneBomb => self.plane_bombs,
            EnemyKind::ShieldBomb => self.shield_bombs,
        }
    }

    pub fn total_destroyed(&self) -> u32 {
        EnemyKind::ALL.iter().map(|&k| self.destroyed(k)).sum()
    }
}

/// Streak multiplier: +1 for every `STREAK_PER_MULTIPLIER` intercepts, capped
pub fn multiplier_for(streak: u32) -> f32 {
    (1.0 + (streak / STREAK_PER_MULTIPLIER) as f32).min(MAX_MULTIPLIER)
}

/// Running score state for a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scoreboard {
    /// Score earned in the current wave
    pub round_score: u64,
    /// Score for the whole run
    pub total_score: u64,
    /// Consecutive player intercepts since the last structure loss
    pub streak: u32,
    pub multiplier: f32,
    pub difficulty_factor: f32,
    pub accounting: KillAccounting,
    pub stats: KillStats,
}

impl Scoreboard {
    pub fn new(difficulty_factor: f32, accounting: KillAccounting) -> Self {
        Self {
            round_score: 0,
            total_score: 0,
            streak: 0,
            multiplier: 1.0,
            difficulty_factor,
            accounting,
            stats: KillStats::default(),
        }
    }

    /// Apply `base` points through the multiplier and difficulty factor
    pub fn award(&mut self, base: u32) -> u64 {
        let points = (base as f32 * self.multiplier * self.difficulty_factor).round() as u64;
        self.round_score += points;
        self.total_score += points;
        points
    }

    /// A kill credited to the defender extends the streak
    pub fn extend_streak(&mut self) {
        self.streak += 1;
        self.multiplier = multiplier_for(self.streak);
    }

    /// A city or base was destroyed
    pub fn structure_lost(&mut self) {
        self.streak = 0;
        self.multiplier = 1.0;
    }

    /// Record a kill. In immediate mode the counter moves now and the entity
    /// is flagged; deferred mode leaves both to `count_deferred_kills`.
    pub fn record_kill(&mut self, kind: EnemyKind, counted: &mut bool) {
        if self.accounting == KillAccounting::Immediate && !*counted {
            self.stats.bump(kind);
            *counted = true;
        }
    }

    pub fn reset_round(&mut self) {
        self.round_score = 0;
    }
}

/// Bump counters for every intercepted entity not yet counted
///
/// Runs once per tick after all collision work. Returns how many kills were
/// counted.
pub fn count_deferred_kills(
    board: &mut Scoreboard,
    projectiles: &mut [Projectile],
    planes: &mut [Plane],
) -> u32 {
    let mut counted = 0;
    for p in projectiles.iter_mut().filter(|p| p.pending_kill_credit()) {
        board.stats.bump(p.kind);
        p.counted_as_destroyed = true;
        counted += 1;
    }
    for plane in planes.iter_mut().filter(|p| p.pending_kill_credit()) {
        board.stats.bump(EnemyKind::Plane);
        plane.counted_as_destroyed = true;
        counted += 1;
    }
    counted
}
