//! Wave definitions
//!
//! Eleven hand-authored waves, extrapolated to 100 by scaling the last
//! authored wave, then generated on demand past 100.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entities::EnemyKind;
use crate::error::SimError;

/// Waves held in the precomputed table
pub const TABLE_WAVES: usize = 100;
/// Count/speed growth per wave past the template
pub const WAVE_GROWTH: f32 = 0.06;
/// Ceiling on the growth factor
pub const MAX_WAVE_SCALE: f32 = 4.0;
/// Ceiling on any part's speed factor
pub const MAX_SPEED_FACTOR: f32 = 3.0;

/// One enemy quota within a wave
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WavePart {
    pub kind: EnemyKind,
    pub count: u32,
    pub speed_factor: f32,
}

impl WavePart {
    pub fn new(kind: EnemyKind, count: u32, speed_factor: f32) -> Self {
        Self {
            kind,
            count,
            speed_factor,
        }
    }
}

/// Ordered quotas for one wave; one part per category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveDescriptor {
    parts: Vec<WavePart>,
}

impl WaveDescriptor {
    /// Build a descriptor, merging repeated categories (counts add, fastest
    /// speed wins) so spawned counters can be keyed by category
    pub fn new(parts: impl IntoIterator<Item = WavePart>) -> Self {
        let mut merged: Vec<WavePart> = Vec::new();
        for part in parts {
            match merged.iter_mut().find(|p| p.kind == part.kind) {
                Some(existing) => {
                    existing.count = existing.count.saturating_add(part.count);
                    existing.speed_factor = existing.speed_factor.max(part.speed_factor);
                }
                None => merged.push(part),
            }
        }
        Self { parts: merged }
    }

    pub fn parts(&self) -> &[WavePart] {
        &self.parts
    }

    pub fn part(&self, kind: EnemyKind) -> Option<&WavePart> {
        self.parts.iter().find(|p| p.kind == kind)
    }

    /// Total entities the scheduler must spawn
    pub fn required_count(&self) -> u32 {
        self.parts
            .iter()
            .fold(0u32, |total, p| total.saturating_add(p.count))
    }

    /// Copy with counts (rounded up) and speeds (capped) scaled by `factor`
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            parts: self
                .parts
                .iter()
                .map(|p| WavePart {
                    kind: p.kind,
                    count: (p.count as f32 * factor).ceil() as u32,
                    speed_factor: (p.speed_factor * factor).min(MAX_SPEED_FACTOR),
                })
                .collect(),
        }
    }
}

/// Growth factor for a wave `steps` waves past its template
pub fn scale_factor(steps: u32) -> f32 {
    (1.0 + steps as f32 * WAVE_GROWTH).min(MAX_WAVE_SCALE)
}

/// Full wave table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveTable {
    waves: Vec<WaveDescriptor>,
}

impl Default for WaveTable {
    fn default() -> Self {
        Self::from_authored(authored_waves()).unwrap_or_else(|_| Self { waves: Vec::new() })
    }
}

impl WaveTable {
    /// Extend hand-authored waves to `TABLE_WAVES` by scaling the last one
    pub fn from_authored(authored: Vec<WaveDescriptor>) -> Result<Self, SimError> {
        let template = authored.last().cloned().ok_or(SimError::EmptyWaveTable)?;
        let template_index = authored.len() - 1;
        let mut waves = authored;
        for index in waves.len()..TABLE_WAVES {
            let steps = (index - template_index) as u32;
            waves.push(template.scaled(scale_factor(steps)));
        }
        Ok(Self { waves })
    }

    /// Parse authored waves from JSON and extend them
    ///
    /// Shape: `[[{"type": "missile", "count": 10, "speedFactor": 1.0}, ...], ...]`.
    /// Parts with an unknown type or a non-numeric count are skipped.
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let doc: Value = serde_json::from_str(json)?;
        let waves = doc
            .as_array()
            .ok_or_else(|| SimError::Config("wave table must be an array".into()))?;
        let authored = waves
            .iter()
            .enumerate()
            .map(|(i, wave)| parse_wave(i + 1, wave))
            .collect();
        Self::from_authored(authored)
    }

    #[cfg(test)]
    pub(crate) fn empty() -> Self {
        Self { waves: Vec::new() }
    }

    /// Precomputed waves
    pub fn len(&self) -> usize {
        self.waves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    /// Descriptor for a 0-based wave index, generating past the table end
    pub fn wave(&self, index: u32) -> Result<WaveDescriptor, SimError> {
        let last = self.waves.last().ok_or(SimError::EmptyWaveTable)?;
        let index = index as usize;
        if let Some(wave) = self.waves.get(index) {
            return Ok(wave.clone());
        }
        let steps = (index - (self.waves.len() - 1)) as u32;
        Ok(last.scaled(scale_factor(steps)))
    }
}

fn parse_wave(wave_number: usize, wave: &Value) -> WaveDescriptor {
    let Some(parts) = wave.as_array() else {
        log::warn!("Wave {wave_number}: expected a list of parts, skipping wave contents");
        return WaveDescriptor::default();
    };
    WaveDescriptor::new(parts.iter().filter_map(|part| parse_part(wave_number, part)))
}

fn parse_part(wave_number: usize, part: &Value) -> Option<WavePart> {
    let kind_name = part.get("type").and_then(Value::as_str).unwrap_or("");
    let Some(kind) = EnemyKind::from_str(kind_name) else {
        log::warn!("Wave {wave_number}: unknown enemy type {kind_name:?}, skipping part");
        return None;
    };
    if kind == EnemyKind::PlaneBomb {
        log::warn!("Wave {wave_number}: plane bombs are released by planes, skipping part");
        return None;
    }
    let count = match part.get("count").and_then(Value::as_f64) {
        Some(c) if c.is_finite() && c >= 0.0 => c.ceil() as u32,
        _ => {
            log::warn!(
                "Wave {wave_number}: non-numeric count {:?} for {}, skipping part",
                part.get("count"),
                kind.as_str()
            );
            return None;
        }
    };
    let speed_factor = part
        .get("speedFactor")
        .and_then(Value::as_f64)
        .map(|s| s as f32)
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or(1.0);
    Some(WavePart::new(kind, count, speed_factor))
}

/// The eleven hand-authored waves
pub fn authored_waves() -> Vec<WaveDescriptor> {
    use EnemyKind::*;
    let w = |parts: &[(EnemyKind, u32, f32)]| {
        WaveDescriptor::new(parts.iter().map(|&(k, c, s)| WavePart::new(k, c, s)))
    };
    vec![
        w(&[(Missile, 10, 1.0)]),
        w(&[(Missile, 12, 1.1)]),
        w(&[(Missile, 12, 1.1), (Mirv, 2, 1.0)]),
        w(&[(Missile, 14, 1.15), (Mirv, 3, 1.0), (Plane, 1, 1.0)]),
        w(&[(Missile, 14, 1.2), (Mirv, 3, 1.05), (SmartBomb, 2, 1.0), (Plane, 1, 1.0)]),
        w(&[(Missile, 16, 1.2), (Mirv, 3, 1.1), (SmartBomb, 3, 1.05), (Plane, 2, 1.0)]),
        w(&[
            (Missile, 16, 1.25),
            (Mirv, 4, 1.1),
            (SmartBomb, 3, 1.1),
            (Plane, 2, 1.05),
            (ShieldBomb, 1, 1.0),
        ]),
        w(&[
            (Missile, 18, 1.3),
            (Mirv, 4, 1.15),
            (SmartBomb, 4, 1.1),
            (Plane, 2, 1.1),
            (ShieldBomb, 1, 1.0),
        ]),
        w(&[
            (Missile, 20, 1.3),
            (Mirv, 5, 1.2),
            (SmartBomb, 4, 1.15),
            (Plane, 3, 1.1),
            (ShieldBomb, 2, 1.05),
        ]),
        w(&[
            (Missile, 20, 1.35),
            (Mirv, 5, 1.25),
            (SmartBomb, 5, 1.2),
            (Plane, 3, 1.15),
            (ShieldBomb, 2, 1.05),
        ]),
        w(&[
            (Missile, 22, 1.4),
            (Mirv, 6, 1.3),
            (SmartBomb, 5, 1.3),
            (Plane, 3, 1.2),
            (ShieldBomb, 2, 1.1),
        ]),
    ]
}

/// Per-wave progress: what has been spawned so far
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveProgress {
    /// 1-based wave number
    pub number: u32,
    pub descriptor: WaveDescriptor,
    /// Spawned so far, parallel to `descriptor.parts()`
    pub spawned: Vec<u32>,
    pub required: u32,
    pub spawned_total: u32,
    pub started_tick: u64,
    /// Sim tick at which the last required entity spawned
    pub last_spawn_tick: Option<u64>,
}

impl WaveProgress {
    /// Start tracking a wave. A wave with nothing to spawn falls back to a
    /// plain missile wave so it can never stall.
    pub fn new(number: u32, descriptor: WaveDescriptor, started_tick: u64) -> Self {
        let descriptor = if descriptor.required_count() == 0 {
            log::warn!(
                "Wave {number} has no spawnable enemies, defaulting to {} missiles",
                crate::consts::DEFAULT_REQUIRED_COUNT
            );
            WaveDescriptor::new([WavePart::new(
                EnemyKind::Missile,
                crate::consts::DEFAULT_REQUIRED_COUNT,
                1.0,
            )])
        } else {
            descriptor
        };
        Self {
            number,
            spawned: vec![0; descriptor.parts().len()],
            required: descriptor.required_count(),
            spawned_total: 0,
            started_tick,
            last_spawn_tick: None,
            descriptor,
        }
    }

    /// Placeholder before the first wave is initialised
    pub(crate) fn empty(number: u32) -> Self {
        Self {
            number,
            descriptor: WaveDescriptor::default(),
            spawned: Vec::new(),
            required: 0,
            spawned_total: 0,
            started_tick: 0,
            last_spawn_tick: None,
        }
    }

    pub fn all_spawned(&self) -> bool {
        self.spawned_total >= self.required
    }

    /// Spawned so far for a category
    pub fn spawned_of(&self, kind: EnemyKind) -> u32 {
        self.descriptor
            .parts()
            .iter()
            .zip(&self.spawned)
            .filter(|(p, _)| p.kind == kind)
            .map(|(_, n)| *n)
            .sum()
    }

    /// Parts still below quota, with their index
    pub fn eligible(&self) -> impl Iterator<Item = (usize, &WavePart)> {
        self.descriptor
            .parts()
            .iter()
            .enumerate()
            .filter(|(i, p)| self.spawned[*i] < p.count)
    }

    /// Count one spawn against part `index`; records the finish tick
    pub fn record_spawn(&mut self, index: usize, now: u64) {
        self.spawned[index] += 1;
        self.spawned_total += 1;
        if self.all_spawned() && self.last_spawn_tick.is_none() {
            self.last_spawn_tick = Some(now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_table_has_hundred_waves() {
        let table = WaveTable::default();
        assert_eq!(table.len(), TABLE_WAVES);
        assert_eq!(table.wave(0).unwrap(), authored_waves()[0]);
        assert_eq!(table.wave(10).unwrap(), authored_waves()[10]);
    }

    #[test]
    fn test_wave_twelve_scaling() {
        let table = WaveTable::default();
        let wave12 = table.wave(11).unwrap();
        let missiles = wave12.part(EnemyKind::Missile).unwrap();
        // 22 * 1.06 = 23.32 -> 24
        assert_eq!(missiles.count, 24);
        assert!((missiles.speed_factor - 1.4 * 1.06).abs() < 1e-4);
    }

    #[test]
    fn test_scale_ceiling_and_speed_cap() {
        assert_eq!(scale_factor(200), MAX_WAVE_SCALE);
        let table = WaveTable::default();
        let wave100 = table.wave(99).unwrap();
        assert_eq!(wave100.part(EnemyKind::Missile).unwrap().count, 88);
        for part in wave100.parts() {
            assert!(part.speed_factor <= MAX_SPEED_FACTOR);
        }
    }

    #[test]
    fn test_beyond_table_is_generated_from_last_wave() {
        let table = WaveTable::default();
        let wave100 = table.wave(99).unwrap();
        let wave101 = table.wave(100).unwrap();
        let m100 = wave100.part(EnemyKind::Missile).unwrap().count;
        let m101 = wave101.part(EnemyKind::Missile).unwrap().count;
        assert_eq!(m101, (m100 as f32 * 1.06).ceil() as u32);
        let far = table.wave(10_000).unwrap();
        assert_eq!(far.part(EnemyKind::Missile).unwrap().count, m100 * 4);
    }

    #[test]
    fn test_duplicate_parts_merge() {
        let desc = WaveDescriptor::new([
            WavePart::new(EnemyKind::Missile, 3, 1.0),
            WavePart::new(EnemyKind::Missile, 2, 1.5),
        ]);
        assert_eq!(desc.parts().len(), 1);
        assert_eq!(desc.required_count(), 5);
        assert_eq!(desc.parts()[0].speed_factor, 1.5);
    }

    #[test]
    fn test_json_skips_malformed_parts() {
        let json = r#"[
            [{"type": "missile", "count": 5, "speedFactor": 1.2},
             {"type": "mirv", "count": "lots"},
             {"type": "ufo", "count": 2}],
            [{"type": "plane", "count": 2}]
        ]"#;
        let table = WaveTable::from_json(json).unwrap();
        let first = table.wave(0).unwrap();
        assert_eq!(first.parts().len(), 1);
        assert_eq!(first.required_count(), 5);
        assert_eq!(table.wave(1).unwrap().part(EnemyKind::Plane).unwrap().speed_factor, 1.0);
        assert_eq!(table.len(), TABLE_WAVES);
    }

    #[test]
    fn test_oversized_counts_saturate() {
        let json = r#"[[
            {"type": "missile", "count": 3e9},
            {"type": "mirv", "count": 3e9},
            {"type": "missile", "count": 3e9}
        ]]"#;
        let table = WaveTable::from_json(json).unwrap();
        let first = table.wave(0).unwrap();
        assert_eq!(first.part(EnemyKind::Missile).unwrap().count, u32::MAX);
        assert_eq!(first.required_count(), u32::MAX);

        let state = crate::sim::state::GameState::with_waves(1, crate::Settings::default(), table);
        assert!(!state.halted);
        assert_eq!(state.wave.required, u32::MAX);
    }

    #[test]
    fn test_empty_table_is_error() {
        assert_eq!(WaveTable::from_json("[]").unwrap_err(), SimError::EmptyWaveTable);
        assert!(matches!(WaveTable::from_json("{"), Err(SimError::Config(_))));
    }

    #[test]
    fn test_zero_required_clamps_to_default() {
        let progress = WaveProgress::new(3, WaveDescriptor::default(), 0);
        assert_eq!(progress.required, crate::consts::DEFAULT_REQUIRED_COUNT);
        assert_eq!(progress.eligible().count(), 1);
    }

    #[test]
    fn test_last_spawn_tick_recorded_once() {
        let desc = WaveDescriptor::new([WavePart::new(EnemyKind::Missile, 2, 1.0)]);
        let mut progress = WaveProgress::new(1, desc, 0);
        progress.record_spawn(0, 10);
        assert_eq!(progress.last_spawn_tick, None);
        progress.record_spawn(0, 25);
        assert_eq!(progress.last_spawn_tick, Some(25));
        assert!(progress.all_spawned());
        assert_eq!(progress.spawned_of(EnemyKind::Missile), 2);
    }

    proptest! {
        #[test]
        fn prop_difficulty_never_decreases(index in 0u32..400) {
            let table = WaveTable::default();
            let a = table.wave(index).unwrap();
            let b = table.wave(index + 1).unwrap();
            prop_assert!(b.required_count() >= a.required_count());
            for part in a.parts() {
                let next = b.part(part.kind).unwrap();
                prop_assert!(next.count >= part.count);
                prop_assert!(next.speed_factor >= part.speed_factor - 1e-6);
            }
        }
    }
}
