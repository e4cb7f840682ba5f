//! Sound cues raised by the simulation
//!
//! The core never plays audio. It maps game events to fire-and-forget
//! `SoundEvent`s and hands them to the host through `SimHooks::sound`. Each
//! cue carries a procedural tone description so a host can synthesise it
//! without sample files.

use serde::{Deserialize, Serialize};

use crate::sim::state::GameEvent;

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEvent {
    /// Interceptor(s) left a launch site
    MissileLaunched,
    /// Any blast started
    ExplosionTriggered,
    /// Enemy destroyed
    EnemyDestroyed,
    /// Shield bomb lost an armor layer
    ArmorCrack,
    /// Base or satellite shield absorbed a hit
    ShieldHit,
    ShieldBroken,
    /// City, base or satellite destroyed
    StructureLost,
    WaveStart,
    WaveClear,
    GameOver,
}

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// One oscillator sweep with an exponential decay envelope
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    pub waveform: Waveform,
    pub start_hz: f32,
    pub end_hz: f32,
    pub duration_s: f32,
    /// Peak gain before volume scaling
    pub gain: f32,
}

impl Tone {
    const fn new(
        waveform: Waveform,
        start_hz: f32,
        end_hz: f32,
        duration_s: f32,
        gain: f32,
    ) -> Self {
        Self {
            waveform,
            start_hz,
            end_hz,
            duration_s,
            gain,
        }
    }
}

impl SoundEvent {
    /// Procedural recipe for this cue
    pub fn tone(&self) -> Tone {
        use Waveform::*;
        match self {
            SoundEvent::MissileLaunched => Tone::new(Sine, 300.0, 900.0, 0.12, 0.3),
            SoundEvent::ExplosionTriggered => Tone::new(Sawtooth, 120.0, 40.0, 0.35, 0.45),
            SoundEvent::EnemyDestroyed => Tone::new(Square, 600.0, 200.0, 0.1, 0.25),
            SoundEvent::ArmorCrack => Tone::new(Square, 400.0, 200.0, 0.2, 0.25),
            SoundEvent::ShieldHit => Tone::new(Triangle, 800.0, 500.0, 0.15, 0.3),
            SoundEvent::ShieldBroken => Tone::new(Sawtooth, 900.0, 100.0, 0.4, 0.4),
            SoundEvent::StructureLost => Tone::new(Sine, 80.0, 30.0, 0.6, 0.6),
            SoundEvent::WaveStart => Tone::new(Triangle, 440.0, 660.0, 0.3, 0.3),
            SoundEvent::WaveClear => Tone::new(Sine, 523.0, 1047.0, 0.5, 0.35),
            SoundEvent::GameOver => Tone::new(Sine, 400.0, 100.0, 1.0, 0.5),
        }
    }
}

/// Sound cue for a game event, if it has one
pub fn cue_for(event: &GameEvent) -> Option<SoundEvent> {
    let cue = match event {
        GameEvent::MissileLaunched { .. } => SoundEvent::MissileLaunched,
        GameEvent::ExplosionTriggered { .. } => SoundEvent::ExplosionTriggered,
        GameEvent::EnemyDestroyed { .. } => SoundEvent::EnemyDestroyed,
        GameEvent::ArmorLayerBroken { .. } => SoundEvent::ArmorCrack,
        GameEvent::ShieldHit { .. } => SoundEvent::ShieldHit,
        GameEvent::ShieldBroken { .. } => SoundEvent::ShieldBroken,
        GameEvent::StructureDestroyed { .. } => SoundEvent::StructureLost,
        GameEvent::WaveStarted { .. } => SoundEvent::WaveStart,
        GameEvent::WaveCompleted { .. } => SoundEvent::WaveClear,
        GameEvent::GameOver { .. } => SoundEvent::GameOver,
        // The split puff is silent; the parent's trail just stops
        GameEvent::Split { .. } => return None,
    };
    Some(cue)
}

/// Host-side volume state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mixer {
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for Mixer {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl Mixer {
    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Peak gain for a cue at the current volume, None when silent
    pub fn gain_for(&self, cue: SoundEvent) -> Option<f32> {
        let gain = cue.tone().gain * self.effective_volume();
        (gain > 0.0).then_some(gain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{LaunchSite, StructureRef};
    use glam::Vec2;

    #[test]
    fn test_cue_mapping() {
        let launch = GameEvent::MissileLaunched {
            site: LaunchSite::Base(1),
            count: 1,
        };
        assert_eq!(cue_for(&launch), Some(SoundEvent::MissileLaunched));
        let blast = GameEvent::ExplosionTriggered {
            pos: Vec2::ZERO,
            radius: 10.0,
            player: true,
        };
        assert_eq!(cue_for(&blast), Some(SoundEvent::ExplosionTriggered));
        let lost = GameEvent::StructureDestroyed {
            structure: StructureRef::City(0),
        };
        assert_eq!(cue_for(&lost), Some(SoundEvent::StructureLost));
        let split = GameEvent::Split {
            kind: crate::sim::EnemyKind::Mirv,
            pos: Vec2::ZERO,
            children: 3,
        };
        assert_eq!(cue_for(&split), None);
    }

    #[test]
    fn test_mixer_volume() {
        let mut mixer = Mixer::default();
        mixer.set_sfx_volume(0.5);
        assert!((mixer.effective_volume() - 0.4).abs() < 1e-6);
        mixer.set_master_volume(3.0);
        assert!((mixer.effective_volume() - 0.5).abs() < 1e-6);
        mixer.set_muted(true);
        assert_eq!(mixer.gain_for(SoundEvent::GameOver), None);
    }

    #[test]
    fn test_tones_are_audible() {
        use SoundEvent::*;
        for cue in [
            MissileLaunched,
            ExplosionTriggered,
            EnemyDestroyed,
            ArmorCrack,
            ShieldHit,
            ShieldBroken,
            StructureLost,
            WaveStart,
            WaveClear,
            GameOver,
        ] {
            let tone = cue.tone();
            assert!(tone.duration_s > 0.0 && tone.gain > 0.0, "{cue:?}");
            assert!(tone.start_hz >= 20.0 && tone.end_hz >= 20.0);
        }
    }
}
