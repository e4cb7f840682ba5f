//! Skyguard headless runner
//!
//! Plays a run with a simple autopilot at the fixed tick rate (no wall clock),
//! then prints the run summary as JSON.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::collections::HashMap;
    use std::path::PathBuf;

    use clap::Parser;
    use glam::Vec2;

    use skyguard::audio::{Mixer, SoundEvent};
    use skyguard::consts::*;
    use skyguard::render::build_frame;
    use skyguard::sim::{GamePhase, GameState, SimHooks, TickInput, tick};
    use skyguard::{Difficulty, HighScores, PersistError, RunSummary, Settings};

    /// Ticks between autopilot shots
    const FIRE_INTERVAL: u64 = 18;
    /// Ten minutes of play
    const DEFAULT_TICK_CAP: u64 = 10 * 60 * TICK_RATE as u64;

    fn parse_difficulty(value: &str) -> Result<Difficulty, String> {
        Difficulty::from_str(value).ok_or_else(|| format!("unknown difficulty: {value}"))
    }

    /// Play a headless run with the autopilot and print its summary as JSON
    #[derive(Debug, Parser)]
    #[command(author, version, about, long_about = None)]
    pub(crate) struct Options {
        /// RNG seed; overrides the settings file
        #[arg(long)]
        pub(crate) seed: Option<u64>,
        /// Difficulty preset (easy, normal, hard); overrides the settings file
        #[arg(long, value_parser = parse_difficulty)]
        pub(crate) difficulty: Option<Difficulty>,
        /// Settings JSON file
        #[arg(long, value_name = "FILE")]
        pub(crate) settings: Option<PathBuf>,
        /// High score JSON file, loaded at start and saved at game over
        #[arg(long, value_name = "FILE")]
        pub(crate) scores: Option<PathBuf>,
        /// Stop after this many ticks if the run has not ended
        #[arg(
            long,
            default_value_t = DEFAULT_TICK_CAP,
            value_parser = clap::value_parser!(u64).range(1..)
        )]
        pub(crate) ticks: u64,
    }

    /// Host side of the simulation: mixer and leaderboard
    struct Host {
        mixer: Mixer,
        cues: HashMap<SoundEvent, u32>,
        scores: HighScores,
        scores_path: Option<PathBuf>,
    }

    impl SimHooks for Host {
        fn sound(&mut self, cue: SoundEvent) {
            if let Some(gain) = self.mixer.gain_for(cue) {
                log::trace!("cue {cue:?} at gain {gain:.2}");
                *self.cues.entry(cue).or_default() += 1;
            }
        }

        fn run_finished(&mut self, summary: &RunSummary) -> Result<(), PersistError> {
            match self.scores.add_summary(summary) {
                Some(rank) => log::info!("New high score #{rank}: {}", summary.score),
                None => log::info!("Score {} did not place", summary.score),
            }
            if let Some(path) = &self.scores_path {
                self.scores.save(path)?;
            }
            Ok(())
        }
    }

    /// Aim a little ahead of the lowest live threat
    fn autopilot_target(state: &GameState) -> Option<Vec2> {
        let lowest = state
            .projectiles
            .iter()
            .filter(|p| p.alive && p.pos.y < GROUND_Y - 60.0)
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))?;
        Some(lowest.pos + lowest.vel * 20.0)
    }

    pub(crate) fn run(opts: Options) -> Result<(), String> {
        let mut settings = match &opts.settings {
            Some(path) => Settings::load(path),
            None => Settings::default(),
        };
        if let Some(difficulty) = opts.difficulty {
            settings.difficulty = difficulty;
        }
        let seed = opts.seed.or(settings.seed).unwrap_or_else(rand::random);
        log::info!("Skyguard starting: seed {seed}, {}", settings.difficulty.as_str());

        let mut host = Host {
            mixer: Mixer::default(),
            cues: HashMap::new(),
            scores: opts
                .scores
                .as_deref()
                .map(HighScores::load)
                .unwrap_or_default(),
            scores_path: opts.scores.clone(),
        };

        let mut state = GameState::new(seed, settings);
        while state.time_ticks < opts.ticks
            && state.phase != GamePhase::GameOver
            && !state.halted
        {
            let firing = state.time_ticks % FIRE_INTERVAL == 0;
            let input = TickInput {
                fire_at: if firing { autopilot_target(&state) } else { None },
                close_store: state.phase == GamePhase::Store,
                ..Default::default()
            };
            tick(&mut state, &input, &mut host);
        }

        let summary = RunSummary::from_state(&state);
        let json = serde_json::to_string_pretty(&summary).map_err(|e| e.to_string())?;
        println!("{json}");
        log::info!(
            "Finished at wave {} after {} ticks; last frame {} vertices, {} cues played",
            summary.wave,
            summary.ticks,
            build_frame(&state).len(),
            host.cues.values().sum::<u32>()
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;

    env_logger::init();
    if let Err(err) = native::run(native::Options::parse()) {
        log::error!("{err}");
        eprintln!("skyguard: {err}");
        std::process::exit(2);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Library only on wasm; hosts drive `sim::tick` themselves
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use clap::{CommandFactory, Parser};
    use skyguard::Difficulty;

    use super::native::Options;

    #[test]
    fn test_cli_definition() {
        Options::command().debug_assert();
    }

    #[test]
    fn test_cli_parses_flags() {
        let opts = Options::try_parse_from([
            "skyguard",
            "--seed",
            "42",
            "--difficulty",
            "HARD",
            "--ticks",
            "600",
        ])
        .unwrap();
        assert_eq!(opts.seed, Some(42));
        assert_eq!(opts.difficulty, Some(Difficulty::Hard));
        assert_eq!(opts.ticks, 600);
        assert!(opts.scores.is_none());

        let defaults = Options::try_parse_from(["skyguard"]).unwrap();
        assert_eq!(defaults.ticks, 36_000);
        assert!(defaults.difficulty.is_none());
    }

    #[test]
    fn test_cli_rejects_bad_values() {
        assert!(Options::try_parse_from(["skyguard", "--difficulty", "nightmare"]).is_err());
        assert!(Options::try_parse_from(["skyguard", "--ticks", "0"]).is_err());
        assert!(Options::try_parse_from(["skyguard", "--seed", "-3"]).is_err());
        assert!(Options::try_parse_from(["skyguard", "--frames", "3"]).is_err());
    }
}
