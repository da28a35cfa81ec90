//! Scenario ids of Atari games.
use crate::AtariEnvError;
use serde::{Deserialize, Serialize};
use std::{path::{Path, PathBuf}, str::FromStr};

/// The number of emulator frames per agent step.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum FrameSkip {
    /// Always the given number of frames.
    Fixed(usize),

    /// Uniformly sampled from `low..high` at every step.
    Stochastic(usize, usize),
}

/// Emulator settings identified by a scenario id, like `BreakoutNoFrameskip-v4`.
///
/// Accepted forms are `{Game}NoFrameskip-v{0,4}`, `{Game}Deterministic-v{0,4}`,
/// `{Game}-v{0,4}` and `ALE/{Game}-v5`.
#[derive(Clone, Debug, PartialEq)]
pub struct Scenario {
    /// The scenario id.
    pub id: String,

    /// Name of the game in CamelCase, like `SpaceInvaders`.
    pub game: String,

    /// Emulator frames per agent step.
    pub frame_skip: FrameSkip,

    /// Probability that the emulator repeats the previous action.
    pub repeat_action_probability: f32,

    /// The maximum number of agent steps in an episode.
    pub max_episode_steps: usize,
}

impl Scenario {
    /// Returns the file stem of the ROM, like `space_invaders`.
    pub fn rom_stem(&self) -> String {
        let mut stem = String::with_capacity(self.game.len() + 4);
        for (i, c) in self.game.chars().enumerate() {
            if c.is_ascii_uppercase() {
                if i > 0 {
                    stem.push('_');
                }
                stem.push(c.to_ascii_lowercase());
            } else {
                stem.push(c);
            }
        }
        stem
    }

    /// Returns the path of the ROM file in the given directory.
    pub fn rom_path(&self, rom_dir: impl AsRef<Path>) -> PathBuf {
        rom_dir.as_ref().join(format!("{}.bin", self.rom_stem()))
    }

    fn error(id: &str, reason: impl Into<String>) -> AtariEnvError {
        AtariEnvError::EnvironmentCreation {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

impl FromStr for Scenario {
    type Err = AtariEnvError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        let (name, version) = id
            .rsplit_once("-v")
            .ok_or_else(|| Self::error(id, "no version suffix"))?;

        let (game, frame_skip, repeat_action_probability, max_episode_steps) =
            match (name.strip_prefix("ALE/"), version) {
                (Some(game), "5") => (game, FrameSkip::Fixed(4), 0.25, 108_000 / 4),
                (Some(_), _) => return Err(Self::error(id, "ALE/ namespace requires v5")),
                (None, "0") | (None, "4") => {
                    let sticky = if version == "0" { 0.25 } else { 0.0 };
                    if let Some(game) = name.strip_suffix("NoFrameskip") {
                        (game, FrameSkip::Fixed(1), sticky, 400_000)
                    } else if let Some(game) = name.strip_suffix("Deterministic") {
                        let skip = if game == "SpaceInvaders" { 3 } else { 4 };
                        (game, FrameSkip::Fixed(skip), sticky, 100_000)
                    } else {
                        let max_steps = if version == "0" { 10_000 } else { 100_000 };
                        (name, FrameSkip::Stochastic(2, 5), sticky, max_steps)
                    }
                }
                _ => return Err(Self::error(id, format!("unsupported version v{}", version))),
            };

        let mut chars = game.chars();
        match chars.next() {
            Some(c) if c.is_ascii_uppercase() && chars.all(|c| c.is_ascii_alphanumeric()) => {}
            _ => return Err(Self::error(id, format!("invalid game name {:?}", game))),
        }

        Ok(Self {
            id: id.to_string(),
            game: game.to_string(),
            frame_skip,
            repeat_action_probability,
            max_episode_steps,
        })
    }
}
