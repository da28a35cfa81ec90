//! Atari emulator.
//!
//! [`Ale`] is a thin binding of the Arcade Learning Environment, and [`AtariEnv`]
//! puts it behind the [`Emulator`] trait together with the path of the loaded ROM.
#[cfg(feature = "atari-env-sys")]
pub mod ale;
#[cfg(feature = "atari-env-sys")]
pub use ale::{Ale, AleConfig as EmulatorConfig};
use anyhow::Result;

/// Actions of the Atari 2600 controller.
#[derive(Copy, Clone, Debug, PartialEq, Eq, num_derive::FromPrimitive, strum::Display)]
#[repr(i32)]
pub enum AtariAction {
    #[strum(serialize = "NOOP")]
    Noop = 0,
    #[strum(serialize = "FIRE")]
    Fire = 1,
    #[strum(serialize = "UP")]
    Up = 2,
    #[strum(serialize = "RIGHT")]
    Right = 3,
    #[strum(serialize = "LEFT")]
    Left = 4,
    #[strum(serialize = "DOWN")]
    Down = 5,
    #[strum(serialize = "UPRIGHT")]
    UpRight = 6,
    #[strum(serialize = "UPLEFT")]
    UpLeft = 7,
    #[strum(serialize = "DOWNRIGHT")]
    DownRight = 8,
    #[strum(serialize = "DOWNLEFT")]
    DownLeft = 9,
    #[strum(serialize = "UPFIRE")]
    UpFire = 10,
    #[strum(serialize = "RIGHTFIRE")]
    RightFire = 11,
    #[strum(serialize = "LEFTFIRE")]
    LeftFire = 12,
    #[strum(serialize = "DOWNFIRE")]
    DownFire = 13,
    #[strum(serialize = "UPRIGHTFIRE")]
    UpRightFire = 14,
    #[strum(serialize = "UPLEFTFIRE")]
    UpLeftFire = 15,
    #[strum(serialize = "DOWNRIGHTFIRE")]
    DownRightFire = 16,
    #[strum(serialize = "DOWNLEFTFIRE")]
    DownLeftFire = 17,
}

/// Interface of an Atari emulator, operated one frame at a time.
pub trait Emulator {
    /// Actions meaningful for the loaded game.
    fn minimal_actions(&self) -> Vec<AtariAction>;

    /// Width of the screen in pixels.
    fn width(&self) -> usize;

    /// Height of the screen in pixels.
    fn height(&self) -> usize;

    /// Remaining lives.
    fn lives(&self) -> usize;

    /// Returns `true` if the game is over.
    fn is_game_over(&self) -> bool;

    /// Resets the game.
    fn reset(&mut self);

    /// Emulates a frame with the given action and returns the reward.
    fn act(&mut self, action: AtariAction) -> i32;

    /// Writes the screen to `buf` as RGB, row-major, of length `width * height * 3`.
    fn screen_rgb(&self, buf: &mut [u8]);

    /// Reseeds the random number generator of the emulator.
    fn reseed(&mut self, seed: i32) -> Result<()>;
}

/// Arcade Learning Environment with a loaded ROM.
#[cfg(feature = "atari-env-sys")]
pub struct AtariEnv {
    ale: Ale,
}

#[cfg(feature = "atari-env-sys")]
impl AtariEnv {
    /// Loads a ROM.
    ///
    /// About frame-skipping and action-repeat, see
    /// <https://danieltakeshi.github.io/2016/11/25/frame-skipping-and-preprocessing-for-deep-q-networks-on-atari-2600-games/>
    pub fn new<P: AsRef<std::path::Path>>(rom_path: P, emulator_config: EmulatorConfig) -> Result<Self> {
        Ok(Self {
            ale: Ale::new(rom_path.as_ref(), emulator_config)?,
        })
    }
}

#[cfg(feature = "atari-env-sys")]
impl Emulator for AtariEnv {
    fn minimal_actions(&self) -> Vec<AtariAction> {
        self.ale.minimal_actions()
    }

    fn width(&self) -> usize {
        self.ale.width() as usize
    }

    fn height(&self) -> usize {
        self.ale.height() as usize
    }

    fn lives(&self) -> usize {
        self.ale.lives() as usize
    }

    fn is_game_over(&self) -> bool {
        self.ale.is_game_over()
    }

    fn reset(&mut self) {
        self.ale.reset()
    }

    fn act(&mut self, action: AtariAction) -> i32 {
        self.ale.take_action(action)
    }

    fn screen_rgb(&self, buf: &mut [u8]) {
        self.ale.rgb24(buf);
    }

    fn reseed(&mut self, seed: i32) -> Result<()> {
        self.ale.reseed(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::AtariAction;
    use num_traits::FromPrimitive;

    #[test]
    fn action_meanings() {
        assert_eq!(AtariAction::Fire.to_string(), "FIRE");
        assert_eq!(AtariAction::DownLeftFire.to_string(), "DOWNLEFTFIRE");
        assert_eq!(AtariAction::from_i32(3), Some(AtariAction::Right));
        assert_eq!(AtariAction::from_i32(18), None);
    }
}
