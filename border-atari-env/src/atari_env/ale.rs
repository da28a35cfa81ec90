//! Binding of the Arcade Learning Environment.
use super::AtariAction;
use anyhow::{anyhow, Context, Result};
use c_str_macro::c_str;
use num_traits::FromPrimitive;
use std::{ffi::CString, os::unix::ffi::OsStrExt, path::Path};

/// Settings of the emulator, applied before loading a ROM.
pub struct AleConfig {
    /// Seed of the emulator. 0 means seeding with the current time.
    pub random_seed: i32,
    pub display_screen: bool,
    pub sound: bool,
    /// Averages the last 2 frames.
    pub color_averaging: bool,
    /// 1 is no skip.
    pub frame_skip: i32,
    pub repeat_action_probability: f32,
    pub difficulty_setting: i32,
}

impl Default for AleConfig {
    fn default() -> Self {
        Self {
            random_seed: 0,
            display_screen: false,
            sound: false,
            color_averaging: false,
            frame_skip: 1,
            repeat_action_probability: 0.25,
            difficulty_setting: 0,
        }
    }
}

pub struct Ale {
    inner: *mut atari_env_sys::ALEInterface,
    rom_path: CString,
    difficulty_setting: i32,
}

// The interface is owned by a single `Ale` and never shared.
unsafe impl Send for Ale {}

impl Drop for Ale {
    fn drop(&mut self) {
        unsafe {
            atari_env_sys::ALE_del(self.inner);
        }
    }
}

fn to_c_string(path: &Path) -> Result<CString> {
    CString::new(path.as_os_str().as_bytes())
        .with_context(|| format!("Invalid path {:?}", path))
}

impl Ale {
    pub fn new(rom_path: &Path, config: AleConfig) -> Result<Self> {
        if !rom_path.is_file() {
            return Err(anyhow!("ROM file {:?} does not exist", rom_path));
        }
        let rom_path = to_c_string(rom_path)?;
        let ale = unsafe { atari_env_sys::ALE_new() };
        unsafe {
            atari_env_sys::setInt(ale, c_str!("random_seed").as_ptr(), config.random_seed);
            atari_env_sys::setBool(
                ale,
                c_str!("display_screen").as_ptr(),
                config.display_screen,
            );
            atari_env_sys::setBool(ale, c_str!("sound").as_ptr(), config.sound);
            atari_env_sys::setBool(
                ale,
                c_str!("color_averaging").as_ptr(),
                config.color_averaging,
            );
            atari_env_sys::setInt(ale, c_str!("frame_skip").as_ptr(), config.frame_skip);
            atari_env_sys::setFloat(
                ale,
                c_str!("repeat_action_probability").as_ptr(),
                config.repeat_action_probability,
            );
        }

        let mut ale = Self {
            inner: ale,
            rom_path,
            difficulty_setting: config.difficulty_setting,
        };
        ale.load_rom();
        Ok(ale)
    }

    fn load_rom(&mut self) {
        unsafe {
            atari_env_sys::loadROM(self.inner, self.rom_path.as_ptr());
            atari_env_sys::setDifficulty(self.inner, self.difficulty_setting);
            atari_env_sys::reset_game(self.inner);
        }
    }

    /// Sets the seed and reloads the ROM, which is when the emulator reads the seed.
    pub fn reseed(&mut self, seed: i32) -> Result<()> {
        unsafe {
            atari_env_sys::setInt(self.inner, c_str!("random_seed").as_ptr(), seed);
        }
        self.load_rom();
        Ok(())
    }

    fn actions(n: usize, fill: impl FnOnce(*mut i32)) -> Vec<AtariAction> {
        let mut buf = vec![0i32; n];
        fill(buf.as_mut_ptr());
        buf.into_iter().filter_map(AtariAction::from_i32).collect()
    }

    pub fn minimal_actions(&self) -> Vec<AtariAction> {
        let n = unsafe { atari_env_sys::getMinimalActionSize(self.inner) } as usize;
        Self::actions(n, |ptr| unsafe {
            atari_env_sys::getMinimalActionSet(self.inner, ptr);
        })
    }

    pub fn is_game_over(&self) -> bool {
        unsafe { atari_env_sys::game_over(self.inner) }
    }

    pub fn reset(&mut self) {
        unsafe {
            atari_env_sys::reset_game(self.inner);
        }
    }

    /// Returns reward.
    pub fn take_action(&mut self, action: AtariAction) -> i32 {
        let ret: ::std::os::raw::c_int = unsafe { atari_env_sys::act(self.inner, action as i32) };
        ret.into()
    }

    pub fn lives(&self) -> u32 {
        unsafe { atari_env_sys::lives(self.inner) as u32 }
    }

    pub fn width(&self) -> u32 {
        unsafe { atari_env_sys::getScreenWidth(self.inner) as u32 }
    }

    pub fn height(&self) -> u32 {
        unsafe { atari_env_sys::getScreenHeight(self.inner) as u32 }
    }

    pub fn rgb24_size(&self) -> usize {
        (self.width() as usize) * (self.height() as usize) * 3
    }

    /// Always RGB regardless of endianness.
    pub fn rgb24(&self, buf: &mut [u8]) {
        debug_assert_eq!(buf.len(), self.rgb24_size());
        unsafe {
            atari_env_sys::getScreenRGB2(self.inner, buf.as_mut_ptr());
        }
    }
}
