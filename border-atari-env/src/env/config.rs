//! Configuration of [`BorderAtariEnv`](super::BorderAtariEnv).
//!
//! If environment variable `ATARI_ROM_DIR` exists, it is used as the directory
//! from which ROM images of the Atari games are loaded. Otherwise `$HOME/atari_rom`.
use crate::pipeline::Stage;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    env,
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Configurations of [`BorderAtariEnv`](super::BorderAtariEnv).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BorderAtariEnvConfig {
    /// Directory of ROM files.
    pub rom_dir: PathBuf,

    /// Scenario id, like `BreakoutNoFrameskip-v4`.
    pub name: String,

    /// Preprocessing stages, from the emulator outward.
    pub stages: Vec<Stage>,

    /// Shows the screen in a window.
    pub render: bool,

    /// Upper limit of frames per second in rendering. 0 for no limit.
    pub render_fps: u32,
}

/// `$ATARI_ROM_DIR`, falling back to `$HOME/atari_rom`.
pub fn default_rom_dir() -> PathBuf {
    match env::var_os("ATARI_ROM_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("atari_rom"),
    }
}

impl Default for BorderAtariEnvConfig {
    fn default() -> Self {
        Self {
            rom_dir: default_rom_dir(),
            name: "BreakoutNoFrameskip-v4".to_string(),
            stages: Stage::atari_preprocessing(),
            render: false,
            render_fps: 60,
        }
    }
}

impl BorderAtariEnvConfig {
    /// Sets the scenario id.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the directory of ROM files.
    pub fn rom_dir(mut self, v: impl AsRef<Path>) -> Self {
        self.rom_dir = v.as_ref().to_path_buf();
        self
    }

    /// Sets preprocessing stages.
    pub fn stages(mut self, v: Vec<Stage>) -> Self {
        self.stages = v;
        self
    }

    /// Records frames under `videos/<run_name>`.
    pub fn record_video(mut self, run_name: impl AsRef<str>) -> Self {
        self.stages
            .retain(|s| !matches!(s, Stage::RecordVideo { .. }));
        self.stages.insert(
            0,
            Stage::RecordVideo {
                video_dir: Path::new("videos").join(run_name.as_ref()),
            },
        );
        self
    }

    /// Sets the rendering flag.
    pub fn render(mut self, render: bool) -> Self {
        self.render = render;
        self
    }

    /// Sets the upper limit of frames per second in rendering.
    pub fn render_fps(mut self, v: u32) -> Self {
        self.render_fps = v;
        self
    }

    /// Constructs [`BorderAtariEnvConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`BorderAtariEnvConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_video_wraps_the_emulator() {
        let config = BorderAtariEnvConfig::default()
            .record_video("first")
            .record_video("second");

        assert_eq!(config.stages.len(), Stage::atari_preprocessing().len() + 1);
        assert_eq!(
            config.stages[0],
            Stage::RecordVideo {
                video_dir: PathBuf::from("videos/second")
            }
        );
        assert!(Stage::validate(&config.stages).is_ok());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: BorderAtariEnvConfig =
            serde_yaml::from_str("name: PongNoFrameskip-v4\nrender: true\n").unwrap();

        assert_eq!(config.name, "PongNoFrameskip-v4");
        assert!(config.render);
        assert_eq!(config.render_fps, 60);
        assert_eq!(config.stages, Stage::atari_preprocessing());
    }
}
