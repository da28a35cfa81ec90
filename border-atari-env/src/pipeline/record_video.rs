use super::{AtariInfo, AtariLayer, LayerStep, Pixels};
use crate::{atari_env::AtariAction, AtariEnvError};
use anyhow::Result;
use image::{ImageError, RgbImage};
use log::{info, warn};
use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

/// Returns `true` for perfect cubes below 1000, and every 1000th episode after.
pub fn capped_cubic_schedule(episode_id: usize) -> bool {
    if episode_id < 1000 {
        let c = (episode_id as f64).cbrt().round() as usize;
        c * c * c == episode_id
    } else {
        episode_id % 1000 == 0
    }
}

fn fs_error(path: &Path, source: io::Error) -> AtariEnvError {
    AtariEnvError::FileSystem {
        path: path.to_path_buf(),
        source,
    }
}

struct Recording {
    dir: PathBuf,
    n_frames: usize,
}

/// Saves every frame of scheduled episodes as PNG files.
///
/// Frames of episode `n` go to `<video_dir>/rl-video-episode-<n>/` as
/// `frame-000000.png`, `frame-000001.png` and so on. Episodes are counted by
/// resets of this layer and scheduled with [`capped_cubic_schedule`].
pub struct RecordVideo {
    inner: Box<dyn AtariLayer>,
    video_dir: PathBuf,
    n_episodes: usize,
    recording: Option<Recording>,
}

impl RecordVideo {
    /// Creates `video_dir` if it does not exist.
    pub fn new(inner: Box<dyn AtariLayer>, video_dir: impl AsRef<Path>) -> Result<Self> {
        let video_dir = video_dir.as_ref().to_path_buf();
        if video_dir.is_dir() {
            warn!("Frames will be written into the existing directory {:?}", video_dir);
        }
        fs::create_dir_all(&video_dir).map_err(|e| fs_error(&video_dir, e))?;

        Ok(Self {
            inner,
            video_dir,
            n_episodes: 0,
            recording: None,
        })
    }

    fn write_frame(&mut self, pixels: &Pixels) -> Result<()> {
        let recording = match self.recording.as_mut() {
            Some(recording) => recording,
            None => return Ok(()),
        };
        let img = match pixels {
            Pixels::Rgb(img) => img,
            p => {
                return Err(AtariEnvError::Pipeline(format!(
                    "RecordVideo received {} frames",
                    p.kind()
                ))
                .into())
            }
        };

        let path = recording
            .dir
            .join(format!("frame-{:06}.png", recording.n_frames));
        img.save(&path).map_err(|e| {
            let source = match e {
                ImageError::IoError(e) => e,
                e => io::Error::new(io::ErrorKind::Other, e),
            };
            fs_error(&path, source)
        })?;
        recording.n_frames += 1;
        Ok(())
    }

    fn finish(&mut self) {
        if let Some(recording) = self.recording.take() {
            info!(
                "Recorded {} frames in {:?}",
                recording.n_frames, recording.dir
            );
        }
    }
}

impl AtariLayer for RecordVideo {
    fn reset(&mut self, seed: Option<u64>) -> Result<(Pixels, AtariInfo)> {
        self.finish();
        let (pixels, info) = self.inner.reset(seed)?;

        let episode_id = self.n_episodes;
        self.n_episodes += 1;
        if capped_cubic_schedule(episode_id) {
            let dir = self
                .video_dir
                .join(format!("rl-video-episode-{}", episode_id));
            fs::create_dir_all(&dir).map_err(|e| fs_error(&dir, e))?;
            self.recording = Some(Recording { dir, n_frames: 0 });
            self.write_frame(&pixels)?;
        }

        Ok((pixels, info))
    }

    fn step(&mut self, action: usize) -> Result<LayerStep> {
        let step = self.inner.step(action)?;
        self.write_frame(&step.pixels)?;
        if step.is_done() {
            self.finish();
        }
        Ok(step)
    }

    fn close(&mut self) -> Result<()> {
        self.finish();
        self.inner.close()
    }

    fn actions(&self) -> &[AtariAction] {
        self.inner.actions()
    }

    fn lives(&self) -> usize {
        self.inner.lives()
    }

    fn screen(&self) -> Result<RgbImage> {
        self.inner.screen()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{pipeline::EmulatorLayer, scenario::FrameSkip, util::test::ScriptedEmulator};
    use tempdir::TempDir;

    fn recorder(dir: &Path, game_over_at: usize) -> Result<RecordVideo> {
        let emulator = ScriptedEmulator::new().game_over_at(game_over_at);
        let base = EmulatorLayer::new(Box::new(emulator), FrameSkip::Fixed(1), 1000);
        RecordVideo::new(Box::new(base), dir)
    }

    fn n_files(dir: &Path) -> usize {
        fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
    }

    #[test]
    fn schedule() {
        let scheduled = (0..2001)
            .filter(|&i| capped_cubic_schedule(i))
            .collect::<Vec<_>>();
        assert_eq!(
            scheduled,
            vec![0, 1, 8, 27, 64, 125, 216, 343, 512, 729, 1000, 2000]
        );
    }

    #[test]
    fn scheduled_episodes_are_saved_frame_by_frame() -> Result<()> {
        let tmp = TempDir::new("record_video")?;
        let video_dir = tmp.path().join("videos").join("run");
        let mut layer = recorder(&video_dir, 3)?;

        for _ in 0..3 {
            layer.reset(None)?;
            while !layer.step(0)?.is_done() {}
        }
        layer.close()?;

        // Reset frame and 3 steps
        assert_eq!(n_files(&video_dir.join("rl-video-episode-0")), 4);
        assert_eq!(n_files(&video_dir.join("rl-video-episode-1")), 4);
        assert!(!video_dir.join("rl-video-episode-2").exists());
        assert!(video_dir
            .join("rl-video-episode-0")
            .join("frame-000003.png")
            .is_file());
        Ok(())
    }

    #[test]
    fn unwritable_directory_is_reported() -> Result<()> {
        let tmp = TempDir::new("record_video")?;
        let file = tmp.path().join("not_a_dir");
        fs::write(&file, b"")?;

        let err = recorder(&file.join("run"), 3).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<AtariEnvError>(),
            Some(AtariEnvError::FileSystem { .. })
        ));
        Ok(())
    }
}
