use super::{AtariInfo, AtariLayer, LayerStep, Pixels};
use crate::{
    atari_env::{AtariAction, Emulator},
    scenario::FrameSkip,
    AtariEnvError,
};
use anyhow::Result;
use image::RgbImage;
use log::trace;

/// Derives a nonzero emulator seed, since the emulator seeds itself with the
/// current time for 0.
pub(crate) fn emulator_seed(seed: u64) -> i32 {
    fastrand::Rng::with_seed(seed).i32(1..)
}

/// The innermost layer, taking actions of the minimal action set on the emulator.
///
/// An agent step spans the frames given by [`FrameSkip`]. Episodes are truncated
/// after `max_episode_steps` agent steps.
pub struct EmulatorLayer {
    emulator: Box<dyn Emulator>,
    actions: Vec<AtariAction>,
    frame_skip: FrameSkip,
    max_episode_steps: usize,
    elapsed_steps: usize,
    rng: fastrand::Rng,
}

impl EmulatorLayer {
    pub fn new(emulator: Box<dyn Emulator>, frame_skip: FrameSkip, max_episode_steps: usize) -> Self {
        Self {
            actions: emulator.minimal_actions(),
            emulator,
            frame_skip,
            max_episode_steps,
            elapsed_steps: 0,
            rng: fastrand::Rng::new(),
        }
    }

    fn info(&self) -> AtariInfo {
        AtariInfo {
            lives: self.emulator.lives(),
            real_done: self.emulator.is_game_over(),
            episode: None,
        }
    }
}

impl AtariLayer for EmulatorLayer {
    fn reset(&mut self, seed: Option<u64>) -> Result<(Pixels, AtariInfo)> {
        if let Some(seed) = seed {
            self.emulator.reseed(emulator_seed(seed))?;
            self.rng = fastrand::Rng::with_seed(seed);
        }
        self.emulator.reset();
        self.elapsed_steps = 0;
        Ok((Pixels::Rgb(self.screen()?), self.info()))
    }

    fn step(&mut self, action: usize) -> Result<LayerStep> {
        let a = *self
            .actions
            .get(action)
            .ok_or(AtariEnvError::InvalidAction {
                action,
                n_actions: self.actions.len(),
            })?;
        let n_frames = match self.frame_skip {
            FrameSkip::Fixed(n) => n,
            FrameSkip::Stochastic(low, high) => self.rng.usize(low..high),
        };

        let mut reward = 0f32;
        for _ in 0..n_frames {
            reward += self.emulator.act(a) as f32;
            if self.emulator.is_game_over() {
                break;
            }
        }
        self.elapsed_steps += 1;
        trace!("{} for {} frames, reward = {}", a, n_frames, reward);

        let info = self.info();
        Ok(LayerStep {
            pixels: Pixels::Rgb(self.screen()?),
            reward,
            is_terminated: info.real_done,
            is_truncated: self.elapsed_steps >= self.max_episode_steps,
            info,
        })
    }

    fn actions(&self) -> &[AtariAction] {
        &self.actions
    }

    fn lives(&self) -> usize {
        self.emulator.lives()
    }

    fn screen(&self) -> Result<RgbImage> {
        let (w, h) = (self.emulator.width(), self.emulator.height());
        let mut buf = vec![0u8; w * h * 3];
        self.emulator.screen_rgb(&mut buf);
        RgbImage::from_raw(w as u32, h as u32, buf).ok_or_else(|| {
            AtariEnvError::Pipeline(format!("screen buffer does not fit {}x{}", w, h)).into()
        })
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test::ScriptedEmulator;

    fn layer(emulator: ScriptedEmulator, frame_skip: FrameSkip, max_steps: usize) -> EmulatorLayer {
        EmulatorLayer::new(Box::new(emulator), frame_skip, max_steps)
    }

    #[test]
    fn emulator_seeds_are_nonzero_and_reproducible() {
        for seed in 0..100 {
            assert!(emulator_seed(seed) > 0);
            assert_eq!(emulator_seed(seed), emulator_seed(seed));
        }
    }

    #[test]
    fn frames_are_skipped_and_rewards_summed() -> Result<()> {
        let emulator = ScriptedEmulator::new().rewards(vec![1, 0, 2]);
        let log = emulator.log.clone();
        let mut layer = layer(emulator, FrameSkip::Fixed(3), 100);

        layer.reset(Some(5))?;
        let step = layer.step(1)?;

        assert_eq!(step.reward, 3.0);
        assert_eq!(log.borrow().actions, vec![AtariAction::Fire; 3]);
        assert_eq!(log.borrow().seeds, vec![emulator_seed(5)]);
        Ok(())
    }

    #[test]
    fn time_limit_truncates() -> Result<()> {
        let mut layer = layer(ScriptedEmulator::new(), FrameSkip::Fixed(1), 2);

        layer.reset(None)?;
        assert!(!layer.step(0)?.is_truncated);
        let step = layer.step(0)?;
        assert!(step.is_truncated);
        assert!(!step.is_terminated);

        layer.reset(None)?;
        assert!(!layer.step(0)?.is_truncated);
        Ok(())
    }

    #[test]
    fn out_of_range_action_is_rejected() -> Result<()> {
        let mut layer = layer(ScriptedEmulator::new(), FrameSkip::Fixed(1), 10);
        layer.reset(None)?;

        let err = layer.step(4).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<AtariEnvError>(),
            Some(AtariEnvError::InvalidAction {
                action: 4,
                n_actions: 4
            })
        ));
        Ok(())
    }

    #[test]
    fn stochastic_skip_is_seeded_by_reset() -> Result<()> {
        let n_frames = |seed| -> Result<usize> {
            let emulator = ScriptedEmulator::new();
            let log = emulator.log.clone();
            let mut layer = layer(emulator, FrameSkip::Stochastic(2, 5), 100);
            layer.reset(Some(seed))?;
            for _ in 0..10 {
                layer.step(0)?;
            }
            let n = log.borrow().actions.len();
            Ok(n)
        };

        let n = n_frames(3)?;
        assert!((20..50).contains(&n));
        assert_eq!(n, n_frames(3)?);
        Ok(())
    }
}
