use super::{delegate_to_inner, AtariInfo, AtariLayer, LayerStep, Pixels};
use crate::AtariEnvError;
use anyhow::Result;

/// Repeats an action `skip` times, returning the sum of rewards and the
/// pixel-wise maximum of the last two frames.
///
/// Repetition stops early when the episode ends. Frames of the previous step
/// are kept for the maximum in that case.
pub struct MaxAndSkip {
    inner: Box<dyn AtariLayer>,
    skip: usize,
    buffer: [Option<Pixels>; 2],
}

impl MaxAndSkip {
    pub fn new(inner: Box<dyn AtariLayer>, skip: usize) -> Self {
        Self {
            inner,
            skip,
            buffer: [None, None],
        }
    }
}

impl AtariLayer for MaxAndSkip {
    fn reset(&mut self, seed: Option<u64>) -> Result<(Pixels, AtariInfo)> {
        let (pixels, info) = self.inner.reset(seed)?;
        self.buffer = [Some(pixels.clone()), Some(pixels.clone())];
        Ok((pixels, info))
    }

    fn step(&mut self, action: usize) -> Result<LayerStep> {
        let mut total_reward = 0f32;
        let mut last = None;

        for i in 0..self.skip {
            let step = self.inner.step(action)?;
            total_reward += step.reward;
            if i + 2 == self.skip {
                self.buffer[0] = Some(step.pixels.clone());
            } else if i + 1 == self.skip {
                self.buffer[1] = Some(step.pixels.clone());
            }
            let done = step.is_done();
            last = Some(step);
            if done {
                break;
            }
        }

        let mut step = last.ok_or_else(|| AtariEnvError::Pipeline("skip must be positive".into()))?;
        step.pixels = match &self.buffer {
            [Some(a), Some(b)] => a.max(b)?,
            _ => return Err(AtariEnvError::Pipeline("MaxAndSkip stepped before reset".into()).into()),
        };
        step.reward = total_reward;
        Ok(step)
    }

    delegate_to_inner!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{pipeline::EmulatorLayer, scenario::FrameSkip, util::test::ScriptedEmulator};

    fn layer(emulator: ScriptedEmulator) -> MaxAndSkip {
        let base = EmulatorLayer::new(Box::new(emulator), FrameSkip::Fixed(1), 1000);
        MaxAndSkip::new(Box::new(base), 4)
    }

    fn brightness(pixels: &Pixels) -> u8 {
        match pixels {
            Pixels::Rgb(img) => img.as_raw()[0],
            _ => panic!("unexpected {}", pixels.kind()),
        }
    }

    #[test]
    fn max_of_last_two_frames() -> Result<()> {
        // Frame i has brightness of brightness[i % 8]
        let emulator = ScriptedEmulator::new()
            .brightness(vec![0, 10, 20, 90, 30, 40, 50, 60])
            .rewards(vec![1, 0, 2, 0]);
        let log = emulator.log.clone();
        let mut layer = layer(emulator);

        layer.reset(None)?;
        let step = layer.step(0)?;
        assert_eq!(brightness(&step.pixels), 90);
        assert_eq!(step.reward, 3.0);

        let step = layer.step(0)?;
        assert_eq!(brightness(&step.pixels), 60);
        assert_eq!(log.borrow().actions.len(), 8);
        Ok(())
    }

    #[test]
    fn repetition_stops_at_game_over() -> Result<()> {
        let emulator = ScriptedEmulator::new().rewards(vec![1]).game_over_at(2);
        let log = emulator.log.clone();
        let mut layer = layer(emulator);

        let (reset_frame, _) = layer.reset(None)?;
        let step = layer.step(0)?;

        assert!(step.is_terminated);
        assert_eq!(step.reward, 2.0);
        assert_eq!(log.borrow().actions.len(), 2);
        assert_eq!(step.pixels, reset_frame);
        Ok(())
    }

    #[test]
    fn step_before_reset_is_an_error() {
        let mut layer = layer(ScriptedEmulator::new());
        assert!(layer.step(0).is_err());
    }

    #[test]
    fn buffered_frames_have_screen_size() -> Result<()> {
        let mut layer = layer(ScriptedEmulator::new().size(7, 5));
        layer.reset(None)?;
        match layer.step(0)?.pixels {
            Pixels::Rgb(img) => assert_eq!(img.dimensions(), (7, 5)),
            p => panic!("unexpected {}", p.kind()),
        }
        Ok(())
    }
}
