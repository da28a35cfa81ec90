use super::{delegate_to_inner, AtariInfo, AtariLayer, LayerStep, Pixels};
use anyhow::Result;
use log::debug;

/// Terminates an episode when a life is lost, while the game goes on.
///
/// After such a soft terminal, [`AtariLayer::reset`] takes a single no-op
/// instead of resetting the game. The game is reset only when it is really over,
/// including when that no-op ends it.
pub struct EpisodicLife {
    inner: Box<dyn AtariLayer>,
    lives: usize,
    was_real_done: bool,
}

impl EpisodicLife {
    pub fn new(inner: Box<dyn AtariLayer>) -> Self {
        Self {
            inner,
            lives: 0,
            was_real_done: true,
        }
    }
}

impl AtariLayer for EpisodicLife {
    fn reset(&mut self, seed: Option<u64>) -> Result<(Pixels, AtariInfo)> {
        let (pixels, info) = if self.was_real_done {
            self.inner.reset(seed)?
        } else {
            let step = self.inner.step(0)?;
            if step.is_done() {
                debug!("Game over on the no-op after a lost life");
                self.inner.reset(seed)?
            } else {
                (step.pixels, step.info)
            }
        };
        self.lives = self.inner.lives();
        Ok((pixels, info))
    }

    fn step(&mut self, action: usize) -> Result<LayerStep> {
        let mut step = self.inner.step(action)?;
        self.was_real_done = step.is_done();

        let lives = self.inner.lives();
        if lives < self.lives && lives > 0 {
            debug!("Life lost, {} remaining", lives);
            step.is_terminated = true;
        }
        self.lives = lives;
        Ok(step)
    }

    delegate_to_inner!();
}
