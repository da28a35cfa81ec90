use super::{delegate_to_inner, AtariInfo, AtariLayer, EpisodeStats, LayerStep, Pixels};
use anyhow::Result;
use log::debug;

/// Attaches the return and length of an episode to its last step.
///
/// Rewards are summed before clipping when this layer is placed below
/// [`ClipReward`](super::ClipReward).
pub struct EpisodeStatistics {
    inner: Box<dyn AtariLayer>,
    ret: f32,
    len: usize,
}

impl EpisodeStatistics {
    pub fn new(inner: Box<dyn AtariLayer>) -> Self {
        Self {
            inner,
            ret: 0.0,
            len: 0,
        }
    }
}

impl AtariLayer for EpisodeStatistics {
    fn reset(&mut self, seed: Option<u64>) -> Result<(Pixels, AtariInfo)> {
        self.ret = 0.0;
        self.len = 0;
        self.inner.reset(seed)
    }

    fn step(&mut self, action: usize) -> Result<LayerStep> {
        let mut step = self.inner.step(action)?;
        self.ret += step.reward;
        self.len += 1;

        if step.is_done() {
            debug!("Game over, return = {}, length = {}", self.ret, self.len);
            step.info.episode = Some(EpisodeStats {
                ret: self.ret,
                len: self.len,
            });
        }
        Ok(step)
    }

    delegate_to_inner!();
}
