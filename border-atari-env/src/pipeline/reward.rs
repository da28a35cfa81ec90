use super::{delegate_to_inner, AtariInfo, AtariLayer, LayerStep, Pixels};
use anyhow::Result;

/// Replaces rewards with their signs, keeping 0 as is.
pub struct ClipReward {
    inner: Box<dyn AtariLayer>,
}

impl ClipReward {
    pub fn new(inner: Box<dyn AtariLayer>) -> Self {
        Self { inner }
    }

    pub fn clip(reward: f32) -> f32 {
        if reward > 0.0 {
            1.0
        } else if reward < 0.0 {
            -1.0
        } else {
            0.0
        }
    }
}

impl AtariLayer for ClipReward {
    fn reset(&mut self, seed: Option<u64>) -> Result<(Pixels, AtariInfo)> {
        self.inner.reset(seed)
    }

    fn step(&mut self, action: usize) -> Result<LayerStep> {
        let mut step = self.inner.step(action)?;
        step.reward = Self::clip(step.reward);
        Ok(step)
    }

    delegate_to_inner!();
}
