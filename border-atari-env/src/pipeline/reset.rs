use super::{delegate_to_inner, AtariInfo, AtariLayer, LayerStep, Pixels};
use crate::{atari_env::AtariAction, AtariEnvError};
use anyhow::Result;
use log::trace;

/// Takes a random number of no-op actions after reset, in `1..=noop_max`.
///
/// The number is drawn from a generator reseeded by [`AtariLayer::reset`] with
/// a seed. If the game ends during no-ops, the layer below is reset again.
pub struct NoopReset {
    inner: Box<dyn AtariLayer>,
    noop_max: usize,
    rng: fastrand::Rng,
}

impl NoopReset {
    /// Fails if the first action is not `NOOP`.
    pub fn new(inner: Box<dyn AtariLayer>, noop_max: usize) -> Result<Self> {
        if inner.actions().first() != Some(&AtariAction::Noop) {
            return Err(AtariEnvError::Pipeline("NoopReset requires NOOP as action 0".into()).into());
        }
        Ok(Self {
            inner,
            noop_max,
            rng: fastrand::Rng::new(),
        })
    }
}

impl AtariLayer for NoopReset {
    fn reset(&mut self, seed: Option<u64>) -> Result<(Pixels, AtariInfo)> {
        if let Some(seed) = seed {
            self.rng = fastrand::Rng::with_seed(seed);
        }
        let (mut pixels, mut info) = self.inner.reset(seed)?;

        let noops = self.rng.usize(1..=self.noop_max);
        trace!("{} no-op actions", noops);
        for _ in 0..noops {
            let step = self.inner.step(0)?;
            if step.is_done() {
                let (p, i) = self.inner.reset(None)?;
                pixels = p;
                info = i;
            } else {
                pixels = step.pixels;
                info = step.info;
            }
        }

        Ok((pixels, info))
    }

    fn step(&mut self, action: usize) -> Result<LayerStep> {
        self.inner.step(action)
    }

    delegate_to_inner!();
}

/// Presses `FIRE` and then the action 2 after reset, for games that stay
/// still until fired.
pub struct FireReset {
    inner: Box<dyn AtariLayer>,
}

impl FireReset {
    /// Fails unless action 1 is `FIRE` and there are at least 3 actions.
    pub fn new(inner: Box<dyn AtariLayer>) -> Result<Self> {
        let actions = inner.actions();
        if actions.get(1) != Some(&AtariAction::Fire) || actions.len() < 3 {
            return Err(AtariEnvError::Pipeline(format!(
                "FireReset requires FIRE as action 1 and at least 3 actions, got {:?}",
                actions
            ))
            .into());
        }
        Ok(Self { inner })
    }
}

impl AtariLayer for FireReset {
    fn reset(&mut self, seed: Option<u64>) -> Result<(Pixels, AtariInfo)> {
        self.inner.reset(seed)?;
        let mut last = None;
        for action in [1, 2] {
            let step = self.inner.step(action)?;
            last = Some(if step.is_done() {
                self.inner.reset(seed)?
            } else {
                (step.pixels, step.info)
            });
        }
        last.ok_or_else(|| AtariEnvError::Pipeline("no frame after FIRE".into()).into())
    }

    fn step(&mut self, action: usize) -> Result<LayerStep> {
        self.inner.step(action)
    }

    delegate_to_inner!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        pipeline::EmulatorLayer,
        scenario::FrameSkip,
        util::test::{EmulatorLog, ScriptedEmulator},
    };
    use std::{cell::RefCell, rc::Rc};

    fn base(emulator: ScriptedEmulator) -> (Box<dyn AtariLayer>, Rc<RefCell<EmulatorLog>>) {
        let log = emulator.log.clone();
        let layer = EmulatorLayer::new(Box::new(emulator), FrameSkip::Fixed(1), 1000);
        (Box::new(layer), log)
    }

    #[test]
    fn noops_are_within_bounds_and_seeded() -> Result<()> {
        let (inner, log) = base(ScriptedEmulator::new());
        let mut layer = NoopReset::new(inner, 30)?;

        let mut counts = vec![];
        for seed in 0..20 {
            log.borrow_mut().actions.clear();
            layer.reset(Some(seed))?;
            let actions = log.borrow().actions.clone();
            assert!((1..=30).contains(&actions.len()));
            assert!(actions.iter().all(|&a| a == AtariAction::Noop));
            counts.push(actions.len());
        }

        log.borrow_mut().actions.clear();
        layer.reset(Some(7))?;
        assert_eq!(log.borrow().actions.len(), counts[7]);
        Ok(())
    }

    #[test]
    fn game_over_during_noops_resets_again() -> Result<()> {
        let (inner, log) = base(ScriptedEmulator::new().game_over_at(1));
        let mut layer = NoopReset::new(inner, 3)?;

        layer.reset(Some(0))?;
        let log = log.borrow();
        assert_eq!(log.resets, 1 + log.actions.len());
        Ok(())
    }

    #[test]
    fn fire_reset_presses_fire_then_action_2() -> Result<()> {
        let (inner, log) = base(ScriptedEmulator::new());
        let mut layer = FireReset::new(inner)?;

        let (pixels, _) = layer.reset(None)?;

        assert_eq!(
            log.borrow().actions,
            vec![AtariAction::Fire, AtariAction::Right]
        );
        assert_eq!(pixels, Pixels::Rgb(layer.screen()?));
        Ok(())
    }

    #[test]
    fn game_over_on_fire_resets_with_the_same_seed() -> Result<()> {
        let (inner, log) = base(ScriptedEmulator::new().game_over_at(1));
        let mut layer = FireReset::new(inner)?;

        layer.reset(Some(11))?;

        let log = log.borrow();
        assert_eq!(log.resets, 3);
        assert_eq!(log.seeds.len(), 3);
        assert!(log.seeds.windows(2).all(|s| s[0] == s[1]));
        Ok(())
    }

    #[test]
    fn fire_reset_requires_fire() {
        let emulator =
            ScriptedEmulator::new().actions(vec![AtariAction::Noop, AtariAction::Up, AtariAction::Down]);
        let (inner, _) = base(emulator);
        assert!(FireReset::new(inner).is_err());

        let emulator = ScriptedEmulator::new().actions(vec![AtariAction::Noop, AtariAction::Fire]);
        let (inner, _) = base(emulator);
        assert!(FireReset::new(inner).is_err());
    }

    #[test]
    fn noop_reset_requires_noop() {
        let emulator = ScriptedEmulator::new().actions(vec![AtariAction::Fire, AtariAction::Noop]);
        let (inner, _) = base(emulator);
        assert!(NoopReset::new(inner, 30).is_err());
    }
}
