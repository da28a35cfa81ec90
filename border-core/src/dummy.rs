//! Scripted environment and policy, used in tests.
use crate::{record::Record, util::argmax, Act, Env, Info, Obs, Policy, Step};
use anyhow::{anyhow, Result};
use std::{cell::RefCell, rc::Rc};

/// Dummy observation, the number of steps taken in the current episode.
#[derive(Clone, Debug, PartialEq)]
pub struct DummyObs(pub usize);

impl Obs for DummyObs {
    fn len(&self) -> usize {
        1
    }
}

/// Dummy action.
#[derive(Clone, Debug, PartialEq)]
pub struct DummyAct(pub usize);

impl Act for DummyAct {
    fn len(&self) -> usize {
        1
    }
}

/// Dummy info.
#[derive(Clone, Debug)]
pub struct DummyInfo;

impl Info for DummyInfo {}

/// Calls made on [`DummyEnv`].
#[derive(Debug, Default)]
pub struct DummyEnvLog {
    /// Seeds given at every reset.
    pub resets: Vec<Option<u64>>,

    /// Actions given at every step.
    pub acts: Vec<usize>,

    /// The number of calls of [`Env::render`].
    pub renders: usize,

    /// The number of calls of [`Env::close`].
    pub closes: usize,
}

/// Configuration of [`DummyEnv`].
#[derive(Clone, Debug)]
pub struct DummyEnvConfig {
    /// `(reward, is_terminated)` of every step, per episode.
    /// Episodes cycle when more episodes are run than scripted.
    /// An episode is truncated when its script runs out.
    pub episodes: Vec<Vec<(f32, bool)>>,

    /// Fails at the step of this index, counted over all episodes.
    pub fail_at_step: Option<usize>,

    /// Shared log of calls.
    pub log: Rc<RefCell<DummyEnvLog>>,
}

impl DummyEnvConfig {
    /// Creates a configuration with the given episode scripts.
    pub fn new(episodes: Vec<Vec<(f32, bool)>>) -> Self {
        Self {
            episodes,
            fail_at_step: None,
            log: Rc::new(RefCell::new(DummyEnvLog::default())),
        }
    }

    /// Makes the environment fail at the given step.
    pub fn fail_at_step(mut self, v: usize) -> Self {
        self.fail_at_step = Some(v);
        self
    }
}

/// Environment replaying scripted rewards and terminations.
pub struct DummyEnv {
    config: DummyEnvConfig,
    n_resets: usize,
    t: usize,
}

impl Env for DummyEnv {
    type Config = DummyEnvConfig;
    type Obs = DummyObs;
    type Act = DummyAct;
    type Info = DummyInfo;

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            n_resets: 0,
            t: 0,
        })
    }

    fn reset(&mut self, seed: Option<u64>) -> Result<(Self::Obs, Self::Info)> {
        self.config.log.borrow_mut().resets.push(seed);
        self.n_resets += 1;
        self.t = 0;
        Ok((DummyObs(0), DummyInfo))
    }

    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)> {
        let n_steps = {
            let mut log = self.config.log.borrow_mut();
            log.acts.push(a.0);
            log.acts.len() - 1
        };
        if self.config.fail_at_step == Some(n_steps) {
            return Err(anyhow!("scripted failure at step {}", n_steps));
        }
        if self.n_resets == 0 {
            return Err(anyhow!("step before reset"));
        }

        let n_episodes = self.config.episodes.len().max(1);
        let script = self.config.episodes.get((self.n_resets - 1) % n_episodes);
        let (reward, is_terminated, is_truncated) = match script.and_then(|s| s.get(self.t)) {
            Some(&(r, d)) => (r, d, script.map_or(true, |s| self.t + 1 == s.len()) && !d),
            None => (0.0, false, true),
        };
        self.t += 1;

        let step = Step::new(
            DummyObs(self.t),
            a.clone(),
            reward,
            is_terminated,
            is_truncated,
            DummyInfo,
        );
        Ok((step, Record::empty()))
    }

    fn render(&mut self) -> Result<()> {
        self.config.log.borrow_mut().renders += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.config.log.borrow_mut().closes += 1;
        Ok(())
    }
}

/// A greedy policy over fixed action values.
pub struct DummyQPolicy {
    q_values: Vec<f32>,
}

impl DummyQPolicy {
    /// Creates a policy always seeing the given action values.
    pub fn new(q_values: Vec<f32>) -> Self {
        Self { q_values }
    }
}

impl Policy<DummyEnv> for DummyQPolicy {
    fn sample(&mut self, _obs: &DummyObs) -> Result<DummyAct> {
        argmax(&self.q_values)
            .map(DummyAct)
            .ok_or_else(|| anyhow!("no action value"))
    }
}
