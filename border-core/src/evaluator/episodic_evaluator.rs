//! Runs a fixed number of episodes with a policy.
use super::{Evaluator, EvaluatorConfig};
use crate::{
    record::{Record, RecordValue},
    util::ReturnStats,
    Env, Policy,
};
use anyhow::Result;
use log::{debug, info, warn};
use std::io::{self, Write};

/// Result of a single episode.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeSummary {
    /// Index of the episode, also used as the seed of the reset.
    pub ix: usize,

    /// Sum of rewards in the episode.
    pub total_reward: f32,

    /// The number of environment steps in the episode.
    pub n_steps: usize,
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Evaluates a policy over a fixed number of episodes.
///
/// Each episode goes through the following states:
///
/// ```mermaid
/// stateDiagram-v2
///     [*] --> Start: reset_with_index(ix)
///     Start --> Query: total_reward = 0
///     Query --> Act: render, Policy::sample
///     Act --> Observe: Env::step
///     Observe --> Query: not done
///     Observe --> Terminal: terminated or truncated
///     Terminal --> [*]: report
/// ```
///
/// Episodes run sequentially. Any error of the environment or the policy aborts
/// the evaluation. Summary lines are written to the standard output by default.
pub struct EpisodicEvaluator<E: Env> {
    config: EvaluatorConfig,
    env: E,
    out: Box<dyn Write>,
    closed: bool,
}

impl<E: Env> EpisodicEvaluator<E> {
    /// Constructs a new [`EpisodicEvaluator`], building the environment.
    pub fn new(env_config: &E::Config, seed: i64, config: EvaluatorConfig) -> Result<Self> {
        Ok(Self::from_env(E::build(env_config, seed)?, config))
    }

    /// Constructs a new [`EpisodicEvaluator`] with a given environment.
    pub fn from_env(env: E, config: EvaluatorConfig) -> Self {
        Self {
            config,
            env,
            out: Box::new(io::stdout()),
            closed: false,
        }
    }

    /// Sets the destination of summary lines.
    pub fn with_output(mut self, out: impl Write + 'static) -> Self {
        self.out = Box::new(out);
        self
    }

    /// Returns a reference to the environment.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Runs a single episode.
    pub fn run_episode<P>(&mut self, ix: usize, policy: &mut P) -> Result<EpisodeSummary>
    where
        P: Policy<E> + ?Sized,
    {
        let mut obs = self.env.reset_with_index(ix)?;
        let mut total_reward = 0f32;
        let mut n_steps = 0;

        loop {
            self.env.render()?;
            let act = policy.sample(&obs)?;
            let (step, _) = self.env.step(&act)?;
            total_reward += step.reward;
            n_steps += 1;
            if step.is_done() {
                debug!(
                    "Episode {} done, terminated = {}, truncated = {}",
                    ix, step.is_terminated, step.is_truncated
                );
                break;
            }
            obs = step.obs;
        }

        Ok(EpisodeSummary {
            ix,
            total_reward,
            n_steps,
        })
    }

    fn report(&mut self, summary: &EpisodeSummary) -> Result<()> {
        info!(
            "Episode {}: {} steps, total reward = {}",
            summary.ix + 1,
            summary.n_steps,
            summary.total_reward
        );
        if self.config.is_reported(summary.ix) {
            writeln!(
                self.out,
                "Episode {}: Total Reward = {:.1}",
                summary.ix + 1,
                summary.total_reward
            )?;
        }
        Ok(())
    }

    fn summarize(returns: Vec<f32>) -> Record {
        let mut record = Record::empty();
        if let Some(stats) = ReturnStats::from_returns(&returns) {
            info!(
                "{} episodes: mean = {}, std = {}, min = {}, max = {}",
                returns.len(),
                stats.mean,
                stats.std,
                stats.min,
                stats.max
            );
            record.insert("Episode return", RecordValue::Scalar(stats.mean));
            record.insert("Episode return std", RecordValue::Scalar(stats.std));
            record.insert("Episode return min", RecordValue::Scalar(stats.min));
            record.insert("Episode return max", RecordValue::Scalar(stats.max));
        }
        record.insert("Episode returns", RecordValue::Array1(returns));
        record
    }

    /// Closes the environment. Calls after the first one do nothing.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.env.close()
    }

    /// Evaluates the policy, then closes the environment.
    ///
    /// The environment is closed on failure as well. In that case the error
    /// of the evaluation is returned and a failure of closing is only logged.
    pub fn run<P>(mut self, policy: &mut P) -> Result<Record>
    where
        P: Policy<E> + ?Sized,
    {
        let result = self.evaluate(policy);
        let closed = self.close();

        match result {
            Ok(record) => {
                closed?;
                Ok(record)
            }
            Err(e) => {
                if let Err(e_close) = closed {
                    warn!("Failed to close the environment: {:?}", e_close);
                }
                Err(e)
            }
        }
    }
}

impl<E: Env> Evaluator<E> for EpisodicEvaluator<E> {
    fn evaluate<P>(&mut self, policy: &mut P) -> Result<Record>
    where
        P: Policy<E> + ?Sized,
    {
        let mut returns = Vec::with_capacity(self.config.n_episodes);

        for ix in 0..self.config.n_episodes {
            let summary = self.run_episode(ix, policy)?;
            self.report(&summary)?;
            returns.push(summary.total_reward);
        }

        Ok(Self::summarize(returns))
    }
}
