//! Evaluate [`Policy`].
use crate::{record::Record, Env, Policy};
use anyhow::Result;
mod config;
mod episodic_evaluator;
pub use config::EvaluatorConfig;
pub use episodic_evaluator::{EpisodeSummary, EpisodicEvaluator};

/// Evaluate [`Policy`].
pub trait Evaluator<E: Env> {
    /// Evaluate [`Policy`] and returns the result as a [`Record`].
    fn evaluate<P>(&mut self, policy: &mut P) -> Result<Record>
    where
        P: Policy<E> + ?Sized;
}
