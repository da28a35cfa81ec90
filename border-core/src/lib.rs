#![warn(missing_docs)]
//! Core abstractions for evaluating reinforcement learning agents.
//!
//! An environment ([`Env`]) emits observations, a policy ([`Policy`]) maps them
//! to actions, and an [`Evaluator`] drives the interaction episode by episode.
pub mod dummy;
pub mod error;
pub mod record;
pub mod util;

mod base;
pub use base::{Act, Configurable, Env, Info, Obs, Policy, Step};

mod evaluator;
pub use evaluator::{EpisodeSummary, EpisodicEvaluator, Evaluator, EvaluatorConfig};
