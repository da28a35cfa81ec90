//! Environment.
use super::{Act, Info, Obs, Step};
use crate::record::Record;
use anyhow::Result;

/// Represents an environment, typically an MDP.
///
/// Every method is fallible: errors raised by the underlying simulator are
/// returned to the caller, which is expected to abort the run.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Observation of the environment.
    type Obs: Obs;

    /// Action of the environment.
    type Act: Act;

    /// Information in the [`Step`] object.
    type Info: Info;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Performes an environment step.
    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)>
    where
        Self: Sized;

    /// Resets the environment.
    ///
    /// If `seed` is given, random number generators of the environment are
    /// reseeded before the reset.
    fn reset(&mut self, seed: Option<u64>) -> Result<(Self::Obs, Self::Info)>;

    /// Resets the environment with a given index.
    ///
    /// The index is used as the random seed of the reset, which makes evaluation
    /// of a trained agent reproducible episode by episode.
    fn reset_with_index(&mut self, ix: usize) -> Result<Self::Obs> {
        let (obs, _) = self.reset(Some(ix as u64))?;
        Ok(obs)
    }

    /// Renders the current state of the environment.
    ///
    /// Does nothing in the default implementation.
    fn render(&mut self) -> Result<()> {
        Ok(())
    }

    /// Releases resources held by the environment, like a window or open files.
    ///
    /// Does nothing in the default implementation.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
