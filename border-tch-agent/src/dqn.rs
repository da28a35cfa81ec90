//! Greedy policies on pretrained Q-networks.
mod config;
mod error;
mod model;
mod policy;
pub use config::GreedyPolicyConfig;
pub use error::WeightLoadError;
pub use model::{DqnModel, DqnModelConfig};
pub use policy::GreedyPolicy;
