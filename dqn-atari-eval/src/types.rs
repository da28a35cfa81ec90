//! Type aliases
use border_atari_env::{BorderAtariEnv, BorderAtariEnvConfig};
use border_core::EpisodicEvaluator;
use border_tch_agent::{
    cnn::{AtariCnn, AtariCnnConfig},
    dqn::{GreedyPolicy, GreedyPolicyConfig},
};

pub type EnvConfig = BorderAtariEnvConfig;
pub type Env = BorderAtariEnv;
pub type Policy = GreedyPolicy<Env, AtariCnn>;
pub type PolicyConfig = GreedyPolicyConfig<AtariCnnConfig>;
pub type Evaluator = EpisodicEvaluator<Env>;
