//! Configuration of [`GreedyPolicy`](super::GreedyPolicy).
use super::DqnModelConfig;
use crate::{util::OutDim, Device};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Constructs [`GreedyPolicy`](super::GreedyPolicy).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct GreedyPolicyConfig<Q>
where
    Q: OutDim,
{
    /// Configuration of the Q-network.
    pub model_config: DqnModelConfig<Q>,

    /// File from which parameters of the Q-network are loaded.
    pub model_path: PathBuf,

    /// Device on which the Q-network runs.
    ///
    /// A GPU is used if available when not given.
    #[serde(default)]
    pub device: Option<Device>,
}

impl<Q> Default for GreedyPolicyConfig<Q>
where
    Q: OutDim,
{
    fn default() -> Self {
        Self {
            model_config: DqnModelConfig::default(),
            model_path: PathBuf::from("dqn_atari.safetensors"),
            device: None,
        }
    }
}

impl<Q> GreedyPolicyConfig<Q>
where
    Q: OutDim + Serialize + for<'de> Deserialize<'de>,
{
    /// Sets the configuration of the Q-network.
    pub fn model_config(mut self, v: DqnModelConfig<Q>) -> Self {
        self.model_config = v;
        self
    }

    /// Sets the number of actions.
    pub fn out_dim(mut self, v: i64) -> Self {
        self.model_config = self.model_config.out_dim(v);
        self
    }

    /// Sets the parameter file.
    pub fn model_path(mut self, v: impl AsRef<Path>) -> Self {
        self.model_path = v.as_ref().to_path_buf();
        self
    }

    /// Sets the device.
    pub fn device(mut self, v: Device) -> Self {
        self.device = Some(v);
        self
    }

    /// Constructs [`GreedyPolicyConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`GreedyPolicyConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cnn::AtariCnnConfig;
    use tempdir::TempDir;

    #[test]
    fn serde_greedy_policy_config() -> Result<()> {
        let config = GreedyPolicyConfig::default()
            .model_config(DqnModelConfig::default().q_config(AtariCnnConfig::default()))
            .out_dim(4)
            .model_path("model/qnet.safetensors")
            .device(Device::Cuda(1));

        let dir = TempDir::new("greedy_policy_config")?;
        let path = dir.path().join("greedy_policy.yaml");
        config.save(&path)?;
        let config_ = GreedyPolicyConfig::<AtariCnnConfig>::load(&path)?;

        assert_eq!(config, config_);
        assert_eq!(config_.model_config.q_config.unwrap().out_dim, 4);
        Ok(())
    }

    #[test]
    fn device_defaults_to_none() -> Result<()> {
        let yaml = "model_config:\n  q_config:\n    n_stack: 4\n    out_dim: 6\nmodel_path: qnet.ot\n";
        let config: GreedyPolicyConfig<AtariCnnConfig> = serde_yaml::from_str(yaml)?;

        assert_eq!(config.device, None);
        assert_eq!(config.model_path, PathBuf::from("qnet.ot"));
        Ok(())
    }
}
