//! Configuration of [`EpisodicEvaluator`](super::EpisodicEvaluator).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`EpisodicEvaluator`](super::EpisodicEvaluator).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EvaluatorConfig {
    /// The number of episodes to run.
    pub n_episodes: usize,

    /// A summary line is printed every `report_interval` episodes.
    /// `0` disables printing.
    pub report_interval: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            n_episodes: 30,
            report_interval: 5,
        }
    }
}

impl EvaluatorConfig {
    /// Sets the number of episodes.
    pub fn n_episodes(mut self, v: usize) -> Self {
        self.n_episodes = v;
        self
    }

    /// Sets the interval of printing summaries in episodes.
    pub fn report_interval(mut self, v: usize) -> Self {
        self.report_interval = v;
        self
    }

    /// Returns `true` if the summary of the episode of index `ix` is printed.
    pub fn is_reported(&self, ix: usize) -> bool {
        self.report_interval > 0 && (ix + 1) % self.report_interval == 0
    }

    /// Constructs [`EvaluatorConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`EvaluatorConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn reports_every_nth_episode() {
        let config = EvaluatorConfig::default();
        let reported = (0..12).filter(|&ix| config.is_reported(ix)).collect::<Vec<_>>();
        assert_eq!(reported, vec![4, 9]);

        let config = config.report_interval(0);
        assert!((0..12).all(|ix| !config.is_reported(ix)));
    }

    #[test]
    fn serde_evaluator_config() -> Result<()> {
        let config = EvaluatorConfig::default().n_episodes(3).report_interval(1);

        let dir = TempDir::new("evaluator_config")?;
        let path = dir.path().join("evaluator_config.yaml");
        config.save(&path)?;
        let config_ = EvaluatorConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }
}
