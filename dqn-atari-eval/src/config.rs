use crate::args::Args;
use crate::types::*;
use anyhow::Result;
use border_core::EvaluatorConfig;
use border_tch_agent::{
    cnn::AtariCnnConfig,
    dqn::DqnModelConfig,
    Device,
};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Seed of the environment used when nothing else is given.
pub const DEFAULT_SEED: i64 = 22520750;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DqnAtariEvalConfig {
    pub seed: i64,
    pub run_name: Option<String>,
    pub env_config: EnvConfig,
    pub policy_config: PolicyConfig,
    pub evaluator_config: EvaluatorConfig,
}

impl Default for DqnAtariEvalConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            run_name: None,
            env_config: EnvConfig::default().render(true),
            policy_config: PolicyConfig::default()
                .model_config(DqnModelConfig::default().q_config(AtariCnnConfig::default())),
            evaluator_config: EvaluatorConfig::default(),
        }
    }
}

impl DqnAtariEvalConfig {
    /// Constructs the configuration from a YAML file, if given, and overrides it
    /// with command line options.
    pub fn from_args(args: &Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        if let Some(env) = &args.env {
            config.env_config = config.env_config.name(env.as_str());
        }
        if let Some(seed) = args.seed {
            config.seed = seed;
        }
        if let Some(run_name) = &args.run_name {
            config.run_name = Some(run_name.clone());
        }
        if let Some(model_path) = &args.model_path {
            config.policy_config = config.policy_config.model_path(model_path);
        }
        if let Some(device) = &args.device {
            let device: Device = device.parse()?;
            config.policy_config = config.policy_config.device(device);
        }
        if let Some(n_episodes) = args.n_episodes {
            config.evaluator_config = config.evaluator_config.n_episodes(n_episodes);
        }
        if let Some(report_interval) = args.report_interval {
            config.evaluator_config = config.evaluator_config.report_interval(report_interval);
        }
        if let Some(render_fps) = args.render_fps {
            config.env_config = config.env_config.render_fps(render_fps);
        }
        if args.no_render {
            config.env_config = config.env_config.render(false);
        }
        if args.record_video {
            let run_name = config.run_name();
            config.env_config = config.env_config.record_video(run_name);
        }

        Ok(config)
    }

    /// Name of the run, `{env}__dqn_atari_eval__{seed}` if not given.
    pub fn run_name(&self) -> String {
        match &self.run_name {
            Some(run_name) => run_name.clone(),
            None => format!(
                "{}__dqn_atari_eval__{}",
                self.env_config.name.replace('/', "_"),
                self.seed
            ),
        }
    }

    /// Constructs [`DqnAtariEvalConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`DqnAtariEvalConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use border_atari_env::Stage;
    use std::path::PathBuf;
    use tempdir::TempDir;

    #[test]
    fn defaults_follow_breakout_evaluation() {
        let config = DqnAtariEvalConfig::from_args(&Args::default()).unwrap();

        assert_eq!(config.seed, 22520750);
        assert_eq!(config.env_config.name, "BreakoutNoFrameskip-v4");
        assert!(config.env_config.render);
        assert_eq!(config.evaluator_config.n_episodes, 30);
        assert_eq!(config.evaluator_config.report_interval, 5);
        assert_eq!(
            config.policy_config.model_config.q_config,
            Some(AtariCnnConfig::default())
        );
        assert_eq!(config.policy_config.device, None);
        assert!(!config
            .env_config
            .stages
            .iter()
            .any(|s| matches!(s, Stage::RecordVideo { .. })));
        assert_eq!(
            config.run_name(),
            "BreakoutNoFrameskip-v4__dqn_atari_eval__22520750"
        );
    }

    #[test]
    fn command_line_overrides_options() {
        let args = Args {
            model_path: Some(PathBuf::from("pong.safetensors")),
            env: Some("PongNoFrameskip-v4".to_string()),
            n_episodes: Some(3),
            seed: Some(1),
            report_interval: Some(1),
            device: Some("cpu".to_string()),
            render_fps: Some(0),
            no_render: true,
            ..Args::default()
        };
        let config = DqnAtariEvalConfig::from_args(&args).unwrap();

        assert_eq!(config.seed, 1);
        assert_eq!(config.env_config.name, "PongNoFrameskip-v4");
        assert!(!config.env_config.render);
        assert_eq!(config.env_config.render_fps, 0);
        assert_eq!(config.evaluator_config.n_episodes, 3);
        assert_eq!(config.evaluator_config.report_interval, 1);
        assert_eq!(
            config.policy_config.model_path,
            PathBuf::from("pong.safetensors")
        );
        assert_eq!(config.policy_config.device, Some(Device::Cpu));
    }

    #[test]
    fn record_video_uses_run_name() {
        let args = Args {
            env: Some("ALE/Breakout-v5".to_string()),
            seed: Some(7),
            record_video: true,
            ..Args::default()
        };
        let config = DqnAtariEvalConfig::from_args(&args).unwrap();

        assert_eq!(
            config.env_config.stages[0],
            Stage::RecordVideo {
                video_dir: PathBuf::from("videos/ALE_Breakout-v5__dqn_atari_eval__7")
            }
        );
    }

    #[test]
    fn unknown_device_is_rejected() {
        let args = Args {
            device: Some("tpu".to_string()),
            ..Args::default()
        };
        assert!(DqnAtariEvalConfig::from_args(&args).is_err());
    }

    #[test]
    fn yaml_file_is_overridden_by_command_line() {
        let dir = TempDir::new("dqn_atari_eval").unwrap();
        let path = dir.path().join("config.yaml");
        let saved = DqnAtariEvalConfig {
            seed: 3,
            run_name: Some("from_file".to_string()),
            ..DqnAtariEvalConfig::default()
        };
        saved.save(&path).unwrap();
        assert_eq!(DqnAtariEvalConfig::load(&path).unwrap(), saved);

        let args = Args {
            config: Some(path),
            n_episodes: Some(2),
            ..Args::default()
        };
        let config = DqnAtariEvalConfig::from_args(&args).unwrap();

        assert_eq!(config.seed, 3);
        assert_eq!(config.run_name(), "from_file");
        assert_eq!(config.evaluator_config.n_episodes, 2);
    }

    #[test]
    fn partial_yaml_falls_back_to_defaults() {
        let dir = TempDir::new("dqn_atari_eval").unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "seed: 5\n").unwrap();

        let config = DqnAtariEvalConfig::load(&path).unwrap();

        assert_eq!(config.seed, 5);
        assert_eq!(config.evaluator_config, EvaluatorConfig::default());
        assert_eq!(config.env_config.name, "BreakoutNoFrameskip-v4");
    }
}
