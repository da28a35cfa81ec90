use clap::Parser;
use std::path::PathBuf;

/// Evaluate a pretrained DQN agent in atari environment
///
/// The Q-network is loaded from a `.safetensors`, `.npz` or libtorch archive
/// file whose parameters are named `network.{0,2,4,7,9}.{weight,bias}`.
/// A PyTorch state dict can be converted with
/// `safetensors.torch.save_file(torch.load(path, map_location="cpu"), "dqn_atari.safetensors")`.
#[derive(Clone, Parser, Debug, Default)]
#[command(version, about)]
pub struct Args {
    /// YAML file of the configuration.
    /// Other options override values in the file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Parameter file of the Q-network.
    #[arg(long)]
    pub model_path: Option<PathBuf>,

    /// Scenario id, like `BreakoutNoFrameskip-v4`.
    #[arg(long)]
    pub env: Option<String>,

    /// The number of episodes.
    #[arg(long)]
    pub n_episodes: Option<usize>,

    /// Random seed of the environment.
    #[arg(long)]
    pub seed: Option<i64>,

    /// Total reward is printed every this number of episodes.
    #[arg(long)]
    pub report_interval: Option<usize>,

    /// Saves frames of scheduled episodes under `videos/<run_name>`.
    #[arg(long)]
    pub record_video: bool,

    /// Name of the run, used as the directory of recorded frames.
    #[arg(long)]
    pub run_name: Option<String>,

    /// Device name, `cpu`, `cuda` or `cuda:<n>`.
    /// If not given, the device will be determined by the `cuda_if_available()` method.
    #[arg(long)]
    pub device: Option<String>,

    /// Upper limit of frames per second in rendering.
    #[arg(long)]
    pub render_fps: Option<u32>,

    /// Does not open a window.
    #[arg(long)]
    pub no_render: bool,

    /// Prints the configuration in YAML and exits.
    #[arg(long)]
    pub show_config: bool,
}
