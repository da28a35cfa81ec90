//! Preprocessing of the emulator as a stack of layers.
//!
//! A pipeline is described by a list of [`Stage`]s, applied from the emulator
//! outward. Each stage wraps the layer built so far and sees the frames, rewards
//! and episode ends produced by it.
mod base;
mod life;
mod observation;
mod record_video;
mod reset;
mod reward;
mod skip;
mod stats;
use crate::{
    atari_env::{AtariAction, Emulator},
    scenario::Scenario,
    AtariEnvError,
};
use anyhow::Result;
pub(crate) use base::emulator_seed;
pub use base::EmulatorLayer;
use border_core::Info;
use image::{GrayImage, ImageBuffer, Pixel, RgbImage};
pub use life::EpisodicLife;
use log::info;
pub use observation::{FrameStack, Grayscale, ObservationLayer, ObservationTransform, Resize};
pub use record_video::{capped_cubic_schedule, RecordVideo};
pub use reset::{FireReset, NoopReset};
pub use reward::ClipReward;
use serde::{Deserialize, Serialize};
pub use skip::MaxAndSkip;
pub use stats::EpisodeStatistics;
use std::{mem::discriminant, path::PathBuf};

/// A frame passed between layers.
#[derive(Clone, Debug, PartialEq)]
pub enum Pixels {
    Rgb(RgbImage),
    Gray(GrayImage),
    Stack(Vec<GrayImage>),
}

fn max_image<P: Pixel<Subpixel = u8> + 'static>(
    a: &ImageBuffer<P, Vec<u8>>,
    b: &ImageBuffer<P, Vec<u8>>,
) -> Result<ImageBuffer<P, Vec<u8>>, AtariEnvError> {
    if a.dimensions() != b.dimensions() {
        return Err(AtariEnvError::Pipeline(format!(
            "cannot take the maximum of frames of size {:?} and {:?}",
            a.dimensions(),
            b.dimensions()
        )));
    }
    let buf = a.iter().zip(b.iter()).map(|(&x, &y)| x.max(y)).collect();
    let (w, h) = a.dimensions();
    ImageBuffer::from_raw(w, h, buf)
        .ok_or_else(|| AtariEnvError::Pipeline("inconsistent frame buffer".to_string()))
}

impl Pixels {
    /// Name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Rgb(_) => "RGB",
            Self::Gray(_) => "grayscale",
            Self::Stack(_) => "stacked",
        }
    }

    /// Pixel-wise maximum of two frames of the same kind.
    pub fn max(&self, other: &Pixels) -> Result<Pixels, AtariEnvError> {
        match (self, other) {
            (Self::Rgb(a), Self::Rgb(b)) => Ok(Self::Rgb(max_image(a, b)?)),
            (Self::Gray(a), Self::Gray(b)) => Ok(Self::Gray(max_image(a, b)?)),
            (a, b) => Err(AtariEnvError::Pipeline(format!(
                "cannot take the maximum of {} and {} frames",
                a.kind(),
                b.kind()
            ))),
        }
    }
}

/// Statistics of a finished episode, before reward clipping.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EpisodeStats {
    /// Sum of rewards.
    pub ret: f32,

    /// The number of steps.
    pub len: usize,
}

/// Information attached to every step of [`BorderAtariEnv`](crate::BorderAtariEnv).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AtariInfo {
    /// Remaining lives.
    pub lives: usize,

    /// `true` if the game is over, not just a life lost.
    pub real_done: bool,

    /// Set at the step the game ends.
    pub episode: Option<EpisodeStats>,
}

impl Info for AtariInfo {}

/// Output of [`AtariLayer::step`].
#[derive(Clone, Debug)]
pub struct LayerStep {
    pub pixels: Pixels,
    pub reward: f32,
    pub is_terminated: bool,
    pub is_truncated: bool,
    pub info: AtariInfo,
}

impl LayerStep {
    /// Terminated or truncated.
    pub fn is_done(&self) -> bool {
        self.is_terminated || self.is_truncated
    }
}

/// A layer of the preprocessing pipeline.
pub trait AtariLayer {
    /// Resets the layer and those below it.
    fn reset(&mut self, seed: Option<u64>) -> Result<(Pixels, AtariInfo)>;

    /// Takes the action of the given index in [`AtariLayer::actions`].
    fn step(&mut self, action: usize) -> Result<LayerStep>;

    /// The minimal action set of the game.
    fn actions(&self) -> &[AtariAction];

    /// Remaining lives.
    fn lives(&self) -> usize;

    /// The current screen of the emulator.
    fn screen(&self) -> Result<RgbImage>;

    /// Releases resources of the layer and those below it.
    fn close(&mut self) -> Result<()>;
}

/// Implements methods of [`AtariLayer`] not related to the wrapper by delegating
/// to the field `inner`.
macro_rules! delegate_to_inner {
    () => {
        fn actions(&self) -> &[crate::atari_env::AtariAction] {
            self.inner.actions()
        }

        fn lives(&self) -> usize {
            self.inner.lives()
        }

        fn screen(&self) -> anyhow::Result<image::RgbImage> {
            self.inner.screen()
        }

        fn close(&mut self) -> anyhow::Result<()> {
            self.inner.close()
        }
    };
}
pub(crate) use delegate_to_inner;

/// A stage of the preprocessing pipeline.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub enum Stage {
    /// Saves the frames of scheduled episodes as PNG files under `video_dir`.
    RecordVideo { video_dir: PathBuf },

    /// Attaches [`EpisodeStats`] to the step where the game ends.
    EpisodeStatistics,

    /// Takes a random number of no-op actions in `1..=noop_max` after reset.
    NoopReset { noop_max: usize },

    /// Repeats an action and takes the pixel-wise max of the last two frames.
    MaxAndSkip { skip: usize },

    /// Terminates an episode when a life is lost.
    EpisodicLife,

    /// Presses `FIRE` after reset. Skipped for games without `FIRE`.
    FireReset,

    /// Replaces rewards with their signs.
    ClipReward,

    /// Resizes frames.
    Resize { width: u32, height: u32 },

    /// Converts RGB frames to grayscale.
    Grayscale,

    /// Stacks the most recent grayscale frames.
    FrameStack { n_stack: usize },
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Format {
    Rgb,
    Gray,
    Stack,
}

impl Stage {
    /// The preprocessing of the Nature DQN paper.
    pub fn atari_preprocessing() -> Vec<Stage> {
        vec![
            Stage::EpisodeStatistics,
            Stage::NoopReset { noop_max: 30 },
            Stage::MaxAndSkip { skip: 4 },
            Stage::EpisodicLife,
            Stage::FireReset,
            Stage::ClipReward,
            Stage::Resize {
                width: 84,
                height: 84,
            },
            Stage::Grayscale,
            Stage::FrameStack { n_stack: 4 },
        ]
    }

    fn check_params(&self) -> Result<(), String> {
        match self {
            Stage::NoopReset { noop_max: 0 } => Err("noop_max must be positive".into()),
            Stage::MaxAndSkip { skip: 0 } => Err("skip must be positive".into()),
            Stage::Resize { width, height } if *width == 0 || *height == 0 => {
                Err("frame size must be positive".into())
            }
            Stage::FrameStack { n_stack: 0 } => Err("n_stack must be positive".into()),
            _ => Ok(()),
        }
    }

    fn output_format(&self, format: Format) -> Result<Format, String> {
        match (self, format) {
            (Stage::Grayscale, Format::Rgb) => Ok(Format::Gray),
            (Stage::FrameStack { .. }, Format::Gray) => Ok(Format::Stack),
            (Stage::Grayscale, f) | (Stage::FrameStack { .. }, f) => {
                Err(format!("{:?} received {:?} frames", self, f))
            }
            (Stage::Resize { .. }, Format::Stack) | (Stage::MaxAndSkip { .. }, Format::Stack) => {
                Err(format!("{:?} received stacked frames", self))
            }
            (_, f) => Ok(f),
        }
    }

    /// Checks the order and parameters of stages.
    ///
    /// [`Stage::RecordVideo`] must come first, since it records the frames of
    /// the emulator. Grayscale conversion requires RGB frames, and the pipeline
    /// must end with stacked grayscale frames. No stage may appear twice.
    pub fn validate(stages: &[Stage]) -> Result<(), AtariEnvError> {
        let mut format = Format::Rgb;
        for (i, stage) in stages.iter().enumerate() {
            let check = || -> Result<Format, String> {
                if stages[..i]
                    .iter()
                    .any(|s| discriminant(s) == discriminant(stage))
                {
                    return Err(format!("{:?} appears more than once", stage));
                }
                if let Stage::RecordVideo { .. } = stage {
                    if i != 0 {
                        return Err("RecordVideo must directly wrap the emulator".into());
                    }
                }
                stage.check_params()?;
                stage.output_format(format)
            };
            format = check().map_err(AtariEnvError::Pipeline)?;
        }

        match format {
            Format::Stack => Ok(()),
            f => Err(AtariEnvError::Pipeline(format!(
                "the pipeline must end with stacked grayscale frames, not {:?} frames",
                f
            ))),
        }
    }

    fn wrap(&self, inner: Box<dyn AtariLayer>) -> Result<Box<dyn AtariLayer>> {
        Ok(match self {
            Stage::RecordVideo { video_dir } => Box::new(RecordVideo::new(inner, video_dir)?),
            Stage::EpisodeStatistics => Box::new(EpisodeStatistics::new(inner)),
            Stage::NoopReset { noop_max } => Box::new(NoopReset::new(inner, *noop_max)?),
            Stage::MaxAndSkip { skip } => Box::new(MaxAndSkip::new(inner, *skip)),
            Stage::EpisodicLife => Box::new(EpisodicLife::new(inner)),
            Stage::FireReset => {
                if inner.actions().contains(&AtariAction::Fire) {
                    Box::new(FireReset::new(inner)?)
                } else {
                    info!("Skip FireReset, the game has no FIRE action");
                    inner
                }
            }
            Stage::ClipReward => Box::new(ClipReward::new(inner)),
            Stage::Resize { width, height } => {
                Box::new(ObservationLayer::new(inner, Resize::new(*width, *height)))
            }
            Stage::Grayscale => Box::new(ObservationLayer::new(inner, Grayscale)),
            Stage::FrameStack { n_stack } => {
                Box::new(ObservationLayer::new(inner, FrameStack::new(*n_stack)))
            }
        })
    }
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Builds the pipeline of the given stages on an emulator.
///
/// Stages are validated with [`Stage::validate`] first. The standard
/// preprocessing, [`Stage::atari_preprocessing`], builds the following layers:
///
/// ```mermaid
/// flowchart LR
///     A[Emulator] --> B[EpisodeStatistics] --> C[NoopReset] --> D[MaxAndSkip]
///     D --> E[EpisodicLife] --> F[FireReset] --> G[ClipReward]
///     G --> H[Resize] --> I[Grayscale] --> J[FrameStack]
/// ```
pub fn build_pipeline(
    emulator: Box<dyn Emulator>,
    scenario: &Scenario,
    stages: &[Stage],
) -> Result<Box<dyn AtariLayer>> {
    Stage::validate(stages)?;

    let mut layer: Box<dyn AtariLayer> = Box::new(EmulatorLayer::new(
        emulator,
        scenario.frame_skip,
        scenario.max_episode_steps,
    ));
    for stage in stages {
        layer = stage.wrap(layer)?;
    }
    Ok(layer)
}
