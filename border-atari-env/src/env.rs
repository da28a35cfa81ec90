mod config;
#[cfg(feature = "window")]
mod window;
use crate::{
    atari_env::Emulator,
    pipeline::{build_pipeline, AtariInfo, AtariLayer},
    scenario::Scenario,
    AtariEnvError, BorderAtariAct, BorderAtariObs,
};
use anyhow::Result;
use border_core::{
    record::{Record, RecordValue},
    Env, Step,
};
pub use config::{default_rom_dir, BorderAtariEnvConfig};
use log::{debug, info};
use std::{
    convert::TryFrom,
    time::{Duration, Instant},
};
#[cfg(feature = "window")]
use window::AtariWindow;

/// Atari environment with preprocessing of observations, rewards and episode ends.
///
/// Preprocessing is given by [`BorderAtariEnvConfig::stages`]. The default is
/// the same as in the link:
/// <https://stable-baselines3.readthedocs.io/en/master/common/atari_wrappers.html#stable_baselines3.common.atari_wrappers.AtariWrapper>.
pub struct BorderAtariEnv {
    scenario: Scenario,

    // Outermost layer of the preprocessing pipeline
    layer: Box<dyn AtariLayer>,

    // Random number generator for sampling actions
    action_space_rng: fastrand::Rng,

    render: bool,
    render_fps: u32,
    last_render: Option<Instant>,

    #[cfg(feature = "window")]
    window: Option<AtariWindow>,

    closed: bool,
}

impl BorderAtariEnv {
    /// Builds the environment on a given emulator instead of the ROM named in
    /// the configuration.
    pub fn from_emulator(
        emulator: Box<dyn Emulator>,
        config: &BorderAtariEnvConfig,
        seed: i64,
    ) -> Result<Self> {
        let scenario: Scenario = config.name.parse()?;
        let layer = build_pipeline(emulator, &scenario, &config.stages)?;
        info!(
            "Build {} with actions {:?}",
            scenario.id,
            layer.actions()
        );

        Ok(Self {
            scenario,
            layer,
            action_space_rng: fastrand::Rng::with_seed(seed as u64),
            render: config.render,
            render_fps: config.render_fps,
            last_render: None,
            #[cfg(feature = "window")]
            window: None,
            closed: false,
        })
    }

    #[cfg(feature = "atari-env-sys")]
    fn emulator(config: &BorderAtariEnvConfig, seed: i64) -> Result<Box<dyn Emulator>> {
        use crate::atari_env::{AtariEnv, EmulatorConfig};

        let scenario: Scenario = config.name.parse()?;
        let rom_path = scenario.rom_path(&config.rom_dir);
        if !rom_path.is_file() {
            return Err(AtariEnvError::EnvironmentCreation {
                id: scenario.id,
                reason: format!("ROM not found at {:?}", rom_path),
            }
            .into());
        }

        let emulator_config = EmulatorConfig {
            random_seed: crate::pipeline::emulator_seed(seed as u64),
            frame_skip: 1,
            repeat_action_probability: scenario.repeat_action_probability,
            ..EmulatorConfig::default()
        };
        let env = AtariEnv::new(&rom_path, emulator_config).map_err(|e| {
            AtariEnvError::EnvironmentCreation {
                id: scenario.id.clone(),
                reason: e.to_string(),
            }
        })?;
        Ok(Box::new(env))
    }

    #[cfg(not(feature = "atari-env-sys"))]
    fn emulator(config: &BorderAtariEnvConfig, _seed: i64) -> Result<Box<dyn Emulator>> {
        Err(AtariEnvError::EnvironmentCreation {
            id: config.name.clone(),
            reason: "built without the atari-env-sys feature".to_string(),
        }
        .into())
    }

    /// The scenario of the environment.
    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Returns the number of actions.
    pub fn n_actions(&self) -> usize {
        self.layer.actions().len()
    }

    /// Names of actions, like `NOOP` and `FIRE`.
    pub fn action_meanings(&self) -> Vec<String> {
        self.layer.actions().iter().map(|a| a.to_string()).collect()
    }

    /// Remaining lives.
    pub fn lives(&self) -> usize {
        self.layer.lives()
    }

    /// Samples an action uniformly, from a generator seeded at build.
    pub fn sample_act(&mut self) -> BorderAtariAct {
        BorderAtariAct::new(self.action_space_rng.usize(..self.n_actions()) as u8)
    }

    fn throttle(&mut self) {
        if self.render_fps > 0 {
            if let Some(last) = self.last_render {
                let interval = Duration::from_secs_f64(1.0 / self.render_fps as f64);
                let elapsed = last.elapsed();
                if elapsed < interval {
                    std::thread::sleep(interval - elapsed);
                }
            }
        }
        self.last_render = Some(Instant::now());
    }

    #[cfg(feature = "window")]
    fn draw(&mut self) -> Result<()> {
        let screen = self.layer.screen()?;
        if self.window.is_none() {
            let (w, h) = screen.dimensions();
            self.window = Some(AtariWindow::new(&self.scenario.id, w, h)?);
        }

        let close_requested = match self.window.as_mut() {
            Some(window) => {
                window.draw(&screen)?;
                window.close_requested()
            }
            None => false,
        };
        if close_requested {
            info!("Window closed, rendering is disabled");
            self.window = None;
            self.render = false;
        }
        Ok(())
    }

    #[cfg(not(feature = "window"))]
    fn draw(&mut self) -> Result<()> {
        debug!("Built without the window feature, nothing is rendered");
        self.render = false;
        Ok(())
    }
}

impl Env for BorderAtariEnv {
    type Config = BorderAtariEnvConfig;
    type Obs = BorderAtariObs;
    type Act = BorderAtariAct;
    type Info = AtariInfo;

    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized,
    {
        let emulator = Self::emulator(config, seed)?;
        Self::from_emulator(emulator, config, seed)
    }

    fn reset(&mut self, seed: Option<u64>) -> Result<(Self::Obs, Self::Info)> {
        let (pixels, info) = self.layer.reset(seed)?;
        debug!("Reset with seed {:?}, {} lives", seed, info.lives);
        Ok((BorderAtariObs::try_from(pixels)?, info))
    }

    fn step(&mut self, act: &Self::Act) -> Result<(Step<Self>, Record)>
    where
        Self: Sized,
    {
        let step = self.layer.step(act.act as usize)?;
        let obs = BorderAtariObs::try_from(step.pixels)?;

        let mut record = Record::empty();
        if let Some(stats) = &step.info.episode {
            record.insert("episode_return", RecordValue::Scalar(stats.ret));
            record.insert("episode_length", RecordValue::Scalar(stats.len as f32));
        }

        let step = Step::new(
            obs,
            act.clone(),
            step.reward,
            step.is_terminated,
            step.is_truncated,
            step.info,
        );
        Ok((step, record))
    }

    fn render(&mut self) -> Result<()> {
        if !self.render || self.closed {
            return Ok(());
        }
        self.throttle();
        self.draw()
    }

    /// Closes the window and finalizes recording. Calls after the first one do nothing.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        #[cfg(feature = "window")]
        {
            self.window = None;
        }
        info!("Close {}", self.scenario.id);
        self.layer.close()
    }
}
