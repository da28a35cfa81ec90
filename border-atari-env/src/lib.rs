//! Atari environment for [`Border`](https://crates.io/crates/border), with the
//! preprocessing of the DQN paper.
//!
//! The binding under [atari_env] is adapted from the
//! [`atari-env`](https://crates.io/crates/atari-env) crate
//! (rev = `0ef0422f953d79e96b32ad14284c9600bd34f335`),
//! extended with reseeding and the lives of the game, which are required for
//! reproducible evaluation and episodic life environments.
//!
//! Preprocessing is a pipeline of [`Stage`]s, following
//! [`atari_wrapper.py`](https://github.com/openai/baselines/blob/master/baselines/common/atari_wrappers.py).
//!
//! You need to place ROM files under the directory specified by environment variable
//! `ATARI_ROM_DIR`. An easy way to do this is to use [AutoROM](https://pypi.org/project/AutoROM/)
//! Python package.
//!
//! ```bash
//! pip install autorom
//! mkdir $HOME/atari_rom
//! AutoROM --install-dir $HOME/atari_rom
//! export ATARI_ROM_DIR=$HOME/atari_rom
//! ```
//!
//! Here is an example of playing Breakout with random actions.
//!
//! ```no_run
//! use anyhow::Result;
//! use border_atari_env::{BorderAtariEnv, BorderAtariEnvConfig};
//! use border_core::Env as _;
//!
//! fn main() -> Result<()> {
//! #     env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
//!     let config = BorderAtariEnvConfig::default()
//!         .name("BreakoutNoFrameskip-v4")
//!         .render(true);
//!     let mut env = BorderAtariEnv::build(&config, 42)?;
//!
//!     env.reset(Some(0))?;
//!     loop {
//!         env.render()?;
//!         let act = env.sample_act();
//!         let (step, _) = env.step(&act)?;
//!         if step.is_done() {
//!             break;
//!         }
//!     }
//!     env.close()
//! }
//! ```
mod act;
pub mod atari_env;
mod env;
mod error;
mod obs;
pub mod pipeline;
pub mod scenario;
pub mod util;
pub use act::BorderAtariAct;
pub use env::{default_rom_dir, BorderAtariEnv, BorderAtariEnvConfig};
pub use error::AtariEnvError;
pub use obs::BorderAtariObs;
pub use pipeline::{AtariInfo, EpisodeStats, Stage};
pub use scenario::Scenario;
