use anyhow::Result;
use border_atari_env::{
    atari_env::AtariAction,
    util::test::{EmulatorLog, ScriptedEmulator},
    AtariEnvError, BorderAtariAct, BorderAtariEnv, BorderAtariEnvConfig, Stage,
};
use border_core::{Env, EpisodicEvaluator, EvaluatorConfig, Policy};
use std::{cell::RefCell, io, rc::Rc};
use tempdir::TempDir;
use test_log::test;

fn config() -> BorderAtariEnvConfig {
    BorderAtariEnvConfig::default().name("BreakoutNoFrameskip-v4")
}

fn env_with(
    emulator: ScriptedEmulator,
    config: &BorderAtariEnvConfig,
) -> Result<(BorderAtariEnv, Rc<RefCell<EmulatorLog>>)> {
    let log = emulator.log.clone();
    let env = BorderAtariEnv::from_emulator(Box::new(emulator), config, 0)?;
    Ok((env, log))
}

struct FixedPolicy(u8);

impl Policy<BorderAtariEnv> for FixedPolicy {
    fn sample(&mut self, _obs: &<BorderAtariEnv as Env>::Obs) -> Result<BorderAtariAct> {
        Ok(BorderAtariAct::new(self.0))
    }
}

#[test]
fn observation_is_four_stacked_84x84_frames() -> Result<()> {
    let (mut env, _) = env_with(ScriptedEmulator::new(), &config())?;

    let (obs, info) = env.reset(Some(0))?;
    assert_eq!(obs.shape(), [4, 84, 84]);
    assert_eq!(obs.frames().len(), 4 * 84 * 84);
    assert_eq!(info.lives, 5);

    let (step, _) = env.step(&BorderAtariAct::new(0))?;
    assert_eq!(step.obs.shape(), [4, 84, 84]);
    Ok(())
}

#[test]
fn rewards_are_clipped_and_statistics_are_not() -> Result<()> {
    // 5 points every 3 frames, game over at frame 200
    let emulator = ScriptedEmulator::new().rewards(vec![0, 0, 5]).game_over_at(200);
    let (mut env, _) = env_with(emulator, &config())?;

    env.reset(Some(0))?;
    let (last, record) = loop {
        let (step, record) = env.step(&BorderAtariAct::new(2))?;
        assert!(step.reward == 0.0 || step.reward == 1.0);
        if step.is_done() {
            break (step, record);
        }
    };

    assert!(last.is_terminated);
    assert!(last.info.real_done);
    assert_eq!(record.get_scalar("episode_return")?, 330.0);
    assert_eq!(record.get_scalar("episode_length")?, 200.0);
    Ok(())
}

#[test]
fn reset_with_seed_is_reproducible() -> Result<()> {
    let reset = |seed| -> Result<_> {
        let (mut env, log) = env_with(ScriptedEmulator::new(), &config())?;
        let (obs, _) = env.reset(Some(seed))?;
        let actions = log.borrow().actions.clone();
        Ok((obs, actions))
    };

    let (obs1, actions1) = reset(3)?;
    let (obs2, actions2) = reset(3)?;
    assert_eq!(obs1, obs2);
    assert_eq!(actions1, actions2);

    // No-ops, then FIRE and RIGHT for 4 frames each
    let n_noops = actions1.len() - 8;
    assert!((1..=30).contains(&n_noops));
    assert!(actions1[..n_noops].iter().all(|&a| a == AtariAction::Noop));
    assert_eq!(&actions1[n_noops..n_noops + 4], &[AtariAction::Fire; 4]);
    assert_eq!(&actions1[n_noops + 4..], &[AtariAction::Right; 4]);
    Ok(())
}

#[test]
fn reset_after_lost_life_continues_the_game() -> Result<()> {
    // 3 lives, one lost every 40 frames
    let (mut env, log) = env_with(ScriptedEmulator::new().lives(3, 40), &config())?;

    env.reset(Some(0))?;
    let step = loop {
        let (step, _) = env.step(&BorderAtariAct::new(0))?;
        if step.is_done() {
            break step;
        }
    };
    assert!(step.is_terminated);
    assert!(!step.info.real_done);
    assert_eq!(env.lives(), 2);

    env.reset(Some(1))?;
    let log = log.borrow();
    assert_eq!(log.resets, 1);
    assert_eq!(log.seeds.len(), 1);
    Ok(())
}

#[test]
fn evaluation_over_preprocessed_env() -> Result<()> {
    let emulator = ScriptedEmulator::new().rewards(vec![1]).game_over_at(120);
    let (env, log) = env_with(emulator, &config())?;
    let config = EvaluatorConfig::default().n_episodes(3);

    let record = EpisodicEvaluator::from_env(env, config)
        .with_output(io::sink())
        .run(&mut FixedPolicy(3))?;

    let returns = record.get_array1("Episode returns")?;
    assert_eq!(returns.len(), 3);
    assert!(returns.iter().all(|&r| r > 0.0));

    let log = log.borrow();
    assert_eq!(log.seeds.len(), 3);
    assert!(log.seeds[0] != log.seeds[1]);
    Ok(())
}

#[test]
fn game_without_fire_skips_fire_reset() -> Result<()> {
    let emulator = ScriptedEmulator::new().actions(vec![
        AtariAction::Noop,
        AtariAction::Up,
        AtariAction::Down,
    ]);
    let (mut env, log) = env_with(emulator, &config())?;

    assert_eq!(env.action_meanings(), vec!["NOOP", "UP", "DOWN"]);
    env.reset(Some(1))?;
    assert!(log
        .borrow()
        .actions
        .iter()
        .all(|&a| a == AtariAction::Noop));
    Ok(())
}

#[test]
fn invalid_configurations_are_rejected() {
    let err = env_with(ScriptedEmulator::new(), &config().name("Breakout"))
        .err()
        .unwrap();
    assert!(matches!(
        err.downcast_ref::<AtariEnvError>(),
        Some(AtariEnvError::EnvironmentCreation { .. })
    ));

    let config = config().stages(vec![Stage::FrameStack { n_stack: 4 }, Stage::Grayscale]);
    let err = env_with(ScriptedEmulator::new(), &config).err().unwrap();
    assert!(matches!(
        err.downcast_ref::<AtariEnvError>(),
        Some(AtariEnvError::Pipeline(_))
    ));
}

#[test]
fn missing_rom_is_an_environment_creation_error() -> Result<()> {
    let dir = TempDir::new("rom_dir")?;
    let config = config().rom_dir(dir.path());

    let err = BorderAtariEnv::build(&config, 0).err().unwrap();
    assert!(matches!(
        err.downcast_ref::<AtariEnvError>(),
        Some(AtariEnvError::EnvironmentCreation { .. })
    ));
    Ok(())
}

#[test]
fn close_finalizes_recording_once() -> Result<()> {
    let dir = TempDir::new("videos")?;
    let video_dir = dir.path().join("run");
    let mut stages = Stage::atari_preprocessing();
    stages.insert(
        0,
        Stage::RecordVideo {
            video_dir: video_dir.clone(),
        },
    );
    let emulator = ScriptedEmulator::new().game_over_at(60);
    let (mut env, _) = env_with(emulator, &config().stages(stages))?;

    env.reset(Some(0))?;
    while !env.step(&BorderAtariAct::new(0))?.0.is_done() {}
    env.close()?;
    env.close()?;

    // Every emulator frame of the first episode, and the reset frame
    let n_frames = std::fs::read_dir(video_dir.join("rl-video-episode-0"))?.count();
    assert_eq!(n_frames, 61);
    Ok(())
}

#[test]
fn sampled_actions_depend_only_on_seed() -> Result<()> {
    let sample = |seed| -> Result<Vec<u8>> {
        let mut env = BorderAtariEnv::from_emulator(Box::new(ScriptedEmulator::new()), &config(), seed)?;
        Ok((0..20).map(|_| env.sample_act().act).collect())
    };

    let acts = sample(22520750)?;
    assert_eq!(acts, sample(22520750)?);
    assert!(acts.iter().all(|&a| a < 4));
    Ok(())
}
