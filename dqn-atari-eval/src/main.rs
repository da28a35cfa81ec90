mod args;
mod config;
mod types;
use anyhow::Result;
use args::Args;
use border_core::{Configurable, Env as _};
use clap::Parser;
use config::DqnAtariEvalConfig;
use log::{info, warn};
use types::*;

fn create_policy(config: &DqnAtariEvalConfig, env: &Env) -> Result<Policy> {
    let n_actions = env.n_actions() as i64;
    let policy_config = config.policy_config.clone().out_dim(n_actions);
    <Policy as Configurable<Env>>::build(policy_config)
}

fn eval(config: &DqnAtariEvalConfig) -> Result<()> {
    let mut env = Env::build(&config.env_config, config.seed)?;

    let mut policy = match create_policy(config, &env) {
        Ok(policy) => policy,
        Err(e) => {
            if let Err(e_close) = env.close() {
                warn!("Failed to close the environment: {:?}", e_close);
            }
            return Err(e);
        }
    };

    Evaluator::from_env(env, config.evaluator_config.clone()).run(&mut policy)?;

    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = DqnAtariEvalConfig::from_args(&args)?;

    if args.show_config {
        print!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    info!("Run {}", config.run_name());
    eval(&config)
}
