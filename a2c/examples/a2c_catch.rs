use a2c::{catch_agent_config, catch_trainer_config};
use a2c_candle_agent::{a2c::A2c, cnn::Cnn, Device};
use a2c_catch_env::{CatchEnv, CatchEnvConfig};
use a2c_core::{
    record::AggregateRecorder,
    returns::{ReturnConfig, ReturnEstimator},
    DefaultEvaluator, Trainer,
};
use a2c_tensorboard::TensorboardRecorder;
use anyhow::Result;
use clap::Parser;
use log::info;
use std::path::Path;

const N_EPISODES_PER_EVAL: usize = 10;
const EVAL_SEED: i64 = 1_000_000;

/// Train A2C agent in Catch
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// The number of environment steps summed over all workers
    #[arg(long, default_value_t = 200_000)]
    max_frames: usize,

    /// The number of workers
    #[arg(long, default_value_t = 16)]
    n_workers: usize,

    /// The number of steps each worker takes per cycle
    #[arg(long, default_value_t = 5)]
    batch_size: usize,

    /// Learning rate
    #[arg(long, default_value_t = 7e-4)]
    lr: f64,

    /// Discount factor
    #[arg(long, default_value_t = 0.99)]
    gamma: f32,

    /// Use generalized advantage estimation with this lambda
    #[arg(long)]
    lambda: Option<f32>,

    /// Interval of evaluation in cycles, 0 disables evaluation
    #[arg(long, default_value_t = 500)]
    eval_interval: usize,

    /// Use the GPU of the given index
    #[arg(long)]
    cuda: Option<usize>,

    /// Directory of TensorBoard logs and configuration files
    #[arg(long, default_value = "./a2c/examples/model/a2c_catch")]
    logdir: String,

    /// Print the configurations and exit
    #[arg(long, default_value_t = false)]
    show_config: bool,
}

fn returns_config(args: &Args) -> ReturnConfig {
    let estimator = match args.lambda {
        Some(lambda) => ReturnEstimator::Gae { lambda },
        None => ReturnEstimator::Bootstrap,
    };
    ReturnConfig::default().gamma(args.gamma).estimator(estimator)
}

fn train(args: &Args, recorder: &mut dyn AggregateRecorder) -> Result<()> {
    let device = match args.cuda {
        Some(ix) => Device::Cuda(ix),
        None => Device::Cpu,
    };
    let env_config = CatchEnvConfig::default();
    let agent_config = catch_agent_config(args.lr, device);
    let trainer_config = catch_trainer_config(
        args.max_frames,
        args.n_workers,
        args.batch_size,
        returns_config(args),
    )
    .eval_interval(args.eval_interval);

    if args.show_config {
        println!("{}", serde_yaml::to_string(&env_config)?);
        println!("{}", serde_yaml::to_string(&agent_config)?);
        println!("{}", serde_yaml::to_string(&trainer_config)?);
        return Ok(());
    }

    let logdir = Path::new(&args.logdir);
    std::fs::create_dir_all(logdir)?;
    agent_config.save(logdir.join("agent.yaml"))?;
    trainer_config.save(logdir.join("trainer.yaml"))?;

    let mut agent = A2c::<CatchEnv, Cnn>::build(agent_config)?;
    let mut evaluator =
        DefaultEvaluator::<CatchEnv>::new(&env_config, EVAL_SEED, N_EPISODES_PER_EVAL)?;
    let mut trainer = Trainer::<CatchEnv>::build(trainer_config, env_config)?;
    let log = trainer.train_with_evaluator(&mut agent, recorder, &mut evaluator)?;

    let rs = log.episode_rewards();
    let recent = &rs[rs.len().saturating_sub(100)..];
    if !recent.is_empty() {
        info!(
            "{} episodes, mean reward of the last {} episodes = {:.3}",
            rs.len(),
            recent.len(),
            recent.iter().sum::<f32>() / recent.len() as f32
        );
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let mut recorder = TensorboardRecorder::new(&args.logdir);
    train(&args, &mut recorder)
}

#[cfg(test)]
mod tests {
    use super::{train, Args};
    use a2c_core::record::NullRecorder;
    use anyhow::Result;
    use tempdir::TempDir;

    #[test]
    fn test_a2c_catch() -> Result<()> {
        let tmp_dir = TempDir::new("a2c_catch")?;
        let logdir = match tmp_dir.as_ref().to_str() {
            Some(s) => s.to_string(),
            None => panic!("Failed to get string of temporary directory"),
        };
        let args = Args {
            max_frames: 40,
            n_workers: 2,
            batch_size: 5,
            lr: 7e-4,
            gamma: 0.99,
            lambda: Some(0.95),
            eval_interval: 2,
            cuda: None,
            logdir,
            show_config: false,
        };
        train(&args, &mut NullRecorder::default())?;
        assert!(tmp_dir.path().join("agent.yaml").exists());
        Ok(())
    }
}
