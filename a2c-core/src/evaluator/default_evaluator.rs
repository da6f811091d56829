use super::Evaluator;
use crate::{record::Record, Env, Policy};
use anyhow::Result;

/// Runs a fixed number of episodes and reports the average return as `eval_reward`.
pub struct DefaultEvaluator<E: Env> {
    n_episodes: usize,
    env: E,
}

impl<E: Env, P: Policy<E>> Evaluator<E, P> for DefaultEvaluator<E> {
    fn evaluate(&mut self, policy: &mut P) -> Result<Record> {
        let mut r_total = 0f32;

        for ix in 0..self.n_episodes {
            let mut prev_obs = self.env.reset_with_index(ix)?;

            loop {
                let act = policy.sample(&prev_obs)?;
                let (step, _) = self.env.step(&act)?;
                r_total += step.reward;
                if step.is_done() {
                    break;
                }
                prev_obs = step.obs;
            }
        }

        Ok(Record::from_scalar(
            "eval_reward",
            r_total / self.n_episodes as f32,
        ))
    }
}

impl<E: Env> DefaultEvaluator<E> {
    /// Constructs an evaluator with its own environment.
    ///
    /// `n_episodes` must be positive.
    pub fn new(config: &E::Config, seed: i64, n_episodes: usize) -> Result<Self> {
        anyhow::ensure!(n_episodes > 0, "n_episodes must be positive");
        Ok(Self {
            n_episodes,
            env: E::build(config, seed)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dummy::{DummyAgent, DummyEnv, DummyEnvConfig};

    #[test]
    fn test_eval_reward() -> Result<()> {
        let config = DummyEnvConfig {
            episode_len: 4,
            reward: 0.5,
            ..Default::default()
        };
        let mut evaluator = DefaultEvaluator::<DummyEnv>::new(&config, 0, 3)?;
        let mut agent = DummyAgent::new(0.0);
        let record = evaluator.evaluate(&mut agent)?;
        assert_eq!(record.get_scalar("eval_reward")?, 2.0);
        Ok(())
    }
}
