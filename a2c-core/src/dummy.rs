//! Deterministic environment and agent used in tests.
use crate::{record::Record, Act, Agent, Env, Obs, Policy, Step, TrajectoryBatch};
use anyhow::{bail, Result};

/// Step count in the current episode.
#[derive(Clone, Debug, PartialEq)]
pub struct DummyObs(pub usize);

impl Obs for DummyObs {}

#[derive(Clone, Debug, PartialEq)]
pub struct DummyAct(pub usize);

impl Act for DummyAct {}

#[derive(Clone, Debug)]
pub struct DummyEnvConfig {
    /// Every episode terminates after this number of steps.
    pub episode_len: usize,

    pub reward: f32,

    /// Indices of calls of `step`, counted from zero over the lifetime of the environment,
    /// that fail.
    pub fail_at: Vec<usize>,

    /// If `true`, every call of `step` fails.
    pub fail_always: bool,

    /// Indices of calls of `reset`, counted like `fail_at`, that fail.
    pub fail_reset_at: Vec<usize>,
}

impl Default for DummyEnvConfig {
    fn default() -> Self {
        Self {
            episode_len: 3,
            reward: 1.0,
            fail_at: vec![],
            fail_always: false,
            fail_reset_at: vec![],
        }
    }
}

pub struct DummyEnv {
    config: DummyEnvConfig,
    t: usize,
    n_calls: usize,
    n_resets: usize,
}

impl Env for DummyEnv {
    type Config = DummyEnvConfig;
    type Obs = DummyObs;
    type Act = DummyAct;
    type Info = ();

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            t: 0,
            n_calls: 0,
            n_resets: 0,
        })
    }

    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)> {
        let ix = self.n_calls;
        self.n_calls += 1;
        if self.config.fail_always || self.config.fail_at.contains(&ix) {
            bail!("step {} failed", ix);
        }

        self.t += 1;
        let is_terminated = self.t >= self.config.episode_len;
        let step = Step::new(
            DummyObs(self.t),
            a.clone(),
            self.config.reward,
            is_terminated,
            false,
            (),
        );
        Ok((step, Record::empty()))
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        let ix = self.n_resets;
        self.n_resets += 1;
        if self.config.fail_reset_at.contains(&ix) {
            bail!("reset {} failed", ix);
        }
        self.t = 0;
        Ok(DummyObs(0))
    }

    fn reset_with_index(&mut self, _ix: usize) -> Result<Self::Obs> {
        self.reset()
    }
}

/// Takes action 0 and estimates a constant value for every observation.
pub struct DummyAgent {
    pub value: f32,
    pub is_train: bool,

    /// Sizes of the batches given to `opt`.
    pub batch_sizes: Vec<usize>,
}

impl DummyAgent {
    pub fn new(value: f32) -> Self {
        Self {
            value,
            is_train: false,
            batch_sizes: vec![],
        }
    }
}

impl Policy<DummyEnv> for DummyAgent {
    fn sample(&mut self, _obs: &DummyObs) -> Result<DummyAct> {
        Ok(DummyAct(0))
    }
}

impl Agent<DummyEnv> for DummyAgent {
    fn train(&mut self) {
        self.is_train = true;
    }

    fn eval(&mut self) {
        self.is_train = false;
    }

    fn is_train(&self) -> bool {
        self.is_train
    }

    fn value(&mut self, obs: &[DummyObs]) -> Result<Vec<f32>> {
        Ok(vec![self.value; obs.len()])
    }

    fn opt(&mut self, batch: TrajectoryBatch<DummyObs, DummyAct>) -> Result<Record> {
        self.batch_sizes.push(batch.len());
        let mean = batch.target.iter().sum::<f32>() / batch.len() as f32;
        let mut record = Record::from_scalar("value_mean", self.value);
        record.insert("target_mean", crate::record::RecordValue::Scalar(mean));
        Ok(record)
    }
}
