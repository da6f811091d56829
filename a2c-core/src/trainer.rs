//! Train [`Agent`].
mod config;
use crate::{
    record::{
        AggregateRecorder, MonitorLog, Record,
        RecordValue::{Array1, Scalar},
    },
    Agent, Env, Evaluator, TrajectoryBuffer, Worker,
};
use anyhow::Result;
pub use config::TrainerConfig;
use log::{debug, error, info};
use std::time::Instant;

/// State of [`Trainer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerState {
    /// The training loop is running.
    Running,

    /// The training loop is not running. It has not been started, the frame budget is
    /// exhausted or the loop failed with an error.
    Stopped,
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Manages the synchronous training loop.
///
/// # Training loop
///
/// 0. Given an agent implementing [`Agent`] and a recorder implementing
///    [`AggregateRecorder`].
/// 1. Build `n_workers` instances of [`Worker`], the `i`-th with seed `seed + i`.
///    Reset `frames = 0` and `cycles = 0`.
/// 2. While `frames < max_frames`:
///     1. For every worker in a fixed order, call [`Worker::get_batch`], push the segment
///        into a [`TrajectoryBuffer`] and `frames += batch_size`.
///     2. Drain the buffer and call [`Agent::opt`] with the batch. Its mean value estimate
///        is appended to the [`MonitorLog`]. `cycles += 1`.
///     3. If `report_interval` frames have passed since the last report, store a record
///        with `frames`, `cycles`, `value_mean`, `episode_reward`, `episode_rewards`,
///        `n_episodes`, `env_faults`, `fps` and the record returned by the agent.
///     4. If `eval_interval > 0` and `cycles % eval_interval == 0`, evaluate the agent
///        and add `eval_reward`.
///     5. Flush the recorder with `frames` as the step if anything was stored.
///
/// Whether the loop finishes or fails, [`Trainer::state`] is
/// [`TrainerState::Stopped`] afterwards.
///
/// The loop thus runs exactly `ceil(max_frames / (batch_size * n_workers))` cycles and
/// every batch has `batch_size * n_workers` triples.
///
/// # Interaction of objects
///
/// ```mermaid
/// graph LR
///     A[Agent]-->|Env::Act|W[Worker]
///     W -->|Env::Obs|A
///     W -->|Segment|B[TrajectoryBuffer]
///     B -->|TrajectoryBatch|A
///     W -->|episode returns|M[MonitorLog]
///     A -->|value_mean|M
/// ```
pub struct Trainer<E: Env> {
    config: TrainerConfig,
    env_config: E::Config,
    state: TrainerState,
    frames: usize,
    cycles: usize,
}

impl<E: Env> Trainer<E> {
    /// Constructs a trainer.
    ///
    /// Fails with [`A2cError::InvalidConfig`](crate::error::A2cError::InvalidConfig)
    /// if `config` is invalid.
    pub fn build(config: TrainerConfig, env_config: E::Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            env_config,
            state: TrainerState::Stopped,
            frames: 0,
            cycles: 0,
        })
    }

    /// Returns the state of the training loop.
    pub fn state(&self) -> TrainerState {
        self.state
    }

    /// Returns the number of environment steps taken in the last call of [`Trainer::train`].
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Returns the number of optimization steps in the last call of [`Trainer::train`].
    pub fn cycles(&self) -> usize {
        self.cycles
    }

    /// Trains the agent without evaluation.
    ///
    /// Returns the history of episode returns and mean critic values.
    pub fn train<A: Agent<E>>(
        &mut self,
        agent: &mut A,
        recorder: &mut dyn AggregateRecorder,
    ) -> Result<MonitorLog> {
        self.run(agent, recorder, None)
    }

    /// Trains the agent with periodic evaluation every `eval_interval` cycles.
    pub fn train_with_evaluator<A: Agent<E>>(
        &mut self,
        agent: &mut A,
        recorder: &mut dyn AggregateRecorder,
        evaluator: &mut dyn Evaluator<E, A>,
    ) -> Result<MonitorLog> {
        self.run(agent, recorder, Some(evaluator))
    }

    fn build_workers(&self) -> Result<Vec<Worker<E>>> {
        (0..self.config.n_workers)
            .map(|i| Worker::build(&self.env_config, self.config.seed + i as i64, &self.config))
            .collect()
    }

    fn report(
        &self,
        log: &mut MonitorLog,
        value_mean: f32,
        fps: f32,
        env_faults: usize,
    ) -> Record {
        let mut record = Record::from_slice(&[
            ("frames", Scalar(self.frames as f32)),
            ("cycles", Scalar(self.cycles as f32)),
            ("value_mean", Scalar(value_mean)),
            ("fps", Scalar(fps)),
            ("env_faults", Scalar(env_faults as f32)),
        ]);

        let rs = log.unreported_episode_rewards();
        record.insert("n_episodes", Scalar(rs.len() as f32));
        if !rs.is_empty() {
            let r = rs.iter().sum::<f32>() / rs.len() as f32;
            record.insert("episode_reward", Scalar(r));
            record.insert("episode_rewards", Array1(rs.to_vec()));
            info!(
                "frames = {}, cycles = {}, episode_reward = {:.3}, value_mean = {:.3}, fps = {:.1}",
                self.frames, self.cycles, r, value_mean, fps
            );
        } else {
            info!(
                "frames = {}, cycles = {}, value_mean = {:.3}, fps = {:.1}",
                self.frames, self.cycles, value_mean, fps
            );
        }

        record
    }

    fn run<A: Agent<E>>(
        &mut self,
        agent: &mut A,
        recorder: &mut dyn AggregateRecorder,
        evaluator: Option<&mut dyn Evaluator<E, A>>,
    ) -> Result<MonitorLog> {
        self.frames = 0;
        self.cycles = 0;
        self.state = TrainerState::Running;
        let result = self.run_loop(agent, recorder, evaluator);
        self.state = TrainerState::Stopped;

        match &result {
            Ok(_) => info!(
                "Finished training: {} frames, {} cycles",
                self.frames, self.cycles
            ),
            Err(e) => error!(
                "Training failed after {} frames, {} cycles: {}",
                self.frames, self.cycles, e
            ),
        }

        result
    }

    fn run_loop<A: Agent<E>>(
        &mut self,
        agent: &mut A,
        recorder: &mut dyn AggregateRecorder,
        mut evaluator: Option<&mut dyn Evaluator<E, A>>,
    ) -> Result<MonitorLog> {
        let cycle_frames = self.config.batch_size * self.config.n_workers;
        let mut workers = self.build_workers()?;
        let mut buffer = TrajectoryBuffer::with_capacity(cycle_frames);
        let mut log = MonitorLog::new();
        let mut timer = Instant::now();
        let mut frames_reported = 0;
        agent.train();
        info!(
            "Starts training with {} workers, {} frames per cycle",
            self.config.n_workers, cycle_frames
        );

        while self.frames < self.config.max_frames {
            for worker in workers.iter_mut() {
                let segment = worker.get_batch(agent, &mut log)?;
                buffer.extend(segment);
                self.frames += self.config.batch_size;
            }

            let batch = buffer.drain();
            debug_assert_eq!(batch.len(), cycle_frames);
            let record_agent = agent.opt(batch)?;
            let value_mean = record_agent.get_scalar("value_mean")?;
            log.push_value(value_mean);
            self.cycles += 1;
            debug!("cycle {}: value_mean = {}", self.cycles, value_mean);

            let mut record = Record::empty();

            if self.frames - frames_reported >= self.config.report_interval {
                let secs = timer.elapsed().as_secs_f32();
                let fps = match secs > 0.0 {
                    true => (self.frames - frames_reported) as f32 / secs,
                    false => 0.0,
                };
                let env_faults = workers.iter().map(|w| w.n_faults()).sum();
                let record_report = self.report(&mut log, value_mean, fps, env_faults);
                record = record_agent.merge(record_report);
                frames_reported = self.frames;
                timer = Instant::now();
            }

            if self.config.eval_interval > 0 && self.cycles % self.config.eval_interval == 0 {
                if let Some(evaluator) = evaluator.as_mut() {
                    info!("Starts evaluation of the trained model");
                    agent.eval();
                    let record_eval = evaluator.evaluate(agent)?;
                    agent.train();
                    record.merge_inplace(record_eval);
                }
            }

            if !record.is_empty() {
                recorder.store(record);
                recorder.flush(self.frames as i64);
            }
        }

        Ok(log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dummy::{DummyAgent, DummyEnv, DummyEnvConfig},
        error::A2cError,
        record::{BufferedRecorder, NullRecorder},
        DefaultEvaluator,
    };

    fn trainer(
        max_frames: usize,
        batch_size: usize,
        n_workers: usize,
    ) -> Result<Trainer<DummyEnv>> {
        let config = TrainerConfig::default()
            .max_frames(max_frames)
            .batch_size(batch_size)
            .n_workers(n_workers)
            .report_interval(batch_size * n_workers);
        Trainer::build(config, DummyEnvConfig::default())
    }

    #[test]
    fn test_number_of_cycles() -> Result<()> {
        for (max_frames, batch_size, n_workers) in
            [(0, 5, 2), (1, 5, 2), (10, 5, 2), (11, 5, 2), (100, 3, 7), (64, 1, 1)]
        {
            let mut trainer = trainer(max_frames, batch_size, n_workers)?;
            let mut agent = DummyAgent::new(0.0);
            let mut recorder = NullRecorder::default();
            trainer.train(&mut agent, &mut recorder)?;

            let cycle_frames = batch_size * n_workers;
            let expected = (max_frames + cycle_frames - 1) / cycle_frames;
            assert_eq!(trainer.cycles(), expected);
            assert_eq!(agent.batch_sizes.len(), expected);
            assert!(agent.batch_sizes.iter().all(|&n| n == cycle_frames));
            assert_eq!(trainer.frames(), expected * cycle_frames);
            assert_eq!(trainer.state(), TrainerState::Stopped);
            assert!(agent.is_train());
        }
        Ok(())
    }

    #[test]
    fn test_monitor_log() -> Result<()> {
        // Episodes of 3 steps, 2 workers, 4 cycles of 3 steps per worker.
        let mut trainer = trainer(24, 3, 2)?;
        let mut agent = DummyAgent::new(0.5);
        let mut recorder = NullRecorder::default();
        let log = trainer.train(&mut agent, &mut recorder)?;

        assert_eq!(log.values(), &[0.5; 4]);
        assert_eq!(log.episode_rewards(), &[3.0; 8]);
        Ok(())
    }

    #[test]
    fn test_report_and_eval() -> Result<()> {
        let config = TrainerConfig::default()
            .max_frames(40)
            .batch_size(5)
            .n_workers(2)
            .report_interval(20)
            .eval_interval(4);
        let mut trainer = Trainer::<DummyEnv>::build(config, DummyEnvConfig::default())?;
        let mut agent = DummyAgent::new(1.0);
        let mut recorder = BufferedRecorder::new();
        let mut evaluator = DefaultEvaluator::<DummyEnv>::new(&DummyEnvConfig::default(), 0, 2)?;
        trainer.train_with_evaluator(&mut agent, &mut recorder, &mut evaluator)?;

        let flushed = recorder.flushed();
        assert_eq!(flushed.len(), 2);
        assert_eq!(flushed[0].0, 20);
        assert_eq!(flushed[1].0, 40);
        assert_eq!(flushed[0].1.get_scalar("frames")?, 20.0);
        assert_eq!(flushed[0].1.get_scalar("value_mean")?, 1.0);
        assert!(flushed[0].1.get_scalar("eval_reward").is_err());
        assert_eq!(flushed[0].1.get_scalar("env_faults")?, 0.0);
        // Each worker finishes 3 episodes of 3 steps in its first 10 steps.
        assert_eq!(flushed[0].1.get_array1("episode_rewards")?, vec![3.0; 6]);
        assert_eq!(flushed[1].1.get_scalar("cycles")?, 4.0);
        assert_eq!(flushed[1].1.get_scalar("eval_reward")?, 3.0);
        Ok(())
    }

    #[test]
    fn test_train_through_env_faults() -> Result<()> {
        // Every worker fails 6 steps in a row once, 2 workers, report after 2 cycles.
        let env_config = DummyEnvConfig {
            fail_at: (1..7).collect(),
            ..Default::default()
        };
        let config = TrainerConfig::default()
            .max_frames(20)
            .batch_size(5)
            .n_workers(2)
            .report_interval(20)
            .env_fault_backoff_ms(1);
        let mut trainer = Trainer::<DummyEnv>::build(config, env_config)?;
        let mut agent = DummyAgent::new(0.0);
        let mut recorder = BufferedRecorder::new();
        trainer.train(&mut agent, &mut recorder)?;

        assert_eq!(trainer.cycles(), 2);
        assert_eq!(trainer.state(), TrainerState::Stopped);
        assert_eq!(recorder.flushed()[0].1.get_scalar("env_faults")?, 12.0);
        Ok(())
    }

    #[test]
    fn test_stopped_after_failure() -> Result<()> {
        let env_config = DummyEnvConfig {
            fail_always: true,
            ..Default::default()
        };
        let config = TrainerConfig::default()
            .max_frames(100)
            .batch_size(5)
            .n_workers(2)
            .max_env_faults(2)
            .env_fault_backoff_ms(1);
        let mut trainer = Trainer::<DummyEnv>::build(config, env_config)?;
        let mut agent = DummyAgent::new(0.0);
        let mut recorder = NullRecorder::default();

        let err = trainer.train(&mut agent, &mut recorder).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<A2cError>(),
            Some(A2cError::EnvironmentFault(_))
        ));
        assert_eq!(trainer.state(), TrainerState::Stopped);
        assert_eq!(trainer.cycles(), 0);
        Ok(())
    }

    #[test]
    fn test_reject_invalid_config() {
        let config = TrainerConfig::default().batch_size(0);
        let err = Trainer::<DummyEnv>::build(config, DummyEnvConfig::default())
            .err()
            .unwrap();
        assert!(matches!(
            err.downcast_ref::<A2cError>(),
            Some(A2cError::InvalidConfig(_))
        ));
    }
}
