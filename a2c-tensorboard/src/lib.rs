//! Writes records of the A2C learner to TensorBoard event files.
use a2c_core::record::{AggregateRecorder, Record, RecordStorage, RecordValue, Recorder};
use log::{debug, warn};
use std::path::Path;
use tensorboard_rs::summary_writer::SummaryWriter;

/// Write records to TFRecord.
///
/// Only [`RecordValue::Scalar`] values are written. Arrays such as `episode_rewards`
/// are summarized by the scalars next to them and skipped.
pub struct TensorboardRecorder {
    writer: SummaryWriter,
    step_key: String,
    storage: RecordStorage,
}

impl TensorboardRecorder {
    /// Construct a [`TensorboardRecorder`].
    ///
    /// TFRecord will be stored in `logdir`.
    pub fn new<P: AsRef<Path>>(logdir: P) -> Self {
        Self {
            writer: SummaryWriter::new(logdir),
            step_key: "frames".to_string(),
            storage: RecordStorage::new(),
        }
    }

    fn write_with_step(&mut self, record: &Record, step: usize) {
        for (k, v) in record.iter() {
            if *k == self.step_key {
                continue;
            }
            match v {
                RecordValue::Scalar(v) => self.writer.add_scalar(k, *v, step),
                RecordValue::Array1(vs) => debug!("Skipped {} ({} values)", k, vs.len()),
            };
        }
    }
}

impl Recorder for TensorboardRecorder {
    /// Write a given [Record] into a TFRecord.
    ///
    /// The step is taken from the scalar with key `frames`. Records without it are
    /// discarded.
    fn write(&mut self, record: Record) {
        let step = match record.get(&self.step_key) {
            Some(RecordValue::Scalar(v)) => *v as usize,
            _ => {
                warn!("Record without {} is discarded", self.step_key);
                return;
            }
        };
        self.write_with_step(&record, step);
        self.writer.flush();
    }
}

impl AggregateRecorder for TensorboardRecorder {
    fn store(&mut self, record: Record) {
        self.storage.store(record);
    }

    fn flush(&mut self, step: i64) {
        let record = self.storage.aggregate();
        self.write_with_step(&record, step.max(0) as usize);
        self.writer.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_write_event_file() -> std::io::Result<()> {
        let dir = TempDir::new("tensorboard")?;
        {
            let mut recorder = TensorboardRecorder::new(dir.path());
            recorder.store(Record::from_scalar("value_mean", 0.5));
            recorder.store(Record::from_slice(&[
                ("value_mean", RecordValue::Scalar(1.5)),
                ("episode_rewards", RecordValue::Array1(vec![1.0, -1.0])),
            ]));
            recorder.flush(100);
            recorder.write(Record::from_scalar("episode_reward", 1.0));
        }

        let n_files = std::fs::read_dir(dir.path())?.count();
        assert!(n_files > 0);
        Ok(())
    }
}
