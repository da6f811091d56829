use super::{AggregateRecorder, Record, Recorder};

/// A recorder that ignores any record.
#[derive(Default)]
pub struct NullRecorder {}

impl Recorder for NullRecorder {
    /// Discard the given record.
    fn write(&mut self, _record: Record) {}
}

impl AggregateRecorder for NullRecorder {
    fn store(&mut self, _record: Record) {}

    fn flush(&mut self, _step: i64) {}
}
