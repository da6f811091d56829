use super::{AggregateRecorder, Record, RecordStorage, Recorder};

/// Keeps records in memory.
///
/// Records given with [`Recorder::write`] are kept as they are. Records given with
/// [`AggregateRecorder::store`] are aggregated on [`AggregateRecorder::flush`] and the
/// result is kept together with the step.
#[derive(Default)]
pub struct BufferedRecorder {
    buf: Vec<Record>,
    storage: RecordStorage,
    flushed: Vec<(i64, Record)>,
}

impl BufferedRecorder {
    /// Construct the recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an iterator over the written records.
    pub fn iter(&self) -> std::slice::Iter<Record> {
        self.buf.iter()
    }

    /// Returns aggregated records with the steps at which they were flushed.
    pub fn flushed(&self) -> &[(i64, Record)] {
        &self.flushed
    }
}

impl Recorder for BufferedRecorder {
    fn write(&mut self, record: Record) {
        self.buf.push(record);
    }
}

impl AggregateRecorder for BufferedRecorder {
    fn store(&mut self, record: Record) {
        self.storage.store(record);
    }

    fn flush(&mut self, step: i64) {
        let record = self.storage.aggregate();
        if !record.is_empty() {
            self.flushed.push((step, record));
        }
    }
}
