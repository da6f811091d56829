//! Types and traits for monitoring training.
//!
//! * [`Record`] is a set of named values, produced by environments, agents and the
//!   [`Trainer`](crate::Trainer).
//! * [`Recorder`] writes a record immediately; [`AggregateRecorder`] stores records and
//!   writes values aggregated by [`RecordStorage`] when flushed.
//! * [`MonitorLog`] is the append-only history of episode returns and mean critic values.
//!
//! ```rust
//! use a2c_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("frames", RecordValue::Scalar(1000.0));
//! record.insert("value_mean", RecordValue::Scalar(0.25));
//! assert_eq!(record.get_scalar("frames").unwrap(), 1000.0);
//! ```
mod base;
mod buffered_recorder;
mod monitor;
mod null_recorder;
mod recorder;
mod storage;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use monitor::MonitorLog;
pub use null_recorder::NullRecorder;
pub use recorder::{AggregateRecorder, Recorder};
pub use storage::RecordStorage;
