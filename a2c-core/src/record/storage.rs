//! Aggregation of stored records.
use super::{Record, RecordValue};
use log::warn;
use std::collections::HashSet;
use xxhash_rust::xxh3::Xxh3Builder;

/// Stores records and aggregates them.
///
/// Scalars stored more than once under the same key are summarized with
/// `{key}_min`, `{key}_max`, `{key}_mean` and `{key}_median`; a single scalar keeps its
/// key. Arrays stored under the same key are concatenated in the order of storing.
#[derive(Default)]
pub struct RecordStorage {
    data: Vec<Record>,
}

fn min(vs: &[f32]) -> RecordValue {
    RecordValue::Scalar(vs.iter().copied().fold(f32::INFINITY, f32::min))
}

fn max(vs: &[f32]) -> RecordValue {
    RecordValue::Scalar(vs.iter().copied().fold(f32::NEG_INFINITY, f32::max))
}

fn mean(vs: &[f32]) -> RecordValue {
    RecordValue::Scalar(vs.iter().sum::<f32>() / vs.len() as f32)
}

fn median(mut vs: Vec<f32>) -> RecordValue {
    vs.sort_by(|x, y| x.total_cmp(y));
    RecordValue::Scalar(vs[vs.len() / 2])
}

impl RecordStorage {
    /// Creates a new empty record storage.
    pub fn new() -> Self {
        Self { data: vec![] }
    }

    /// Stores a record.
    pub fn store(&mut self, record: Record) {
        self.data.push(record);
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if no record is stored.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn get_keys(&self) -> HashSet<String, Xxh3Builder> {
        let mut keys = HashSet::<String, Xxh3Builder>::default();
        for record in self.data.iter() {
            for k in record.keys() {
                keys.insert(k.clone());
            }
        }
        keys
    }

    fn latest(&self, key: &str) -> Option<&RecordValue> {
        self.data.iter().rev().find_map(|record| record.get(key))
    }

    fn array1(&self, key: &str) -> Record {
        let mut vs = vec![];
        for record in self.data.iter() {
            match record.get(key) {
                Some(RecordValue::Array1(v)) => vs.extend_from_slice(v),
                Some(_) => warn!("Ignored a non-array value for {}", key),
                None => {}
            }
        }
        Record::from_slice(&[(key, RecordValue::Array1(vs))])
    }

    fn scalar(&self, key: &str) -> Record {
        let vs: Vec<f32> = self
            .data
            .iter()
            .filter_map(|record| match record.get(key) {
                Some(RecordValue::Scalar(v)) => Some(*v),
                Some(_) => {
                    warn!("Ignored a non-scalar value for {}", key);
                    None
                }
                None => None,
            })
            .collect();

        if vs.len() == 1 {
            Record::from_slice(&[(key, RecordValue::Scalar(vs[0]))])
        } else {
            Record::from_slice(&[
                (format!("{}_min", key), min(&vs)),
                (format!("{}_max", key), max(&vs)),
                (format!("{}_mean", key), mean(&vs)),
                (format!("{}_median", key), median(vs)),
            ])
        }
    }

    /// Aggregates all stored records and clears the storage.
    pub fn aggregate(&mut self) -> Record {
        let mut record = Record::empty();

        for key in self.get_keys().iter() {
            let r = match self.latest(key) {
                Some(RecordValue::Scalar(..)) => self.scalar(key),
                Some(RecordValue::Array1(..)) => self.array1(key),
                None => continue,
            };
            record.merge_inplace(r);
        }

        self.data.clear();

        record
    }
}
