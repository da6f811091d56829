//! Buffer of `(observation, action, target value)` triples.

/// A batch drained from [`TrajectoryBuffer`].
///
/// The three sequences are aligned and have the same length.
#[derive(Debug, Clone)]
pub struct TrajectoryBatch<O, A> {
    /// Observations.
    pub obs: Vec<O>,

    /// Actions taken at the observations.
    pub act: Vec<A>,

    /// Regression targets of the critic.
    pub target: Vec<f32>,
}

impl<O, A> TrajectoryBatch<O, A> {
    /// Number of triples in the batch.
    pub fn len(&self) -> usize {
        self.target.len()
    }

    /// Returns `true` if the batch has no triples.
    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }

    /// Unpacks the batch.
    pub fn unpack(self) -> (Vec<O>, Vec<A>, Vec<f32>) {
        (self.obs, self.act, self.target)
    }
}

/// Accumulates triples contributed by all workers between optimization steps.
///
/// Capacity is not bounded; [`Trainer`](crate::Trainer) drains the buffer once per
/// cycle, after every worker has pushed its segment.
#[derive(Debug)]
pub struct TrajectoryBuffer<O, A> {
    obs: Vec<O>,
    act: Vec<A>,
    target: Vec<f32>,
}

impl<O, A> Default for TrajectoryBuffer<O, A> {
    fn default() -> Self {
        Self {
            obs: vec![],
            act: vec![],
            target: vec![],
        }
    }
}

impl<O, A> TrajectoryBuffer<O, A> {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty buffer with room for `capacity` triples.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            obs: Vec::with_capacity(capacity),
            act: Vec::with_capacity(capacity),
            target: Vec::with_capacity(capacity),
        }
    }

    /// Appends a triple.
    pub fn push(&mut self, obs: O, act: A, target: f32) {
        self.obs.push(obs);
        self.act.push(act);
        self.target.push(target);
    }

    /// Appends all triples of `batch`, keeping their order.
    pub fn extend(&mut self, batch: TrajectoryBatch<O, A>) {
        let (obs, act, target) = batch.unpack();
        self.obs.extend(obs);
        self.act.extend(act);
        self.target.extend(target);
    }

    /// Number of triples in the buffer.
    pub fn len(&self) -> usize {
        self.target.len()
    }

    /// Returns `true` if the buffer has no triples.
    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }

    /// Takes all triples in push order, leaving the buffer empty.
    pub fn drain(&mut self) -> TrajectoryBatch<O, A> {
        TrajectoryBatch {
            obs: std::mem::take(&mut self.obs),
            act: std::mem::take(&mut self.act),
            target: std::mem::take(&mut self.target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_in_push_order() {
        let mut buffer = TrajectoryBuffer::new();
        for i in 0..5 {
            buffer.push(i, i * 10, i as f32 * 0.5);
        }
        assert_eq!(buffer.len(), 5);

        let batch = buffer.drain();
        assert_eq!(batch.obs, vec![0, 1, 2, 3, 4]);
        assert_eq!(batch.act, vec![0, 10, 20, 30, 40]);
        assert_eq!(batch.target, vec![0.0, 0.5, 1.0, 1.5, 2.0]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_drain_empty_after_drain() {
        let mut buffer = TrajectoryBuffer::<u8, u8>::with_capacity(4);
        buffer.push(1, 2, 3.0);
        assert_eq!(buffer.drain().len(), 1);
        assert!(buffer.drain().is_empty());
        assert!(buffer.drain().is_empty());
    }

    #[test]
    fn test_extend_keeps_order() {
        let mut buffer = TrajectoryBuffer::new();
        buffer.push('a', 0, 0.0);
        buffer.extend(TrajectoryBatch {
            obs: vec!['b', 'c'],
            act: vec![1, 2],
            target: vec![1.0, 2.0],
        });
        let (obs, act, target) = buffer.drain().unpack();
        assert_eq!(obs, vec!['a', 'b', 'c']);
        assert_eq!(act, vec![0, 1, 2]);
        assert_eq!(target, vec![0.0, 1.0, 2.0]);
    }
}
