//! Append-only history of episode returns and critic values.

/// Monitoring log shared by the workers and the trainer.
///
/// Episode returns are appended by [`Worker`](crate::Worker) when an episode ends.
/// Mean critic values are appended by [`Trainer`](crate::Trainer) after every
/// optimization step. Entries are never modified or removed; a reporting cursor
/// tracks which episodes were already reported.
#[derive(Debug, Default, Clone)]
pub struct MonitorLog {
    episode_rewards: Vec<f32>,
    values: Vec<f32>,
    n_reported_episodes: usize,
}

impl MonitorLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the cumulative reward of a finished episode.
    pub fn push_episode_reward(&mut self, r: f32) {
        self.episode_rewards.push(r);
    }

    /// Appends a mean critic value.
    pub fn push_value(&mut self, v: f32) {
        self.values.push(v);
    }

    /// Returns all episode returns in the order they were appended.
    pub fn episode_rewards(&self) -> &[f32] {
        &self.episode_rewards
    }

    /// Returns all mean critic values in the order they were appended.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Returns the episode returns appended since the last call and advances the cursor.
    pub fn unreported_episode_rewards(&mut self) -> &[f32] {
        let start = self.n_reported_episodes;
        self.n_reported_episodes = self.episode_rewards.len();
        &self.episode_rewards[start..]
    }
}
