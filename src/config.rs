use std::time::Duration;

/// Ordered backoff delays; the index is the attempt number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrySchedule(Vec<Duration>);

impl RetrySchedule {
    pub fn new(delays: Vec<Duration>) -> Self {
        Self(delays)
    }

    pub fn from_secs(delays: &[u64]) -> Self {
        Self(delays.iter().copied().map(Duration::from_secs).collect())
    }

    /// Delay before the given attempt, or `None` once the schedule is spent.
    pub fn delay(&self, attempt: u32) -> Option<Duration> {
        self.0.get(attempt as usize).copied()
    }

    pub fn len(&self) -> u32 {
        self.0.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for RetrySchedule {
    fn default() -> Self {
        Self::from_secs(&[5, 25, 125])
    }
}

/// Worker configuration, passed to the constructor rather than mutated after
/// the fact.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub retry_schedule: RetrySchedule,
    /// How long to wait after an empty peek before polling again.
    pub poll_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            retry_schedule: RetrySchedule::default(),
            poll_interval: Duration::from_secs(10),
        }
    }
}
