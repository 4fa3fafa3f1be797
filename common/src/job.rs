use std::fmt;

use tracing::debug;

/// Phase of a standalone job. Phases only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum JobState {
    Pending,
    Loading,
    Mapping,
    Shuffling,
    Reducing,
    Reporting,
    Completed,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Pending => "pending",
            JobState::Loading => "loading",
            JobState::Mapping => "mapping",
            JobState::Shuffling => "shuffling",
            JobState::Reducing => "reducing",
            JobState::Reporting => "reporting",
            JobState::Completed => "completed",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub struct JobTracker {
    state: JobState,
}

impl Default for JobTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl JobTracker {
    pub fn new() -> Self {
        Self {
            state: JobState::Pending,
        }
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Move the job to `next`.
    pub fn enter(&mut self, next: JobState) {
        debug_assert!(next > self.state, "job cannot go from {} to {}", self.state, next);
        debug!(from = %self.state, to = %next, "job phase");
        self.state = next;
    }
}
