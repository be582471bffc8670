use serde::{Deserialize, Serialize};

/// Status of a background course-generation job, polled by the page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    /// Percentage of lessons generated so far.
    InProgress(u32),
    /// Carries the download path of the finished PDF.
    Completed(String),
    Failed(String),
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, JobStatus::Completed(_) | JobStatus::Failed(_))
    }
}
