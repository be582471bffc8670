//! Tracks long-running background jobs such as course completion.
//!
//! - `JobsState`: clonable shared state, injected into the Actix app in `main.rs`.
//! - `JobUpdate`: a status change sent by a running job.
//! - `start_job_updater`: applies `JobUpdate`s from the channel to the shared map.

use common::jobs::JobStatus;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

/// Shared state of all background jobs.
#[derive(Clone)]
pub struct JobsState {
    /// Job id -> current status. Read by the status endpoint, written only by
    /// `register` and the updater task.
    pub jobs: Arc<RwLock<HashMap<String, JobStatus>>>,

    /// Jobs report progress through this sender instead of locking `jobs`.
    pub tx: mpsc::Sender<JobUpdate>,
}

/// A status update for one job.
#[derive(Debug)]
pub struct JobUpdate {
    pub(crate) job_id: String,
    pub(crate) status: JobStatus,
}

impl JobUpdate {
    pub fn new(job_id: impl Into<String>, status: JobStatus) -> Self {
        Self {
            job_id: job_id.into(),
            status,
        }
    }
}

impl JobsState {
    /// Create the shared state and the receiver `start_job_updater` consumes.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<JobUpdate>) {
        let (tx, rx) = mpsc::channel(capacity);
        let state = Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            tx,
        };
        (state, rx)
    }

    /// Register a new job as `Pending` and return its id.
    pub async fn register(&self) -> String {
        let job_id = Uuid::new_v4().to_string();
        self.jobs
            .write()
            .await
            .insert(job_id.clone(), JobStatus::Pending);
        job_id
    }

    pub async fn status(&self, job_id: &str) -> Option<JobStatus> {
        self.jobs.read().await.get(job_id).cloned()
    }

    /// Send a status change to the updater. A closed channel means the
    /// server is shutting down, so the update is dropped.
    pub async fn report(&self, job_id: &str, status: JobStatus) {
        let _ = self.tx.send(JobUpdate::new(job_id, status)).await;
    }
}

/// Percentage of `done` out of `total`, 0 when there is nothing to do.
pub fn percent(done: usize, total: usize) -> u32 {
    if total == 0 {
        0
    } else {
        (done as f32 / total as f32 * 100.0) as u32
    }
}

/// Applies status updates until every sender is dropped. Spawned once in
/// `main.rs`.
pub async fn start_job_updater(state: JobsState, mut rx: mpsc::Receiver<JobUpdate>) {
    while let Some(update) = rx.recv().await {
        let mut jobs = state.jobs.write().await;
        jobs.insert(update.job_id.clone(), update.status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn updates_reach_the_shared_map() {
        let (state, rx) = JobsState::new(8);
        tokio::spawn(start_job_updater(state.clone(), rx));

        let job_id = state.register().await;
        assert_eq!(state.status(&job_id).await, Some(JobStatus::Pending));

        state.report(&job_id, JobStatus::InProgress(50)).await;
        state
            .report(&job_id, JobStatus::Completed("/api/course/pdf/s1".to_string()))
            .await;

        for _ in 0..100 {
            if state.status(&job_id).await.is_some_and(|s| s.is_finished()) {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(
            state.status(&job_id).await,
            Some(JobStatus::Completed("/api/course/pdf/s1".to_string()))
        );
    }

    #[test]
    fn percentages() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(3, 3), 100);
    }
}
