//! In-process queue feeding the analysis worker.
//!
//! `complete` enqueues a session id and returns; one worker task drains the
//! queue and runs analyses one at a time, in arrival order.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::analysis::AnalysisRunner;
use crate::error::{AppError, AppResult};

const DEFAULT_QUEUE_CAPACITY: usize = 1000;

/// A unit of analysis work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisJob {
    pub session_id: String,
}

/// Sending half of the analysis queue.
#[derive(Clone)]
pub struct AnalysisQueue {
    sender: mpsc::Sender<AnalysisJob>,
}

impl AnalysisQueue {
    /// Create a queue with the default capacity.
    pub fn channel() -> (Self, mpsc::Receiver<AnalysisJob>) {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> (Self, mpsc::Receiver<AnalysisJob>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }

    /// Queue an analysis for `session_id`.
    pub async fn enqueue(&self, session_id: &str) -> AppResult<()> {
        self.sender
            .send(AnalysisJob {
                session_id: session_id.to_string(),
            })
            .await
            .map_err(|_| AppError::Internal("Analysis worker is not running".to_string()))
    }
}

/// Spawn the worker that drains `receiver` until every sender is dropped.
pub fn start_analysis_worker(
    runner: AnalysisRunner,
    mut receiver: mpsc::Receiver<AnalysisJob>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting analysis worker");

        while let Some(job) = receiver.recv().await {
            if let Err(e) = runner.run(&job.session_id).await {
                error!(session_id = %job.session_id, "Failed to record analysis outcome: {}", e);
            }
        }

        info!("Analysis queue closed, worker stopped");
    })
}
