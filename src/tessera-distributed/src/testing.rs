//! Scripted submitter for exercising dispatch without a cluster.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use common_error::{TesseraError, TesseraResult};
use tessera_core::Row;

use crate::operation::{JobId, NodeId, NodeOperation, NodeOperationResult, PhaseId};
use crate::submitter::NodeOperationSubmitter;

/// A [`NodeOperationSubmitter`] answering from a script and recording
/// everything it was asked to do.
///
/// Unscripted phases acknowledge with `true`.
#[derive(Debug, Default)]
pub struct RecordingSubmitter {
    results: HashMap<PhaseId, NodeOperationResult>,
    failures: HashMap<PhaseId, String>,
    delays: HashMap<PhaseId, Duration>,
    hangs: HashSet<PhaseId>,
    failing_kills: HashSet<NodeId>,
    submitted: Mutex<Vec<PhaseId>>,
    killed: Mutex<Vec<NodeId>>,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl RecordingSubmitter {
    /// Create a submitter that acknowledges everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `phase_id` with rows.
    pub fn with_rows(mut self, phase_id: u32, rows: Vec<Row>) -> Self {
        self.results
            .insert(PhaseId(phase_id), NodeOperationResult::Rows(rows));
        self
    }

    /// Answer `phase_id` with an acknowledgement.
    pub fn with_ack(mut self, phase_id: u32, acknowledged: bool) -> Self {
        self.results
            .insert(PhaseId(phase_id), NodeOperationResult::Acknowledged(acknowledged));
        self
    }

    /// Fail `phase_id` with a remote error.
    pub fn with_failure(mut self, phase_id: u32, message: impl Into<String>) -> Self {
        self.failures.insert(PhaseId(phase_id), message.into());
        self
    }

    /// Delay the answer for `phase_id`.
    pub fn with_delay(mut self, phase_id: u32, delay: Duration) -> Self {
        self.delays.insert(PhaseId(phase_id), delay);
        self
    }

    /// Never answer `phase_id`.
    pub fn with_hang(mut self, phase_id: u32) -> Self {
        self.hangs.insert(PhaseId(phase_id));
        self
    }

    /// Fail kill requests sent to `node`.
    pub fn with_failing_kill(mut self, node: impl Into<String>) -> Self {
        self.failing_kills.insert(NodeId::new(node));
        self
    }

    /// Phases in submission order.
    pub fn submitted(&self) -> Vec<PhaseId> {
        lock(&self.submitted).clone()
    }

    /// Nodes that received a kill request, in request order.
    pub fn killed(&self) -> Vec<NodeId> {
        lock(&self.killed).clone()
    }

    /// Highest number of operations answered concurrently.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Wait until at least `count` operations were submitted.
    pub async fn wait_for_submissions(&self, count: usize) {
        loop {
            let seen = lock(&self.submitted).len();
            if seen >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }
}

#[async_trait]
impl NodeOperationSubmitter for RecordingSubmitter {
    async fn submit(
        &self,
        _job_id: &JobId,
        operation: &NodeOperation,
    ) -> TesseraResult<NodeOperationResult> {
        let phase_id = operation.phase_id;
        lock(&self.submitted).push(phase_id);
        let _active = ActiveGuard::enter(&self.active, &self.peak);

        if self.hangs.contains(&phase_id) {
            std::future::pending::<()>().await;
        }
        if let Some(delay) = self.delays.get(&phase_id) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(message) = self.failures.get(&phase_id) {
            return Err(TesseraError::remote(message.clone()));
        }
        Ok(self
            .results
            .get(&phase_id)
            .cloned()
            .unwrap_or(NodeOperationResult::Acknowledged(true)))
    }

    async fn kill(&self, _job_id: &JobId, node: &NodeId) -> TesseraResult<()> {
        lock(&self.killed).push(node.clone());
        if self.failing_kills.contains(node) {
            return Err(TesseraError::remote(format!("node {node} unreachable")));
        }
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Counts an answer as active until dropped, including when aborted.
struct ActiveGuard<'a> {
    active: &'a AtomicUsize,
}

impl<'a> ActiveGuard<'a> {
    fn enter(active: &'a AtomicUsize, peak: &AtomicUsize) -> Self {
        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        Self { active }
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}
