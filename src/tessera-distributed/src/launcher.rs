//! Push-driven job dispatch.
//!
//! The launcher submits every leaf at once, then submits each operation as
//! soon as the last of its producers completed. Rows from terminal
//! operations go to the job's consumer; the consumer receives its terminal
//! signal exactly once, after every operation succeeded or on the first
//! failure or cancellation. A consumer that closes counts as a
//! cancellation, and completions arriving after it closed are discarded.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::Arc;

use futures::future::join_all;
use log::{debug, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use common_config::ExecutionConfig;
use common_error::{TesseraError, TesseraResult};
use common_runtime::{JoinSet, cancelled};
use tessera_core::{BoxedRowConsumer, Rejection};

use crate::ctx::NodeOperationCtx;
use crate::operation::{JobId, NodeId, NodeOperationResult, PhaseId};
use crate::submitter::NodeOperationSubmitter;

type Completion = (PhaseId, TesseraResult<NodeOperationResult>);

/// Dispatches node operation graphs through a [`NodeOperationSubmitter`].
#[derive(Clone)]
pub struct JobLauncher {
    submitter: Arc<dyn NodeOperationSubmitter>,
    config: ExecutionConfig,
}

impl JobLauncher {
    /// Create a launcher.
    pub fn new(submitter: Arc<dyn NodeOperationSubmitter>, config: ExecutionConfig) -> Self {
        Self { submitter, config }
    }

    /// The dispatch configuration.
    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Start dispatching the operations of `ctx`.
    ///
    /// Must be called within a Tokio runtime. A graph rejected before
    /// anything was submitted hands the consumer back untouched; otherwise
    /// the returned task owns the consumer's terminal signal.
    pub fn launch(
        &self,
        ctx: NodeOperationCtx,
        consumer: BoxedRowConsumer,
        cancel: watch::Receiver<bool>,
    ) -> Result<JoinHandle<()>, Rejection> {
        if self.config.verify_graph {
            if let Err(e) = ctx.tree().verify_acyclic() {
                return Err(Rejection::new(e, consumer));
            }
        }

        let driver = Driver {
            submitter: Arc::clone(&self.submitter),
            config: self.config.clone(),
            ctx,
            consumer,
            cancel,
        };
        Ok(common_runtime::spawn(driver.run()))
    }
}

impl std::fmt::Debug for JobLauncher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobLauncher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// How a dispatch loop ended.
enum Stop {
    Drained,
    Failed(TesseraError),
    Cancelled,
}

struct Driver {
    submitter: Arc<dyn NodeOperationSubmitter>,
    config: ExecutionConfig,
    ctx: NodeOperationCtx,
    consumer: BoxedRowConsumer,
    cancel: watch::Receiver<bool>,
}

impl Driver {
    async fn run(mut self) {
        let job_id = self.ctx.job_id().clone();
        let total = self.ctx.tree().len();
        let limit = self.config.max_in_flight_operations.unwrap_or(usize::MAX).max(1);

        let mut remaining = self.ctx.upstream_counts();
        let mut ready: VecDeque<PhaseId> = self.ctx.find_leafs().into();
        let mut in_flight: JoinSet<Completion> = JoinSet::new();
        let mut running: HashMap<PhaseId, NodeId> = HashMap::new();
        let mut completed = 0usize;
        let mut row_count = 0u64;
        let mut consumer_closed = self.consumer.closed();

        debug!(
            "job {job_id}: {total} operations on {} nodes, {} leafs",
            self.ctx.tree().nodes().len(),
            ready.len()
        );

        let stop = loop {
            let cancel_requested = *self.cancel.borrow();
            if cancel_requested || self.consumer.is_closed() {
                break Stop::Cancelled;
            }

            while running.len() < limit {
                let Some(phase_id) = ready.pop_front() else { break };
                let Some(op) = self.ctx.operation(phase_id).cloned() else { continue };
                debug!("job {job_id}: dispatching {op}");
                running.insert(phase_id, op.node.clone());
                let submitter = Arc::clone(&self.submitter);
                let job = job_id.clone();
                in_flight.spawn(async move {
                    let result = submitter.submit(&job, &op).await;
                    (op.phase_id, result)
                });
            }

            if in_flight.is_empty() {
                break Stop::Drained;
            }

            let joined = tokio::select! {
                biased;
                _ = cancelled(&mut self.cancel) => break Stop::Cancelled,
                _ = &mut consumer_closed => break Stop::Cancelled,
                joined = in_flight.join_next() => joined,
            };

            let (phase_id, result) = match joined {
                Some(Ok(completion)) => completion,
                Some(Err(e)) => {
                    break Stop::Failed(TesseraError::internal(format!(
                        "operation task of job {job_id} failed: {e}"
                    )));
                }
                None => break Stop::Drained,
            };
            running.remove(&phase_id);
            if self.consumer.is_closed() {
                break Stop::Cancelled;
            }

            let result = match result {
                Ok(result) => result,
                Err(e) => {
                    warn!("job {job_id}: phase {phase_id} failed: {e}");
                    break Stop::Failed(e);
                }
            };
            completed += 1;

            let Some(op) = self.ctx.operation(phase_id) else { continue };
            if op.is_terminal() {
                for row in result.into_rows() {
                    self.consumer.accept(row);
                    row_count += 1;
                }
            } else {
                for target in &op.downstream {
                    if let Some(count) = remaining.get_mut(target) {
                        *count = count.saturating_sub(1);
                        if *count == 0 {
                            ready.push_back(*target);
                        }
                    }
                }
            }
        };
        drop(consumer_closed);

        let outcome = match stop {
            Stop::Drained if completed == total => {
                debug!("job {job_id}: finished with {row_count} rows");
                Ok(row_count)
            }
            Stop::Drained => Err(TesseraError::graph(format!(
                "job {job_id}: {} of {total} operations never became ready",
                total - completed
            ))),
            Stop::Failed(e) => {
                in_flight.abort_all();
                if self.config.cancel_in_flight_on_failure {
                    kill_running(self.submitter.as_ref(), &job_id, &running).await;
                }
                Err(e)
            }
            Stop::Cancelled => {
                debug!(
                    "job {job_id}: cancelled, discarding {} in-flight operations",
                    running.len()
                );
                in_flight.abort_all();
                if self.config.cancel_in_flight_on_failure {
                    kill_running(self.submitter.as_ref(), &job_id, &running).await;
                }
                Err(TesseraError::cancelled(format!("job {job_id} was cancelled")))
            }
        };

        self.consumer.complete(outcome);
    }
}

/// Ask every node with in-flight work to stop.
async fn kill_running(
    submitter: &dyn NodeOperationSubmitter,
    job_id: &JobId,
    running: &HashMap<PhaseId, NodeId>,
) {
    let nodes: BTreeSet<&NodeId> = running.values().collect();
    if nodes.is_empty() {
        return;
    }

    debug!("job {job_id}: killing operations on {} nodes", nodes.len());
    let kills = nodes
        .into_iter()
        .map(|node| async move { (node, submitter.kill(job_id, node).await) });
    for (node, result) in join_all(kills).await {
        if let Err(e) = result {
            warn!("job {job_id}: kill on node {node} failed: {e}");
        }
    }
}
