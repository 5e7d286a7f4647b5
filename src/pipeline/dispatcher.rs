use log::{ debug, error };
use std::collections::BTreeMap;
use std::panic::{ self, AssertUnwindSafe };
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::errors::{ FillerError, FillerResult };
use crate::models::common::ProofMode;
use crate::models::fixture::Fixture;
use crate::models::unit::Unit;
use crate::traits::tools::{ BlockBuilder, TransitionTool };

/// The two tool handles shared by every execution of a run
#[derive(Clone)]
pub struct ToolHandles {
    pub t8n: Arc<dyn TransitionTool>,
    pub b11r: Arc<dyn BlockBuilder>,
}

impl ToolHandles {
    pub fn new(t8n: Arc<dyn TransitionTool>, b11r: Arc<dyn BlockBuilder>) -> Self {
        Self { t8n, b11r }
    }
}

/// A unit scheduled for execution and the file its fixture goes to
#[derive(Debug, Clone)]
pub struct Job {
    pub unit: Unit,
    pub target: PathBuf,
}

/// A finished job. Failures already carry the unit's address.
#[derive(Debug)]
pub struct Completion {
    pub job: Job,
    pub outcome: FillerResult<Fixture>,
}

/// Runs jobs on a bounded pool of blocking workers
pub struct Dispatcher {
    tools: ToolHandles,
    proof_mode: ProofMode,
    worker_limit: usize,
}

impl Dispatcher {
    pub fn new(tools: ToolHandles, proof_mode: ProofMode, worker_limit: usize) -> Self {
        Self {
            tools,
            proof_mode,
            worker_limit: worker_limit.max(1),
        }
    }

    pub fn worker_limit(&self) -> usize {
        self.worker_limit
    }

    /// Execute every job and hand each completion to `on_complete` as it
    /// finishes.
    ///
    /// Jobs acquire a worker slot in submission order; completions arrive in
    /// whatever order the executions finish. A failing or panicking job never
    /// affects its siblings. Returns the number of completions delivered,
    /// which always equals the number of jobs.
    pub async fn run<F>(&self, jobs: Vec<Job>, mut on_complete: F) -> usize where F: FnMut(Completion) {
        let semaphore = Arc::new(Semaphore::new(self.worker_limit));
        let mut tasks: JoinSet<(usize, Completion)> = JoinSet::new();
        let mut pending: BTreeMap<usize, Job> = BTreeMap::new();
        let mut delivered = 0;

        for (index, job) in jobs.into_iter().enumerate() {
            // Drain finished work while waiting for a free worker
            let permit = loop {
                tokio::select! {
                    biased;
                    Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                        delivered += deliver(joined, &mut pending, &mut on_complete);
                    }
                    permit = semaphore.clone().acquire_owned() => break permit,
                }
            };
            let permit = match permit {
                Ok(permit) => permit,
                Err(e) => {
                    on_complete(failed(job, e.to_string()));
                    delivered += 1;
                    continue;
                }
            };

            debug!("submitting {}", job.unit.address);
            pending.insert(index, job.clone());
            let tools = self.tools.clone();
            let proof_mode = self.proof_mode;

            tasks.spawn(async move {
                let unit = job.unit.clone();
                let joined = tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    execute(&unit, &tools, proof_mode)
                }).await;
                let address = job.unit.address.to_string();
                let outcome = match joined {
                    Ok(outcome) => outcome.map_err(|e| e.for_unit(&address)),
                    Err(e) =>
                        Err(FillerError::ExecutionFailure {
                            address,
                            message: e.to_string(),
                        }),
                };
                (index, Completion { job, outcome })
            });
        }

        while let Some(joined) = tasks.join_next().await {
            delivered += deliver(joined, &mut pending, &mut on_complete);
        }

        // Only reachable if a task was torn down; report its unit rather than lose it
        for (_, job) in pending {
            on_complete(failed(job, "execution task was cancelled".to_string()));
            delivered += 1;
        }
        delivered
    }
}

fn deliver<F: FnMut(Completion)>(
    joined: Result<(usize, Completion), tokio::task::JoinError>,
    pending: &mut BTreeMap<usize, Job>,
    on_complete: &mut F
) -> usize {
    match joined {
        Ok((index, completion)) => {
            pending.remove(&index);
            on_complete(completion);
            1
        }
        Err(e) => {
            error!("dispatch task ended abnormally: {}", e);
            0
        }
    }
}

fn failed(job: Job, message: String) -> Completion {
    let address = job.unit.address.to_string();
    Completion {
        job,
        outcome: Err(FillerError::ExecutionFailure { address, message }),
    }
}

/// Run one unit, turning a panic into an ordinary failure
fn execute(unit: &Unit, tools: &ToolHandles, proof_mode: ProofMode) -> FillerResult<Fixture> {
    debug!("filling - {}", unit.address);
    let filled = panic::catch_unwind(
        AssertUnwindSafe(|| unit.filler.fill(tools.t8n.as_ref(), tools.b11r.as_ref(), proof_mode))
    );
    match filled {
        Ok(outcome) => outcome,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(FillerError::ExecutionFailure {
                address: unit.address.to_string(),
                message: format!("panicked: {}", message),
            })
        }
    }
}
