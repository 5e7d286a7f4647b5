use chrono::{ DateTime, Utc };
use log::{ debug, info, warn };
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{ Duration, Instant };

use crate::config::FillOptions;
use crate::errors::{ FillerError, FillerResult };
use crate::implementations::evm::{ EvmBlockBuilder, EvmTransitionTool };
use crate::models::common::UnitAddress;
use crate::pipeline::dispatcher::{ Completion, Dispatcher, Job, ToolHandles };
use crate::pipeline::output::{ self, OutputResolver };
use crate::pipeline::registry::{ DiscoveryFilter, UnitRegistry };
use crate::pipeline::staleness::StalenessOracle;

/// A unit that did not produce a fixture
#[derive(Debug, Clone)]
pub struct UnitFailure {
    pub address: UnitAddress,
    pub message: String,
}

/// What happened during one filling run
#[derive(Debug, Clone)]
pub struct FillReport {
    pub started_at: DateTime<Utc>,
    pub discovered: usize,
    pub skipped: Vec<UnitAddress>,
    pub filled: Vec<(UnitAddress, PathBuf)>,
    pub failures: Vec<UnitFailure>,
    /// Wall clock from discovery to the last write, when benchmarking
    pub elapsed: Option<Duration>,
}

impl FillReport {
    fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            discovered: 0,
            skipped: Vec::new(),
            filled: Vec::new(),
            failures: Vec::new(),
            elapsed: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Drives discovery, staleness checks, execution and persistence for one run
pub struct FixtureFiller {
    options: FillOptions,
    tools: ToolHandles,
}

impl FixtureFiller {
    /// Build a filler whose tool handles run the configured `evm` binary
    pub fn new(options: FillOptions) -> Self {
        let binary = options.evm_bin.as_deref();
        let t8n = EvmTransitionTool::new(binary, options.traces);
        let b11r = EvmBlockBuilder::new(binary);
        info!("using evm binary {}", t8n.binary().display());
        let tools = ToolHandles::new(Arc::new(t8n), Arc::new(b11r));
        Self::with_tools(options, tools)
    }

    /// Build a filler around caller supplied tool handles
    pub fn with_tools(options: FillOptions, tools: ToolHandles) -> Self {
        Self { options, tools }
    }

    /// Fill all stale units.
    ///
    /// Discovery and output-root errors abort the run, as does any other
    /// run-fatal error. Failures of single units are collected in the report while every other unit is still
    /// filled and written.
    pub async fn fill(&self) -> FillerResult<FillReport> {
        let started = Instant::now();
        let mut report = FillReport::new(Utc::now());

        let registry = UnitRegistry::new(&self.options.filler_path, DiscoveryFilter {
            categories: self.options.test_categories.clone(),
            module: self.options.test_module.clone(),
            name: self.options.test_case.clone(),
        });
        let units = registry.discover()?;
        report.discovered = units.len();

        fs::create_dir_all(&self.options.output).map_err(|e|
            FillerError::io(&self.options.output, e)
        )?;

        let resolver = OutputResolver::new(&self.options.output, self.options.no_output_structure);
        let oracle = StalenessOracle::new(self.options.no_skip);
        let mut claimed: HashMap<PathBuf, UnitAddress> = HashMap::new();
        let mut jobs = Vec::new();

        for unit in units {
            let target = match resolver.resolve(unit.package_path(), unit.name()) {
                Ok(target) => target,
                Err(e) => {
                    report.failures.push(UnitFailure {
                        address: unit.address.clone(),
                        message: e.to_string(),
                    });
                    continue;
                }
            };
            let collision = if resolver.is_flat() {
                claimed.insert(target.clone(), unit.address.clone())
            } else {
                None
            };
            if let Some(previous) = collision {
                warn!(
                    "{} and {} both write {}; the last one to finish wins",
                    previous,
                    unit.address,
                    target.display()
                );
            }

            match oracle.should_skip(&target, &unit.source_location) {
                Ok(true) => {
                    debug!("skipping - {}", unit.address);
                    report.skipped.push(unit.address.clone());
                    continue;
                }
                Ok(false) => {}
                Err(e) if e.is_run_fatal() => return Err(e),
                Err(e) => {
                    warn!("{}", e);
                    report.failures.push(UnitFailure {
                        address: unit.address.clone(),
                        message: e.to_string(),
                    });
                    continue;
                }
            }
            jobs.push(Job { unit, target });
        }

        info!(
            "filling {} of {} fillers with {} workers",
            jobs.len(),
            report.discovered,
            self.options.worker_limit()
        );

        let dispatcher = Dispatcher::new(
            self.tools.clone(),
            self.options.proof_mode,
            self.options.worker_limit()
        );
        dispatcher.run(jobs, |completion| record(&mut report, completion)).await;

        if self.options.benchmark {
            let elapsed = started.elapsed();
            info!("Filled test fixtures in {:.2} seconds.", elapsed.as_secs_f64());
            report.elapsed = Some(elapsed);
        }
        Ok(report)
    }
}

/// Persist a completion and account for it in the report
fn record(report: &mut FillReport, completion: Completion) {
    let Completion { job, outcome } = completion;
    let written = outcome.and_then(|fixture|
        output::persist(job.unit.name(), &fixture, &job.target)
    );
    match written {
        Ok(()) => {
            debug!("filled - {} -> {}", job.unit.address, job.target.display());
            report.filled.push((job.unit.address, job.target));
        }
        Err(e) => {
            warn!("{}", e);
            report.failures.push(UnitFailure {
                address: job.unit.address,
                message: e.to_string(),
            });
        }
    }
}
