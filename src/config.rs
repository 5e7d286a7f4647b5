use std::path::PathBuf;

use crate::models::common::ProofMode;

/// Run-wide options for one filling run
#[derive(Debug, Clone)]
pub struct FillOptions {
    /// Executable providing `t8n` and `b11r`; `None` lets the tool resolve it
    pub evm_bin: Option<PathBuf>,
    pub filler_path: PathBuf,
    pub output: PathBuf,
    pub test_categories: Option<Vec<String>>,
    pub test_module: Option<String>,
    pub test_case: Option<String>,
    pub traces: bool,
    /// Write every fixture directly under `output`
    pub no_output_structure: bool,
    pub benchmark: bool,
    /// `None` picks the available parallelism, `Some(1)` runs serially
    pub max_workers: Option<usize>,
    /// Fill every unit regardless of output timestamps
    pub no_skip: bool,
    pub proof_mode: ProofMode,
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            evm_bin: None,
            filler_path: PathBuf::from("fillers"),
            output: PathBuf::from("fixtures"),
            test_categories: None,
            test_module: None,
            test_case: None,
            traces: false,
            no_output_structure: false,
            benchmark: false,
            max_workers: None,
            no_skip: false,
            proof_mode: ProofMode::NoProof,
        }
    }
}

impl FillOptions {
    /// Number of concurrent workers for this run
    pub fn worker_limit(&self) -> usize {
        match self.max_workers {
            Some(n) if n > 0 => n,
            _ =>
                std::thread
                    ::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1),
        }
    }
}
