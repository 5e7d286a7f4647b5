use clap::Parser;
use std::path::PathBuf;

use fixture_filler::config::FillOptions;

pub mod ui;

#[derive(Parser, Debug)]
#[command(
    name = "fill",
    about = "Execute test fillers to create filled fixtures consumable by execution clients",
    version,
    author,
    long_about = None
)]
pub struct FillCli {
    /// Sets the log level (error, warn, info, debug, trace)
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Path to a YAML configuration file with default options
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Path to evm executable that provides `t8n` and `b11r` subcommands
    #[arg(long)]
    pub evm_bin: Option<PathBuf>,

    /// Path to filler directives, default: ./fillers
    #[arg(long)]
    pub filler_path: Option<PathBuf>,

    /// Directory to store filled test fixtures, default: ./fixtures
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Limit to filling tests of specific categories
    #[arg(long, num_args = 1..)]
    pub test_categories: Option<Vec<String>>,

    /// Limit to filling tests of a specific module
    #[arg(long)]
    pub test_module: Option<String>,

    /// Limit to filling only tests with matching name
    #[arg(long)]
    pub test_case: Option<String>,

    /// Collect traces of the execution information from the transition tool
    #[arg(long)]
    pub traces: bool,

    /// Removes the folder structure from test fixture output
    #[arg(long)]
    pub no_output_structure: bool,

    /// Logs the timing of the test filler for benchmarking
    #[arg(long)]
    pub benchmark: bool,

    /// Max number of workers for the test filler, set to 1 for serial execution
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_workers: Option<u64>,

    /// Fill all test fillers and don't skip any tests
    #[arg(long)]
    pub no_skip: bool,
}

impl FillCli {
    /// Override `options` with everything given on the command line
    pub fn apply(&self, options: &mut FillOptions) {
        if let Some(evm_bin) = &self.evm_bin {
            options.evm_bin = Some(evm_bin.clone());
        }
        if let Some(filler_path) = &self.filler_path {
            options.filler_path = filler_path.clone();
        }
        if let Some(output) = &self.output {
            options.output = output.clone();
        }
        if self.test_categories.is_some() {
            options.test_categories = self.test_categories.clone();
        }
        if self.test_module.is_some() {
            options.test_module = self.test_module.clone();
        }
        if self.test_case.is_some() {
            options.test_case = self.test_case.clone();
        }
        if let Some(max_workers) = self.max_workers {
            options.max_workers = Some(max_workers as usize);
        }
        options.traces |= self.traces;
        options.no_output_structure |= self.no_output_structure;
        options.benchmark |= self.benchmark;
        options.no_skip |= self.no_skip;
    }
}
