use log::{ debug, trace };
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::{ Path, PathBuf };
use std::process::{ Command, Stdio };

use crate::errors::{ FillerError, FillerResult };
use crate::models::tools::{ BlockRequest, BuiltBlock, TransitionRequest, TransitionResult };
use crate::traits::tools::{ BlockBuilder, TransitionTool };

/// Environment variable consulted when no binary is given explicitly
pub const EVM_BIN_ENV: &str = "EVM_BIN";

const DEFAULT_EVM_BIN: &str = "evm";

/// Resolve the `evm` executable: explicit path, then `EVM_BIN`, then `evm` on `PATH`
pub fn resolve_binary(binary: Option<&Path>) -> PathBuf {
    if let Some(binary) = binary {
        return binary.to_path_buf();
    }
    match std::env::var(EVM_BIN_ENV) {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_EVM_BIN),
    }
}

/// `t8n` subcommand of a geth-compatible `evm` binary.
///
/// The handle only holds configuration; every call spawns its own process,
/// so sharing one handle across worker threads needs no locking.
#[derive(Debug, Clone)]
pub struct EvmTransitionTool {
    binary: PathBuf,
    trace: bool,
}

impl EvmTransitionTool {
    pub fn new(binary: Option<&Path>, trace: bool) -> Self {
        Self {
            binary: resolve_binary(binary),
            trace,
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Arguments passed to the binary for one transition
    pub fn command_args(&self, fork: &str, trace_dir: Option<&Path>) -> Vec<String> {
        let mut args = vec![
            "t8n".to_string(),
            "--input.alloc=stdin".to_string(),
            "--input.txs=stdin".to_string(),
            "--input.env=stdin".to_string(),
            "--output.result=stdout".to_string(),
            "--output.alloc=stdout".to_string(),
            "--output.body=stdout".to_string(),
            format!("--state.fork={}", fork)
        ];
        if let Some(dir) = trace_dir {
            args.push("--trace".to_string());
            args.push(format!("--output.basedir={}", dir.display()));
        }
        args
    }
}

impl TransitionTool for EvmTransitionTool {
    fn evaluate(&self, request: &TransitionRequest) -> FillerResult<TransitionResult> {
        let trace_dir = if self.trace {
            Some(tempfile::tempdir().map_err(|e| tool_error(self.name(), e))?)
        } else {
            None
        };
        let args = self.command_args(
            &request.fork,
            trace_dir.as_ref().map(|dir| dir.path())
        );

        let stdout = run_tool(self.name(), &self.binary, &args, request)?;
        let mut result = parse_transition_output(&stdout)?;

        if let Some(dir) = trace_dir {
            result.traces = collect_traces(self.name(), dir.path())?;
            debug!("{} produced {} trace entries", self.name(), result.traces.len());
        }
        Ok(result)
    }
}

/// `b11r` subcommand of a geth-compatible `evm` binary
#[derive(Debug, Clone)]
pub struct EvmBlockBuilder {
    binary: PathBuf,
}

impl EvmBlockBuilder {
    pub fn new(binary: Option<&Path>) -> Self {
        Self { binary: resolve_binary(binary) }
    }

    pub fn command_args(&self) -> Vec<String> {
        vec![
            "b11r".to_string(),
            "--input.header=stdin".to_string(),
            "--input.txs=stdin".to_string(),
            "--input.ommers=stdin".to_string(),
            "--output.block=stdout".to_string()
        ]
    }
}

impl BlockBuilder for EvmBlockBuilder {
    fn build(&self, request: &BlockRequest) -> FillerResult<BuiltBlock> {
        let stdout = run_tool(self.name(), &self.binary, &self.command_args(), request)?;
        parse_block_output(&stdout)
    }
}

/// Parse the combined stdout document of `evm t8n`
pub fn parse_transition_output(stdout: &str) -> FillerResult<TransitionResult> {
    serde_json::from_str(stdout).map_err(|e| FillerError::ExternalToolError {
        tool: "t8n".to_string(),
        message: format!("unparseable output: {}", e),
    })
}

/// Parse the stdout document of `evm b11r`
pub fn parse_block_output(stdout: &str) -> FillerResult<BuiltBlock> {
    serde_json::from_str(stdout).map_err(|e| FillerError::ExternalToolError {
        tool: "b11r".to_string(),
        message: format!("unparseable output: {}", e),
    })
}

fn tool_error(tool: &str, err: impl std::fmt::Display) -> FillerError {
    FillerError::ExternalToolError {
        tool: tool.to_string(),
        message: err.to_string(),
    }
}

fn run_tool<T: Serialize>(
    tool: &str,
    binary: &Path,
    args: &[String],
    input: &T
) -> FillerResult<String> {
    let payload = serde_json::to_vec(input)?;
    trace!("{} {} {}", binary.display(), tool, args.join(" "));

    let mut child = Command::new(binary)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| tool_error(tool, format!("failed to start {}: {}", binary.display(), e)))?;

    if let Some(ref mut stdin) = child.stdin {
        stdin.write_all(&payload).map_err(|e| tool_error(tool, e))?;
    }
    drop(child.stdin.take());

    let output = child.wait_with_output().map_err(|e| tool_error(tool, e))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(tool_error(tool, format!("exited with {}: {}", output.status, stderr.trim())));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Read every `trace-*.jsonl` file below `dir`, in file name order
pub fn collect_traces(tool: &str, dir: &Path) -> FillerResult<Vec<Value>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| tool_error(tool, format!("unreadable trace dir {}: {}", dir.display(), e)))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.starts_with("trace-") && name.ends_with(".jsonl"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();

    let mut traces = Vec::new();
    for file in files {
        let content = fs::read_to_string(&file).map_err(|e| FillerError::io(&file, e))?;
        for line in content.lines().filter(|l| !l.trim().is_empty()) {
            let entry = serde_json
                ::from_str(line)
                .map_err(|e| tool_error(tool, format!("bad trace line in {}: {}", file.display(), e)))?;
            traces.push(entry);
        }
    }
    Ok(traces)
}
