use serde_json::{ json, Value };
use std::fs;
use std::path::{ Path, PathBuf };
use std::sync::atomic::{ AtomicUsize, Ordering };
use std::sync::Arc;
use std::time::{ Duration, SystemTime };

use crate::errors::{ FillerError, FillerResult };
use crate::models::common::{ ProofMode, UnitAddress };
use crate::models::fixture::{ Fixture, FixtureInfo };
use crate::models::tools::{ BlockRequest, BuiltBlock, TransitionRequest, TransitionResult };
use crate::models::unit::Unit;
use crate::pipeline::dispatcher::ToolHandles;
use crate::traits::filler::Filler;
use crate::traits::tools::{ BlockBuilder, TransitionTool };

/// t8n stand-in: bumps a `nonce` field on every account and echoes the env
#[derive(Default)]
pub struct MockTransitionTool {
    pub calls: AtomicUsize,
    /// Emit one trace entry per transaction
    pub trace: bool,
}

impl TransitionTool for MockTransitionTool {
    fn evaluate(&self, request: &TransitionRequest) -> FillerResult<TransitionResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut alloc = request.alloc.clone();
        if let Value::Object(accounts) = &mut alloc {
            for account in accounts.values_mut() {
                let nonce = account.get("nonce").and_then(Value::as_u64).unwrap_or(0);
                account["nonce"] = json!(nonce + (request.txs.len() as u64));
            }
        }
        Ok(TransitionResult {
            alloc,
            result: json!({
                "stateRoot": format!("0xroot{}", request.txs.len()),
                "txRoot": "0xtx",
                "receiptsRoot": "0xreceipts",
                "logsBloom": "0x00",
                "gasUsed": "0x5208",
            }),
            body: Some("0xc0".to_string()),
            traces: if self.trace {
                (0..request.txs.len()).map(|tx| json!({ "tx": tx, "op": "STOP", "pc": 0 })).collect()
            } else {
                Vec::new()
            },
        })
    }
}

/// b11r stand-in: the block hash is derived from number and parent
#[derive(Default)]
pub struct MockBlockBuilder {
    pub calls: AtomicUsize,
}

impl BlockBuilder for MockBlockBuilder {
    fn build(&self, request: &BlockRequest) -> FillerResult<BuiltBlock> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let number = request.header.get("number").cloned().unwrap_or(Value::Null);
        let parent = request.header["parentHash"].as_str().unwrap_or_default().to_string();
        Ok(BuiltBlock {
            rlp: format!("0xf9{}", number),
            hash: format!("0xblock{}-{}", number, parent.len()),
        })
    }
}

pub fn mock_tools() -> (Arc<MockTransitionTool>, Arc<MockBlockBuilder>, ToolHandles) {
    tools_around(MockTransitionTool::default())
}

/// Mock handles whose t8n also reports traces
pub fn tracing_mock_tools() -> (Arc<MockTransitionTool>, Arc<MockBlockBuilder>, ToolHandles) {
    tools_around(MockTransitionTool { trace: true, ..MockTransitionTool::default() })
}

fn tools_around(t8n: MockTransitionTool) -> (Arc<MockTransitionTool>, Arc<MockBlockBuilder>, ToolHandles) {
    let t8n = Arc::new(t8n);
    let b11r = Arc::new(MockBlockBuilder::default());
    let tools = ToolHandles::new(t8n.clone(), b11r.clone());
    (t8n, b11r, tools)
}

/// Filler driven by a closure, for dispatcher tests
pub struct FnFiller<F>(pub F);

impl<F> Filler for FnFiller<F> where F: Fn(ProofMode) -> FillerResult<Fixture> + Send + Sync {
    fn fill(
        &self,
        _t8n: &dyn TransitionTool,
        _b11r: &dyn BlockBuilder,
        proof_mode: ProofMode
    ) -> FillerResult<Fixture> {
        (self.0)(proof_mode)
    }
}

pub fn sample_fixture(source: &str, proof_mode: ProofMode) -> Fixture {
    Fixture {
        info: FixtureInfo {
            filling_tool: "fixture-filler test".to_string(),
            source: source.to_string(),
        },
        network: "Merge".to_string(),
        seal_engine: proof_mode,
        pre: json!({}),
        blocks: Vec::new(),
        lastblockhash: "0x00".to_string(),
        post_state: json!({}),
        traces: Vec::new(),
    }
}

pub fn fn_unit<F>(package: &[&str], name: &str, f: F) -> Unit
    where F: Fn(ProofMode) -> FillerResult<Fixture> + Send + Sync + 'static
{
    let address = UnitAddress::new(
        package
            .iter()
            .map(|s| s.to_string())
            .collect(),
        "module",
        name
    );
    Unit {
        address,
        source_location: PathBuf::from("module.yml"),
        filler: Arc::new(FnFiller(f)),
    }
}

pub fn failing(message: &str) -> FillerResult<Fixture> {
    Err(FillerError::ExternalToolError {
        tool: "t8n".to_string(),
        message: message.to_string(),
    })
}

/// A state test entry for a module file
pub fn state_test_entry(name: &str) -> String {
    format!(
        r#"{name}:
  filler:
    name: {name}
  state_test:
    fork: Merge
    env:
      currentCoinbase: "0x2adc25665018aa1fe0e6bc666dac8fc2697ff9ba"
      currentNumber: "0x01"
      currentGasLimit: "0x5f5e100"
      currentTimestamp: "0x3e8"
    pre:
      "0x0000000000000000000000000000000000000100":
        balance: "0x0ba1a9ce0ba1a9ce"
        nonce: 0
    transactions:
      - to: "0x0000000000000000000000000000000000000100"
        value: "0x01"
"#
    )
}

/// Write a module file below `root`, creating the package directories
pub fn write_module(root: &Path, package: &[&str], module: &str, content: &str) -> PathBuf {
    let dir = package.iter().fold(root.to_path_buf(), |dir, segment| dir.join(segment));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(format!("{}.yml", module));
    fs::write(&path, content).unwrap();
    path
}

pub fn set_mtime(path: &Path, time: SystemTime) {
    let file = fs::File::options().write(true).open(path).unwrap();
    file.set_modified(time).unwrap();
}

/// A fixed reference time, well clear of filesystem timestamp granularity
pub fn reference_time() -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
}

/// Every file below `root` with its content, keyed by relative path
pub fn snapshot(root: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                let content = fs::read(&path).unwrap();
                files.push((path.strip_prefix(root).unwrap().to_path_buf(), content));
            }
        }
    }
    files.sort();
    files
}
