use log::debug;
use serde_json::{ Map, Value };

use crate::errors::{ FillerError, FillerResult };
use crate::models::common::{ ProofMode, UnitAddress };
use crate::models::definition::{ BlockSpec, FillerSpec };
use crate::models::fixture::{ Fixture, FixtureBlock, FixtureInfo };
use crate::models::tools::{ BlockRequest, TransitionRequest, TransitionResult };
use crate::traits::filler::Filler;
use crate::traits::tools::{ BlockBuilder, TransitionTool };

const FILLING_TOOL: &str = concat!("fixture-filler ", env!("CARGO_PKG_VERSION"));

/// Env keys accepted by t8n and the header field each one maps to
const ENV_TO_HEADER: &[(&str, &str)] = &[
    ("currentCoinbase", "miner"),
    ("currentNumber", "number"),
    ("currentGasLimit", "gasLimit"),
    ("currentTimestamp", "timestamp"),
    ("currentDifficulty", "difficulty"),
    ("currentBaseFee", "baseFeePerGas"),
    ("currentRandom", "mixHash"),
];

/// Result keys of t8n and the header field each one maps to
const RESULT_TO_HEADER: &[(&str, &str)] = &[
    ("stateRoot", "stateRoot"),
    ("txRoot", "transactionsRoot"),
    ("receiptsRoot", "receiptsRoot"),
    ("logsBloom", "logsBloom"),
    ("gasUsed", "gasUsed"),
    ("currentDifficulty", "difficulty"),
    ("currentBaseFee", "baseFeePerGas"),
];

const GENESIS_PARENT_HASH: &str =
    "0x0000000000000000000000000000000000000000000000000000000000000000";

/// Filler backed by a typed descriptor read from a module manifest
#[derive(Debug, Clone)]
pub struct SpecFiller {
    address: UnitAddress,
    spec: FillerSpec,
}

impl SpecFiller {
    pub fn new(address: UnitAddress, spec: FillerSpec) -> Self {
        Self { address, spec }
    }

    /// The block sequence this descriptor stands for, as (env, transactions) pairs
    fn blocks(&self) -> FillerResult<(Value, Vec<(Value, Vec<Value>)>)> {
        match &self.spec {
            FillerSpec::StateTest(spec) =>
                Ok((spec.pre.clone(), vec![(spec.env.clone(), spec.transactions.clone())])),
            FillerSpec::BlockchainTest(spec) => {
                if spec.blocks.is_empty() {
                    return Err(
                        FillerError::InvalidInput(
                            format!("{} declares a blockchain test without blocks", self.address)
                        )
                    );
                }
                let blocks = spec.blocks
                    .iter()
                    .map(|block: &BlockSpec| {
                        let env = merge_env(&spec.genesis, block.env.as_ref());
                        (env, block.transactions.clone())
                    })
                    .collect();
                Ok((spec.pre.clone(), blocks))
            }
        }
    }
}

impl Filler for SpecFiller {
    fn fill(
        &self,
        t8n: &dyn TransitionTool,
        b11r: &dyn BlockBuilder,
        proof_mode: ProofMode
    ) -> FillerResult<Fixture> {
        let fork = self.spec.fork().to_string();
        let (pre, blocks) = self.blocks()?;

        let mut alloc = pre.clone();
        let mut parent_hash = GENESIS_PARENT_HASH.to_string();
        let mut filled = Vec::with_capacity(blocks.len());
        let mut traces = Vec::new();

        for (index, (env, txs)) in blocks.into_iter().enumerate() {
            let request = TransitionRequest {
                fork: fork.clone(),
                alloc,
                txs,
                env: env.clone(),
            };
            let mut result = t8n.evaluate(&request)?;
            if !result.traces.is_empty() {
                debug!("{} block {}: {} trace entries", self.address, index, result.traces.len());
                traces.append(&mut result.traces);
            }

            let header = block_header(&env, &result, &parent_hash);
            let built = b11r.build(&BlockRequest {
                header,
                txs: result.body.clone().unwrap_or_else(|| "0xc0".to_string()),
                ommers: Vec::new(),
            })?;

            parent_hash = built.hash.clone();
            filled.push(FixtureBlock {
                rlp: built.rlp,
                block_hash: built.hash,
                state_root: result.result_field("stateRoot").cloned().unwrap_or(Value::Null),
            });
            alloc = result.alloc;
        }

        Ok(Fixture {
            info: FixtureInfo {
                filling_tool: FILLING_TOOL.to_string(),
                source: self.address.to_string(),
            },
            network: fork,
            seal_engine: proof_mode,
            pre,
            blocks: filled,
            lastblockhash: parent_hash,
            post_state: alloc,
            traces,
        })
    }
}

/// Overlay a block's env on top of the shared genesis env
fn merge_env(base: &Value, overrides: Option<&Value>) -> Value {
    let mut merged = match base {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    if let Some(Value::Object(extra)) = overrides {
        for (key, value) in extra {
            merged.insert(key.clone(), value.clone());
        }
    }
    Value::Object(merged)
}

/// Build the b11r header from the block env and the transition result
pub fn block_header(env: &Value, result: &TransitionResult, parent_hash: &str) -> Value {
    let mut header = Map::new();
    header.insert("parentHash".to_string(), Value::String(parent_hash.to_string()));
    for (env_key, header_key) in ENV_TO_HEADER {
        if let Some(value) = env.get(*env_key) {
            header.insert(header_key.to_string(), value.clone());
        }
    }
    // Values computed by t8n win over the ones requested in env
    for (result_key, header_key) in RESULT_TO_HEADER {
        if let Some(value) = result.result_field(result_key) {
            header.insert(header_key.to_string(), value.clone());
        }
    }
    Value::Object(header)
}
