use serde::Serialize;
use serde_json::Value;

use crate::models::common::ProofMode;

/// The filled artifact produced by executing one unit.
///
/// Field order here is the field order on disk. Tool payloads are
/// `serde_json::Value`s whose maps serialize with sorted keys, so the
/// whole document is stable across runs.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Fixture {
    #[serde(rename = "_info")]
    pub info: FixtureInfo,
    pub network: String,
    #[serde(rename = "sealEngine")]
    pub seal_engine: ProofMode,
    pub pre: Value,
    pub blocks: Vec<FixtureBlock>,
    pub lastblockhash: String,
    #[serde(rename = "postState")]
    pub post_state: Value,
    /// Execution traces of every block, in block order. Kept out of the
    /// fixture document and written beside it.
    #[serde(skip)]
    pub traces: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FixtureInfo {
    #[serde(rename = "filling-tool")]
    pub filling_tool: String,
    pub source: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FixtureBlock {
    pub rlp: String,
    #[serde(rename = "blockHash")]
    pub block_hash: String,
    #[serde(rename = "stateRoot")]
    pub state_root: Value,
}
