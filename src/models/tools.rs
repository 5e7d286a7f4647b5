use serde::{ Deserialize, Serialize };
use serde_json::Value;

/// Input for one state transition
#[derive(Debug, Clone, Serialize)]
pub struct TransitionRequest {
    #[serde(skip)]
    pub fork: String,
    pub alloc: Value,
    pub txs: Vec<Value>,
    pub env: Value,
}

/// Output of a state transition
#[derive(Debug, Clone, Deserialize)]
pub struct TransitionResult {
    pub alloc: Value,
    pub result: Value,
    /// RLP-encoded transaction list of the block body
    #[serde(default)]
    pub body: Option<String>,
    #[serde(skip)]
    pub traces: Vec<Value>,
}

impl TransitionResult {
    /// Read a string field of the transition result, e.g. `stateRoot`
    pub fn result_field(&self, key: &str) -> Option<&Value> {
        self.result.get(key)
    }
}

/// Input for assembling one block
#[derive(Debug, Clone, Serialize)]
pub struct BlockRequest {
    pub header: Value,
    pub txs: String,
    pub ommers: Vec<Value>,
}

/// An assembled block
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct BuiltBlock {
    pub rlp: String,
    pub hash: String,
}
