use serde::{ Deserialize, Serialize };
use serde_json::Value;

/// Metadata tag that marks a module entry as a filler
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FillerMetadata {
    /// Unit name; defaults to the entry key when absent
    #[serde(default)]
    pub name: Option<String>,
}

/// One filler entry of a module manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitDefinition {
    #[serde(default)]
    pub filler: Option<FillerMetadata>,
    #[serde(flatten)]
    pub spec: FillerSpec,
}

/// Typed descriptor of what a filler does when executed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillerSpec {
    StateTest(StateTestSpec),
    BlockchainTest(BlockchainTestSpec),
}

impl FillerSpec {
    pub fn fork(&self) -> &str {
        match self {
            FillerSpec::StateTest(spec) => &spec.fork,
            FillerSpec::BlockchainTest(spec) => &spec.fork,
        }
    }
}

fn default_fork() -> String {
    "Merge".to_string()
}

/// A single transition applied on top of a pre-state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTestSpec {
    #[serde(default = "default_fork")]
    pub fork: String,
    pub env: Value,
    pub pre: Value,
    #[serde(default)]
    pub transactions: Vec<Value>,
}

/// A chain of blocks, each one transitioning the state left by the previous
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockchainTestSpec {
    #[serde(default = "default_fork")]
    pub fork: String,
    /// Environment shared by every block, overridden per block
    pub genesis: Value,
    pub pre: Value,
    pub blocks: Vec<BlockSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockSpec {
    #[serde(default)]
    pub env: Option<Value>,
    #[serde(default)]
    pub transactions: Vec<Value>,
}
