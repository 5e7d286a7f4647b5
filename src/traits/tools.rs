use crate::errors::FillerResult;
use crate::models::tools::{ BlockRequest, BuiltBlock, TransitionRequest, TransitionResult };

/// State-transition evaluator (`t8n`).
///
/// One handle is shared by every concurrently running unit, so
/// implementations must be safe to call from several threads at once.
pub trait TransitionTool: Send + Sync {
    /// Apply the transactions of `request` on top of its pre-state
    fn evaluate(&self, request: &TransitionRequest) -> FillerResult<TransitionResult>;

    /// Human readable tool name used in error messages
    fn name(&self) -> &str {
        "t8n"
    }
}

/// Block-assembly evaluator (`b11r`). Shared the same way as [`TransitionTool`].
pub trait BlockBuilder: Send + Sync {
    /// Assemble and seal a block from a header and an encoded body
    fn build(&self, request: &BlockRequest) -> FillerResult<BuiltBlock>;

    fn name(&self) -> &str {
        "b11r"
    }
}
