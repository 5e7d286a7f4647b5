use crate::errors::FillerResult;
use crate::models::common::ProofMode;
use crate::models::fixture::Fixture;
use crate::traits::tools::{ BlockBuilder, TransitionTool };

/// A unit of fixture generation.
///
/// Implementations are called concurrently from worker threads and must not
/// rely on any particular execution order between units.
pub trait Filler: Send + Sync {
    /// Produce the fixture for this unit using the shared tool handles
    fn fill(
        &self,
        t8n: &dyn TransitionTool,
        b11r: &dyn BlockBuilder,
        proof_mode: ProofMode
    ) -> FillerResult<Fixture>;
}
