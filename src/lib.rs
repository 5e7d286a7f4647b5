pub mod models;
pub mod traits;
pub mod errors;
pub mod config;
pub mod implementations;
pub mod pipeline;
#[cfg(test)]
mod tests;

// Re-export core components
pub use config::FillOptions;
pub use errors::{ FillerError, FillerResult };
pub use implementations::config::{ ConfigError, FillerConfig };
pub use implementations::evm::{ EvmBlockBuilder, EvmTransitionTool };
pub use implementations::spec_filler::SpecFiller;
pub use models::{
    common::{ ProofMode, UnitAddress },
    definition::{ FillerSpec, UnitDefinition },
    fixture::{ Fixture, FixtureBlock, FixtureInfo },
    unit::Unit,
};
pub use pipeline::{
    Dispatcher,
    DiscoveryFilter,
    FillReport,
    FixtureFiller,
    OutputResolver,
    StalenessOracle,
    ToolHandles,
    UnitRegistry,
};
pub use traits::{ BlockBuilder, Filler, TransitionTool };
