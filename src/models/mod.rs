pub mod common;
pub mod definition;
pub mod fixture;
pub mod tools;
pub mod unit;

// Re-export common model types
pub use common::{ ProofMode, UnitAddress };
pub use definition::{ BlockSpec, BlockchainTestSpec, FillerMetadata, FillerSpec, StateTestSpec, UnitDefinition };
pub use fixture::{ Fixture, FixtureBlock, FixtureInfo };
pub use tools::{ BlockRequest, BuiltBlock, TransitionRequest, TransitionResult };
pub use unit::Unit;
