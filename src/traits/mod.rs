pub mod filler;
pub mod tools;

// Re-export traits
pub use filler::Filler;
pub use tools::{ BlockBuilder, TransitionTool };
