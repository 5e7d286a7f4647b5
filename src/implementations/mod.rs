pub mod config;
pub mod evm;
pub mod spec_filler;
