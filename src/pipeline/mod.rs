pub mod dispatcher;
pub mod orchestrator;
pub mod output;
pub mod registry;
pub mod staleness;

pub use dispatcher::{ Completion, Dispatcher, Job, ToolHandles };
pub use orchestrator::{ FillReport, FixtureFiller, UnitFailure };
pub use output::{ persist, render_fixture, OutputResolver };
pub use registry::{ DiscoveryFilter, UnitRegistry };
pub use staleness::StalenessOracle;
