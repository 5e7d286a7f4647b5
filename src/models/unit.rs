use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::models::common::UnitAddress;
use crate::traits::filler::Filler;

/// A discovered, executable filler together with where it came from
#[derive(Clone)]
pub struct Unit {
    pub address: UnitAddress,
    /// Module file defining the unit; only its timestamp is used
    pub source_location: PathBuf,
    pub filler: Arc<dyn Filler>,
}

impl Unit {
    pub fn name(&self) -> &str {
        &self.address.name
    }

    pub fn package_path(&self) -> &[String] {
        &self.address.package_path
    }
}

impl fmt::Debug for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unit")
            .field("address", &self.address.to_string())
            .field("source_location", &self.source_location)
            .finish()
    }
}
