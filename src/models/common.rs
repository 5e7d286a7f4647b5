use serde::{ Deserialize, Serialize };
use std::fmt;

/// Proof mode label handed through to every unit execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ProofMode {
    #[default]
    NoProof,
}

impl fmt::Display for ProofMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProofMode::NoProof => write!(f, "NoProof"),
        }
    }
}

/// Fully-qualified logical address of a unit: package path, module and unit name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitAddress {
    pub package_path: Vec<String>,
    pub module: String,
    pub name: String,
}

impl UnitAddress {
    pub fn new(package_path: Vec<String>, module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package_path,
            module: module.into(),
            name: name.into(),
        }
    }

    /// Dotted package name, e.g. `vm.vm_tests`
    pub fn package(&self) -> String {
        self.package_path.join(".")
    }
}

impl fmt::Display for UnitAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.package_path {
            write!(f, "{}.", segment)?;
        }
        write!(f, "{}.{}", self.module, self.name)
    }
}
