//! Discovery of filler units below a root directory.
//!
//! Every non-hidden directory below the root is a package; every YAML file
//! inside a package is a module. Module entries that carry a `filler` key are
//! units, everything else in a module is ignored.

use log::{ debug, info };
use serde_yaml::{ Mapping, Value };
use std::collections::{ HashMap, HashSet };
use std::fs;
use std::path::{ Path, PathBuf };
use std::sync::Arc;

use crate::errors::{ FillerError, FillerResult };
use crate::implementations::spec_filler::SpecFiller;
use crate::models::common::UnitAddress;
use crate::models::definition::UnitDefinition;
use crate::models::unit::Unit;

const MODULE_EXTENSIONS: &[&str] = &["yml", "yaml"];
const FILLER_TAG: &str = "filler";

/// Predicates applied during discovery; `None` lets everything through
#[derive(Debug, Clone, Default)]
pub struct DiscoveryFilter {
    /// Dotted package patterns (`*` and `?` wildcards); a package matches
    /// when it or an ancestor matches one of them
    pub categories: Option<Vec<String>>,
    /// Substring of the module file stem
    pub module: Option<String>,
    /// Substring of the unit name
    pub name: Option<String>,
}

impl DiscoveryFilter {
    pub fn matches_package(&self, package_path: &[String]) -> bool {
        match &self.categories {
            None => true,
            Some(categories) =>
                (1..=package_path.len()).any(|depth| {
                    let prefix = package_path[..depth].join(".");
                    categories.iter().any(|c| glob_match(c, &prefix))
                }),
        }
    }

    pub fn matches_module(&self, module: &str) -> bool {
        self.module.as_deref().map_or(true, |m| module.contains(m))
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.name.as_deref().map_or(true, |n| name.contains(n))
    }
}

/// A module file and the package that owns it
#[derive(Debug, Clone)]
struct ModuleEntry {
    package_path: Vec<String>,
    name: String,
    path: PathBuf,
}

/// Walks a filler root and produces the units selected by a filter
#[derive(Debug, Clone)]
pub struct UnitRegistry {
    root: PathBuf,
    filter: DiscoveryFilter,
}

impl UnitRegistry {
    pub fn new(root: impl Into<PathBuf>, filter: DiscoveryFilter) -> Self {
        Self { root: root.into(), filter }
    }

    /// Discover all eligible units in discovery order.
    ///
    /// Every call walks the filesystem again.
    pub fn discover(&self) -> FillerResult<Vec<Unit>> {
        if !self.root.is_dir() {
            return Err(FillerError::DiscoveryError {
                path: self.root.clone(),
                message: "filler root is not a directory".to_string(),
            });
        }

        let mut scanned: HashSet<PathBuf> = HashSet::new();
        let mut seen: HashSet<UnitAddress> = HashSet::new();
        let mut names_in_package: HashMap<(Vec<String>, String), UnitAddress> = HashMap::new();
        let mut units = Vec::new();

        for package in self.find_packages()? {
            if !self.filter.matches_package(&package) {
                continue;
            }
            for module in self.modules_in(&package)? {
                if !scanned.insert(module.path.clone()) {
                    continue;
                }
                if !self.filter.matches_module(&module.name) {
                    continue;
                }
                debug!("searching {} for fillers", module.path.display());

                for unit in load_module(&module)? {
                    if !self.filter.matches_name(unit.name()) {
                        continue;
                    }
                    if !seen.insert(unit.address.clone()) {
                        continue;
                    }
                    let key = (unit.address.package_path.clone(), unit.address.name.clone());
                    if let Some(existing) = names_in_package.get(&key) {
                        return Err(FillerError::DuplicateUnit {
                            package: unit.address.package(),
                            address: format!("{} and {}", existing, unit.address),
                        });
                    }
                    names_in_package.insert(key, unit.address.clone());
                    units.push(unit);
                }
            }
        }

        info!("collected {} fillers", units.len());
        Ok(units)
    }

    /// Every package below the root, parents before children
    fn find_packages(&self) -> FillerResult<Vec<Vec<String>>> {
        let mut packages = Vec::new();
        let mut stack = vec![Vec::new()];
        while let Some(package) = stack.pop() {
            let dir = self.package_dir(&package);
            let mut children: Vec<Vec<String>> = sorted_entries(&dir)?
                .into_iter()
                .filter(|path| path.is_dir())
                .filter_map(|path| package_segment(&path))
                .map(|segment| {
                    let mut child = package.clone();
                    child.push(segment);
                    child
                })
                .collect();
            // Reverse so the stack pops children in name order
            children.reverse();
            if !package.is_empty() {
                packages.push(package);
            }
            stack.extend(children);
        }
        Ok(packages)
    }

    /// Modules of `package` and of all its sub-packages, depth-first
    fn modules_in(&self, package: &[String]) -> FillerResult<Vec<ModuleEntry>> {
        let mut modules = Vec::new();
        for path in sorted_entries(&self.package_dir(package))? {
            if path.is_dir() {
                if let Some(segment) = package_segment(&path) {
                    let mut child = package.to_vec();
                    child.push(segment);
                    modules.extend(self.modules_in(&child)?);
                }
            } else if let Some(name) = module_name(&path) {
                modules.push(ModuleEntry {
                    package_path: package.to_vec(),
                    name,
                    path,
                });
            }
        }
        Ok(modules)
    }

    fn package_dir(&self, package: &[String]) -> PathBuf {
        package.iter().fold(self.root.clone(), |dir, segment| dir.join(segment))
    }
}

fn sorted_entries(dir: &Path) -> FillerResult<Vec<PathBuf>> {
    let read = fs::read_dir(dir).map_err(|e| FillerError::DiscoveryError {
        path: dir.to_path_buf(),
        message: e.to_string(),
    })?;
    let mut entries = Vec::new();
    for entry in read {
        let entry = entry.map_err(|e| FillerError::DiscoveryError {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })?;
        entries.push(entry.path());
    }
    entries.sort();
    Ok(entries)
}

/// Directory name usable as a package segment; hidden directories are skipped
fn package_segment(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    if name.starts_with('.') || name.contains('.') {
        return None;
    }
    Some(name.to_string())
}

fn module_name(path: &Path) -> Option<String> {
    let extension = path.extension()?.to_str()?;
    if !MODULE_EXTENSIONS.contains(&extension) {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    if stem.starts_with('.') {
        return None;
    }
    Some(stem.to_string())
}

/// Shell-style match of a dotted package name; `*` and `?` also match dots
fn glob_match(pattern: &str, text: &str) -> bool {
    let pat: Vec<char> = pattern.chars().collect();
    let txt: Vec<char> = text.chars().collect();
    glob_match_from(&pat, &txt, 0, 0)
}

fn glob_match_from(pat: &[char], txt: &[char], mut pi: usize, mut ti: usize) -> bool {
    while pi < pat.len() {
        match pat[pi] {
            '*' => {
                while pi < pat.len() && pat[pi] == '*' {
                    pi += 1;
                }
                if pi == pat.len() {
                    return true;
                }
                return (ti..=txt.len()).any(|start| glob_match_from(pat, txt, pi, start));
            }
            '?' => {
                if ti >= txt.len() {
                    return false;
                }
            }
            c => {
                if ti >= txt.len() || txt[ti] != c {
                    return false;
                }
            }
        }
        pi += 1;
        ti += 1;
    }
    ti == txt.len()
}

/// A unit name becomes a file name, so it must stay inside its package directory
fn check_unit_name(name: &str, module: &ModuleEntry) -> FillerResult<()> {
    if name.trim().is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(FillerError::DiscoveryError {
            path: module.path.clone(),
            message: format!("invalid unit name {:?}", name),
        });
    }
    Ok(())
}

/// Parse a module file into its units, in the order they are declared
fn load_module(module: &ModuleEntry) -> FillerResult<Vec<Unit>> {
    let content = fs::read_to_string(&module.path).map_err(|e| FillerError::DiscoveryError {
        path: module.path.clone(),
        message: e.to_string(),
    })?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let document: Value = serde_yaml::from_str(&content).map_err(|source| FillerError::ManifestError {
        path: module.path.clone(),
        source,
    })?;
    let entries: Mapping = match document {
        Value::Mapping(entries) => entries,
        Value::Null => return Ok(Vec::new()),
        _ => {
            return Err(FillerError::DiscoveryError {
                path: module.path.clone(),
                message: "a filler module must be a mapping".to_string(),
            });
        }
    };

    let mut units = Vec::new();
    for (key, value) in entries {
        let Some(key) = key.as_str() else {
            continue;
        };
        if !carries_filler_tag(&value) {
            continue;
        }
        let definition: UnitDefinition = serde_yaml::from_value(value).map_err(|source| FillerError::ManifestError {
            path: module.path.clone(),
            source,
        })?;
        let name = definition.filler
            .and_then(|meta| meta.name)
            .unwrap_or_else(|| key.to_string());
        check_unit_name(&name, module)?;
        let address = UnitAddress::new(module.package_path.clone(), module.name.clone(), name);
        units.push(Unit {
            filler: Arc::new(SpecFiller::new(address.clone(), definition.spec)),
            address,
            source_location: module.path.clone(),
        });
    }
    Ok(units)
}

fn carries_filler_tag(value: &Value) -> bool {
    match value {
        Value::Mapping(map) => map.contains_key(FILLER_TAG),
        _ => false,
    }
}
