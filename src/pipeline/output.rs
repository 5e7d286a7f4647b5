use serde::Serialize;
use serde_json::ser::{ PrettyFormatter, Serializer };
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{ Path, PathBuf };

use crate::errors::{ FillerError, FillerResult };
use crate::models::fixture::Fixture;

const INDENT: &[u8] = b"    ";
const TRACES_EXTENSION: &str = "traces.jsonl";

/// Maps unit addresses to fixture files below an output root
#[derive(Debug, Clone)]
pub struct OutputResolver {
    root: PathBuf,
    flatten: bool,
}

impl OutputResolver {
    pub fn new(root: impl Into<PathBuf>, flatten: bool) -> Self {
        Self { root: root.into(), flatten }
    }

    pub fn is_flat(&self) -> bool {
        self.flatten
    }

    /// Path of the fixture file for a unit, without touching the filesystem
    pub fn target(&self, package_path: &[String], unit_name: &str) -> PathBuf {
        let dir = if self.flatten {
            self.root.clone()
        } else {
            package_path.iter().fold(self.root.clone(), |dir, segment| dir.join(segment))
        };
        dir.join(format!("{}.json", unit_name))
    }

    /// Path of the fixture file for a unit, creating its directory chain
    pub fn resolve(&self, package_path: &[String], unit_name: &str) -> FillerResult<PathBuf> {
        let path = self.target(package_path, unit_name);
        if let Some(dir) = path.parent() {
            // create_dir_all treats an existing directory as success
            fs::create_dir_all(dir).map_err(|e| FillerError::io(dir, e))?;
        }
        Ok(path)
    }
}

/// Serialize a fixture document: 4-space indent, sorted map keys, raw UTF-8
pub fn render_fixture(name: &str, fixture: &Fixture) -> FillerResult<Vec<u8>> {
    let mut document = BTreeMap::new();
    document.insert(name, fixture);

    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(INDENT));
    document.serialize(&mut serializer)?;
    Ok(buffer)
}

/// Where the traces of the fixture at `path` are written: `add.json` -> `add.traces.jsonl`
pub fn traces_path(path: &Path) -> PathBuf {
    path.with_extension(TRACES_EXTENSION)
}

/// One JSON document per line
pub fn render_traces(traces: &[Value]) -> FillerResult<Vec<u8>> {
    let mut buffer = Vec::new();
    for entry in traces {
        serde_json::to_writer(&mut buffer, entry)?;
        buffer.push(b'\n');
    }
    Ok(buffer)
}

/// Write the fixture of unit `name` to `path`, replacing any previous file.
///
/// Collected traces go to a `.traces.jsonl` file beside the fixture.
pub fn persist(name: &str, fixture: &Fixture, path: &Path) -> FillerResult<()> {
    let bytes = render_fixture(name, fixture)?;
    fs::write(path, bytes).map_err(|e| FillerError::io(path, e))?;

    if !fixture.traces.is_empty() {
        let traces = traces_path(path);
        fs::write(&traces, render_traces(&fixture.traces)?).map_err(|e| FillerError::io(&traces, e))?;
    }
    Ok(())
}
