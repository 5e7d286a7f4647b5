use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

use crate::errors::{ FillerError, FillerResult };

/// Timestamp-only cache check: the output doubles as the cache entry
#[derive(Debug, Clone, Copy, Default)]
pub struct StalenessOracle {
    /// Never skip anything
    force: bool,
}

impl StalenessOracle {
    pub fn new(force: bool) -> Self {
        Self { force }
    }

    /// Whether filling `source` into `output` can be skipped.
    ///
    /// A missing output counts as modified at the beginning of time, so it
    /// is never skipped. A source modified at or before the output is.
    pub fn should_skip(&self, output: &Path, source: &Path) -> FillerResult<bool> {
        if self.force {
            return Ok(false);
        }
        let source_modified = modified(source)
            .map_err(|e| FillerError::io(source, e))?
            .ok_or_else(|| FillerError::DiscoveryError {
                path: source.to_path_buf(),
                message: "source of a discovered unit no longer exists".to_string(),
            })?;
        match modified(output).map_err(|e| FillerError::io(output, e))? {
            Some(output_modified) => Ok(source_modified <= output_modified),
            None => Ok(false),
        }
    }
}

fn modified(path: &Path) -> io::Result<Option<SystemTime>> {
    match fs::metadata(path) {
        Ok(metadata) => metadata.modified().map(Some),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
