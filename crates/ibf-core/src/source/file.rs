use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::trace;

use super::{RecordSource, RecordWindow, SourceError};

/// Reads one record window per file, in the order the paths were given.
pub struct RecordFileSource {
    pending: VecDeque<PathBuf>,
}

impl RecordFileSource {
    /// Checks every path up front so a bad input fails before any decoding.
    pub fn open<P: AsRef<Path>>(paths: &[P]) -> Result<Self, SourceError> {
        let mut pending = VecDeque::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            let meta = fs::metadata(path).map_err(|source| SourceError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            if !meta.is_file() {
                return Err(SourceError::NotAFile {
                    path: path.to_path_buf(),
                });
            }
            pending.push_back(path.to_path_buf());
        }
        Ok(Self { pending })
    }
}

impl RecordSource for RecordFileSource {
    fn next_window(&mut self) -> Result<Option<RecordWindow>, SourceError> {
        let Some(path) = self.pending.pop_front() else {
            return Ok(None);
        };
        let data = fs::read(&path).map_err(|source| SourceError::Io {
            path: path.clone(),
            source,
        })?;
        trace!(path = %path.display(), len = data.len(), "read record window");
        Ok(Some(RecordWindow {
            label: path.display().to_string(),
            data,
        }))
    }
}
