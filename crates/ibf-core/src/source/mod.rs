mod file;
mod memory;

pub use file::RecordFileSource;
pub use memory::MemorySource;

use std::path::PathBuf;

use thiserror::Error;

/// Byte window holding exactly one log record.
#[derive(Debug, Clone)]
pub struct RecordWindow {
    /// Where the window came from (file path or caller-provided name).
    pub label: String,
    pub data: Vec<u8>,
}

/// Producer of record windows. Splitting a full device dump into windows is
/// the job of the implementor.
pub trait RecordSource {
    fn next_window(&mut self) -> Result<Option<RecordWindow>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("not a file: {}", .path.display())]
    NotAFile { path: PathBuf },
}
