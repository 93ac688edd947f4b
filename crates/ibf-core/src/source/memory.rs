use std::collections::VecDeque;

use super::{RecordSource, RecordWindow, SourceError};

/// Record windows already resident in memory.
///
/// # Examples
/// ```
/// use ibf_core::{MemorySource, RecordSource, RecordWindow};
///
/// let mut source = MemorySource::new([RecordWindow {
///     label: "first".to_string(),
///     data: vec![0x03; 4],
/// }]);
/// assert_eq!(source.next_window().unwrap().unwrap().label, "first");
/// assert!(source.next_window().unwrap().is_none());
/// ```
#[derive(Debug, Default)]
pub struct MemorySource {
    windows: VecDeque<RecordWindow>,
}

impl MemorySource {
    pub fn new(windows: impl IntoIterator<Item = RecordWindow>) -> Self {
        Self {
            windows: windows.into_iter().collect(),
        }
    }

    /// Label each window with its position, starting at `#0`.
    pub fn from_buffers<B: Into<Vec<u8>>>(buffers: impl IntoIterator<Item = B>) -> Self {
        Self::new(
            buffers
                .into_iter()
                .enumerate()
                .map(|(idx, data)| RecordWindow {
                    label: format!("#{idx}"),
                    data: data.into(),
                }),
        )
    }
}

impl RecordSource for MemorySource {
    fn next_window(&mut self) -> Result<Option<RecordWindow>, SourceError> {
        Ok(self.windows.pop_front())
    }
}
