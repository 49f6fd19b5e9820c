//! Directory layout conventions of a simulation case.

use std::path::{Component, Path, PathBuf};

/// Position of the case directory, counted from the end of a data file path.
const SPECIFIC_CASE_DEPTH: usize = 6;
/// Position of the parent case directory, counted the same way.
const PARENT_CASE_DEPTH: usize = 7;

/// A data file inside a case, together with the labels of the case it belongs to.
///
/// Labels come from fixed positions in the path, so data files are expected at
/// `<parent_case>/<specific_case>/<a>/<b>/<c>/<file>`. Paths at any other depth
/// give meaningless labels.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseFile {
    pub path: PathBuf,
    pub specific_case: String,
    pub parent_case: String,
}

impl CaseFile {
    /// Locate `file_name` next to `input`, which is any path inside the data directory.
    pub fn sibling<P: AsRef<Path>>(input: P, file_name: &str) -> Self {
        let input = input.as_ref();
        let path = input
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(file_name);

        let parts: Vec<Component> = path.components().collect();
        let label = |depth: usize| match parts.len().checked_sub(depth) {
            Some(idx) => parts[idx].as_os_str().to_string_lossy().into_owned(),
            None => {
                log::warn!("{path:?} is too shallow to hold a case label at depth {depth}");
                String::new()
            }
        };

        let specific_case = label(SPECIFIC_CASE_DEPTH);
        let parent_case = label(PARENT_CASE_DEPTH);

        Self {
            path,
            specific_case,
            parent_case,
        }
    }
}
