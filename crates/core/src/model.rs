use serde::{Deserialize, Serialize};

use crate::config::InstallMode;
use crate::selection::SelectionCriteria;

pub const MANIFEST_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct DataFileGroup {
    /// Install directory relative to the prefix, e.g. `share/man/man1`.
    pub dir: String,
    /// Source paths relative to the project root.
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    pub manifest_version: String,
    pub generated_at: String,
    pub root: String,
    pub mode: InstallMode,
    pub selection: SelectionCriteria,
    pub packages: Vec<String>,
    pub scripts: Vec<String>,
    pub data_files: Vec<DataFileGroup>,
    /// Exclude patterns the walks were built with; backends honor them too.
    #[serde(default)]
    pub excludes: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl Manifest {
    pub fn data_file_count(&self) -> usize {
        self.data_files.iter().map(|group| group.files.len()).sum()
    }

    pub fn group(&self, dir: &str) -> Option<&DataFileGroup> {
        self.data_files.iter().find(|group| group.dir == dir)
    }
}
