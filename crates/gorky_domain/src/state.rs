use crate::{ArtifactBrowser, ArtifactGroup};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct LoadId(pub u64);

/// Header line facts shown above the artifact list.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct DatabaseSummary {
    pub file_name: String,
    pub size_bytes: u64,
    pub tables: Vec<String>,
    pub artifact_count: u64,
}

/// Everything the reader produces for one database file.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct LoadedDatabase {
    pub path: PathBuf,
    pub summary: DatabaseSummary,
    pub groups: Vec<ArtifactGroup>,
}

#[derive(Clone, Debug)]
pub struct OpenDatabase {
    pub path: PathBuf,
    pub summary: DatabaseSummary,
    pub browser: ArtifactBrowser,
}

#[derive(Clone, Debug)]
pub struct ViewerState {
    pub(crate) next_load_id: u64,
    pub database: Option<OpenDatabase>,
    /// The only load whose result will be accepted.
    pub pending_load: Option<LoadId>,
    /// Message of the last failed load, until it is dismissed.
    pub last_error: Option<String>,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewerState {
    pub fn browser(&self) -> Option<&ArtifactBrowser> {
        self.database.as_ref().map(|db| &db.browser)
    }

    pub fn is_loading(&self) -> bool {
        self.pending_load.is_some()
    }
}
