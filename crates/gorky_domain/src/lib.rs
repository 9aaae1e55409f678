mod artifacts;
pub use artifacts::{ArtifactGroup, ArtifactRow, ArtifactVersion, GroupingError, build_groups};
mod timestamp;
pub use timestamp::parse_timestamp;
mod browser;
pub use browser::ArtifactBrowser;
pub mod render;
pub use render::{format_content, version_title};

mod actions;
pub use actions::Action;
mod effects;
pub use effects::Effect;

mod state;
pub use state::{DatabaseSummary, LoadId, LoadedDatabase, OpenDatabase, ViewerState};

mod reducer;

pub const DEFAULT_ARTIFACTS_TABLE: &str = "artifacts";
