use gorky_domain::GroupingError;
use std::path::PathBuf;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("sqlite engine failed to initialize: {message}")]
    EngineInit { message: String },

    #[error("failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("query failed: {message}")]
    Query { message: String },

    #[error("invalid json in {}: {source}", path.display())]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    pub(crate) fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    pub(crate) fn file_read(path: impl Into<PathBuf>, source: impl Into<BoxError>) -> Self {
        Self::FileRead {
            path: path.into(),
            source: source.into(),
        }
    }
}

impl From<GroupingError> for LoadError {
    fn from(err: GroupingError) -> Self {
        Self::query(err.to_string())
    }
}
