mod artifact_db;
pub mod env;
mod error;
mod json_file;
mod reader;

pub use artifact_db::load_database;
pub use error::{BoxError, LoadError};
pub use json_file::load_json_file;
pub use reader::{ARTIFACTS_TABLE_ENV, ArtifactReader, ReaderOptions};
