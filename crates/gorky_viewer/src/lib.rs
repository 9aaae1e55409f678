mod commands;
mod config;
mod controller;
pub mod projection;
mod session;

pub use commands::{BrowseCommand, GroupRef, HELP, parse_command};
pub use config::{DB_PATH_ENV, DEFAULT_PREVIEW_CHARS, PREVIEW_CHARS_ENV, ViewerConfig};
pub use controller::Viewer;
pub use session::{open_database, print_json_file, run_browse};
