use crate::{LoadId, LoadedDatabase};
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub enum Action {
    LoadFile {
        path: PathBuf,
    },
    DatabaseLoaded {
        load_id: LoadId,
        database: Box<LoadedDatabase>,
    },
    DatabaseLoadFailed {
        load_id: LoadId,
        message: String,
    },

    SelectGroup {
        step: String,
    },
    SelectVersion {
        step: String,
        index: u32,
    },

    ErrorDismissed,
}
