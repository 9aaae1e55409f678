use crate::LoadId;
use std::path::PathBuf;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Effect {
    LoadDatabase { load_id: LoadId, path: PathBuf },
    ReportError { message: String },
}
