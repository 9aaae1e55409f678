use crate::LoadError;
use std::path::Path;

/// Reads `path` as JSON and hands the parsed value to `on_load`.
///
/// The handler is not called when the file cannot be read or parsed.
pub fn load_json_file<F>(path: &Path, on_load: F) -> Result<(), LoadError>
where
    F: FnOnce(serde_json::Value),
{
    let text = std::fs::read_to_string(path).map_err(|err| LoadError::file_read(path, err))?;
    let value = serde_json::from_str(&text).map_err(|source| LoadError::InvalidJson {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "json file loaded");
    on_load(value);
    Ok(())
}
