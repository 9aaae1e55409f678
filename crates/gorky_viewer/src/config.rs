use anyhow::{Context as _, anyhow};
use gorky_backend::ReaderOptions;
use gorky_backend::env::{optional_trimmed_from_env, optional_trimmed_path_from_env};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "GORKY_DB_PATH";
pub const PREVIEW_CHARS_ENV: &str = "GORKY_PREVIEW_CHARS";
pub const DEFAULT_PREVIEW_CHARS: usize = 60;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ViewerConfig {
    pub reader: ReaderOptions,
    pub default_db: Option<PathBuf>,
    /// Characters of content shown next to each version; 0 hides previews.
    pub preview_chars: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            reader: ReaderOptions::default(),
            default_db: None,
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }
}

impl ViewerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let mut out = Self {
            reader: ReaderOptions::from_env().context("invalid reader options")?,
            ..Self::default()
        };

        out.default_db = optional_trimmed_path_from_env(DB_PATH_ENV)?;

        if let Some(raw) = optional_trimmed_from_env(PREVIEW_CHARS_ENV)? {
            out.preview_chars = raw
                .parse::<usize>()
                .map_err(|_| anyhow!("{PREVIEW_CHARS_ENV} must be a number, got {raw:?}"))?;
        }

        Ok(out)
    }
}
