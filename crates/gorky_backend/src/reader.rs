use crate::artifact_db::ArtifactDatabase;
use crate::env::optional_trimmed_from_env;
use crate::LoadError;
use anyhow::anyhow;
use gorky_domain::{DEFAULT_ARTIFACTS_TABLE, LoadedDatabase};
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::mpsc;

pub const ARTIFACTS_TABLE_ENV: &str = "GORKY_ARTIFACTS_TABLE";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReaderOptions {
    pub artifacts_table: String,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            artifacts_table: DEFAULT_ARTIFACTS_TABLE.to_owned(),
        }
    }
}

impl ReaderOptions {
    pub fn from_env() -> anyhow::Result<Self> {
        let mut out = Self::default();
        if let Some(table) = optional_trimmed_from_env(ARTIFACTS_TABLE_ENV)? {
            if !is_plain_identifier(&table) {
                return Err(anyhow!(
                    "{ARTIFACTS_TABLE_ENV} must be a plain table name, got {table:?}"
                ));
            }
            out.artifacts_table = table;
        }
        Ok(out)
    }
}

fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

type LoadReply = mpsc::Sender<Result<LoadedDatabase, LoadError>>;

enum ReaderCommand {
    LoadDatabase { path: PathBuf, reply: LoadReply },
}

/// Handle to the thread that owns every SQLite connection.
#[derive(Clone)]
pub struct ArtifactReader {
    tx: mpsc::Sender<ReaderCommand>,
}

impl ArtifactReader {
    pub fn new_with_options(options: ReaderOptions) -> Result<Self, LoadError> {
        let (tx, rx) = mpsc::channel::<ReaderCommand>();

        std::thread::Builder::new()
            .name("gorky-sqlite".to_owned())
            .spawn(move || {
                let engine = check_engine();
                match &engine {
                    Ok(version) => tracing::debug!(%version, "sqlite engine ready"),
                    Err(message) => tracing::warn!(%message, "sqlite engine failed to initialize"),
                }
                while let Ok(cmd) = rx.recv() {
                    match (&engine, cmd) {
                        (Ok(_), ReaderCommand::LoadDatabase { path, reply }) => {
                            let _ = reply.send(load(&path, &options.artifacts_table));
                        }
                        (Err(message), ReaderCommand::LoadDatabase { reply, .. }) => {
                            let _ = reply.send(Err(LoadError::EngineInit {
                                message: message.clone(),
                            }));
                        }
                    }
                }
            })
            .map_err(|err| LoadError::EngineInit {
                message: format!("failed to spawn sqlite worker thread: {err}"),
            })?;

        Ok(Self { tx })
    }

    /// Sends the load to the worker and returns the channel its result arrives on.
    pub fn request_load(
        &self,
        path: PathBuf,
    ) -> Result<mpsc::Receiver<Result<LoadedDatabase, LoadError>>, LoadError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx
            .send(ReaderCommand::LoadDatabase {
                path,
                reply: reply_tx,
            })
            .map_err(|_| LoadError::EngineInit {
                message: "sqlite worker is not running".to_owned(),
            })?;
        Ok(reply_rx)
    }

    pub fn load_database(&self, path: PathBuf) -> Result<LoadedDatabase, LoadError> {
        let reply = self.request_load(path)?;
        reply.recv().map_err(|_| LoadError::EngineInit {
            message: "sqlite worker terminated".to_owned(),
        })?
    }
}

fn check_engine() -> Result<String, String> {
    let conn = Connection::open_in_memory().map_err(|err| err.to_string())?;
    conn.query_row("SELECT sqlite_version()", [], |row| row.get::<_, String>(0))
        .map_err(|err| err.to_string())
}

fn load(path: &std::path::Path, table: &str) -> Result<LoadedDatabase, LoadError> {
    tracing::info!(path = %path.display(), table, "loading artifact database");
    let result = ArtifactDatabase::open(path).and_then(|db| db.load(table));
    match &result {
        Ok(loaded) => tracing::info!(
            path = %path.display(),
            groups = loaded.groups.len(),
            artifacts = loaded.summary.artifact_count,
            "artifact database loaded"
        ),
        Err(err) => tracing::warn!(path = %path.display(), error = %err, "artifact database load failed"),
    }
    result
}
