use crate::LoadError;
use gorky_domain::{ArtifactGroup, ArtifactRow, DatabaseSummary, LoadedDatabase, build_groups};
use rusqlite::{Connection, ErrorCode, OpenFlags};
use std::path::{Path, PathBuf};

const CONCAT_SEPARATOR: &str = "|||";

/// One row of the per-step grouping query.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct StepSummary {
    pub step: String,
    /// Joined bodies. A body may itself contain the separator.
    pub contents: String,
    pub timestamps: Vec<String>,
    pub first_created: Option<String>,
    pub versions_count: u64,
}

pub(crate) struct ArtifactDatabase {
    conn: Connection,
    path: PathBuf,
    size_bytes: u64,
}

impl ArtifactDatabase {
    pub(crate) fn open(path: &Path) -> Result<Self, LoadError> {
        let metadata = std::fs::metadata(path).map_err(|err| LoadError::file_read(path, err))?;
        if !metadata.is_file() {
            return Err(LoadError::file_read(path, "not a regular file"));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|err| LoadError::file_read(path, err))?;

        // SQLite only inspects the header on first access.
        conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })
        .map_err(|err| {
            if is_not_a_database(&err) {
                LoadError::file_read(path, err)
            } else {
                LoadError::query(format!("failed to read sqlite schema: {err}"))
            }
        })?;

        Ok(Self {
            conn,
            path: path.to_path_buf(),
            size_bytes: metadata.len(),
        })
    }

    pub(crate) fn tables(&self) -> Result<Vec<String>, LoadError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .map_err(query_error("list tables"))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(query_error("list tables"))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(query_error("list tables"))
    }

    pub(crate) fn artifact_count(&self, table: &str) -> Result<u64, LoadError> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(table));
        let count = self
            .conn
            .query_row(&sql, [], |row| row.get::<_, i64>(0))
            .map_err(query_error("count artifacts"))?;
        Ok(count.max(0) as u64)
    }

    /// Rows in insertion order, which is what version numbers are based on.
    pub(crate) fn artifact_rows(&self, table: &str) -> Result<Vec<ArtifactRow>, LoadError> {
        let sql = format!(
            "SELECT step, content, created_at FROM {} ORDER BY rowid ASC",
            quote_identifier(table)
        );
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(query_error("read artifacts"))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ArtifactRow {
                    step: row.get(0)?,
                    content: row.get(1)?,
                    created_at: row.get(2)?,
                })
            })
            .map_err(query_error("read artifacts"))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(query_error("read artifacts"))
    }

    /// Steps are compared byte-for-byte, matching `build_groups`, even when
    /// the column declares another collation.
    pub(crate) fn step_summaries(&self, table: &str) -> Result<Vec<StepSummary>, LoadError> {
        let sql = format!(
            "SELECT
                step,
                GROUP_CONCAT(content, '{CONCAT_SEPARATOR}') AS contents,
                GROUP_CONCAT(created_at, '{CONCAT_SEPARATOR}') AS timestamps,
                MIN(created_at) AS first_created,
                COUNT(*) AS versions_count
             FROM {}
             GROUP BY step COLLATE BINARY
             ORDER BY first_created ASC",
            quote_identifier(table)
        );
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(query_error("group artifacts"))?;
        let rows = stmt
            .query_map([], |row| {
                let contents: Option<String> = row.get(1)?;
                let timestamps: Option<String> = row.get(2)?;
                Ok(StepSummary {
                    step: row.get(0)?,
                    contents: contents.unwrap_or_default(),
                    timestamps: timestamps
                        .map(|joined| {
                            joined
                                .split(CONCAT_SEPARATOR)
                                .map(str::to_owned)
                                .collect()
                        })
                        .unwrap_or_default(),
                    first_created: row.get(3)?,
                    versions_count: row.get::<_, i64>(4)?.max(0) as u64,
                })
            })
            .map_err(query_error("group artifacts"))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(query_error("group artifacts"))
    }

    pub(crate) fn load(&self, table: &str) -> Result<LoadedDatabase, LoadError> {
        let tables = self.tables()?;
        if !tables.iter().any(|name| name == table) {
            return Err(LoadError::query(format!(
                "no `{table}` table in {}",
                self.path.display()
            )));
        }

        let artifact_count = self.artifact_count(table)?;
        let rows = self.artifact_rows(table)?;
        tracing::debug!(rows = rows.len(), table, "read artifact rows");

        let groups = build_groups(rows)?;
        let summaries = self.step_summaries(table)?;
        check_summaries(&groups, &summaries)?;

        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string());

        Ok(LoadedDatabase {
            path: self.path.clone(),
            summary: DatabaseSummary {
                file_name,
                size_bytes: self.size_bytes,
                tables,
                artifact_count,
            },
            groups,
        })
    }
}

/// Loads and groups every artifact of the database at `path`.
pub fn load_database(path: &Path, table: &str) -> Result<LoadedDatabase, LoadError> {
    ArtifactDatabase::open(path)?.load(table)
}

fn check_summaries(groups: &[ArtifactGroup], summaries: &[StepSummary]) -> Result<(), LoadError> {
    if groups.len() != summaries.len() {
        return Err(LoadError::query(format!(
            "grouping query returned {} steps, expected {}",
            summaries.len(),
            groups.len()
        )));
    }

    for summary in summaries {
        if summary.versions_count == 0 {
            return Err(LoadError::query(format!(
                "no rows for step {:?}",
                summary.step
            )));
        }
        let Some(group) = groups.iter().find(|g| g.step == summary.step) else {
            return Err(LoadError::query(format!(
                "grouping query returned unknown step {:?}",
                summary.step
            )));
        };
        if group.version_count as u64 != summary.versions_count {
            return Err(LoadError::query(format!(
                "step {:?} has {} rows but the grouping query counted {}",
                summary.step, group.version_count, summary.versions_count
            )));
        }
        let content_parts = summary.contents.split(CONCAT_SEPARATOR).count() as u64;
        if content_parts < summary.versions_count {
            return Err(LoadError::query(format!(
                "step {:?} returned {content_parts} bodies for {} rows",
                summary.step, summary.versions_count
            )));
        }
        if summary.timestamps.len() as u64 != summary.versions_count {
            return Err(LoadError::query(format!(
                "step {:?} returned {} timestamps for {} rows",
                summary.step,
                summary.timestamps.len(),
                summary.versions_count
            )));
        }
        if summary.first_created.is_none() {
            return Err(LoadError::query(format!(
                "step {:?} has no first created_at",
                summary.step
            )));
        }
    }

    Ok(())
}

fn query_error(what: &'static str) -> impl Fn(rusqlite::Error) -> LoadError {
    move |err| LoadError::query(format!("failed to {what}: {err}"))
}

fn is_not_a_database(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _) if inner.code == ErrorCode::NotADatabase
    )
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_db_path(test_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let mut dir = std::env::temp_dir();
        dir.push("gorky-tests");
        let _ = std::fs::create_dir_all(&dir);
        dir.push(format!("{test_name}-{}-{nanos}.db", std::process::id()));
        dir
    }

    fn create_story_db(path: &Path, rows: &[(&str, &str, Option<&str>)]) {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(
            "CREATE TABLE artifacts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                step TEXT NOT NULL,
                content TEXT NOT NULL,
                version INTEGER NOT NULL DEFAULT 1,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );
            CREATE TABLE diffs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                artifact_id INTEGER,
                diff TEXT,
                version INTEGER NOT NULL DEFAULT 1,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );",
        )
        .unwrap();
        for (step, content, created_at) in rows {
            conn.execute(
                "INSERT INTO artifacts (step, content, created_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![step, content, created_at],
            )
            .unwrap();
        }
    }

    #[test]
    fn load_groups_story_artifacts() {
        let path = temp_db_path("load_groups_story_artifacts");
        create_story_db(
            &path,
            &[
                ("build", r#"{"x":1}"#, Some("2024-01-01 10:00:00")),
                ("build", "raw", Some("2024-01-01 12:00:00")),
                ("test", "{}", Some("2024-01-01 11:00:00")),
            ],
        );

        let loaded = load_database(&path, "artifacts").unwrap();
        assert_eq!(loaded.summary.tables, vec!["artifacts", "diffs", "sqlite_sequence"]);
        assert_eq!(loaded.summary.artifact_count, 3);
        assert!(loaded.summary.size_bytes > 0);
        assert!(loaded.summary.file_name.ends_with(".db"));

        let steps: Vec<&str> = loaded.groups.iter().map(|g| g.step.as_str()).collect();
        assert_eq!(steps, vec!["build", "test"]);
        let build = &loaded.groups[0];
        assert_eq!(build.version_count, 2);
        assert_eq!(build.versions[0].index, 2);
        assert_eq!(build.versions[0].content, "raw");
    }

    #[test]
    fn grouping_query_splits_timestamps() {
        let path = temp_db_path("grouping_query_splits_timestamps");
        create_story_db(
            &path,
            &[
                ("outline", "a", Some("2024-01-02 00:00:00")),
                ("brief", "b", Some("2024-01-01 00:00:00")),
                ("outline", "c", Some("2024-01-03 00:00:00")),
            ],
        );

        let db = ArtifactDatabase::open(&path).unwrap();
        let summaries = db.step_summaries("artifacts").unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].step, "brief");
        assert_eq!(summaries[1].step, "outline");
        assert_eq!(summaries[1].versions_count, 2);
        assert_eq!(summaries[1].timestamps.len(), 2);
        assert_eq!(summaries[1].contents, "a|||c");
        assert_eq!(
            summaries[1].first_created.as_deref(),
            Some("2024-01-02 00:00:00")
        );
    }

    #[test]
    fn empty_table_loads_without_groups() {
        let path = temp_db_path("empty_table_loads_without_groups");
        create_story_db(&path, &[]);

        let loaded = load_database(&path, "artifacts").unwrap();
        assert_eq!(loaded.summary.artifact_count, 0);
        assert!(loaded.groups.is_empty());
    }

    #[test]
    fn missing_table_is_a_query_failure() {
        let path = temp_db_path("missing_table_is_a_query_failure");
        create_story_db(&path, &[]);

        let err = load_database(&path, "nope").unwrap_err();
        assert!(matches!(err, LoadError::Query { .. }), "{err:?}");
    }

    #[test]
    fn null_timestamp_is_a_query_failure() {
        let path = temp_db_path("null_timestamp_is_a_query_failure");
        create_story_db(&path, &[("brief", "b", None)]);

        let err = load_database(&path, "artifacts").unwrap_err();
        match err {
            LoadError::Query { message } => assert!(message.contains("created_at"), "{message}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_database_file_is_a_read_failure() {
        let path = temp_db_path("non_database_file_is_a_read_failure");
        std::fs::write(&path, "this is not a sqlite database\n".repeat(64)).unwrap();

        let err = load_database(&path, "artifacts").unwrap_err();
        assert!(matches!(err, LoadError::FileRead { .. }), "{err:?}");
    }

    #[test]
    fn missing_file_is_a_read_failure() {
        let path = temp_db_path("missing_file_is_a_read_failure");
        let err = load_database(&path, "artifacts").unwrap_err();
        assert!(matches!(err, LoadError::FileRead { .. }), "{err:?}");
    }

    fn summary(step: &str, contents: &str, timestamps: &[&str]) -> StepSummary {
        StepSummary {
            step: step.to_owned(),
            contents: contents.to_owned(),
            timestamps: timestamps.iter().map(|ts| (*ts).to_owned()).collect(),
            first_created: timestamps.iter().min().map(|ts| (*ts).to_owned()),
            versions_count: timestamps.len() as u64,
        }
    }

    fn two_groups() -> Vec<ArtifactGroup> {
        build_groups(vec![
            ArtifactRow::new("brief", "b", "2024-01-01 00:00:00"),
            ArtifactRow::new("outline", "o1", "2024-01-02 00:00:00"),
            ArtifactRow::new("outline", "o2", "2024-01-03 00:00:00"),
        ])
        .unwrap()
    }

    fn matching_summaries() -> Vec<StepSummary> {
        vec![
            summary("brief", "b", &["2024-01-01 00:00:00"]),
            summary(
                "outline",
                "o1|||o2",
                &["2024-01-02 00:00:00", "2024-01-03 00:00:00"],
            ),
        ]
    }

    fn check_message(summaries: &[StepSummary]) -> String {
        match check_summaries(&two_groups(), summaries).unwrap_err() {
            LoadError::Query { message } => message,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn summaries_matching_groups_pass() {
        assert!(check_summaries(&two_groups(), &matching_summaries()).is_ok());
    }

    #[test]
    fn summary_step_count_mismatch_fails() {
        let mut summaries = matching_summaries();
        summaries.pop();
        assert!(check_message(&summaries).contains("returned 1 steps, expected 2"));
    }

    #[test]
    fn summary_with_unknown_step_fails() {
        let mut summaries = matching_summaries();
        summaries[0].step = "draft".to_owned();
        assert!(check_message(&summaries).contains("unknown step \"draft\""));
    }

    #[test]
    fn summary_without_rows_fails() {
        let mut summaries = matching_summaries();
        summaries[0].versions_count = 0;
        assert!(check_message(&summaries).contains("no rows for step \"brief\""));
    }

    #[test]
    fn summary_count_mismatch_fails() {
        let mut summaries = matching_summaries();
        summaries[1] = summary(
            "outline",
            "o1|||o2|||o3",
            &["2024-01-02 00:00:00", "2024-01-03 00:00:00", "2024-01-04 00:00:00"],
        );
        assert!(check_message(&summaries).contains("has 2 rows but the grouping query counted 3"));
    }

    #[test]
    fn summary_with_too_few_bodies_fails() {
        let mut summaries = matching_summaries();
        summaries[1].contents = "o1".to_owned();
        assert!(check_message(&summaries).contains("returned 1 bodies for 2 rows"));
    }

    #[test]
    fn summary_timestamp_count_mismatch_fails() {
        let mut summaries = matching_summaries();
        summaries[1].timestamps.pop();
        assert!(check_message(&summaries).contains("returned 1 timestamps for 2 rows"));
    }

    #[test]
    fn summary_without_first_timestamp_fails() {
        let mut summaries = matching_summaries();
        summaries[0].first_created = None;
        assert!(check_message(&summaries).contains("no first created_at"));
    }

    #[test]
    fn separator_inside_content_still_loads() {
        let path = temp_db_path("separator_inside_content_still_loads");
        create_story_db(
            &path,
            &[
                ("brief", "x|||y", Some("2024-01-01 00:00:00")),
                ("brief", "z", Some("2024-01-01 01:00:00")),
            ],
        );

        let loaded = load_database(&path, "artifacts").unwrap();
        assert_eq!(loaded.groups.len(), 1);
        assert_eq!(loaded.groups[0].version_count, 2);
        assert_eq!(
            loaded.groups[0].version(1).map(|v| v.content.as_str()),
            Some("x|||y")
        );
    }

    #[test]
    fn nocase_step_column_groups_like_build_groups() {
        let path = temp_db_path("nocase_step_column_groups_like_build_groups");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE artifacts (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    step TEXT COLLATE NOCASE NOT NULL,
                    content TEXT NOT NULL,
                    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
                );
                INSERT INTO artifacts (step, content, created_at)
                    VALUES ('Brief', 'upper', '2024-01-01 00:00:00');
                INSERT INTO artifacts (step, content, created_at)
                    VALUES ('brief', 'lower', '2024-01-01 01:00:00');",
            )
            .unwrap();
        }

        let loaded = load_database(&path, "artifacts").unwrap();
        let steps: Vec<&str> = loaded.groups.iter().map(|g| g.step.as_str()).collect();
        assert_eq!(steps, vec!["Brief", "brief"]);
    }

    #[test]
    fn minute_precision_timestamps_load() {
        let path = temp_db_path("minute_precision_timestamps_load");
        create_story_db(&path, &[("brief", "b", Some("2024-01-01 10:00"))]);

        let loaded = load_database(&path, "artifacts").unwrap();
        assert_eq!(loaded.groups.len(), 1);
        assert_eq!(
            loaded.groups[0].first_created_at.to_string(),
            "2024-01-01 10:00:00"
        );
    }

    #[test]
    fn quote_identifier_escapes_quotes() {
        assert_eq!(quote_identifier("artifacts"), "\"artifacts\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }
}
