use crate::timestamp::parse_timestamp;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashMap;

/// One stored artifact, in the order the database returned it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ArtifactRow {
    pub step: String,
    pub content: String,
    pub created_at: Option<String>,
}

impl ArtifactRow {
    pub fn new(step: impl Into<String>, content: impl Into<String>, created_at: &str) -> Self {
        Self {
            step: step.into(),
            content: content.into(),
            created_at: Some(created_at.to_owned()),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ArtifactVersion {
    /// 1-based position of the row among its step's rows, in arrival order.
    pub index: u32,
    pub content: String,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ArtifactGroup {
    pub step: String,
    /// Newest first. Never empty.
    pub versions: Vec<ArtifactVersion>,
    pub first_created_at: NaiveDateTime,
    pub version_count: usize,
}

impl ArtifactGroup {
    pub fn latest(&self) -> Option<&ArtifactVersion> {
        self.versions.first()
    }

    pub fn version(&self, index: u32) -> Option<&ArtifactVersion> {
        self.versions.iter().find(|v| v.index == index)
    }

    pub fn versions_by_index(&self) -> Vec<&ArtifactVersion> {
        let mut out: Vec<&ArtifactVersion> = self.versions.iter().collect();
        out.sort_by_key(|v| v.index);
        out
    }
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum GroupingError {
    #[error("artifact #{position} (step {step:?}) has no created_at")]
    MissingTimestamp { step: String, position: usize },
    #[error("artifact #{position} (step {step:?}) has invalid created_at {value:?}")]
    InvalidTimestamp {
        step: String,
        position: usize,
        value: String,
    },
}

/// Groups rows by step.
///
/// Groups come out oldest first by their earliest row; versions inside a group
/// newest first. Both sorts are stable, so ties keep arrival order.
pub fn build_groups(
    rows: impl IntoIterator<Item = ArtifactRow>,
) -> Result<Vec<ArtifactGroup>, GroupingError> {
    let mut groups: Vec<ArtifactGroup> = Vec::new();
    let mut by_step: HashMap<String, usize> = HashMap::new();

    for (offset, row) in rows.into_iter().enumerate() {
        let position = offset + 1;
        let created_at = match row.created_at.as_deref() {
            None => {
                return Err(GroupingError::MissingTimestamp {
                    step: row.step,
                    position,
                });
            }
            Some(raw) => match parse_timestamp(raw) {
                Some(parsed) => parsed,
                None => {
                    return Err(GroupingError::InvalidTimestamp {
                        step: row.step,
                        position,
                        value: raw.to_owned(),
                    });
                }
            },
        };

        let slot = match by_step.get(&row.step) {
            Some(slot) => *slot,
            None => {
                by_step.insert(row.step.clone(), groups.len());
                groups.push(ArtifactGroup {
                    step: row.step.clone(),
                    versions: Vec::new(),
                    first_created_at: created_at,
                    version_count: 0,
                });
                groups.len() - 1
            }
        };

        let group = &mut groups[slot];
        group.version_count += 1;
        group.first_created_at = group.first_created_at.min(created_at);
        group.versions.push(ArtifactVersion {
            index: group.version_count as u32,
            content: row.content,
            created_at,
        });
    }

    for group in &mut groups {
        group
            .versions
            .sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }
    groups.sort_by_key(|group| group.first_created_at);

    Ok(groups)
}
