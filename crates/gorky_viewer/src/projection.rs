//! Text projections of the viewer state. Nothing here is read back.

use gorky_domain::render::{content_preview, format_size_kb, version_label};
use gorky_domain::{
    ArtifactBrowser, ArtifactGroup, DatabaseSummary, OpenDatabase, ViewerState, format_content,
    version_title,
};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

pub fn render_summary(summary: &DatabaseSummary) -> String {
    format!(
        "File: {}\nSize: {}\nTables: {}\nArtifacts: {}\n",
        summary.file_name,
        format_size_kb(summary.size_bytes),
        summary.tables.join(", "),
        summary.artifact_count
    )
}

pub fn render_groups(browser: &ArtifactBrowser, preview_chars: usize) -> String {
    let mut out = String::new();
    if browser.groups().is_empty() {
        out.push_str("(no artifacts)\n");
        return out;
    }

    for (position, group) in browser.groups().iter().enumerate() {
        render_group_card(&mut out, browser, position + 1, group, preview_chars);
    }
    out
}

fn render_group_card(
    out: &mut String,
    browser: &ArtifactBrowser,
    position: usize,
    group: &ArtifactGroup,
    preview_chars: usize,
) {
    let marker = if browser.is_selected(&group.step) {
        '>'
    } else {
        ' '
    };
    let _ = writeln!(
        out,
        "{marker} [{position}] {} ({} {})  {}",
        group.step,
        group.version_count,
        if group.version_count == 1 {
            "version"
        } else {
            "versions"
        },
        group.first_created_at.format(gorky_domain::render::TITLE_TIMESTAMP_FORMAT)
    );

    let current = browser.current_version_index(&group.step);
    for version in &group.versions {
        let mark = if current == Some(version.index) {
            '*'
        } else {
            ' '
        };
        let label = version_label(version.index, version.created_at);
        match content_preview(&version.content, preview_chars) {
            Some(preview) => {
                let _ = writeln!(out, "    {mark} {label}  {preview}");
            }
            None => {
                let _ = writeln!(out, "    {mark} {label}");
            }
        }
    }
}

/// Title line and formatted body of the current version.
pub fn render_content(browser: &ArtifactBrowser) -> Option<String> {
    let (group, version) = browser.current()?;
    let title = version_title(&group.step, version.index, group.first_created_at);
    Some(format!(
        "== {title} ==\n{}\n",
        format_content(&version.content)
    ))
}

pub fn render_view(state: &ViewerState, preview_chars: usize) -> String {
    let Some(db) = state.database.as_ref() else {
        return "No database loaded.\n".to_owned();
    };
    render_database(db, preview_chars)
}

fn render_database(db: &OpenDatabase, preview_chars: usize) -> String {
    let mut out = render_summary(&db.summary);
    out.push('\n');
    out.push_str(&render_groups(&db.browser, preview_chars));
    if let Some(content) = render_content(&db.browser) {
        out.push('\n');
        out.push_str(&content);
    }
    out
}

#[derive(Clone, Debug, Serialize)]
pub struct SelectionSnapshot {
    pub step: String,
    pub version: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct ViewSnapshot<'a> {
    pub path: &'a Path,
    pub summary: &'a DatabaseSummary,
    pub groups: &'a [ArtifactGroup],
    pub selection: Option<SelectionSnapshot>,
}

pub fn view_snapshot(db: &OpenDatabase) -> ViewSnapshot<'_> {
    ViewSnapshot {
        path: &db.path,
        summary: &db.summary,
        groups: db.browser.groups(),
        selection: db
            .browser
            .current()
            .map(|(group, version)| SelectionSnapshot {
                step: group.step.clone(),
                version: version.index,
            }),
    }
}
