use crate::Viewer;
use crate::commands::{BrowseCommand, HELP, parse_command};
use crate::projection::{render_content, render_groups, render_view};
use anyhow::Context as _;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// Reads commands from `input` until `quit` or end of input.
///
/// Views go to `out`; user-facing errors go to `err`.
pub fn run_browse(
    viewer: &mut Viewer,
    input: impl BufRead,
    mut out: impl Write,
    mut err: impl Write,
) -> anyhow::Result<()> {
    for line in input.lines() {
        let line = line.context("failed to read command")?;
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                writeln!(err, "error: {message}")?;
                continue;
            }
        };
        tracing::debug!(?command, "browse command");

        if command == BrowseCommand::Quit {
            break;
        }
        run_command(viewer, command, &mut out, &mut err)?;
        out.flush()?;
    }
    Ok(())
}

fn run_command(
    viewer: &mut Viewer,
    command: BrowseCommand,
    out: &mut impl Write,
    err: &mut impl Write,
) -> anyhow::Result<()> {
    let preview_chars = viewer.config().preview_chars;
    match command {
        BrowseCommand::Open(path) => open_database(viewer, path, out, err)?,
        BrowseCommand::Groups => match viewer.state().browser() {
            Some(browser) => write!(out, "{}", render_groups(browser, preview_chars))?,
            None => writeln!(err, "error: no database loaded")?,
        },
        BrowseCommand::Group(group) => match viewer.select_group(&group) {
            Ok(()) => show_current(viewer, out)?,
            Err(message) => writeln!(err, "error: {message}")?,
        },
        BrowseCommand::Version { group, index } => {
            match viewer.select_version(group.as_ref(), index) {
                Ok(()) => show_current(viewer, out)?,
                Err(message) => writeln!(err, "error: {message}")?,
            }
        }
        BrowseCommand::Show => show_current(viewer, out)?,
        BrowseCommand::Json(path) => {
            if let Err(message) = print_json_file(&path, &mut *out) {
                writeln!(err, "error: {message:#}")?;
            }
        }
        BrowseCommand::Help => write!(out, "{HELP}")?,
        BrowseCommand::Quit => {}
    }
    Ok(())
}

/// Loads `path` and prints the new view, or the load error.
///
/// A failed load leaves the previous database on screen.
pub fn open_database(
    viewer: &mut Viewer,
    path: PathBuf,
    out: &mut impl Write,
    err: &mut impl Write,
) -> anyhow::Result<()> {
    viewer.open(path);
    match viewer.take_error() {
        Some(message) => writeln!(err, "error: {message}")?,
        None => write!(
            out,
            "{}",
            render_view(viewer.state(), viewer.config().preview_chars)
        )?,
    }
    Ok(())
}

fn show_current(viewer: &Viewer, out: &mut impl Write) -> anyhow::Result<()> {
    match viewer.state().browser().and_then(render_content) {
        Some(content) => write!(out, "{content}")?,
        None => writeln!(out, "Nothing selected.")?,
    }
    Ok(())
}

/// Loads a JSON file and writes it back pretty-printed.
pub fn print_json_file(path: &Path, mut out: impl Write) -> anyhow::Result<()> {
    let mut rendered = None;
    gorky_backend::load_json_file(path, |value| {
        rendered = Some(serde_json::to_string_pretty(&value));
    })?;
    if let Some(rendered) = rendered {
        writeln!(out, "{}", rendered.context("failed to encode json")?)?;
    }
    Ok(())
}
