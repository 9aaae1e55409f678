use std::path::PathBuf;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GroupRef {
    /// 1-based position in the displayed list, written `#2`.
    Position(usize),
    Step(String),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BrowseCommand {
    Open(PathBuf),
    Groups,
    Group(GroupRef),
    Version { group: Option<GroupRef>, index: u32 },
    Show,
    Json(PathBuf),
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  open <path>              load an artifact database
  groups                   list artifact groups
  group <step|#n>          select a group
  version [<step|#n>] <n>  select a version (of the selected group by default)
  show                     print the current version
  json <path>              pretty-print a json file
  help                     show this help
  quit                     leave
";

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<BrowseCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb {
        "open" | "load" => BrowseCommand::Open(required_path(verb, rest)?),
        "groups" | "ls" | "list" => BrowseCommand::Groups,
        "group" | "g" => {
            if rest.is_empty() {
                return Err("usage: group <step|#n>".to_owned());
            }
            BrowseCommand::Group(parse_group_ref(rest)?)
        }
        "version" | "v" => parse_version(rest)?,
        "show" | "cat" => BrowseCommand::Show,
        "json" => BrowseCommand::Json(required_path(verb, rest)?),
        "help" | "?" => BrowseCommand::Help,
        "quit" | "exit" | "q" => BrowseCommand::Quit,
        other => return Err(format!("unknown command: {other} (try `help`)")),
    };
    Ok(Some(command))
}

fn required_path(verb: &str, rest: &str) -> Result<PathBuf, String> {
    if rest.is_empty() {
        return Err(format!("usage: {verb} <path>"));
    }
    Ok(PathBuf::from(rest))
}

fn parse_group_ref(raw: &str) -> Result<GroupRef, String> {
    match raw.strip_prefix('#') {
        Some(number) => match number.parse::<usize>() {
            Ok(position) if position > 0 => Ok(GroupRef::Position(position)),
            _ => Err(format!("invalid group position: {raw}")),
        },
        None => Ok(GroupRef::Step(raw.to_owned())),
    }
}

fn parse_version(rest: &str) -> Result<BrowseCommand, String> {
    const USAGE: &str = "usage: version [<step|#n>] <n>";
    let (group, index) = match rest.rsplit_once(char::is_whitespace) {
        Some((group, index)) => (Some(parse_group_ref(group.trim())?), index),
        None => (None, rest),
    };
    if index.is_empty() {
        return Err(USAGE.to_owned());
    }
    let index = index
        .trim_start_matches('v')
        .parse::<u32>()
        .map_err(|_| USAGE.to_owned())?;
    Ok(BrowseCommand::Version { group, index })
}
