use crate::ViewerConfig;
use crate::commands::GroupRef;
use anyhow::Context as _;
use gorky_backend::ArtifactReader;
use gorky_domain::{Action, Effect, ViewerState};
use std::collections::VecDeque;
use std::path::PathBuf;

/// Owns the viewer state and runs the effects its transitions ask for.
pub struct Viewer {
    state: ViewerState,
    reader: ArtifactReader,
    config: ViewerConfig,
}

impl Viewer {
    pub fn new(config: ViewerConfig) -> anyhow::Result<Self> {
        let reader = ArtifactReader::new_with_options(config.reader.clone())
            .context("failed to start artifact reader")?;
        Ok(Self {
            state: ViewerState::new(),
            reader,
            config,
        })
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Applies `action` and every follow-up it triggers. Returns the error
    /// messages that should be shown to the user.
    pub fn dispatch(&mut self, action: Action) -> Vec<String> {
        let mut reported = Vec::new();
        let mut queue = VecDeque::from([action]);

        while let Some(action) = queue.pop_front() {
            for effect in self.state.apply(action) {
                match effect {
                    Effect::LoadDatabase { load_id, path } => {
                        let next = match self.reader.load_database(path) {
                            Ok(database) => Action::DatabaseLoaded {
                                load_id,
                                database: Box::new(database),
                            },
                            Err(err) => Action::DatabaseLoadFailed {
                                load_id,
                                message: format!("failed to load database: {err}"),
                            },
                        };
                        queue.push_back(next);
                    }
                    Effect::ReportError { message } => {
                        tracing::warn!(%message, "reported to user");
                        reported.push(message);
                    }
                }
            }
        }

        reported
    }

    pub fn open(&mut self, path: PathBuf) -> Vec<String> {
        self.dispatch(Action::LoadFile { path })
    }

    /// Hands out the last load error once, dismissing it.
    pub fn take_error(&mut self) -> Option<String> {
        let message = self.state.last_error.clone()?;
        self.dispatch(Action::ErrorDismissed);
        Some(message)
    }

    /// Resolves a group reference against the displayed list.
    pub fn resolve_group(&self, group: &GroupRef) -> Option<String> {
        let browser = self.state.browser()?;
        match group {
            GroupRef::Position(position) => browser
                .groups()
                .get(position.checked_sub(1)?)
                .map(|g| g.step.clone()),
            GroupRef::Step(step) => browser.group(step).map(|g| g.step.clone()),
        }
    }

    pub fn select_group(&mut self, group: &GroupRef) -> Result<(), String> {
        let step = self.resolve_group(group).ok_or_else(|| missing_group(group))?;
        self.dispatch(Action::SelectGroup { step });
        Ok(())
    }

    /// Selects version `index` of `group`, or of the selected group when `group` is `None`.
    pub fn select_version(&mut self, group: Option<&GroupRef>, index: u32) -> Result<(), String> {
        let step = match group {
            Some(group) => self.resolve_group(group).ok_or_else(|| missing_group(group))?,
            None => self
                .state
                .browser()
                .and_then(|b| b.selected_group())
                .map(|g| g.step.clone())
                .ok_or_else(|| "no group selected".to_owned())?,
        };

        let exists = self
            .state
            .browser()
            .and_then(|b| b.group(&step))
            .is_some_and(|g| g.version(index).is_some());
        if !exists {
            return Err(format!("{step} has no version v{index}"));
        }

        self.dispatch(Action::SelectVersion { step, index });
        Ok(())
    }
}

fn missing_group(group: &GroupRef) -> String {
    match group {
        GroupRef::Position(position) => format!("no group #{position}"),
        GroupRef::Step(step) => format!("no group named {step:?}"),
    }
}
