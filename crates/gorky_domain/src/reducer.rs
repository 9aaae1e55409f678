use crate::{
    Action, ArtifactBrowser, Effect, LoadId, LoadedDatabase, OpenDatabase, ViewerState,
};
use std::path::PathBuf;

impl ViewerState {
    pub fn new() -> Self {
        Self {
            next_load_id: 1,
            database: None,
            pending_load: None,
            last_error: None,
        }
    }

    pub fn apply(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::LoadFile { path } => self.start_load(path),
            Action::DatabaseLoaded { load_id, database } => {
                if !self.is_pending(load_id) {
                    return Vec::new();
                }
                self.pending_load = None;
                self.last_error = None;
                self.replace_database(*database);
                Vec::new()
            }
            Action::DatabaseLoadFailed { load_id, message } => {
                if !self.is_pending(load_id) {
                    return Vec::new();
                }
                self.pending_load = None;
                self.last_error = Some(message.clone());
                vec![Effect::ReportError { message }]
            }

            Action::SelectGroup { step } => {
                if let Some(db) = self.database.as_mut() {
                    db.browser.select_group(&step);
                }
                Vec::new()
            }
            Action::SelectVersion { step, index } => {
                if let Some(db) = self.database.as_mut() {
                    db.browser.select_version(&step, index);
                }
                Vec::new()
            }

            Action::ErrorDismissed => {
                self.last_error = None;
                Vec::new()
            }
        }
    }

    fn start_load(&mut self, path: PathBuf) -> Vec<Effect> {
        let load_id = LoadId(self.next_load_id);
        self.next_load_id += 1;
        self.pending_load = Some(load_id);
        vec![Effect::LoadDatabase { load_id, path }]
    }

    fn is_pending(&self, load_id: LoadId) -> bool {
        self.pending_load == Some(load_id)
    }

    fn replace_database(&mut self, loaded: LoadedDatabase) {
        let LoadedDatabase {
            path,
            summary,
            groups,
        } = loaded;
        self.database = Some(OpenDatabase {
            path,
            summary,
            browser: ArtifactBrowser::new(groups),
        });
    }
}
