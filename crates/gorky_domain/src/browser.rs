use crate::{ArtifactGroup, ArtifactVersion};

/// Artifact groups of one loaded database plus the user's selection.
///
/// Every group remembers its own current version, so switching away from a
/// group and back restores the version that was being viewed.
#[derive(Clone, Debug)]
pub struct ArtifactBrowser {
    groups: Vec<ArtifactGroup>,
    selected_group: Option<usize>,
    current_versions: Vec<Option<u32>>,
}

impl ArtifactBrowser {
    /// Selects the first group and its newest version when there is one.
    pub fn new(groups: Vec<ArtifactGroup>) -> Self {
        let mut this = Self {
            current_versions: vec![None; groups.len()],
            groups,
            selected_group: None,
        };
        if let Some(latest) = this.groups.first().and_then(ArtifactGroup::latest) {
            this.current_versions[0] = Some(latest.index);
            this.selected_group = Some(0);
        }
        this
    }

    pub fn groups(&self) -> &[ArtifactGroup] {
        &self.groups
    }

    pub fn group(&self, step: &str) -> Option<&ArtifactGroup> {
        self.groups.iter().find(|g| g.step == step)
    }

    fn position(&self, step: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.step == step)
    }

    pub fn selected_group(&self) -> Option<&ArtifactGroup> {
        self.selected_group.map(|idx| &self.groups[idx])
    }

    pub fn is_selected(&self, step: &str) -> bool {
        self.selected_group().is_some_and(|g| g.step == step)
    }

    /// Version remembered for `step`, if the user has viewed that group.
    pub fn current_version_index(&self, step: &str) -> Option<u32> {
        self.position(step).and_then(|idx| self.current_versions[idx])
    }

    pub fn current(&self) -> Option<(&ArtifactGroup, &ArtifactVersion)> {
        let idx = self.selected_group?;
        let group = &self.groups[idx];
        let version = self.current_versions[idx].and_then(|index| group.version(index))?;
        Some((group, version))
    }

    pub fn select_group(&mut self, step: &str) -> bool {
        let Some(idx) = self.position(step) else {
            return false;
        };
        let remembered = self.current_versions[idx];
        let Some(index) = remembered.or_else(|| self.groups[idx].latest().map(|v| v.index)) else {
            return false;
        };
        self.current_versions[idx] = Some(index);
        self.selected_group = Some(idx);
        true
    }

    pub fn select_version(&mut self, step: &str, index: u32) -> bool {
        let Some(idx) = self.position(step) else {
            return false;
        };
        if self.groups[idx].version(index).is_none() {
            return false;
        }
        self.current_versions[idx] = Some(index);
        self.selected_group = Some(idx);
        true
    }
}
