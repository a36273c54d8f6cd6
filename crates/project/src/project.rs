use crate::color::Color;
use crate::id::{IdGenerator, PatternId};
use crate::patch::PatchFragment;
use crate::song::{Pattern, Song};
use crate::undo::UndoStack;
use crate::{
    FORMAT_VERSION, PatternData, ProjectData, ProjectError, ProjectFormat, load_project,
    save_project,
};
use daw_transport::{Transport, TransportChange};
use std::path::{Path, PathBuf};

/// Where a project lives on disk and whether it differs from that file.
#[derive(Debug, Clone, Default)]
pub struct ProjectFile {
    path: Option<PathBuf>,
    dirty: bool,
}

impl ProjectFile {
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// True once the project has been written to or read from a file.
    pub fn is_saved(&self) -> bool {
        self.path.is_some()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn mark_clean(&mut self, path: PathBuf) {
        self.path = Some(path);
        self.dirty = false;
    }
}

/// One open project: transport, song, its undo history and file state.
///
/// All edits go through methods on `Project`. Committed edits are recorded as
/// [`PatchFragment`]s and mark the project dirty; live edits only change the
/// current value.
#[derive(Debug)]
pub struct Project {
    transport: Transport,
    song: Song,
    history: UndoStack,
    file: ProjectFile,
}

impl Project {
    pub fn new(ids: &mut IdGenerator, undo_limit: Option<usize>) -> Self {
        Self {
            transport: Transport::new(),
            song: Song::new(ids),
            history: UndoStack::with_limit(undo_limit),
            file: ProjectFile::default(),
        }
    }

    /// Build a project from file data. Patterns get fresh ids from `ids` in
    /// file order, so they never clash with anything else open.
    pub fn from_data(data: ProjectData, ids: &mut IdGenerator, undo_limit: Option<usize>) -> Self {
        let mut song = Song::empty();
        for pattern in data.patterns {
            song.insert(ids.next_pattern_id(), Pattern::new(pattern.name, pattern.color));
        }

        Self {
            transport: Transport::from_snapshot(data.transport),
            song,
            history: UndoStack::with_limit(undo_limit),
            file: ProjectFile::default(),
        }
    }

    pub fn to_data(&self) -> ProjectData {
        ProjectData {
            version: FORMAT_VERSION,
            transport: self.transport.snapshot(),
            patterns: self
                .song
                .patterns()
                .iter()
                .map(|(id, pattern)| PatternData {
                    id: *id,
                    name: pattern.display_name().to_string(),
                    color: pattern.color(),
                })
                .collect(),
        }
    }

    pub fn load(
        path: &Path,
        ids: &mut IdGenerator,
        undo_limit: Option<usize>,
    ) -> Result<Self, ProjectError> {
        let data = load_project(path)?;
        let mut project = Self::from_data(data, ids, undo_limit);
        project.file.mark_clean(path.to_path_buf());
        Ok(project)
    }

    pub fn save_as(&mut self, path: &Path, format: ProjectFormat) -> Result<(), ProjectError> {
        save_project(path, &self.to_data(), format)?;
        self.file.mark_clean(path.to_path_buf());
        Ok(())
    }

    pub fn save(&mut self, format: ProjectFormat) -> Result<(), ProjectError> {
        let path = self
            .file
            .path
            .clone()
            .ok_or(ProjectError::NoBackingPath)?;
        self.save_as(&path, format)
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn song(&self) -> &Song {
        &self.song
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    pub fn file(&self) -> &ProjectFile {
        &self.file
    }

    pub fn path(&self) -> Option<&Path> {
        self.file.path()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.file.has_unsaved_changes()
    }

    pub fn is_saved(&self) -> bool {
        self.file.is_saved()
    }

    fn commit(&mut self, fragment: PatchFragment) {
        log::debug!("commit {:?}", fragment.patch_type());
        self.history.push(fragment);
        self.file.mark_dirty();
    }

    fn commit_transport(&mut self, change: Option<TransportChange>) {
        if let Some(change) = change {
            self.commit(PatchFragment::TransportParameter(change));
        }
    }

    pub fn set_beats_per_minute(&mut self, value: f32, is_patch: bool) {
        let change = self.transport.set_beats_per_minute(value, is_patch);
        self.commit_transport(change);
    }

    pub fn set_default_numerator(&mut self, value: u8, is_patch: bool) {
        let change = self.transport.set_default_numerator(value, is_patch);
        self.commit_transport(change);
    }

    pub fn set_default_denominator(&mut self, value: u8, is_patch: bool) {
        let change = self.transport.set_default_denominator(value, is_patch);
        self.commit_transport(change);
    }

    pub fn create_pattern(
        &mut self,
        ids: &mut IdGenerator,
        name: impl Into<String>,
        color: Color,
    ) -> PatternId {
        let id = ids.next_pattern_id();
        let fragment = PatchFragment::PatternAdd {
            id,
            pattern: Pattern::new(name, color),
        };
        fragment.apply(&mut self.transport, &mut self.song);
        self.commit(fragment);
        id
    }

    /// Remove a pattern. Returns `false`, recording nothing, if `id` is not in
    /// the song.
    pub fn remove_pattern(&mut self, id: PatternId) -> bool {
        let Some(pattern) = self.song.remove(id) else {
            return false;
        };
        self.commit(PatchFragment::PatternRemove { id, pattern });
        true
    }

    pub fn rename_pattern(&mut self, id: PatternId, name: impl Into<String>) -> bool {
        let name = name.into();
        let Some(pattern) = self.song.pattern(id) else {
            return false;
        };
        if pattern.display_name() == name {
            return false;
        }

        let fragment = PatchFragment::PatternRename {
            id,
            old: pattern.display_name().to_string(),
            new: name,
        };
        fragment.apply(&mut self.transport, &mut self.song);
        self.commit(fragment);
        true
    }

    pub fn set_pattern_color(&mut self, id: PatternId, color: Color) -> bool {
        let Some(pattern) = self.song.pattern(id) else {
            return false;
        };
        if pattern.color() == color {
            return false;
        }

        let fragment = PatchFragment::PatternRecolor {
            id,
            old: pattern.color(),
            new: color,
        };
        fragment.apply(&mut self.transport, &mut self.song);
        self.commit(fragment);
        true
    }

    pub fn undo(&mut self) -> bool {
        let stepped = self.history.undo(&mut self.transport, &mut self.song);
        if stepped {
            self.file.mark_dirty();
        }
        stepped
    }

    pub fn redo(&mut self) -> bool {
        let stepped = self.history.redo(&mut self.transport, &mut self.song);
        if stepped {
            self.file.mark_dirty();
        }
        stepped
    }
}
