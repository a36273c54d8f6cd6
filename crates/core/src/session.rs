use std::path::Path;

use crate::config::SessionConfig;
use daw_engine::EngineHandle;
use daw_project::{Color, IdGenerator, PatternId, Project, ProjectError, ProjectFile};
use daw_transport::TransportValue;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Project index {index} out of range ({open} open)")]
    OutOfRange { index: usize, open: usize },

    #[error("No project is open")]
    NoOpenProject,

    #[error(transparent)]
    Project(#[from] ProjectError),
}

struct OpenProject {
    project: Project,
    engine: EngineHandle,
}

impl OpenProject {
    fn new(project: Project) -> Self {
        let engine = daw_engine::start(project.transport().snapshot());
        Self { project, engine }
    }
}

/// The set of open projects and which one is active.
///
/// Projects are addressed by index. Closing a project shifts every project
/// above it down by one; the active index follows the rule documented on
/// [`Session::close_project`], and callers choose the next active project
/// explicitly with [`Session::switch_active_project`].
///
/// Every musical parameter is exposed here as a thin delegate to the active
/// project, which also forwards the new value to that project's engine handle.
pub struct Session {
    ids: IdGenerator,
    projects: Vec<OpenProject>,
    active_project_index: usize,
    config: SessionConfig,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl Session {
    /// A session with one fresh project open and active.
    pub fn new(config: SessionConfig) -> Self {
        let mut session = Self {
            ids: IdGenerator::new(),
            projects: Vec::new(),
            active_project_index: 0,
            config,
        };
        session.new_project();
        session
    }

    /// A session configured from the user's config file, falling back to
    /// defaults when there is none. See [`SessionConfig::load`].
    pub fn with_user_config() -> Self {
        Self::new(SessionConfig::load())
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    pub fn active_project_index(&self) -> usize {
        self.active_project_index
    }

    fn open(&self, index: usize) -> Result<&OpenProject, SessionError> {
        self.projects.get(index).ok_or(SessionError::OutOfRange {
            index,
            open: self.projects.len(),
        })
    }

    fn active(&self) -> Result<&OpenProject, SessionError> {
        self.projects
            .get(self.active_project_index)
            .ok_or(SessionError::NoOpenProject)
    }

    fn active_mut(&mut self) -> Result<&mut OpenProject, SessionError> {
        self.projects
            .get_mut(self.active_project_index)
            .ok_or(SessionError::NoOpenProject)
    }

    fn push(&mut self, project: Project) -> usize {
        self.projects.push(OpenProject::new(project));
        self.active_project_index = self.projects.len() - 1;
        self.active_project_index
    }

    pub fn new_project(&mut self) -> usize {
        let project = Project::new(&mut self.ids, self.config.max_undo_steps);
        let index = self.push(project);
        log::debug!("opened new project at index {index}");
        index
    }

    pub fn load_project(&mut self, path: &Path) -> Result<usize, SessionError> {
        let project = Project::load(path, &mut self.ids, self.config.max_undo_steps)?;
        let index = self.push(project);
        log::debug!("opened {} at index {index}", path.display());
        Ok(index)
    }

    /// Close the project at `index`.
    ///
    /// If `index` is at or below the active index, the active index moves
    /// down by one (never below zero). Nothing else is re-selected.
    pub fn close_project(&mut self, index: usize) -> Result<Project, SessionError> {
        self.open(index)?;
        let closed = self.projects.remove(index);
        if index <= self.active_project_index {
            self.active_project_index = self.active_project_index.saturating_sub(1);
        }
        log::debug!(
            "closed project {index}, {} open, active {}",
            self.projects.len(),
            self.active_project_index
        );
        Ok(closed.project)
    }

    pub fn switch_active_project(&mut self, index: usize) -> Result<(), SessionError> {
        self.open(index)?;
        self.active_project_index = index;
        Ok(())
    }

    pub fn project_at(&self, index: usize) -> Result<&Project, SessionError> {
        self.open(index).map(|open| &open.project)
    }

    pub fn engine_at(&self, index: usize) -> Result<&EngineHandle, SessionError> {
        self.open(index).map(|open| &open.engine)
    }

    /// Mutable access, e.g. to hand the engine processor to an audio host.
    pub fn engine_at_mut(&mut self, index: usize) -> Result<&mut EngineHandle, SessionError> {
        let open = self.projects.len();
        self.projects
            .get_mut(index)
            .map(|p| &mut p.engine)
            .ok_or(SessionError::OutOfRange { index, open })
    }

    pub fn project_file_at(&self, index: usize) -> Result<&ProjectFile, SessionError> {
        self.open(index).map(|open| open.project.file())
    }

    pub fn active_project(&self) -> Result<&Project, SessionError> {
        self.active().map(|open| &open.project)
    }

    pub fn project_has_unsaved_changes(&self, index: usize) -> Result<bool, SessionError> {
        self.project_at(index).map(Project::has_unsaved_changes)
    }

    pub fn is_project_saved(&self, index: usize) -> Result<bool, SessionError> {
        self.project_at(index).map(Project::is_saved)
    }

    pub fn save_active_project_as(&mut self, path: &Path) -> Result<(), SessionError> {
        let format = self.config.project_format;
        self.active_mut()?.project.save_as(path, format)?;
        Ok(())
    }

    pub fn save_active_project(&mut self) -> Result<(), SessionError> {
        let format = self.config.project_format;
        self.active_mut()?.project.save(format)?;
        Ok(())
    }

    pub fn set_beats_per_minute(&mut self, value: f32, is_patch: bool) -> Result<(), SessionError> {
        let open = self.active_mut()?;
        open.project.set_beats_per_minute(value, is_patch);
        open.engine.send(TransportValue::BeatsPerMinute(value));
        Ok(())
    }

    pub fn beats_per_minute(&self) -> Result<f32, SessionError> {
        Ok(self.active_project()?.transport().beats_per_minute.get())
    }

    pub fn set_default_numerator(&mut self, value: u8, is_patch: bool) -> Result<(), SessionError> {
        let open = self.active_mut()?;
        open.project.set_default_numerator(value, is_patch);
        open.engine.send(TransportValue::DefaultNumerator(value));
        Ok(())
    }

    pub fn default_numerator(&self) -> Result<u8, SessionError> {
        Ok(self.active_project()?.transport().default_numerator.get())
    }

    pub fn set_default_denominator(
        &mut self,
        value: u8,
        is_patch: bool,
    ) -> Result<(), SessionError> {
        let open = self.active_mut()?;
        open.project.set_default_denominator(value, is_patch);
        open.engine.send(TransportValue::DefaultDenominator(value));
        Ok(())
    }

    pub fn default_denominator(&self) -> Result<u8, SessionError> {
        Ok(self.active_project()?.transport().default_denominator.get())
    }

    pub fn create_pattern(
        &mut self,
        name: impl Into<String>,
        color: Color,
    ) -> Result<PatternId, SessionError> {
        let open = self
            .projects
            .get_mut(self.active_project_index)
            .ok_or(SessionError::NoOpenProject)?;
        Ok(open.project.create_pattern(&mut self.ids, name, color))
    }

    /// Returns `false` if the pattern does not exist; that is not an error.
    pub fn remove_pattern(&mut self, id: PatternId) -> Result<bool, SessionError> {
        Ok(self.active_mut()?.project.remove_pattern(id))
    }

    pub fn rename_pattern(
        &mut self,
        id: PatternId,
        name: impl Into<String>,
    ) -> Result<bool, SessionError> {
        Ok(self.active_mut()?.project.rename_pattern(id, name))
    }

    pub fn set_pattern_color(&mut self, id: PatternId, color: Color) -> Result<bool, SessionError> {
        Ok(self.active_mut()?.project.set_pattern_color(id, color))
    }

    pub fn undo(&mut self) -> Result<bool, SessionError> {
        let open = self.active_mut()?;
        let stepped = open.project.undo();
        if stepped {
            open.engine.sync(open.project.transport().snapshot());
        }
        Ok(stepped)
    }

    pub fn redo(&mut self) -> Result<bool, SessionError> {
        let open = self.active_mut()?;
        let stepped = open.project.redo();
        if stepped {
            open.engine.sync(open.project.transport().snapshot());
        }
        Ok(stepped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daw_project::{Pattern, ProjectFormat};
    use tempfile::tempdir;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn pattern_names(session: &Session) -> Vec<String> {
        session
            .active_project()
            .expect("active project")
            .song()
            .patterns()
            .values()
            .map(|p| p.display_name().to_string())
            .collect()
    }

    #[test]
    fn test_user_config_session_opens_one_project() {
        let session = Session::with_user_config();
        assert_eq!(session.project_count(), 1);
        assert_eq!(session.active_project_index(), 0);
    }

    #[test]
    fn test_new_session_has_one_project() {
        let session = Session::default();
        assert_eq!(session.project_count(), 1);
        assert_eq!(session.active_project_index(), 0);
        assert_eq!(session.beats_per_minute().expect("bpm"), 140.0);
    }

    #[test]
    fn test_live_and_committed_set_through_session() {
        let mut session = Session::default();

        session.set_beats_per_minute(-5.0, false).expect("set");
        assert_eq!(session.beats_per_minute().expect("bpm"), -5.0);
        assert!(!session.project_has_unsaved_changes(0).expect("dirty"));
        assert!(session.project_at(0).expect("project").history().is_empty());

        session.set_beats_per_minute(10.0, true).expect("set");
        assert_eq!(session.beats_per_minute().expect("bpm"), 10.0);
        assert!(session.project_has_unsaved_changes(0).expect("dirty"));
        assert_eq!(session.project_at(0).expect("project").history().len(), 1);
    }

    #[test]
    fn test_projects_are_isolated() {
        let mut session = Session::default();
        let second = session.new_project();
        assert_eq!(second, 1);
        assert_eq!(session.active_project_index(), 1);

        session.set_beats_per_minute(6.0, true).expect("set");
        session.set_beats_per_minute(7.0, true).expect("set");

        assert!(!session.project_has_unsaved_changes(0).expect("dirty"));
        assert_eq!(
            session
                .project_at(0)
                .expect("project")
                .transport()
                .beats_per_minute
                .get(),
            140.0
        );

        session.switch_active_project(0).expect("switch");
        assert_eq!(session.beats_per_minute().expect("bpm"), 140.0);
        assert!(session.project_has_unsaved_changes(1).expect("dirty"));
    }

    #[test]
    fn test_out_of_range_accessors() {
        let mut session = Session::default();

        assert!(matches!(
            session.project_at(1),
            Err(SessionError::OutOfRange { index: 1, open: 1 })
        ));
        assert!(session.engine_at(3).is_err());
        assert!(session.engine_at_mut(3).is_err());
        assert!(session.project_file_at(1).is_err());
        assert!(session.project_has_unsaved_changes(2).is_err());
        assert!(session.is_project_saved(2).is_err());
        assert!(session.switch_active_project(1).is_err());
        assert!(session.close_project(1).is_err());
        assert_eq!(session.project_count(), 1);
        assert_eq!(session.active_project_index(), 0);
    }

    #[test]
    fn test_close_reindexes() {
        let mut session = Session::default();
        session.set_beats_per_minute(1.0, true).expect("set");
        session.new_project();
        session.set_beats_per_minute(2.0, true).expect("set");
        session.new_project();
        session.set_beats_per_minute(3.0, true).expect("set");
        session.switch_active_project(0).expect("switch");

        session.close_project(0).expect("close");
        assert_eq!(session.project_count(), 2);
        assert_eq!(session.active_project_index(), 0);

        session.switch_active_project(0).expect("switch");
        assert_eq!(session.beats_per_minute().expect("bpm"), 2.0);
        session.switch_active_project(1).expect("switch");
        assert_eq!(session.beats_per_minute().expect("bpm"), 3.0);
    }

    #[test]
    fn test_close_below_active_keeps_same_project_active() {
        let mut session = Session::default();
        session.new_project();
        session.new_project();
        session.set_beats_per_minute(33.0, true).expect("set");
        assert_eq!(session.active_project_index(), 2);

        session.close_project(0).expect("close");
        assert_eq!(session.active_project_index(), 1);
        assert_eq!(session.beats_per_minute().expect("bpm"), 33.0);

        session.close_project(1).expect("close");
        assert_eq!(session.active_project_index(), 0);
    }

    #[test]
    fn test_empty_session() {
        let mut session = Session::default();
        session.close_project(0).expect("close");

        assert_eq!(session.project_count(), 0);
        assert!(matches!(
            session.beats_per_minute(),
            Err(SessionError::NoOpenProject)
        ));
        assert!(session.set_beats_per_minute(1.0, true).is_err());
        assert!(session.create_pattern("x", Color::WHITE).is_err());
        assert!(session.undo().is_err());
        assert!(session.save_active_project().is_err());

        assert_eq!(session.new_project(), 0);
        assert_eq!(session.beats_per_minute().expect("bpm"), 140.0);
    }

    #[test]
    fn test_save_without_path_is_reported() {
        let mut session = Session::default();
        let result = session.save_active_project();
        assert!(matches!(
            result,
            Err(SessionError::Project(ProjectError::NoBackingPath))
        ));
    }

    #[test]
    fn test_load_missing_file_leaves_session_unchanged() {
        let dir = tempdir().expect("tempdir");
        let mut session = Session::default();

        let result = session.load_project(&dir.path().join("missing.dawproj"));
        assert!(matches!(
            result,
            Err(SessionError::Project(ProjectError::Io(_)))
        ));
        assert_eq!(session.project_count(), 1);
        assert_eq!(session.active_project_index(), 0);
    }

    #[test]
    fn test_save_load_roundtrip() {
        init_logging();
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("test.dawproj");
        let mut session = Session::default();

        session.set_beats_per_minute(10.0, true).expect("set");
        session.save_active_project_as(&path).expect("save as");
        assert!(!session.project_has_unsaved_changes(0).expect("dirty"));
        assert!(session.is_project_saved(0).expect("saved"));

        let index = session.load_project(&path).expect("load");
        assert_eq!(index, 1);
        assert_eq!(session.active_project_index(), 1);
        assert_eq!(session.beats_per_minute().expect("bpm"), 10.0);
        assert!(!session.project_has_unsaved_changes(1).expect("dirty"));
        assert!(session.is_project_saved(1).expect("saved"));
        assert_eq!(session.active_project().expect("project").song().len(), 1);
        assert_eq!(
            session.project_file_at(1).expect("file").path(),
            Some(path.as_path())
        );
    }

    #[test]
    fn test_messagepack_config_is_used() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("test.dawproj");
        let mut session = Session::new(SessionConfig {
            max_undo_steps: None,
            project_format: ProjectFormat::MessagePack,
        });

        session.set_beats_per_minute(77.0, true).expect("set");
        session.save_active_project_as(&path).expect("save as");

        let bytes = std::fs::read(&path).expect("read");
        assert!(bytes.first().is_some_and(|b| *b != b'{'));

        session.load_project(&path).expect("load");
        assert_eq!(session.beats_per_minute().expect("bpm"), 77.0);
    }

    #[test]
    fn test_undo_limit_from_config() {
        let mut session = Session::new(SessionConfig {
            max_undo_steps: Some(2),
            project_format: ProjectFormat::Json,
        });
        for bpm in [1.0, 2.0, 3.0, 4.0] {
            session.set_beats_per_minute(bpm, true).expect("set");
        }

        assert!(session.undo().expect("undo"));
        assert!(session.undo().expect("undo"));
        assert!(!session.undo().expect("undo"));
        assert_eq!(session.beats_per_minute().expect("bpm"), 2.0);
    }

    #[test]
    fn test_engine_follows_edits_and_history() {
        let mut session = Session::default();

        session.set_beats_per_minute(90.0, false).expect("set");
        let engine = session.engine_at(0).expect("engine");
        assert_eq!(engine.processor().expect("processor").beats_per_minute(), 90.0);

        let mut processor = session
            .engine_at_mut(0)
            .expect("engine")
            .take_processor()
            .expect("processor");

        session.set_beats_per_minute(100.0, true).expect("set");
        session.set_default_numerator(3, true).expect("set");
        processor.process_commands();
        assert_eq!(processor.beats_per_minute(), 100.0);
        assert_eq!(processor.transport().default_numerator, 3);

        session.undo().expect("undo");
        session.undo().expect("undo");
        processor.process_commands();
        assert_eq!(processor.beats_per_minute(), 140.0);
        assert_eq!(processor.transport().default_numerator, 4);

        session.redo().expect("redo");
        processor.process_commands();
        assert_eq!(processor.beats_per_minute(), 100.0);
    }

    #[test]
    fn test_commit_after_full_queue_reaches_processor() {
        init_logging();
        let mut session = Session::default();
        let mut processor = session
            .engine_at_mut(0)
            .expect("engine")
            .take_processor()
            .expect("processor");

        for i in 0..64 {
            session.set_beats_per_minute(i as f32, false).expect("set");
        }
        session.set_beats_per_minute(42.0, true).expect("set");

        processor.process_commands();
        assert_eq!(processor.beats_per_minute(), 42.0);
        assert_eq!(session.beats_per_minute().expect("bpm"), 42.0);
    }

    #[test]
    fn test_infinite_tempo_save_load_roundtrip() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("inf.dawproj");
        let mut session = Session::default();

        session.set_beats_per_minute(f32::INFINITY, true).expect("set");
        session.save_active_project_as(&path).expect("save as");

        session.load_project(&path).expect("load");
        assert_eq!(session.beats_per_minute().expect("bpm"), f32::INFINITY);
    }

    #[test]
    fn test_time_signature_delegates() {
        let mut session = Session::default();
        session.set_default_numerator(7, true).expect("set");
        session.set_default_denominator(8, false).expect("set");

        assert_eq!(session.default_numerator().expect("numerator"), 7);
        assert_eq!(session.default_denominator().expect("denominator"), 8);
        assert_eq!(session.active_project().expect("project").history().len(), 1);
    }

    #[test]
    fn test_pattern_delegates() {
        let mut session = Session::default();
        assert_eq!(pattern_names(&session), vec!["New pattern"]);

        let first = session.active_project().expect("project").song().pattern_ids()[0];
        assert!(session.remove_pattern(first).expect("remove"));
        assert!(pattern_names(&session).is_empty());
        assert!(!session.remove_pattern(first).expect("remove"));

        let colors = [
            Color::WHITE,
            Color::rgb(0x10, 0x20, 0x30),
            Color::rgb(0xAB, 0xCD, 0xEF),
        ];
        let ids: Vec<PatternId> = ["Test 1", "Test 2", "Test 3"]
            .into_iter()
            .zip(colors)
            .map(|(name, color)| session.create_pattern(name, color).expect("create"))
            .collect();
        assert_eq!(pattern_names(&session), vec!["Test 1", "Test 2", "Test 3"]);
        let song = session.active_project().expect("project").song();
        assert_eq!(
            song.patterns().values().map(Pattern::color).collect::<Vec<_>>(),
            colors.to_vec()
        );

        assert!(session.rename_pattern(ids[1], "Bridge").expect("rename"));
        assert!(
            session
                .set_pattern_color(ids[2], Color::rgb(0, 0, 0))
                .expect("recolor")
        );
        let song = session.active_project().expect("project").song();
        assert_eq!(song.pattern(ids[1]).map(Pattern::display_name), Some("Bridge"));
        assert_eq!(song.pattern(ids[2]).map(Pattern::color), Some(Color::rgb(0, 0, 0)));
    }

    #[test]
    fn test_pattern_ids_unique_across_projects() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("ids.dawproj");
        let mut session = Session::default();
        session.create_pattern("A", Color::WHITE).expect("create");
        session.save_active_project_as(&path).expect("save");
        session.new_project();
        session.load_project(&path).expect("load");

        let mut all: Vec<PatternId> = (0..session.project_count())
            .flat_map(|i| session.project_at(i).expect("project").song().pattern_ids())
            .collect();
        let total = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), total);
    }

    /// Walks the full open/edit/switch/close/save/load cycle a UI drives.
    #[test]
    fn test_session_lifecycle() {
        init_logging();
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("test.dawproj");
        let mut session = Session::default();

        session.close_project(0).expect("close");
        session.new_project();
        assert!(!session.project_has_unsaved_changes(0).expect("dirty"));

        session.set_beats_per_minute(3.0, true).expect("set");
        assert_eq!(session.beats_per_minute().expect("bpm"), 3.0);
        assert!(session.project_has_unsaved_changes(0).expect("dirty"));
        assert!(!session.is_project_saved(0).expect("saved"));

        session.new_project();
        session.project_at(0).expect("project");
        session.project_at(1).expect("project");
        session.engine_at(1).expect("engine");
        session.project_file_at(1).expect("file");
        assert_eq!(session.active_project_index(), 1);
        assert!(session.project_has_unsaved_changes(0).expect("dirty"));
        assert!(!session.is_project_saved(0).expect("saved"));
        assert!(!session.project_has_unsaved_changes(1).expect("dirty"));
        assert!(!session.is_project_saved(1).expect("saved"));

        session.set_beats_per_minute(6.0, true).expect("set");
        session.set_beats_per_minute(9.0, true).expect("set");

        session.switch_active_project(0).expect("switch");
        assert_eq!(session.active_project_index(), 0);
        session.set_beats_per_minute(6.0, true).expect("set");
        session.set_beats_per_minute(7.0, true).expect("set");
        assert_eq!(session.beats_per_minute().expect("bpm"), 7.0);

        session.close_project(0).expect("close");
        session.switch_active_project(0).expect("switch");
        assert_eq!(session.active_project_index(), 0);
        assert_eq!(session.beats_per_minute().expect("bpm"), 9.0);

        session.set_beats_per_minute(10.0, true).expect("set");
        session.save_active_project_as(&path).expect("save as");
        assert!(!session.project_has_unsaved_changes(0).expect("dirty"));
        assert!(session.is_project_saved(0).expect("saved"));

        session.load_project(&path).expect("load");
        assert_eq!(session.active_project_index(), 1);
        assert_eq!(session.beats_per_minute().expect("bpm"), 10.0);
        assert!(!session.project_has_unsaved_changes(1).expect("dirty"));
        assert!(session.is_project_saved(1).expect("saved"));
        assert_eq!(session.active_project().expect("project").song().len(), 1);

        session.set_beats_per_minute(-12.0, true).expect("set");
        assert!(session.project_has_unsaved_changes(1).expect("dirty"));
        assert!(session.is_project_saved(1).expect("saved"));
        session.save_active_project().expect("save");
        session.load_project(&path).expect("load");
        assert_eq!(session.active_project_index(), 2);
        assert_eq!(session.beats_per_minute().expect("bpm"), -12.0);
        assert!(!session.project_has_unsaved_changes(1).expect("dirty"));
        assert!(session.is_project_saved(1).expect("saved"));
        assert!(!session.project_has_unsaved_changes(2).expect("dirty"));
        assert!(session.is_project_saved(2).expect("saved"));

        session.close_project(2).expect("close");
        session.close_project(1).expect("close");
        session.close_project(0).expect("close");
        session.new_project();
        session.switch_active_project(0).expect("switch");
        assert_eq!(session.active_project_index(), 0);
        assert_eq!(pattern_names(&session), vec!["New pattern"]);
    }
}
