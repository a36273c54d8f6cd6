use crate::patch::PatchFragment;
use crate::song::Song;
use daw_transport::Transport;

/// Linear undo/redo history of one project.
///
/// Fragments before `position` have been applied; the ones after it form the
/// redo tail, which is dropped as soon as a new fragment is pushed.
#[derive(Debug, Clone, Default)]
pub struct UndoStack {
    fragments: Vec<PatchFragment>,
    position: usize,
    limit: Option<usize>,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// A history that keeps at most `limit` undo steps, forgetting the oldest.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    pub fn push(&mut self, fragment: PatchFragment) {
        self.fragments.truncate(self.position);
        self.fragments.push(fragment);

        if let Some(limit) = self.limit {
            if self.fragments.len() > limit {
                let excess = self.fragments.len() - limit;
                self.fragments.drain(..excess);
            }
        }
        self.position = self.fragments.len();
    }

    pub fn undo(&mut self, transport: &mut Transport, song: &mut Song) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.position -= 1;
        let fragment = &self.fragments[self.position];
        log::debug!("undo {:?}", fragment.patch_type());
        fragment.revert(transport, song);
        true
    }

    pub fn redo(&mut self, transport: &mut Transport, song: &mut Song) -> bool {
        if !self.can_redo() {
            return false;
        }
        let fragment = &self.fragments[self.position];
        log::debug!("redo {:?}", fragment.patch_type());
        fragment.apply(transport, song);
        self.position += 1;
        true
    }

    pub fn can_undo(&self) -> bool {
        self.position > 0
    }

    pub fn can_redo(&self) -> bool {
        self.position < self.fragments.len()
    }

    /// The fragment the next `undo` would revert.
    pub fn peek_undo(&self) -> Option<&PatchFragment> {
        self.position.checked_sub(1).map(|i| &self.fragments[i])
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn clear(&mut self) {
        self.fragments.clear();
        self.position = 0;
    }
}
