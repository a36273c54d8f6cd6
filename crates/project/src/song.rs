use crate::color::Color;
use crate::id::{IdGenerator, PatternId};
use std::collections::BTreeMap;

pub const DEFAULT_PATTERN_NAME: &str = "New pattern";

#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    name: String,
    color: Color,
}

impl Default for Pattern {
    fn default() -> Self {
        Self::new(DEFAULT_PATTERN_NAME, Color::default())
    }
}

impl Pattern {
    pub fn new(name: impl Into<String>, color: Color) -> Self {
        Self {
            name: name.into(),
            color,
        }
    }

    pub fn display_name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub(crate) fn set_display_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}

/// The pattern store of a project, keyed by id.
///
/// Iteration follows id order, which is creation order. Mutations go through
/// [`Project`](crate::Project) so that they land in the undo history.
#[derive(Debug, Clone, Default)]
pub struct Song {
    patterns: BTreeMap<PatternId, Pattern>,
}

impl Song {
    /// A song holding a single default pattern.
    pub fn new(ids: &mut IdGenerator) -> Self {
        let mut song = Self::empty();
        song.insert(ids.next_pattern_id(), Pattern::default());
        song
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn patterns(&self) -> &BTreeMap<PatternId, Pattern> {
        &self.patterns
    }

    pub fn pattern(&self, id: PatternId) -> Option<&Pattern> {
        self.patterns.get(&id)
    }

    pub fn pattern_ids(&self) -> Vec<PatternId> {
        self.patterns.keys().copied().collect()
    }

    pub fn contains(&self, id: PatternId) -> bool {
        self.patterns.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub(crate) fn insert(&mut self, id: PatternId, pattern: Pattern) {
        self.patterns.insert(id, pattern);
    }

    pub(crate) fn remove(&mut self, id: PatternId) -> Option<Pattern> {
        self.patterns.remove(&id)
    }

    pub(crate) fn pattern_mut(&mut self, id: PatternId) -> Option<&mut Pattern> {
        self.patterns.get_mut(&id)
    }
}
