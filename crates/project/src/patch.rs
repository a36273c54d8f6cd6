use crate::color::Color;
use crate::id::PatternId;
use crate::song::{Pattern, Song};
use daw_transport::{Transport, TransportChange};

/// Kind of mutation a [`PatchFragment`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchType {
    TransportParameter,
    PatternAdd,
    PatternRemove,
    PatternRename,
    PatternRecolor,
}

/// One reversible change to a project.
///
/// Each variant carries exactly what it needs to be applied in either
/// direction, so `revert` after `apply` (or the other way round) leaves the
/// project as it was.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchFragment {
    TransportParameter(TransportChange),
    PatternAdd {
        id: PatternId,
        pattern: Pattern,
    },
    PatternRemove {
        id: PatternId,
        pattern: Pattern,
    },
    PatternRename {
        id: PatternId,
        old: String,
        new: String,
    },
    PatternRecolor {
        id: PatternId,
        old: Color,
        new: Color,
    },
}

impl PatchFragment {
    pub fn patch_type(&self) -> PatchType {
        match self {
            PatchFragment::TransportParameter(_) => PatchType::TransportParameter,
            PatchFragment::PatternAdd { .. } => PatchType::PatternAdd,
            PatchFragment::PatternRemove { .. } => PatchType::PatternRemove,
            PatchFragment::PatternRename { .. } => PatchType::PatternRename,
            PatchFragment::PatternRecolor { .. } => PatchType::PatternRecolor,
        }
    }

    pub fn apply(&self, transport: &mut Transport, song: &mut Song) {
        match self {
            PatchFragment::TransportParameter(change) => transport.apply(change.new),
            PatchFragment::PatternAdd { id, pattern } => song.insert(*id, pattern.clone()),
            PatchFragment::PatternRemove { id, .. } => {
                song.remove(*id);
            }
            PatchFragment::PatternRename { id, new, .. } => {
                if let Some(p) = song.pattern_mut(*id) {
                    p.set_display_name(new.clone());
                }
            }
            PatchFragment::PatternRecolor { id, new, .. } => {
                if let Some(p) = song.pattern_mut(*id) {
                    p.set_color(*new);
                }
            }
        }
    }

    pub fn revert(&self, transport: &mut Transport, song: &mut Song) {
        match self {
            PatchFragment::TransportParameter(change) => transport.apply(change.old),
            PatchFragment::PatternAdd { id, .. } => {
                song.remove(*id);
            }
            PatchFragment::PatternRemove { id, pattern } => song.insert(*id, pattern.clone()),
            PatchFragment::PatternRename { id, old, .. } => {
                if let Some(p) = song.pattern_mut(*id) {
                    p.set_display_name(old.clone());
                }
            }
            PatchFragment::PatternRecolor { id, old, .. } => {
                if let Some(p) = song.pattern_mut(*id) {
                    p.set_color(*old);
                }
            }
        }
    }
}
