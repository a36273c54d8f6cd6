mod color;
mod id;
mod load;
mod patch;
mod project;
mod save;
mod song;
mod undo;

use daw_transport::TransportSnapshot;
use serde::{Deserialize, Serialize};

pub use color::{Color, ParseColorError};
pub use id::{IdGenerator, PatternId};
pub use load::{ProjectMetadata, load_project, load_project_metadata};
pub use patch::{PatchFragment, PatchType};
pub use project::{Project, ProjectFile};
pub use save::save_project;
pub use song::{DEFAULT_PATTERN_NAME, Pattern, Song};
pub use undo::UndoStack;

/// Newest file version this crate reads and the one it writes.
pub const FORMAT_VERSION: u32 = 1;

/// On-disk representation of a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectData {
    pub version: u32,
    pub transport: TransportSnapshot,
    pub patterns: Vec<PatternData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternData {
    pub id: PatternId,
    pub name: String,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectFormat {
    /// Pretty-printed JSON.
    #[default]
    Json,
    MessagePack,
}

#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Encoding error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// The file looks like JSON but does not parse as a project.
    #[error("Invalid project JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] rmp_serde::decode::Error),

    #[error("Unsupported project file version {found} (newest supported is {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Project has never been saved; a path is required")]
    NoBackingPath,
}
