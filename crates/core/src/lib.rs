pub mod config;
pub mod session;

pub use config::SessionConfig;
pub use session::{Session, SessionError};

pub use daw_engine::{EngineHandle, EngineProcessor};
pub use daw_project::{
    Color, PatchFragment, PatchType, Pattern, PatternId, Project, ProjectError, ProjectFile,
    ProjectFormat, Song, UndoStack, load_project_metadata,
};
pub use daw_transport::{Control, Transport, TransportSnapshot, TransportValue};
