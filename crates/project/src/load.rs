use crate::{FORMAT_VERSION, ProjectData, ProjectError};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct ProjectMetadata {
    pub version: u32,
    pub beats_per_minute: f32,
    pub time_signature: (u8, u8),
    pub pattern_count: usize,
}

fn load_project_data(path: &Path) -> Result<ProjectData, ProjectError> {
    let bytes = fs::read(path)?;

    // Try JSON first, fall back to MessagePack
    let json_error = match serde_json::from_slice(&bytes) {
        Ok(data) => return Ok(data),
        Err(e) => e,
    };
    rmp_serde::from_slice(&bytes).map_err(|e| {
        if looks_like_json(&bytes) {
            ProjectError::InvalidJson(json_error)
        } else {
            ProjectError::Deserialize(e)
        }
    })
}

fn looks_like_json(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|b| *b == b'{')
}

/// Read and validate a project file.
pub fn load_project(path: &Path) -> Result<ProjectData, ProjectError> {
    let data = load_project_data(path)?;
    if data.version > FORMAT_VERSION {
        return Err(ProjectError::UnsupportedVersion {
            found: data.version,
            supported: FORMAT_VERSION,
        });
    }

    log::info!(
        "loaded project {} (version {}, {} patterns)",
        path.display(),
        data.version,
        data.patterns.len()
    );
    Ok(data)
}

pub fn load_project_metadata(path: &Path) -> Result<ProjectMetadata, ProjectError> {
    let data = load_project(path)?;

    Ok(ProjectMetadata {
        version: data.version,
        beats_per_minute: data.transport.beats_per_minute,
        time_signature: (
            data.transport.default_numerator,
            data.transport.default_denominator,
        ),
        pattern_count: data.patterns.len(),
    })
}
