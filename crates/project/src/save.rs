use crate::{ProjectData, ProjectError, ProjectFormat};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub fn save_project(
    path: &Path,
    data: &ProjectData,
    format: ProjectFormat,
) -> Result<(), ProjectError> {
    // Encode fully before touching the file so a failed encode leaves any
    // existing file intact.
    let bytes = match format {
        ProjectFormat::Json => serde_json::to_vec_pretty(data)?,
        ProjectFormat::MessagePack => rmp_serde::encode::to_vec_named(data)?,
    };

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&bytes)?;
    writer.flush()?;

    log::info!("saved project to {} ({:?})", path.display(), format);
    Ok(())
}
