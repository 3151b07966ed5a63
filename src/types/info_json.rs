use std::io::{Read, Seek};

use serde::Deserialize;
use zip::ZipArchive;

use super::version::Version;

// Real info.json files are a few KB; the header's size field is not trusted.
const MAX_INFO_JSON_BYTES: u64 = 1024 * 1024;

/// The `info.json` every mod archive carries in its top-level folder.
#[derive(Debug, Deserialize)]
pub struct InfoJson {
    pub name: String,
    pub version: Version,
}

#[derive(thiserror::Error, Debug)]
pub enum InfoJsonError {
    #[error("Unable to read archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Archive has no info.json")]
    Missing,
    #[error("Unable to read info.json: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid info.json: {0}")]
    Json(#[from] serde_json::Error),
}

impl InfoJson {
    /// Looks for `<folder>/info.json` (or a bare `info.json`) inside the archive.
    pub fn from_zip<R: Read + Seek>(reader: R) -> Result<InfoJson, InfoJsonError> {
        let mut archive = ZipArchive::new(reader)?;

        let name = archive
            .file_names()
            .find(|name| is_top_level_info(name))
            .map(str::to_string)
            .ok_or(InfoJsonError::Missing)?;

        let file = archive.by_name(&name)?;
        let mut contents = String::new();
        file.take(MAX_INFO_JSON_BYTES).read_to_string(&mut contents)?;

        Ok(serde_json::from_str(&contents)?)
    }
}

fn is_top_level_info(name: &str) -> bool {
    let parts: Vec<&str> = name.split('/').collect();
    match parts.as_slice() {
        ["info.json"] => true,
        [_, "info.json"] => true,
        _ => false,
    }
}
