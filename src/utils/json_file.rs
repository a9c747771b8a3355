//! Helpers for the JSON files kept next to the executable.
//!
//! A missing file is not an error: callers get `None` and fall back to an
//! empty value. A file that exists but does not parse is reported with its path.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::utils::error::{AppError, Result};

pub fn read_optional<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| AppError::FileFormat {
            path: path.display().to_string(),
            source,
        })
}

pub fn write<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    fs::write(path, json)?;
    Ok(())
}
