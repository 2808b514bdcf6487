//! Versioned persistence for label state between runs.
//!
//! A run that aborts mid-way is resumed from the last saved [`LabelVector`].
//! Files hold a `u32` format version followed by the payload, both in
//! fixed-width little-endian bincode.
//!
//! [`LabelVector`]: crate::labels::LabelVector

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("checkpoint I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("checkpoint encoding failed: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("checkpoint version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("checkpoint content rejected: {0}")]
    InvalidFormat(String),
}

/// State that can be written to and restored from a checkpoint file.
pub trait Checkpointable: Sized {
    fn save_checkpoint<P: AsRef<Path>>(&self, path: P) -> Result<(), CheckpointError>;

    fn load_checkpoint<P: AsRef<Path>>(path: P) -> Result<Self, CheckpointError>;
}

fn label_codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .reject_trailing_bytes()
}

/// Write `version` then `payload` to `path`, creating parent directories.
pub(crate) fn write_versioned<T: Serialize>(
    path: &Path,
    version: u32,
    payload: &T,
) -> Result<(), CheckpointError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    label_codec().serialize_into(&mut writer, &(version, payload))?;
    writer.flush()?;
    Ok(())
}

/// Read a payload written by [`write_versioned`], rejecting other versions.
pub(crate) fn read_versioned<T: DeserializeOwned>(
    path: &Path,
    expected: u32,
) -> Result<T, CheckpointError> {
    let reader = BufReader::new(File::open(path)?);
    let (found, payload): (u32, T) = label_codec().deserialize_from(reader)?;
    if found != expected {
        return Err(CheckpointError::VersionMismatch { expected, found });
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn scratch(name: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("label-core-ckpt-{}", Uuid::new_v4()))
            .join(name)
    }

    #[test]
    fn version_is_checked_on_read() {
        let path = scratch("values.bin");
        write_versioned(&path, 3, &vec![0.25f32, 1.0]).unwrap();

        let values: Vec<f32> = read_versioned(&path, 3).unwrap();
        assert_eq!(values, vec![0.25, 1.0]);

        let stale = read_versioned::<Vec<f32>>(&path, 4);
        assert!(matches!(
            stale,
            Err(CheckpointError::VersionMismatch { expected: 4, found: 3 })
        ));
        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = read_versioned::<Vec<f32>>(&scratch("absent.bin"), 1);
        assert!(matches!(result, Err(CheckpointError::Io(_))));
    }
}
