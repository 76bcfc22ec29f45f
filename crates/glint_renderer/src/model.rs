//! Packed binary triangle files.
//!
//! A triangle file is a bare sequence of [`Triangle`] records: three
//! vertices of three `f64` each, 72 bytes per record in native byte order,
//! with no header. A file whose length is not a whole number of records is
//! rejected.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::Triangle;

/// Size of one triangle record in bytes.
pub const RECORD_SIZE: usize = std::mem::size_of::<Triangle>();

/// Errors that can occur reading or writing triangle files.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("triangle data is {len} bytes, not a multiple of the {record}-byte record size")]
    RecordLength { len: usize, record: usize },
}

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Read every triangle from a triangle file.
pub fn load_triangles<P: AsRef<Path>>(path: P) -> ModelResult<Vec<Triangle>> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let triangles = triangles_from_bytes(&bytes)?;
    log::info!("Loaded {} triangles from {}", triangles.len(), path.display());
    Ok(triangles)
}

/// Decode packed triangle records.
pub fn triangles_from_bytes(bytes: &[u8]) -> ModelResult<Vec<Triangle>> {
    if bytes.len() % RECORD_SIZE != 0 {
        return Err(ModelError::RecordLength {
            len: bytes.len(),
            record: RECORD_SIZE,
        });
    }

    // File contents carry no alignment guarantee
    Ok(bytes
        .chunks_exact(RECORD_SIZE)
        .map(bytemuck::pod_read_unaligned)
        .collect())
}

/// Write triangles as packed records, replacing any existing file.
pub fn save_triangles<P: AsRef<Path>>(path: P, triangles: &[Triangle]) -> ModelResult<()> {
    fs::write(path, bytemuck::cast_slice::<Triangle, u8>(triangles))?;
    Ok(())
}
