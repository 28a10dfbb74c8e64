//! Utility functions for error handling
//!
//! Filesystem helpers that attach the failing path to the error.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{PipelineError, Result};

/// Open a file for reading, reporting the path on failure
pub fn open_file(path: &Path) -> Result<fs::File> {
    fs::File::open(path).map_err(|e| PipelineError::io(path, e))
}

/// Create (or truncate) a file for writing, reporting the path on failure
pub fn create_file(path: &Path) -> Result<fs::File> {
    fs::File::create(path).map_err(|e| PipelineError::io(path, e))
}

/// Check that a directory exists and is readable
pub fn validate_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(PipelineError::io(
            path,
            io::Error::new(io::ErrorKind::NotFound, "directory not found"),
        ));
    }

    if !path.is_dir() {
        return Err(PipelineError::io(
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "path is not a directory"),
        ));
    }

    fs::read_dir(path)
        .map(|_| ())
        .map_err(|e| PipelineError::io(path, e))
}

/// Create a directory and all of its parents if missing
pub fn ensure_directory(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|e| PipelineError::io(path, e))
}
