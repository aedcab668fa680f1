// src/error.rs

//! Error types shared across the pkggen library

use thiserror::Error;

/// Convenience alias used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A git query failed or returned no usable tag.
    ///
    /// Non-recoverable for the affected channel: nothing is written for
    /// that channel once this is raised.
    #[error("version resolution failed: {0}")]
    VersionResolution(String),

    /// A descriptor value cannot be embedded safely in PKGBUILD syntax.
    #[error("render failed: {0}")]
    Render(String),

    /// Output directory or file could not be created or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
