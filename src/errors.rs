//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! Shader generation itself is infallible: its inputs are closed, internally
//! constructed values, and a malformed key is a caller bug that trips an
//! assertion. [`GsError`] covers the edges where data enters from outside:
//! - Decoding persisted variant keys
//! - Parsing target API names
//! - Loading host configuration documents
//!
//! # Usage
//!
//! Fallible APIs return [`Result<T>`] which is an alias for `std::result::Result<T, GsError>`.
//!
//! ```rust,ignore
//! use gsgen::errors::Result;
//! use gsgen::pipeline::GeometryShaderUid;
//!
//! fn restore(bytes: &[u8]) -> Result<GeometryShaderUid> {
//!     GeometryShaderUid::from_bytes(bytes)
//! }
//! ```

use thiserror::Error;

/// The main error type for the generator.
#[derive(Error, Debug)]
pub enum GsError {
    // ========================================================================
    // Variant Key Errors
    // ========================================================================
    /// Texture generator count outside `0..=8`.
    #[error(
        "Invalid texture generator count: {0} (max {max})",
        max = crate::pipeline::MAX_TEX_GENS
    )]
    InvalidTexGenCount(u32),

    /// Raw primitive type value that maps to no [`PrimitiveType`](crate::pipeline::PrimitiveType).
    #[error("Invalid primitive type: {0}")]
    InvalidPrimitiveType(u32),

    /// Persisted key bytes do not form a valid key.
    #[error("Malformed shader uid: {reason}")]
    MalformedUid {
        /// What was wrong with the bytes
        reason: String,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Unknown target API name.
    #[error("Unsupported API: {0}")]
    UnsupportedApi(String),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Alias for `Result<T, GsError>`.
pub type Result<T> = std::result::Result<T, GsError>;
