//! # gsgen
//!
//! Geometry shader variant generator.
//!
//! A compact [`GeometryShaderUid`] (primitive topology, texture generator
//! count) and an immutable [`HostConfig`] snapshot deterministically produce
//! the text of a geometry-stage program for OpenGL, Vulkan or D3D.
//!
//! ```rust,ignore
//! use gsgen::{ApiType, GeometryShaderUid, HostConfig, PrimitiveType};
//!
//! let host = HostConfig {
//!     stereo: true,
//!     ..Default::default()
//! };
//! let uid = GeometryShaderUid::new(PrimitiveType::Lines, 2);
//! let code = gsgen::generate_geometry_shader_code(ApiType::OpenGl, &host, &uid);
//! println!("{code}");
//! ```

pub mod errors;
pub mod pipeline;
pub mod settings;

pub use errors::{GsError, Result};
pub use pipeline::{
    GeneratedShader, GeometryShaderManager, GeometryShaderUid, PrimitiveType, ShaderCode,
    StageLayout, enumerate_geometry_shader_uids, generate_avatar_geometry_shader_code,
    generate_geometry_shader_code,
};
pub use settings::{ApiType, DriverBugs, HostConfig};
