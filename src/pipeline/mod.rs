//! Geometry Shader Pipeline
//!
//! From variant key to source text:
//!
//! - [`uid`]: The plain-data variant key ([`GeometryShaderUid`])
//! - [`enumerate`]: The canonical set of keys for ahead-of-time generation
//! - [`vertex`]: Interpolants threaded through every emitted vertex
//! - [`shader_gen`]: The expansion algorithm (lines to quads, points to sprites, layering)
//! - [`dialect`]: GLSL/HLSL formatting behind [`DialectEmitter`]
//! - [`shader_code`]: The append-only source buffer
//! - [`shader_manager`]: Key to source map with parallel precompilation

pub mod dialect;
pub mod enumerate;
pub mod shader_code;
pub mod shader_gen;
pub mod shader_manager;
pub mod uid;
pub mod vertex;

pub use dialect::{DialectEmitter, GlslEmitter, HlslEmitter, emitter_for, interpolation_qualifier};
pub use enumerate::{GeometryShaderUids, enumerate_geometry_shader_uids};
pub use shader_code::ShaderCode;
pub use shader_gen::{
    I_LINEPTPARAMS, I_STEREOPARAMS, I_TEXOFFSET, StageLayout, generate_avatar_geometry_shader_code,
    generate_geometry_shader_code,
};
pub use shader_manager::{GeneratedShader, GeometryShaderManager};
pub use uid::{GeometryShaderUid, MAX_TEX_GENS, PrimitiveType};
pub use vertex::{Channel, VaryingMember, VertexShape};
