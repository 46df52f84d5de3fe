//! Variant Enumerator
//!
//! Lists every geometry shader key a process can request, so shaders can be
//! generated ahead of the first draw that needs them.

use std::iter::FusedIterator;

use super::uid::{GeometryShaderUid, MAX_TEX_GENS, PrimitiveType};

const TEX_GEN_VARIANTS: u32 = MAX_TEX_GENS + 1;

/// Returns the canonical set of geometry shader keys.
///
/// With primitive restart the triangle class is drawn as strips, otherwise
/// as lists; lines and points are always included. Each primitive is paired
/// with every texture generator count from `0` to [`MAX_TEX_GENS`].
///
/// The sequence is finite, yields 27 distinct keys and can be restarted by
/// cloning or calling this function again.
#[must_use]
pub fn enumerate_geometry_shader_uids(supports_primitive_restart: bool) -> GeometryShaderUids {
    let triangles = if supports_primitive_restart {
        PrimitiveType::TriangleStrip
    } else {
        PrimitiveType::Triangles
    };

    GeometryShaderUids {
        primitives: [triangles, PrimitiveType::Lines, PrimitiveType::Points],
        next: 0,
    }
}

/// Iterator returned by [`enumerate_geometry_shader_uids`].
#[derive(Debug, Clone)]
pub struct GeometryShaderUids {
    primitives: [PrimitiveType; 3],
    next: u32,
}

impl GeometryShaderUids {
    const TOTAL: u32 = 3 * TEX_GEN_VARIANTS;
}

impl Iterator for GeometryShaderUids {
    type Item = GeometryShaderUid;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= Self::TOTAL {
            return None;
        }

        let primitive = self.primitives[(self.next / TEX_GEN_VARIANTS) as usize];
        let tex_gens = self.next % TEX_GEN_VARIANTS;
        self.next += 1;

        Some(GeometryShaderUid::new(primitive, tex_gens))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = Self::TOTAL.saturating_sub(self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for GeometryShaderUids {}

impl FusedIterator for GeometryShaderUids {}
