//! Geometry shader variant keys.
//!
//! A [`GeometryShaderUid`] holds exactly the per-draw inputs that change the
//! generated text: the primitive topology and the number of active texture
//! generators. It is plain data: the struct is zero-filled before any field is
//! set and every padding byte is an explicit, always-zero field, so byte-wise
//! equality is value equality and the bytes themselves can serve as a cache
//! key (in memory or on disk).
//!
//! Process-wide inputs (API, stereo, wireframe, ...) live in
//! [`HostConfig`](crate::settings::HostConfig) instead.

use bytemuck::{Pod, Zeroable};

use crate::errors::{GsError, Result};
use crate::settings::HostConfig;

/// Highest number of texture generators a key may carry.
pub const MAX_TEX_GENS: u32 = 8;

/// Primitive topology the geometry stage receives.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveType {
    Points = 0,
    Lines = 1,
    Triangles = 2,
    TriangleStrip = 3,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 4] = [
        PrimitiveType::Points,
        PrimitiveType::Lines,
        PrimitiveType::Triangles,
        PrimitiveType::TriangleStrip,
    ];

    /// Number of vertices per input primitive.
    #[inline]
    #[must_use]
    pub fn vertex_in(self) -> u32 {
        (self as u32 + 1).min(3)
    }

    /// Number of vertices emitted per input primitive and layer.
    ///
    /// Wireframe output re-emits the first vertex to close the outline.
    #[inline]
    #[must_use]
    pub fn vertex_out(self, wireframe: bool) -> u32 {
        let base = if self == Self::TriangleStrip { 3 } else { 4 };
        base + u32::from(wireframe)
    }

    #[inline]
    #[must_use]
    pub fn is_triangle_class(self) -> bool {
        matches!(self, Self::Triangles | Self::TriangleStrip)
    }
}

impl TryFrom<u32> for PrimitiveType {
    type Error = GsError;

    fn try_from(raw: u32) -> Result<Self> {
        match raw {
            0 => Ok(Self::Points),
            1 => Ok(Self::Lines),
            2 => Ok(Self::Triangles),
            3 => Ok(Self::TriangleStrip),
            _ => Err(GsError::InvalidPrimitiveType(raw)),
        }
    }
}

/// Geometry shader variant key.
///
/// Two keys with equal bytes always produce equal source under the same
/// [`HostConfig`].
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Pod, Zeroable)]
pub struct GeometryShaderUid {
    primitive_type: u8,
    num_tex_gens: u8,
    padding: [u8; 2],
}

impl GeometryShaderUid {
    /// Size of the key in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Builds a key.
    ///
    /// # Panics
    ///
    /// If `num_tex_gens` exceeds [`MAX_TEX_GENS`]. Keys are built from
    /// internal hardware state, so an out-of-range count is an upstream bug.
    #[must_use]
    pub fn new(primitive_type: PrimitiveType, num_tex_gens: u32) -> Self {
        assert!(
            num_tex_gens <= MAX_TEX_GENS,
            "texture generator count {num_tex_gens} exceeds {MAX_TEX_GENS}"
        );

        let mut uid = Self::zeroed();
        uid.primitive_type = primitive_type as u8;
        uid.num_tex_gens = num_tex_gens as u8;
        uid
    }

    /// Fallible form of [`new`](Self::new) for counts from outside the crate.
    pub fn try_new(primitive_type: PrimitiveType, num_tex_gens: u32) -> Result<Self> {
        if num_tex_gens > MAX_TEX_GENS {
            return Err(GsError::InvalidTexGenCount(num_tex_gens));
        }
        Ok(Self::new(primitive_type, num_tex_gens))
    }

    /// Restores a key from its byte representation.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let uid: Self =
            bytemuck::try_pod_read_unaligned(bytes).map_err(|e| GsError::MalformedUid {
                reason: format!(
                    "expected {} bytes, got {} ({e:?})",
                    Self::SIZE,
                    bytes.len()
                ),
            })?;

        if uid.padding != [0; 2] {
            return Err(GsError::MalformedUid {
                reason: "non-zero padding".to_string(),
            });
        }
        PrimitiveType::try_from(u32::from(uid.primitive_type))?;
        if u32::from(uid.num_tex_gens) > MAX_TEX_GENS {
            return Err(GsError::InvalidTexGenCount(u32::from(uid.num_tex_gens)));
        }

        Ok(uid)
    }

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    #[must_use]
    pub fn primitive_type(&self) -> PrimitiveType {
        match self.primitive_type {
            0 => PrimitiveType::Points,
            1 => PrimitiveType::Lines,
            2 => PrimitiveType::Triangles,
            3 => PrimitiveType::TriangleStrip,
            raw => unreachable!("constructors only store valid primitive types, got {raw}"),
        }
    }

    #[inline]
    #[must_use]
    pub fn num_tex_gens(&self) -> u32 {
        u32::from(self.num_tex_gens)
    }

    /// Whether the draw needs no geometry stage at all.
    ///
    /// Triangles pass through unchanged unless layered output or wireframe
    /// outlines are requested.
    #[must_use]
    pub fn is_passthrough(&self, host: &HostConfig) -> bool {
        self.primitive_type().is_triangle_class() && !host.is_layered() && !host.wireframe
    }
}

impl std::fmt::Debug for GeometryShaderUid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeometryShaderUid")
            .field("primitive_type", &self.primitive_type())
            .field("num_tex_gens", &self.num_tex_gens)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_counts() {
        assert_eq!(PrimitiveType::Points.vertex_in(), 1);
        assert_eq!(PrimitiveType::Lines.vertex_in(), 2);
        assert_eq!(PrimitiveType::Triangles.vertex_in(), 3);
        assert_eq!(PrimitiveType::TriangleStrip.vertex_in(), 3);

        assert_eq!(PrimitiveType::TriangleStrip.vertex_out(false), 3);
        assert_eq!(PrimitiveType::TriangleStrip.vertex_out(true), 4);
        let four_vertex = [
            PrimitiveType::Points,
            PrimitiveType::Lines,
            PrimitiveType::Triangles,
        ];
        for primitive in four_vertex {
            assert_eq!(primitive.vertex_out(false), 4);
            assert_eq!(primitive.vertex_out(true), 5);
        }
    }

    #[test]
    fn test_bytes_are_zero_padded() {
        let uid = GeometryShaderUid::new(PrimitiveType::Lines, 3);
        assert_eq!(uid.as_bytes(), &[1, 3, 0, 0]);
        assert_eq!(GeometryShaderUid::SIZE, 4);
    }

    #[test]
    fn test_byte_equality_matches_value_equality() {
        let a = GeometryShaderUid::new(PrimitiveType::Points, 2);
        let b = GeometryShaderUid::new(PrimitiveType::Points, 2);
        let c = GeometryShaderUid::new(PrimitiveType::Points, 3);
        assert_eq!(a, b);
        assert_eq!(a.as_bytes(), b.as_bytes());
        assert_ne!(a.as_bytes(), c.as_bytes());
    }

    #[test]
    fn test_from_bytes() {
        let uid = GeometryShaderUid::new(PrimitiveType::TriangleStrip, 8);
        assert_eq!(GeometryShaderUid::from_bytes(uid.as_bytes()).unwrap(), uid);

        assert!(GeometryShaderUid::from_bytes(&[1, 0, 0]).is_err());
        assert!(GeometryShaderUid::from_bytes(&[1, 0, 1, 0]).is_err());
        assert!(matches!(
            GeometryShaderUid::from_bytes(&[4, 0, 0, 0]),
            Err(GsError::InvalidPrimitiveType(4))
        ));
        assert!(matches!(
            GeometryShaderUid::from_bytes(&[0, 9, 0, 0]),
            Err(GsError::InvalidTexGenCount(9))
        ));
    }

    #[test]
    fn test_try_new_rejects_out_of_range() {
        assert!(GeometryShaderUid::try_new(PrimitiveType::Points, 8).is_ok());
        assert!(matches!(
            GeometryShaderUid::try_new(PrimitiveType::Points, 9),
            Err(GsError::InvalidTexGenCount(9))
        ));
    }

    #[test]
    #[should_panic(expected = "exceeds")]
    fn test_new_panics_on_contract_violation() {
        let _ = GeometryShaderUid::new(PrimitiveType::Lines, 9);
    }

    #[test]
    fn test_passthrough() {
        let tri = GeometryShaderUid::new(PrimitiveType::Triangles, 0);
        let line = GeometryShaderUid::new(PrimitiveType::Lines, 0);
        let host = HostConfig::default();

        assert!(tri.is_passthrough(&host));
        assert!(!line.is_passthrough(&host));
        assert!(!tri.is_passthrough(&HostConfig {
            wireframe: true,
            ..host
        }));
        assert!(!tri.is_passthrough(&HostConfig {
            stereo: true,
            ..host
        }));
    }
}
