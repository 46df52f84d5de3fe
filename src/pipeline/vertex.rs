//! Vertex Shape Descriptor
//!
//! Describes the interpolants the vertex stage hands to the geometry stage.
//! The generator never hard-codes member names: declarations, copies and the
//! texture-coordinate nudges all iterate a [`VertexShape`].

use smallvec::SmallVec;

use crate::settings::HostConfig;

/// What an interpolant carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Position,
    Color,
    TexCoord,
    ClipPos,
    Normal,
    WorldPos,
    ClipDistance,
}

/// One member of the `VS_OUTPUT` struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VaryingMember {
    pub channel: Channel,
    /// Shader type (`float4`, `float3`, ...).
    pub ty: &'static str,
    pub name: &'static str,
    /// Suffix appended to `name` (`tex` + 2 => `tex2`).
    pub index: Option<u32>,
    /// HLSL semantic name.
    pub semantic: &'static str,
    pub semantic_index: Option<u32>,
}

impl VaryingMember {
    const fn new(
        channel: Channel,
        ty: &'static str,
        name: &'static str,
        index: Option<u32>,
        semantic: &'static str,
        semantic_index: Option<u32>,
    ) -> Self {
        Self {
            channel,
            ty,
            name,
            index,
            semantic,
            semantic_index,
        }
    }

    /// Member identifier as it appears in source (`pos`, `colors_1`, `tex3`).
    #[must_use]
    pub fn ident(&self) -> String {
        match self.index {
            Some(index) => format!("{}{index}", self.name),
            None => self.name.to_string(),
        }
    }

    /// HLSL semantic as it appears in source (`POSITION`, `TEXCOORD3`).
    #[must_use]
    pub fn semantic(&self) -> String {
        match self.semantic_index {
            Some(index) => format!("{}{index}", self.semantic),
            None => self.semantic.to_string(),
        }
    }
}

/// Ordered list of interpolants threaded through every emitted vertex.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexShape {
    members: SmallVec<[VaryingMember; 16]>,
}

impl VertexShape {
    /// Interpolants of the regular vertex stage output.
    ///
    /// Position and both vertex colors are always present, followed by one
    /// `float3` per texture generator. The host adds a clip-space position
    /// (needed for per-pixel depth and for VR eye offsets), lighting inputs,
    /// and the two clip distances used to emulate depth clamping.
    #[must_use]
    pub fn for_vertex_output(num_tex_gens: u32, host: &HostConfig) -> Self {
        let mut members = SmallVec::new();

        members.push(VaryingMember::new(
            Channel::Position,
            "float4",
            "pos",
            None,
            "POSITION",
            None,
        ));
        for i in 0..2 {
            members.push(VaryingMember::new(
                Channel::Color,
                "float4",
                "colors_",
                Some(i),
                "COLOR",
                Some(i),
            ));
        }
        for i in 0..num_tex_gens {
            members.push(VaryingMember::new(
                Channel::TexCoord,
                "float3",
                "tex",
                Some(i),
                "TEXCOORD",
                Some(i),
            ));
        }

        if !host.fast_depth_calc || host.vr {
            members.push(VaryingMember::new(
                Channel::ClipPos,
                "float4",
                "clipPos",
                None,
                "TEXCOORD",
                Some(num_tex_gens),
            ));
        }

        if host.per_pixel_lighting {
            members.push(VaryingMember::new(
                Channel::Normal,
                "float3",
                "Normal",
                None,
                "TEXCOORD",
                Some(num_tex_gens + 1),
            ));
            members.push(VaryingMember::new(
                Channel::WorldPos,
                "float3",
                "WorldPos",
                None,
                "TEXCOORD",
                Some(num_tex_gens + 2),
            ));
        }

        if host.depth_clamp {
            for i in 0..2 {
                members.push(VaryingMember::new(
                    Channel::ClipDistance,
                    "float",
                    "clipDist",
                    Some(i),
                    "SV_ClipDistance",
                    Some(i),
                ));
            }
        }

        Self { members }
    }

    /// Fixed shape used by the avatar overlay: one position, one color and
    /// one texture coordinate.
    #[must_use]
    pub fn avatar() -> Self {
        let members = SmallVec::from_slice(&[
            VaryingMember::new(
                Channel::Position,
                "float4",
                "pos",
                None,
                "POSITION",
                None,
            ),
            VaryingMember::new(
                Channel::Color,
                "float4",
                "colors_",
                Some(0),
                "COLOR",
                Some(0),
            ),
            VaryingMember::new(
                Channel::TexCoord,
                "float3",
                "tex",
                Some(0),
                "TEXCOORD",
                Some(0),
            ),
        ]);
        Self { members }
    }

    #[inline]
    #[must_use]
    pub fn members(&self) -> &[VaryingMember] {
        &self.members
    }

    #[must_use]
    pub fn has(&self, channel: Channel) -> bool {
        self.members.iter().any(|m| m.channel == channel)
    }

    /// Number of texture-coordinate interpolants.
    #[must_use]
    pub fn tex_gen_count(&self) -> u32 {
        self.members
            .iter()
            .filter(|m| m.channel == Channel::TexCoord)
            .count() as u32
    }
}
