//! Host Configuration Snapshot
//!
//! This module defines the process-scope configuration the generator reads.
//!
//! The core abstraction is [`HostConfig`], an immutable value captured once per
//! generation call. It holds everything that is *global* to a process run:
//! the target API, presentation modes (wireframe, stereo, VR) and backend
//! capabilities. Per-draw state lives in the variant key instead.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use gsgen::settings::{ApiType, HostConfig};
//!
//! // Default: OpenGL, mono, solid fill
//! let host = HostConfig::default();
//!
//! // Side-by-side stereo on Vulkan with hardware GS instancing
//! let host = HostConfig {
//!     api: ApiType::Vulkan,
//!     stereo: true,
//!     gs_instancing: true,
//!     ..Default::default()
//! };
//! ```

use std::path::Path;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::errors::{GsError, Result};

// ---------------------------------------------------------------------------
// ApiType
// ---------------------------------------------------------------------------

/// Target graphics API.
///
/// OpenGL and Vulkan share the GLSL-family dialect; Vulkan differs only in
/// flipping clip-space Y when a vertex is written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ApiType {
    #[default]
    #[serde(rename = "opengl")]
    OpenGl,
    #[serde(rename = "vulkan")]
    Vulkan,
    #[serde(rename = "d3d")]
    D3D,
}

impl ApiType {
    /// All supported APIs, in a stable order.
    pub const ALL: [ApiType; 3] = [ApiType::OpenGl, ApiType::Vulkan, ApiType::D3D];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::OpenGl => "opengl",
            Self::Vulkan => "vulkan",
            Self::D3D => "d3d",
        }
    }
}

impl FromStr for ApiType {
    type Err = GsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "opengl" | "gl" | "ogl" => Ok(Self::OpenGl),
            "vulkan" | "vk" => Ok(Self::Vulkan),
            "d3d" | "d3d11" | "dx11" => Ok(Self::D3D),
            _ => Err(GsError::UnsupportedApi(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// DriverBugs
// ---------------------------------------------------------------------------

bitflags! {
    /// Known driver defects the generator must work around.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct DriverBugs: u32 {
        /// Clip distances written by the vertex stage must be consumed by the
        /// geometry stage, otherwise sibling outputs are corrupted.
        const BROKEN_CLIP_DISTANCE = 1 << 0;
    }
}

// ---------------------------------------------------------------------------
// HostConfig
// ---------------------------------------------------------------------------

/// Process-scope flags that affect generation but are not part of the
/// variant key.
///
/// # Fields
///
/// | Field                | Description                                   | Default  |
/// |----------------------|-----------------------------------------------|----------|
/// | `api`                | Active target API                             | `OpenGl` |
/// | `wireframe`          | Emit outlines (line strips) instead of fills  | `false`  |
/// | `msaa` / `ssaa`      | Multisample / per-sample shading              | `false`  |
/// | `stereo`             | Two-eye layered output                        | `false`  |
/// | `vr`                 | Head-mounted display eye offsets              | `false`  |
/// | `more_layers`        | Extra VR layer pair                           | `false`  |
/// | `gs_instancing`      | Backend supports GS invocations               | `false`  |
/// | `depth_clamp`        | Backend emulates depth clamp via clip planes  | `false`  |
/// | `binding_layout`     | Backend supports explicit binding layouts     | `true`   |
/// | `fast_depth_calc`    | Depth computed without a clip-space varying   | `true`   |
/// | `per_pixel_lighting` | Thread normals/world positions to the PS      | `false`  |
/// | `driver_bugs`        | Active driver workarounds                     | empty    |
///
/// Every field that can change emitted text is folded into [`bits`](Self::bits),
/// so `(uid, host.bits())` is a complete cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub api: ApiType,
    pub wireframe: bool,
    pub msaa: bool,
    pub ssaa: bool,
    pub stereo: bool,
    pub vr: bool,
    pub more_layers: bool,
    pub gs_instancing: bool,
    pub depth_clamp: bool,
    pub binding_layout: bool,
    pub fast_depth_calc: bool,
    pub per_pixel_lighting: bool,
    pub driver_bugs: DriverBugs,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            api: ApiType::OpenGl,
            wireframe: false,
            msaa: false,
            ssaa: false,
            stereo: false,
            vr: false,
            more_layers: false,
            gs_instancing: false,
            depth_clamp: false,
            binding_layout: true,
            fast_depth_calc: true,
            per_pixel_lighting: false,
            driver_bugs: DriverBugs::empty(),
        }
    }
}

impl HostConfig {
    /// Number of parallel output views a single invocation writes to.
    ///
    /// 1 for mono, 2 for stereo, up to 4 with the extra VR layer pair.
    #[inline]
    #[must_use]
    pub fn layers(&self) -> u32 {
        u32::from(self.more_layers) * 2 + u32::from(self.stereo) + 1
    }

    /// Whether emitted vertices carry a layer index.
    #[inline]
    #[must_use]
    pub fn is_layered(&self) -> bool {
        self.stereo || self.more_layers || self.vr
    }

    /// Whether the clip-distance forwarding workaround is active.
    #[inline]
    #[must_use]
    pub fn forwards_clip_distance(&self) -> bool {
        self.depth_clamp && self.driver_bugs.contains(DriverBugs::BROKEN_CLIP_DISTANCE)
    }

    /// Packs every text-affecting field into a stable bitfield.
    ///
    /// Layout (LSB first): api:2, wireframe, msaa, ssaa, stereo, vr,
    /// more_layers, gs_instancing, depth_clamp, binding_layout,
    /// fast_depth_calc, per_pixel_lighting, driver_bugs:8.
    #[must_use]
    pub fn bits(&self) -> u32 {
        let api = match self.api {
            ApiType::OpenGl => 0,
            ApiType::Vulkan => 1,
            ApiType::D3D => 2,
        };
        let flags = [
            self.wireframe,
            self.msaa,
            self.ssaa,
            self.stereo,
            self.vr,
            self.more_layers,
            self.gs_instancing,
            self.depth_clamp,
            self.binding_layout,
            self.fast_depth_calc,
            self.per_pixel_lighting,
        ];

        let mut bits = api;
        for (i, flag) in flags.into_iter().enumerate() {
            bits |= u32::from(flag) << (2 + i);
        }
        bits | ((self.driver_bugs.bits() & 0xff) << 13)
    }

    /// Parses a (possibly partial) JSON document; missing fields take their
    /// defaults.
    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Loads a JSON host configuration from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let host = Self::from_json(&source)?;
        log::debug!("Loaded host config from {}: {host:?}", path.display());
        Ok(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_formula() {
        let mono = HostConfig::default();
        assert_eq!(mono.layers(), 1);

        let stereo = HostConfig {
            stereo: true,
            ..Default::default()
        };
        assert_eq!(stereo.layers(), 2);

        let quad = HostConfig {
            stereo: true,
            more_layers: true,
            ..Default::default()
        };
        assert_eq!(quad.layers(), 4);
    }

    #[test]
    fn test_vr_alone_is_layered() {
        let vr = HostConfig {
            vr: true,
            ..Default::default()
        };
        assert!(vr.is_layered());
        assert_eq!(vr.layers(), 1);

        let extra = HostConfig {
            more_layers: true,
            ..Default::default()
        };
        assert!(extra.is_layered());
        assert_eq!(extra.layers(), 3);
        assert!(!HostConfig::default().is_layered());
    }

    #[test]
    fn test_bits_distinguish_fields() {
        let base = HostConfig::default();
        let with = |edit: fn(&mut HostConfig)| {
            let mut host = base;
            edit(&mut host);
            host
        };
        let variants = [
            with(|h| h.api = ApiType::Vulkan),
            with(|h| h.api = ApiType::D3D),
            with(|h| h.wireframe = true),
            with(|h| h.msaa = true),
            with(|h| h.ssaa = true),
            with(|h| h.stereo = true),
            with(|h| h.vr = true),
            with(|h| h.more_layers = true),
            with(|h| h.gs_instancing = true),
            with(|h| h.depth_clamp = true),
            with(|h| h.binding_layout = false),
            with(|h| h.fast_depth_calc = false),
            with(|h| h.per_pixel_lighting = true),
            with(|h| h.driver_bugs = DriverBugs::BROKEN_CLIP_DISTANCE),
        ];

        let mut seen = vec![base.bits()];
        for host in variants {
            assert!(!seen.contains(&host.bits()), "collision for {host:?}");
            seen.push(host.bits());
        }
    }

    #[test]
    fn test_api_from_str() {
        assert_eq!("OpenGL".parse::<ApiType>().unwrap(), ApiType::OpenGl);
        assert_eq!("vk".parse::<ApiType>().unwrap(), ApiType::Vulkan);
        assert_eq!("d3d".parse::<ApiType>().unwrap(), ApiType::D3D);
        assert!("metal".parse::<ApiType>().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let host = HostConfig::from_json(r#"{ "api": "vulkan", "stereo": true }"#).unwrap();
        assert_eq!(host.api, ApiType::Vulkan);
        assert!(host.stereo);
        assert!(host.binding_layout);
        assert!(host.fast_depth_calc);
        assert!(host.driver_bugs.is_empty());
    }

    #[test]
    fn test_json_round_trip_keeps_bits() {
        let host = HostConfig {
            api: ApiType::D3D,
            wireframe: true,
            depth_clamp: true,
            driver_bugs: DriverBugs::BROKEN_CLIP_DISTANCE,
            ..Default::default()
        };
        let json = serde_json::to_string(&host).unwrap();
        let restored = HostConfig::from_json(&json).unwrap();
        assert_eq!(restored.bits(), host.bits());
    }
}
