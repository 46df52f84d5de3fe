//! Geometry Shader Code Generator
//!
//! Expands a [`GeometryShaderUid`] under a [`HostConfig`] into the source of a
//! geometry-stage program. The program:
//!
//! - widens lines into quads, reproducing the fixed-function rasterizer's
//!   axis-aligned line caps (a line that is "more tall" than wide is extended
//!   left/right, otherwise up/down),
//! - expands points into camera-facing quads sized in screen space,
//! - passes triangles through,
//! - duplicates every primitive into each stereo/VR layer, either with a
//!   software loop or with hardware GS invocations,
//! - closes outlines in wireframe mode by re-emitting the first vertex.
//!
//! The algorithm is written once; all syntax that differs between target
//! APIs goes through a [`DialectEmitter`]. Generation is a pure function of
//! its inputs, so identical keys under an unchanged host configuration always
//! yield identical text.

use super::dialect::{DialectEmitter, emitter_for};
use super::shader_code::ShaderCode;
use super::uid::{GeometryShaderUid, MAX_TEX_GENS, PrimitiveType};
use super::vertex::{Channel, VertexShape};
use crate::settings::{ApiType, HostConfig};

/// Stereo eye offsets: `x`/`y` per-eye shift, `z` convergence; VR indexes
/// `[eye]` and `[eye + 2]`.
pub const I_STEREOPARAMS: &str = "cstereo";
/// Line width / point size: `x`/`y` viewport extent, `z` line width, `w` point size.
pub const I_LINEPTPARAMS: &str = "clinept";
/// Texture-coordinate seam correction: `[0]`/`[1]` line/point texgen masks,
/// `[2]`/`[3]` line/point denominators.
pub const I_TEXOFFSET: &str = "ctexoffset";

const LIGHT_STRUCT: &str = "struct Light {\n\
                            \tint4 color;\n\
                            \tfloat4 cosatt;\n\
                            \tfloat4 distatt;\n\
                            \tfloat4 pos;\n\
                            \tfloat4 dir;\n\
                            };\n";

// ─── Stage Layout ─────────────────────────────────────────────────────────────

/// Vertex and invocation bounds declared by the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StageLayout {
    pub primitive: PrimitiveType,
    /// Vertices per input primitive.
    pub vertex_in: u32,
    /// Vertices emitted per input primitive and layer.
    pub vertex_out: u32,
    /// Output views per input primitive.
    pub layers: u32,
    /// Layers are produced by hardware invocations instead of a loop.
    pub instancing: bool,
    /// Vertices carry a layer index.
    pub layered: bool,
    /// Output is a line strip rather than a triangle strip.
    pub wireframe: bool,
}

impl StageLayout {
    #[must_use]
    pub fn new(primitive: PrimitiveType, host: &HostConfig) -> Self {
        Self {
            primitive,
            vertex_in: primitive.vertex_in(),
            vertex_out: primitive.vertex_out(host.wireframe),
            layers: host.layers(),
            instancing: host.gs_instancing,
            layered: host.is_layered(),
            wireframe: host.wireframe,
        }
    }

    /// Declared output vertex bound of one invocation.
    #[inline]
    #[must_use]
    pub fn max_vertices(&self) -> u32 {
        if self.instancing {
            self.vertex_out
        } else {
            self.vertex_out * self.layers
        }
    }

    /// Declared invocation count.
    #[inline]
    #[must_use]
    pub fn invocations(&self) -> u32 {
        if self.instancing { self.layers } else { 1 }
    }

    /// Whether `eye` is driven by a software loop.
    #[inline]
    #[must_use]
    pub fn loops_over_layers(&self) -> bool {
        self.layered && !self.instancing
    }
}

// ─── Entry Points ─────────────────────────────────────────────────────────────

/// Generates the geometry shader for `uid`.
///
/// The text is emitted for `api`; `host.api` is not consulted. Callers that
/// key results by [`HostConfig::bits`] must pass `host.api` so the key
/// matches the text, as [`GeometryShaderManager`](super::GeometryShaderManager)
/// does.
///
/// # Panics
///
/// If `uid` carries more than [`MAX_TEX_GENS`] texture generators.
#[must_use]
pub fn generate_geometry_shader_code(
    api: ApiType,
    host: &HostConfig,
    uid: &GeometryShaderUid,
) -> ShaderCode {
    assert!(
        uid.num_tex_gens() <= MAX_TEX_GENS,
        "malformed geometry shader uid: {uid:?}"
    );

    let shape = VertexShape::for_vertex_output(uid.num_tex_gens(), host);
    let code = GeometryShaderGen::new(api, host, uid.primitive_type(), &shape).generate();

    log::debug!(
        "Generated {} geometry shader for {uid:?} ({} bytes)",
        api.name(),
        code.len()
    );
    code
}

/// Generates the geometry shader used for the avatar overlay, whose vertices
/// always carry exactly one color and one texture coordinate.
///
/// Like [`generate_geometry_shader_code`], the text follows `api` rather
/// than `host.api`.
#[must_use]
pub fn generate_avatar_geometry_shader_code(
    primitive: PrimitiveType,
    api: ApiType,
    host: &HostConfig,
) -> ShaderCode {
    let shape = VertexShape::avatar();
    let code = GeometryShaderGen::new(api, host, primitive, &shape).generate();

    log::debug!(
        "Generated {} avatar geometry shader for {primitive:?} ({} bytes)",
        api.name(),
        code.len()
    );
    code
}

// ─── Generator ────────────────────────────────────────────────────────────────

struct GeometryShaderGen<'a> {
    emitter: &'static dyn DialectEmitter,
    host: &'a HostConfig,
    shape: &'a VertexShape,
    stage: StageLayout,
    out: ShaderCode,
}

impl<'a> GeometryShaderGen<'a> {
    fn new(
        api: ApiType,
        host: &'a HostConfig,
        primitive: PrimitiveType,
        shape: &'a VertexShape,
    ) -> Self {
        Self {
            emitter: emitter_for(api),
            host,
            shape,
            stage: StageLayout::new(primitive, host),
            out: ShaderCode::with_capacity(4096),
        }
    }

    fn generate(mut self) -> ShaderCode {
        self.write_declarations();
        self.write_primitive_setup();

        if self.stage.layered {
            if self.stage.instancing {
                // Each hardware invocation renders one layer.
                self.out.push_str("\tint eye = InstanceID;\n");
            } else {
                writeln!(
                    self.out,
                    "\tfor (int eye = 0; eye < {}; ++eye) {{",
                    self.stage.layers
                );
            }
        }

        if self.stage.wireframe {
            self.out.push_str("\tVS_OUTPUT first;\n");
        }

        writeln!(self.out, "\tfor (int i = 0; i < {}; ++i) {{", self.stage.vertex_in);
        self.write_input_vertex();
        if self.stage.layered {
            self.write_layer_offset();
        }
        self.write_expansion();
        self.out.push_str("\t}\n");

        self.end_primitive();

        if self.stage.loops_over_layers() {
            self.out.push_str("\t}\n");
        }

        self.out.push_str("}\n");
        self.out
    }

    fn write_declarations(&mut self) {
        let emitter = self.emitter;

        emitter.write_stage_header(&mut self.out, &self.stage);
        self.out.push_str(LIGHT_STRUCT);

        emitter.open_uniform_block(&mut self.out);
        writeln!(self.out, "\tfloat4 {I_STEREOPARAMS};");
        writeln!(self.out, "\tfloat4 {I_LINEPTPARAMS};");
        writeln!(self.out, "\tint4 {I_TEXOFFSET};");
        self.out.push_str("};\n");

        self.out.push_str("struct VS_OUTPUT {\n");
        for member in self.shape.members() {
            emitter.define_member(&mut self.out, "", member);
        }
        self.out.push_str("};\n");

        emitter.write_interface(&mut self.out, self.shape, &self.stage, self.host);
    }

    /// Per-primitive values computed once before the layer loop.
    fn write_primitive_setup(&mut self) {
        match self.stage.primitive {
            PrimitiveType::Lines => {
                let endpoints = [("start", "0"), ("end", "1")];
                self.emitter
                    .declare_inputs(&mut self.out, self.shape, &endpoints);

                // Line caps are vertical or horizontal depending on the slope,
                // never perpendicular to the line.
                let p = I_LINEPTPARAMS;
                self.out.push_str("\tfloat2 offset;\n");
                self.out.push_str(
                    "\tfloat2 to = abs(end.pos.xy / end.pos.w - start.pos.xy / start.pos.w);\n",
                );
                writeln!(self.out, "\tif ({p}.y * to.y > {p}.x * to.x) {{");
                // More tall: extend left and right by half the line width.
                writeln!(self.out, "\t\toffset = float2({p}.z / {p}.x, 0);");
                self.out.push_str("\t} else {\n");
                // More wide: extend up and down.
                writeln!(self.out, "\t\toffset = float2(0, -{p}.z / {p}.y);");
                self.out.push_str("\t}\n");
            }
            PrimitiveType::Points => {
                self.emitter
                    .declare_inputs(&mut self.out, self.shape, &[("center", "0")]);

                // Offset from the center to the upper right corner.
                let p = I_LINEPTPARAMS;
                writeln!(
                    self.out,
                    "\tfloat2 offset = float2({p}.w / {p}.x, -{p}.w / {p}.y) * center.pos.w;"
                );
            }
            PrimitiveType::Triangles | PrimitiveType::TriangleStrip => {}
        }
    }

    fn write_input_vertex(&mut self) {
        self.emitter.declare_inputs(&mut self.out, self.shape, &[("f", "i")]);

        if self.host.forwards_clip_distance() {
            self.emitter
                .forward_clip_distances(&mut self.out, self.shape, "f");
        }
    }

    fn write_layer_offset(&mut self) {
        let s = I_STEREOPARAMS;
        self.emitter.select_layer(&mut self.out, self.host.vr);

        if self.host.vr {
            // [eye] is the per-eye camera shift, [eye + 2] the off-axis
            // projection shift.
            if self.shape.has(Channel::ClipPos) {
                writeln!(
                    self.out,
                    "\tf.clipPos.x += {s}[eye] - {s}[eye+2] * f.clipPos.w;"
                );
            }
            writeln!(self.out, "\tf.pos.x += {s}[eye] - {s}[eye+2] * f.pos.w;");
        } else {
            // Horizontal shift proportional to depth minus convergence, so
            // geometry nearer than the convergence plane pops out of the screen.
            writeln!(self.out, "\tfloat hoffset = (eye == 0) ? {s}.x : {s}.y;");
            writeln!(self.out, "\tf.pos.x += hoffset * (f.pos.w - {s}.z);");
        }
    }

    fn write_expansion(&mut self) {
        let t = I_TEXOFFSET;
        let tex_gens = self.shape.tex_gen_count();

        match self.stage.primitive {
            PrimitiveType::Lines => {
                self.out.push_str("\tVS_OUTPUT l = f;\n\tVS_OUTPUT r = f;\n");
                self.out.push_str("\tl.pos.xy -= offset * l.pos.w;\n");
                self.out.push_str("\tr.pos.xy += offset * r.pos.w;\n");

                writeln!(self.out, "\tif ({t}[2] != 0) {{");
                writeln!(self.out, "\tfloat texOffset = 1.0 / float({t}[2]);");
                for i in 0..tex_gens {
                    writeln!(self.out, "\tif ((({t}[0] >> {i}) & 0x1) != 0)");
                    writeln!(self.out, "\t\tr.tex{i}.x += texOffset;");
                }
                self.out.push_str("\t}\n");

                self.emit_vertex("l", true);
                self.emit_vertex("r", false);
            }
            PrimitiveType::Points => {
                self.out.push_str(
                    "\tVS_OUTPUT ll = f;\n\
                     \tVS_OUTPUT lr = f;\n\
                     \tVS_OUTPUT ul = f;\n\
                     \tVS_OUTPUT ur = f;\n",
                );
                self.out.push_str(
                    "\tll.pos.xy += float2(-1,-1) * offset;\n\
                     \tlr.pos.xy += float2(1,-1) * offset;\n\
                     \tul.pos.xy += float2(-1,1) * offset;\n\
                     \tur.pos.xy += offset;\n",
                );

                writeln!(self.out, "\tif ({t}[3] != 0) {{");
                writeln!(
                    self.out,
                    "\tfloat2 texOffset = float2(1.0 / float({t}[3]), 1.0 / float({t}[3]));"
                );
                for i in 0..tex_gens {
                    writeln!(self.out, "\tif ((({t}[1] >> {i}) & 0x1) != 0) {{");
                    writeln!(self.out, "\t\tul.tex{i}.xy += float2(0,1) * texOffset;");
                    writeln!(self.out, "\t\tur.tex{i}.xy += texOffset;");
                    writeln!(self.out, "\t\tlr.tex{i}.xy += float2(1,0) * texOffset;");
                    self.out.push_str("\t}\n");
                }
                self.out.push_str("\t}\n");

                self.emit_vertex("ll", true);
                self.emit_vertex("lr", false);
                self.emit_vertex("ul", false);
                self.emit_vertex("ur", false);
            }
            PrimitiveType::Triangles | PrimitiveType::TriangleStrip => {
                self.emit_vertex("f", true);
            }
        }
    }

    fn emit_vertex(&mut self, vertex: &str, first_vertex: bool) {
        if self.stage.wireframe && first_vertex {
            writeln!(self.out, "\tif (i == 0) first = {vertex};");
        }

        self.emitter.write_vertex(&mut self.out, self.shape, vertex);
        self.emitter.emit_vertex(&mut self.out);
    }

    fn end_primitive(&mut self) {
        if self.stage.wireframe {
            self.emit_vertex("first", false);
        }
        self.emitter.end_primitive(&mut self.out);
    }
}
