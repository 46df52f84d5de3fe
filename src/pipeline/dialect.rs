//! Target-Dialect Emitters
//!
//! Formatting helpers for the two shading-language families. The expansion
//! algorithm in [`shader_gen`](super::shader_gen) is written once against
//! [`DialectEmitter`]; everything that differs between the GLSL-family
//! (OpenGL, Vulkan) and HLSL-family (D3D) vocabularies lives here.
//!
//! | Concern            | GLSL                               | HLSL                                  |
//! |--------------------|------------------------------------|---------------------------------------|
//! | Stage declaration  | `layout(lines) in;` / `layout(...) out;` | `[maxvertexcount(N)]` on `main`  |
//! | Uniforms           | `UBO_BINDING(std140, 3) uniform`   | `cbuffer`                             |
//! | Interface          | `in`/`out VertexData` blocks       | `VertexData` struct + stream argument |
//! | Emit / restart     | `EmitVertex()` / `EndPrimitive()`  | `output.Append` / `output.RestartStrip` |
//!
//! Emitters are stateless: the same inputs always produce byte-identical text.

use super::shader_code::ShaderCode;
use super::shader_gen::StageLayout;
use super::uid::PrimitiveType;
use super::vertex::{Channel, VaryingMember, VertexShape};
use crate::settings::{ApiType, HostConfig};

// ─── Emitter Trait ────────────────────────────────────────────────────────────

/// Per-dialect formatting of geometry-stage declarations and statements.
pub trait DialectEmitter: Sync {
    fn api(&self) -> ApiType;

    /// Declarations that must precede everything else in the program.
    fn write_stage_header(&self, out: &mut ShaderCode, stage: &StageLayout);

    /// Opens the `GSBlock` uniform block.
    fn open_uniform_block(&self, out: &mut ShaderCode);

    /// Declares one `VS_OUTPUT` member.
    fn define_member(&self, out: &mut ShaderCode, qualifier: &str, member: &VaryingMember);

    /// Stage input/output interface, the `main` signature and its opening brace.
    fn write_interface(
        &self,
        out: &mut ShaderCode,
        shape: &VertexShape,
        stage: &StageLayout,
        host: &HostConfig,
    );

    /// Declares local `VS_OUTPUT` copies of input vertices.
    ///
    /// Each entry is `(local_name, input_slot)`; the slot is an index
    /// expression such as `0` or `i`.
    fn declare_inputs(
        &self,
        out: &mut ShaderCode,
        shape: &VertexShape,
        vertices: &[(&str, &str)],
    );

    /// Copies the vertex stage's clip distances into `vertex` explicitly.
    fn forward_clip_distances(&self, _out: &mut ShaderCode, _shape: &VertexShape, _vertex: &str) {}

    /// Routes the current vertex to layer `eye`.
    fn select_layer(&self, out: &mut ShaderCode, vr: bool);

    /// Writes `vertex` into the stage output (without appending it).
    fn write_vertex(&self, out: &mut ShaderCode, shape: &VertexShape, vertex: &str);

    /// Appends the stage output to the current strip.
    fn emit_vertex(&self, out: &mut ShaderCode);

    /// Closes the current strip.
    fn end_primitive(&self, out: &mut ShaderCode);
}

static OPENGL_EMITTER: GlslEmitter = GlslEmitter { api: ApiType::OpenGl };
static VULKAN_EMITTER: GlslEmitter = GlslEmitter { api: ApiType::Vulkan };
static D3D_EMITTER: HlslEmitter = HlslEmitter;

/// Returns the emitter for `api`.
#[must_use]
pub fn emitter_for(api: ApiType) -> &'static dyn DialectEmitter {
    match api {
        ApiType::OpenGl => &OPENGL_EMITTER,
        ApiType::Vulkan => &VULKAN_EMITTER,
        ApiType::D3D => &D3D_EMITTER,
    }
}

/// Interpolation qualifier for stage interface members.
///
/// Without explicit binding-layout support, qualifiers inside a GLSL
/// interface block must carry their storage direction (`centroid in`).
#[must_use]
pub fn interpolation_qualifier(
    msaa: bool,
    ssaa: bool,
    binding_layout: bool,
    in_interface_block: bool,
    input: bool,
) -> &'static str {
    if !msaa {
        return "";
    }

    if in_interface_block && !binding_layout {
        match (ssaa, input) {
            (false, true) => "centroid in",
            (false, false) => "centroid out",
            (true, true) => "sample in",
            (true, false) => "sample out",
        }
    } else if ssaa {
        "sample"
    } else {
        "centroid"
    }
}

/// `dst.member = src.member;` for every member of `shape`.
pub(crate) fn assign_members(out: &mut ShaderCode, shape: &VertexShape, dst: &str, src: &str) {
    for member in shape.members() {
        let ident = member.ident();
        writeln!(out, "\t{dst}.{ident} = {src}.{ident};");
    }
}

fn write_qualified(out: &mut ShaderCode, qualifier: &str) {
    if !qualifier.is_empty() {
        out.push_str(qualifier);
        out.push_str(" ");
    }
}

// ─── GLSL ─────────────────────────────────────────────────────────────────────

/// Block/layout-qualifier dialect shared by OpenGL and Vulkan.
///
/// Vulkan's clip space has Y pointing down, so every written position is
/// flipped; OpenGL instead writes `gl_ClipDistance` when depth clamping is
/// emulated.
#[derive(Debug, Clone, Copy)]
pub struct GlslEmitter {
    api: ApiType,
}

fn glsl_input_primitive(primitive: PrimitiveType) -> &'static str {
    match primitive {
        PrimitiveType::Points => "points",
        PrimitiveType::Lines => "lines",
        PrimitiveType::Triangles | PrimitiveType::TriangleStrip => "triangles",
    }
}

impl DialectEmitter for GlslEmitter {
    fn api(&self) -> ApiType {
        self.api
    }

    fn write_stage_header(&self, out: &mut ShaderCode, stage: &StageLayout) {
        let input = glsl_input_primitive(stage.primitive);
        let strip = if stage.wireframe { "line" } else { "triangle" };
        let max_vertices = stage.max_vertices();

        if stage.instancing {
            writeln!(out, "layout({input}, invocations = {}) in;", stage.layers);
        } else {
            writeln!(out, "layout({input}) in;");
        }
        writeln!(out, "layout({strip}_strip, max_vertices = {max_vertices}) out;");
    }

    fn open_uniform_block(&self, out: &mut ShaderCode) {
        out.push_str("UBO_BINDING(std140, 3) uniform GSBlock {\n");
    }

    fn define_member(&self, out: &mut ShaderCode, qualifier: &str, member: &VaryingMember) {
        out.push_str("\t");
        write_qualified(out, qualifier);
        writeln!(out, "{} {};", member.ty, member.ident());
    }

    fn write_interface(
        &self,
        out: &mut ShaderCode,
        shape: &VertexShape,
        stage: &StageLayout,
        host: &HostConfig,
    ) {
        if stage.instancing {
            out.push_str("#define InstanceID gl_InvocationID\n");
        }

        let in_qualifier =
            interpolation_qualifier(host.msaa, host.ssaa, host.binding_layout, true, true);
        out.push_str("VARYING_LOCATION(0) in VertexData {\n");
        for member in shape.members() {
            self.define_member(out, in_qualifier, member);
        }
        writeln!(out, "}} vs[{}];", stage.vertex_in);

        let out_qualifier =
            interpolation_qualifier(host.msaa, host.ssaa, host.binding_layout, true, false);
        out.push_str("VARYING_LOCATION(0) out VertexData {\n");
        for member in shape.members() {
            self.define_member(out, out_qualifier, member);
        }
        if stage.layered {
            out.push_str("\tflat int layer;\n");
        }
        out.push_str("} ps;\n");

        out.push_str("void main()\n{\n");
    }

    fn declare_inputs(
        &self,
        out: &mut ShaderCode,
        shape: &VertexShape,
        vertices: &[(&str, &str)],
    ) {
        let names: Vec<&str> = vertices.iter().map(|(name, _)| *name).collect();
        writeln!(out, "\tVS_OUTPUT {};", names.join(", "));

        for (name, slot) in vertices {
            assign_members(out, shape, name, &format!("vs[{slot}]"));
        }
    }

    fn forward_clip_distances(&self, out: &mut ShaderCode, shape: &VertexShape, vertex: &str) {
        let clip_distances = shape
            .members()
            .iter()
            .filter(|m| m.channel == Channel::ClipDistance);
        for member in clip_distances {
            let index = member.index.unwrap_or(0);
            writeln!(
                out,
                "\t{vertex}.{} = gl_in[i].gl_ClipDistance[{index}];",
                member.ident()
            );
        }
    }

    fn select_layer(&self, out: &mut ShaderCode, vr: bool) {
        out.push_str("\tps.layer = eye;\n");
        if self.api == ApiType::OpenGl || !vr {
            out.push_str("\tgl_Layer = eye;\n");
        }
    }

    fn write_vertex(&self, out: &mut ShaderCode, shape: &VertexShape, vertex: &str) {
        writeln!(out, "\tgl_Position = {vertex}.pos;");

        if self.api == ApiType::Vulkan {
            out.push_str("\tgl_Position.y = -gl_Position.y;\n");
        } else {
            let clip_distances = shape
                .members()
                .iter()
                .filter(|m| m.channel == Channel::ClipDistance);
            for member in clip_distances {
                let index = member.index.unwrap_or(0);
                writeln!(out, "\tgl_ClipDistance[{index}] = {vertex}.{};", member.ident());
            }
        }

        assign_members(out, shape, "ps", vertex);
    }

    fn emit_vertex(&self, out: &mut ShaderCode) {
        out.push_str("\tEmitVertex();\n");
    }

    fn end_primitive(&self, out: &mut ShaderCode) {
        out.push_str("\tEndPrimitive();\n");
    }
}

// ─── HLSL ─────────────────────────────────────────────────────────────────────

/// Register/cbuffer dialect used by D3D.
#[derive(Debug, Clone, Copy)]
pub struct HlslEmitter;

fn hlsl_input_primitive(primitive: PrimitiveType) -> &'static str {
    match primitive {
        PrimitiveType::Points => "point",
        PrimitiveType::Lines => "line",
        PrimitiveType::Triangles | PrimitiveType::TriangleStrip => "triangle",
    }
}

impl DialectEmitter for HlslEmitter {
    fn api(&self) -> ApiType {
        ApiType::D3D
    }

    // HLSL declares topology and vertex bounds as attributes on `main`.
    fn write_stage_header(&self, _out: &mut ShaderCode, _stage: &StageLayout) {}

    fn open_uniform_block(&self, out: &mut ShaderCode) {
        out.push_str("cbuffer GSBlock {\n");
    }

    fn define_member(&self, out: &mut ShaderCode, qualifier: &str, member: &VaryingMember) {
        out.push_str("\t");
        write_qualified(out, qualifier);
        writeln!(out, "{} {} : {};", member.ty, member.ident(), member.semantic());
    }

    fn write_interface(
        &self,
        out: &mut ShaderCode,
        _shape: &VertexShape,
        stage: &StageLayout,
        _host: &HostConfig,
    ) {
        out.push_str("struct VertexData {\n");
        out.push_str("\tVS_OUTPUT o;\n");
        if stage.layered {
            out.push_str("\tuint layer : SV_RenderTargetArrayIndex;\n");
        }
        out.push_str("};\n");

        let input = hlsl_input_primitive(stage.primitive);
        let stream = if stage.wireframe { "Line" } else { "Triangle" };
        let vertex_in = stage.vertex_in;

        writeln!(out, "[maxvertexcount({})]", stage.max_vertices());
        if stage.instancing {
            writeln!(out, "[instance({})]", stage.layers);
            writeln!(
                out,
                "void main({input} VS_OUTPUT o[{vertex_in}], inout {stream}Stream<VertexData> output, in uint InstanceID : SV_GSInstanceID)"
            );
        } else {
            writeln!(
                out,
                "void main({input} VS_OUTPUT o[{vertex_in}], inout {stream}Stream<VertexData> output)"
            );
        }
        out.push_str("{\n");

        out.push_str("\tVertexData ps;\n");
    }

    fn declare_inputs(
        &self,
        out: &mut ShaderCode,
        _shape: &VertexShape,
        vertices: &[(&str, &str)],
    ) {
        for (name, slot) in vertices {
            writeln!(out, "\tVS_OUTPUT {name} = o[{slot}];");
        }
    }

    fn select_layer(&self, out: &mut ShaderCode, _vr: bool) {
        out.push_str("\tps.layer = eye;\n");
    }

    fn write_vertex(&self, out: &mut ShaderCode, _shape: &VertexShape, vertex: &str) {
        writeln!(out, "\tps.o = {vertex};");
    }

    fn emit_vertex(&self, out: &mut ShaderCode) {
        out.push_str("\toutput.Append(ps);\n");
    }

    fn end_primitive(&self, out: &mut ShaderCode) {
        out.push_str("\toutput.RestartStrip();\n");
    }
}
