//! WGSL sources for the point and line pipelines.
//!
//! Both share one uniform block at group 0, binding 0. Its layout must match
//! [`Uniforms`](super::Uniforms).

/// Instanced camera-facing quads, one instance per live point.
///
/// Quads are expanded in view space so the point size is in world units and
/// shrinks with distance.
pub const POINT_SHADER: &str = r#"
struct Uniforms {
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
    model: mat4x4<f32>,
    color: vec4<f32>,
    point_size: f32,
    line_opacity: f32,
    _pad0: f32,
    _pad1: f32,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) point_pos: vec3<f32>,
) -> VertexOutput {
    var quad_vertices = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
    );
    let quad_pos = quad_vertices[vertex_index];

    var view_pos = uniforms.view * uniforms.model * vec4<f32>(point_pos, 1.0);
    view_pos.x += quad_pos.x * uniforms.point_size * 0.5;
    view_pos.y += quad_pos.y * uniforms.point_size * 0.5;

    var out: VertexOutput;
    out.clip_position = uniforms.proj * view_pos;
    out.uv = quad_pos;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let dist = length(in.uv);
    if dist > 1.0 {
        discard;
    }
    let alpha = 1.0 - smoothstep(0.7, 1.0, dist);
    return vec4<f32>(uniforms.color.rgb, uniforms.color.a * alpha);
}
"#;

/// Line list over the edge segments.
pub const LINE_SHADER: &str = r#"
struct Uniforms {
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
    model: mat4x4<f32>,
    color: vec4<f32>,
    point_size: f32,
    line_opacity: f32,
    _pad0: f32,
    _pad1: f32,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) fade: f32,
};

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) fade: f32,
) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = uniforms.proj * uniforms.view * uniforms.model * vec4<f32>(position, 1.0);
    out.fade = fade;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let alpha = uniforms.line_opacity * mix(0.6, 1.0, in.fade);
    return vec4<f32>(uniforms.color.rgb, alpha);
}
"#;
