//! WGSL shaders for the outline passes
//!
//! Each pass is assembled from shared pieces:
//! - [`UNIFORMS_WGSL`]: the `Uniforms` struct, matching `OutlineUniforms`
//! - [`FULLSCREEN_WGSL`]: fullscreen-triangle vertex stage
//! - a silhouette accessor, multisampled or not, bound at `binding(1)`
//! - the pass body

use contour_core::ShaderPass;

/// Parameter block shared by every pass (48 bytes)
pub const UNIFORMS_WGSL: &str = r#"
struct Uniforms {
    color: vec4<f32>,
    target_size: vec2<f32>,
    outline_width: f32,
    step_width: f32,
    axis_step: vec2<f32>,
    sample_count: u32,
    _padding: u32,
}

@group(0) @binding(0) var<uniform> uniforms: Uniforms;

// Texels without edge information hold (-1, -1)
const NO_EDGE: vec2<f32> = vec2<f32>(-1.0, -1.0);
"#;

/// Fullscreen triangle covering the whole target
pub const FULLSCREEN_WGSL: &str = r#"
struct VertexOutput {
    @builtin(position) position: vec4<f32>,
}

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    var out: VertexOutput;
    let uv = vec2<f32>(
        f32((vertex_index << 1u) & 2u),
        f32(vertex_index & 2u)
    );
    out.position = vec4<f32>(uv * 2.0 - 1.0, 0.0, 1.0);
    return out;
}

fn pixel_of(position: vec4<f32>) -> vec2<i32> {
    return vec2<i32>(floor(position.xy));
}

fn in_target(p: vec2<i32>) -> bool {
    let size = vec2<i32>(uniforms.target_size);
    return p.x >= 0 && p.y >= 0 && p.x < size.x && p.y < size.y;
}
"#;

/// Silhouette coverage for a multisampled mask
pub const SILHOUETTE_ACCESS_MULTISAMPLED_WGSL: &str = r#"
@group(0) @binding(1) var silhouette: texture_multisampled_2d<f32>;

fn coverage_at(p: vec2<i32>) -> f32 {
    let samples = textureNumSamples(silhouette);
    var covered = 0.0;
    for (var i = 0u; i < samples; i = i + 1u) {
        covered = covered + step(0.5, textureLoad(silhouette, p, i32(i)).r);
    }
    return covered / f32(samples);
}
"#;

/// Silhouette coverage for a single-sample mask
pub const SILHOUETTE_ACCESS_WGSL: &str = r#"
@group(0) @binding(1) var silhouette: texture_2d<f32>;

fn coverage_at(p: vec2<i32>) -> f32 {
    return step(0.5, textureLoad(silhouette, p, 0).r);
}
"#;

/// Silhouette fill
///
/// Draws scene triangles given in pixel coordinates as flat coverage.
pub const SILHOUETTE_SHADER: &str = r#"
// ============================================================================
// Contour Silhouette Fill
// ============================================================================

struct VertexInput {
    @location(0) position: vec2<f32>,
}

@vertex
fn vs_main(in: VertexInput) -> @builtin(position) vec4<f32> {
    let ndc = in.position / uniforms.target_size * 2.0 - 1.0;
    return vec4<f32>(ndc.x, -ndc.y, 0.0, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 0.0, 0.0, 1.0);
}
"#;

/// Jump flood seeding
///
/// Boundary pixels (partial coverage, or full coverage next to an empty
/// 4-neighbour) store their edge position in target UV; all others store
/// `NO_EDGE`. Neighbours outside the target read as the pixel's own coverage.
pub const JFA_INIT_SHADER: &str = r#"
// ============================================================================
// Contour Jump Flood Init
// ============================================================================

fn coverage_or(p: vec2<i32>, fallback: f32) -> f32 {
    if (!in_target(p)) {
        return fallback;
    }
    return coverage_at(p);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let p = pixel_of(in.position);
    let c = coverage_at(p);
    if (c <= 0.0) {
        return vec4<f32>(NO_EDGE, 0.0, 0.0);
    }

    let left = coverage_or(p + vec2<i32>(-1, 0), c);
    let right = coverage_or(p + vec2<i32>(1, 0), c);
    let up = coverage_or(p + vec2<i32>(0, -1), c);
    let down = coverage_or(p + vec2<i32>(0, 1), c);

    let boundary = c < 1.0 || min(min(left, right), min(up, down)) <= 0.0;
    if (!boundary) {
        return vec4<f32>(NO_EDGE, 0.0, 0.0);
    }

    // Coverage grows inward; the edge lies against the gradient
    let gradient = vec2<f32>(right - left, down - up);
    var position = vec2<f32>(p) + 0.5;
    let len = length(gradient);
    if (len > 0.0) {
        position = position - gradient / len * (c - 0.5);
    }
    return vec4<f32>(position / uniforms.target_size, 0.0, 0.0);
}
"#;

/// Jump flood propagation
///
/// `fs_flood` samples the centre and the 8 neighbours `step_width` pixels
/// away; `fs_flood_axis` samples the centre and two neighbours along
/// `axis_step`. Both keep the closest edge, first candidate winning ties.
pub const JFA_FLOOD_SHADER: &str = r#"
// ============================================================================
// Contour Jump Flood
// ============================================================================

@group(0) @binding(1) var nearest: texture_2d<f32>;

const FAR: f32 = 3.0e38;

// (uv.x, uv.y, squared pixel distance)
fn candidate(q: vec2<i32>, centre: vec2<f32>) -> vec3<f32> {
    if (!in_target(q)) {
        return vec3<f32>(NO_EDGE, FAR);
    }
    let uv = textureLoad(nearest, q, 0).xy;
    if (uv.x < 0.0 || uv.y < 0.0) {
        return vec3<f32>(NO_EDGE, FAR);
    }
    let d = uv * uniforms.target_size - centre;
    return vec3<f32>(uv, dot(d, d));
}

@fragment
fn fs_flood(in: VertexOutput) -> @location(0) vec4<f32> {
    let p = pixel_of(in.position);
    let centre = vec2<f32>(p) + 0.5;
    let jump = i32(floor(uniforms.step_width));

    var best = vec3<f32>(NO_EDGE, FAR);
    for (var dy = -1; dy <= 1; dy = dy + 1) {
        for (var dx = -1; dx <= 1; dx = dx + 1) {
            let c = candidate(p + vec2<i32>(dx, dy) * jump, centre);
            if (c.z < best.z) {
                best = c;
            }
        }
    }
    return vec4<f32>(best.xy, 0.0, 0.0);
}

@fragment
fn fs_flood_axis(in: VertexOutput) -> @location(0) vec4<f32> {
    let p = pixel_of(in.position);
    let centre = vec2<f32>(p) + 0.5;
    let offset = vec2<i32>(uniforms.axis_step) * i32(floor(uniforms.step_width));

    var best = vec3<f32>(NO_EDGE, FAR);
    for (var k = -1; k <= 1; k = k + 1) {
        let c = candidate(p + offset * k, centre);
        if (c.z < best.z) {
            best = c;
        }
    }
    return vec4<f32>(best.xy, 0.0, 0.0);
}
"#;

/// Outline compositing
///
/// Blended source-over onto the color target by the pipeline blend state.
pub const JFA_OUTLINE_SHADER: &str = r#"
// ============================================================================
// Contour Outline Composite
// ============================================================================

@group(0) @binding(2) var nearest: texture_2d<f32>;

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let p = pixel_of(in.position);
    let uv = textureLoad(nearest, p, 0).xy;
    if (uv.x < 0.0 || uv.y < 0.0) {
        discard;
    }

    let dist = distance(uv * uniforms.target_size, vec2<f32>(p) + 0.5);
    let coverage = clamp(uniforms.outline_width - dist + 0.5, 0.0, 1.0) * (1.0 - coverage_at(p));
    let alpha = uniforms.color.a * coverage;
    if (alpha <= 0.0) {
        discard;
    }
    return vec4<f32>(uniforms.color.rgb, alpha);
}
"#;

/// Full WGSL source for a pass
///
/// `multisampled` selects the silhouette accessor for passes reading the mask.
pub fn source(pass: ShaderPass, multisampled: bool) -> String {
    let access = if multisampled {
        SILHOUETTE_ACCESS_MULTISAMPLED_WGSL
    } else {
        SILHOUETTE_ACCESS_WGSL
    };
    match pass {
        ShaderPass::SilhouetteFill | ShaderPass::InteriorStencil => {
            [UNIFORMS_WGSL, SILHOUETTE_SHADER].concat()
        }
        ShaderPass::JfaInit => [UNIFORMS_WGSL, FULLSCREEN_WGSL, access, JFA_INIT_SHADER].concat(),
        ShaderPass::JfaFlood | ShaderPass::JfaFloodSingleAxis => {
            [UNIFORMS_WGSL, FULLSCREEN_WGSL, JFA_FLOOD_SHADER].concat()
        }
        ShaderPass::JfaOutline => {
            [UNIFORMS_WGSL, FULLSCREEN_WGSL, access, JFA_OUTLINE_SHADER].concat()
        }
    }
}

/// Fragment entry point for a pass
pub fn fragment_entry(pass: ShaderPass) -> &'static str {
    match pass {
        ShaderPass::JfaFlood => "fs_flood",
        ShaderPass::JfaFloodSingleAxis => "fs_flood_axis",
        _ => "fs_main",
    }
}
