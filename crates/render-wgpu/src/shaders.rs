/// WGSL shader for displayed model meshes: two directional lights plus
/// ambient, with the material factors folded into a per-mesh uniform.
pub const MODEL_SHADER: &str = r#"
struct FrameUniforms {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    key_dir: vec4<f32>,
    key_color: vec4<f32>,
    rim_dir: vec4<f32>,
    rim_color: vec4<f32>,
    ambient: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> frame: FrameUniforms;

struct MeshUniforms {
    model: mat4x4<f32>,
    base_color: vec4<f32>,
    emissive: vec4<f32>,
    // x = metallic, y = roughness
    factors: vec4<f32>,
};

@group(1) @binding(0)
var<uniform> mesh: MeshUniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let world_pos = mesh.model * vec4<f32>(vertex.position, 1.0);
    let world_normal = (mesh.model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = frame.view_proj * world_pos;
    out.world_pos = world_pos.xyz;
    out.world_normal = normalize(world_normal);
    return out;
}

fn light(normal: vec3<f32>, view_dir: vec3<f32>, dir: vec3<f32>, color: vec3<f32>,
         metallic: f32, roughness: f32, base: vec3<f32>) -> vec3<f32> {
    let l = normalize(-dir);
    let diffuse = max(dot(normal, l), 0.0) * (1.0 - 0.5 * metallic);
    let halfway = normalize(l + view_dir);
    let shininess = mix(256.0, 8.0, roughness);
    let spec = pow(max(dot(normal, halfway), 0.0), shininess) * mix(0.1, 1.0, metallic);
    let spec_tint = mix(vec3<f32>(1.0, 1.0, 1.0), base, metallic);
    return color * (base * diffuse + spec_tint * spec);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let normal = normalize(in.world_normal);
    let view_dir = normalize(frame.camera_pos.xyz - in.world_pos);
    let metallic = mesh.factors.x;
    let roughness = mesh.factors.y;
    let base = mesh.base_color.rgb;

    var shaded = frame.ambient.rgb * base;
    shaded += light(normal, view_dir, frame.key_dir.xyz, frame.key_color.rgb,
                    metallic, roughness, base);
    shaded += light(normal, view_dir, frame.rim_dir.xyz, frame.rim_color.rgb,
                    metallic, roughness, base);
    shaded += mesh.emissive.rgb;
    return vec4<f32>(shaded, mesh.base_color.a);
}
"#;

/// WGSL shader for the pedestal backdrop line work.
pub const BACKDROP_SHADER: &str = r#"
struct FrameUniforms {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    key_dir: vec4<f32>,
    key_color: vec4<f32>,
    rim_dir: vec4<f32>,
    rim_color: vec4<f32>,
    ambient: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> frame: FrameUniforms;

struct LineVertex {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
};

struct LineOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_line(vertex: LineVertex) -> LineOutput {
    var out: LineOutput;
    out.clip_position = frame.view_proj * vec4<f32>(vertex.position, 1.0);
    out.color = vertex.color;
    return out;
}

@fragment
fn fs_line(in: LineOutput) -> @location(0) vec4<f32> {
    return in.color;
}
"#;
