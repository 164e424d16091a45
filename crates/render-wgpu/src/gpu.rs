use crate::camera::OrbitCamera;
use crate::shaders;
use crate::viewport::Viewport;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use pedestal_common::ModelId;
use pedestal_scene::{StagedModel, ViewerScene};
use std::collections::BTreeMap;
use tracing::debug;
use wgpu::util::DeviceExt;

/// Background clear color: #f8fafc linearized for an sRGB surface.
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.9387,
    g: 0.9559,
    b: 0.9735,
    a: 1.0,
};

const BACKDROP_COLOR: [f32; 4] = [0.78, 0.80, 0.84, 1.0];
const BACKDROP_HEIGHT: f32 = -2.2;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct FrameUniforms {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    key_dir: [f32; 4],
    key_color: [f32; 4],
    rim_dir: [f32; 4],
    rim_color: [f32; 4],
    ambient: [f32; 4],
}

impl FrameUniforms {
    /// Studio rig: a warm key light from the upper front-left and a cool
    /// rim light from behind, over a soft ambient floor.
    fn new(view_proj: Mat4, eye: glam::Vec3) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            camera_pos: [eye.x, eye.y, eye.z, 1.0],
            key_dir: [-0.5, -0.8, -0.4, 0.0],
            key_color: [1.0, 0.97, 0.92, 1.0],
            rim_dir: [0.4, -0.2, 0.9, 0.0],
            rim_color: [0.35, 0.4, 0.5, 1.0],
            ambient: [0.22, 0.23, 0.25, 1.0],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct MeshUniforms {
    model: [[f32; 4]; 4],
    base_color: [f32; 4],
    emissive: [f32; 4],
    factors: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct LineVertex {
    position: [f32; 3],
    color: [f32; 4],
}

/// GPU-side buffers for one imported mesh.
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    base_color: [f32; 4],
    emissive: [f32; 3],
    metallic: f32,
    roughness: f32,
}

/// Line vertices for the pedestal backdrop: two concentric rings under the
/// display position.
fn backdrop_mesh() -> Vec<LineVertex> {
    const SEGMENTS: usize = 72;
    let mut verts = Vec::with_capacity(SEGMENTS * 4);
    for radius in [2.4f32, 1.6] {
        for i in 0..SEGMENTS {
            let a = (i as f32 / SEGMENTS as f32) * std::f32::consts::TAU;
            let b = ((i + 1) as f32 / SEGMENTS as f32) * std::f32::consts::TAU;
            verts.push(LineVertex {
                position: [radius * a.cos(), BACKDROP_HEIGHT, radius * a.sin()],
                color: BACKDROP_COLOR,
            });
            verts.push(LineVertex {
                position: [radius * b.cos(), BACKDROP_HEIGHT, radius * b.sin()],
                color: BACKDROP_COLOR,
            });
        }
    }
    verts
}

/// wgpu renderer for the pedestal scene.
///
/// Mesh buffers are uploaded on demand the first time a staged model is
/// rendered and dropped once the model leaves the scene, so a swap never
/// leaks the outgoing model's GPU memory. The renderer reads scene state
/// and never mutates it.
pub struct GpuRenderer {
    model_pipeline: wgpu::RenderPipeline,
    backdrop_pipeline: wgpu::RenderPipeline,
    frame_uniform_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    mesh_bind_layout: wgpu::BindGroupLayout,
    backdrop_vertex_buffer: wgpu::Buffer,
    backdrop_vertex_count: u32,
    uploads: BTreeMap<ModelId, Vec<GpuMesh>>,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

impl GpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let frame_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("frame_uniform_buffer"),
            contents: bytemuck::bytes_of(&FrameUniforms::new(Mat4::IDENTITY, glam::Vec3::ZERO)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let frame_bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_bind_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &frame_bind_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_uniform_buffer.as_entire_binding(),
            }],
        });

        let mesh_bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("mesh_bind_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let model_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("model_pipeline_layout"),
            bind_group_layouts: &[&frame_bind_layout, &mesh_bind_layout],
            push_constant_ranges: &[],
        });

        let model_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("model_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::MODEL_SHADER.into()),
        });

        let model_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("model_pipeline"),
            layout: Some(&model_layout),
            vertex: wgpu::VertexState {
                module: &model_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x3,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &model_shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let backdrop_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("backdrop_pipeline_layout"),
            bind_group_layouts: &[&frame_bind_layout],
            push_constant_ranges: &[],
        });

        let backdrop_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("backdrop_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::BACKDROP_SHADER.into()),
        });

        let backdrop_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("backdrop_pipeline"),
            layout: Some(&backdrop_layout),
            vertex: wgpu::VertexState {
                module: &backdrop_shader,
                entry_point: Some("vs_line"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<LineVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x4,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &backdrop_shader,
                entry_point: Some("fs_line"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let backdrop_verts = backdrop_mesh();
        let backdrop_vertex_count = backdrop_verts.len() as u32;
        let backdrop_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("backdrop_vertex_buffer"),
            contents: bytemuck::cast_slice(&backdrop_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let depth_texture = Self::create_depth_texture(device, width, height);

        Self {
            model_pipeline,
            backdrop_pipeline,
            frame_uniform_buffer,
            frame_bind_group,
            mesh_bind_layout,
            backdrop_vertex_buffer,
            backdrop_vertex_count,
            uploads: BTreeMap::new(),
            depth_texture,
            surface_format,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Render one frame: backdrop, then the exiting model (if a swap is in
    /// flight), then the current model.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        camera: &OrbitCamera,
        viewport: &Viewport,
        scene: &ViewerScene,
    ) {
        queue.write_buffer(
            &self.frame_uniform_buffer,
            0,
            bytemuck::bytes_of(&FrameUniforms::new(
                camera.view_projection(viewport),
                camera.eye(),
            )),
        );

        self.sync_uploads(device, queue, scene);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_pipeline(&self.backdrop_pipeline);
            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            pass.set_vertex_buffer(0, self.backdrop_vertex_buffer.slice(..));
            pass.draw(0..self.backdrop_vertex_count, 0..1);

            pass.set_pipeline(&self.model_pipeline);
            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            for staged in scene.exiting().into_iter().chain(scene.current()) {
                if let Some(meshes) = self.uploads.get(&staged.id) {
                    for mesh in meshes {
                        pass.set_bind_group(1, &mesh.bind_group, &[]);
                        pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                        pass.set_index_buffer(
                            mesh.index_buffer.slice(..),
                            wgpu::IndexFormat::Uint32,
                        );
                        pass.draw_indexed(0..mesh.index_count, 0, 0..1);
                    }
                }
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    /// Upload buffers for newly staged models, refresh per-mesh uniforms,
    /// and drop buffers for models no longer in the scene.
    fn sync_uploads(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, scene: &ViewerScene) {
        let staged: Vec<&StagedModel> =
            scene.current().into_iter().chain(scene.exiting()).collect();

        let live: Vec<ModelId> = staged.iter().map(|m| m.id).collect();
        let before = self.uploads.len();
        self.uploads.retain(|id, _| live.contains(id));
        if self.uploads.len() < before {
            debug!(
                dropped = before - self.uploads.len(),
                "released gpu meshes for removed models"
            );
        }

        for model in staged {
            if !self.uploads.contains_key(&model.id) {
                let meshes = self.upload_model(device, model);
                debug!(id = %model.id, meshes = meshes.len(), "model meshes uploaded");
                self.uploads.insert(model.id, meshes);
            }
            let transform = model.display_transform();
            let matrix = Mat4::from_scale_rotation_translation(
                transform.scale,
                transform.rotation,
                transform.position,
            );
            if let Some(meshes) = self.uploads.get(&model.id) {
                for mesh in meshes {
                    let uniforms = MeshUniforms {
                        model: matrix.to_cols_array_2d(),
                        base_color: mesh.base_color,
                        emissive: [mesh.emissive[0], mesh.emissive[1], mesh.emissive[2], 0.0],
                        factors: [mesh.metallic, mesh.roughness, 0.0, 0.0],
                    };
                    queue.write_buffer(&mesh.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
                }
            }
        }
    }

    fn upload_model(&self, device: &wgpu::Device, model: &StagedModel) -> Vec<GpuMesh> {
        model
            .data
            .meshes
            .iter()
            .map(|mesh| {
                let vertices: Vec<Vertex> = mesh
                    .positions
                    .iter()
                    .zip(&mesh.normals)
                    .map(|(p, n)| Vertex {
                        position: *p,
                        normal: *n,
                    })
                    .collect();

                let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("mesh_vertex_buffer"),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("mesh_index_buffer"),
                    contents: bytemuck::cast_slice(&mesh.indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
                let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("mesh_uniform_buffer"),
                    size: std::mem::size_of::<MeshUniforms>() as u64,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("mesh_bind_group"),
                    layout: &self.mesh_bind_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniform_buffer.as_entire_binding(),
                    }],
                });

                GpuMesh {
                    vertex_buffer,
                    index_buffer,
                    index_count: mesh.indices.len() as u32,
                    uniform_buffer,
                    bind_group,
                    base_color: mesh.material.base_color,
                    emissive: mesh.material.emissive,
                    metallic: mesh.material.metallic,
                    roughness: mesh.material.roughness,
                }
            })
            .collect()
    }

    fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backdrop_rings_sit_below_the_display_position() {
        let verts = backdrop_mesh();
        assert!(!verts.is_empty());
        assert_eq!(verts.len() % 2, 0);
        for v in &verts {
            assert_eq!(v.position[1], BACKDROP_HEIGHT);
            let r = (v.position[0] * v.position[0] + v.position[2] * v.position[2]).sqrt();
            assert!(r > 1.5 && r < 2.5);
        }
    }
}
