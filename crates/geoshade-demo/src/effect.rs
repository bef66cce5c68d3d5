//! The shading effect: three fixed draw configurations over one vertex slot.
//!
//! wgpu has no geometry stage, so each configuration expands its input
//! primitives in the vertex stage. The vertex buffer is bound as a read-only
//! storage buffer and the draw call is sized to the expanded vertex count.

use std::num::NonZeroU64;

use anyhow::{bail, ensure, Context, Result};

use crate::constants::{CbChangesEveryFrame, CbChangesOnResize, CbNeverChange, ConstantSink};
use crate::vertex::{Shape, VertexBuffer};

/// Device-side rendering configuration.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum DrawConfig {
    /// Triangle list; every triangle becomes its three corner triangles.
    #[default]
    SplitTriangle,
    /// Line strip; every segment is extruded into a lit wall quad.
    CylinderNoCap,
    /// Per vertex, a normal line at the bottom and top of the wall.
    Normal,
}

impl DrawConfig {
    const ALL: [DrawConfig; 3] = [
        DrawConfig::SplitTriangle,
        DrawConfig::CylinderNoCap,
        DrawConfig::Normal,
    ];

    /// Vertices emitted for `input` source vertices.
    pub fn output_vertex_count(self, input: u32) -> u32 {
        match self {
            DrawConfig::SplitTriangle => input / 3 * 9,
            DrawConfig::CylinderNoCap => input.saturating_sub(1) * 6,
            DrawConfig::Normal => input * 4,
        }
    }

    /// The vertex layout this configuration reads.
    pub fn input_shape(self) -> Shape {
        match self {
            DrawConfig::SplitTriangle => Shape::Triangle,
            DrawConfig::CylinderNoCap | DrawConfig::Normal => Shape::Ring,
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    fn label(self) -> &'static str {
        match self {
            DrawConfig::SplitTriangle => "geoshade split triangle",
            DrawConfig::CylinderNoCap => "geoshade cylinder",
            DrawConfig::Normal => "geoshade normals",
        }
    }

    fn entry_points(self) -> (&'static str, &'static str) {
        match self {
            DrawConfig::SplitTriangle => ("vs_split_triangle", "fs_color"),
            DrawConfig::CylinderNoCap => ("vs_cylinder", "fs_lit"),
            DrawConfig::Normal => ("vs_normal", "fs_color"),
        }
    }

    fn primitive(self) -> wgpu::PrimitiveState {
        let (topology, cull_mode) = match self {
            DrawConfig::SplitTriangle => (wgpu::PrimitiveTopology::TriangleList, Some(wgpu::Face::Back)),
            // The wall is open; both sides are visible through the ends.
            DrawConfig::CylinderNoCap => (wgpu::PrimitiveTopology::TriangleList, None),
            DrawConfig::Normal => (wgpu::PrimitiveTopology::LineList, None),
        };
        wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Cw,
            cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        }
    }
}

struct BoundVertices {
    bind_group: wgpu::BindGroup,
    shape: Shape,
    count: u32,
}

struct EffectResources {
    queue: wgpu::Queue,

    every_frame: wgpu::Buffer,
    on_resize: wgpu::Buffer,
    never_change: wgpu::Buffer,
    constants_bind_group: wgpu::BindGroup,

    vertices_layout: wgpu::BindGroupLayout,
    pipelines: Vec<wgpu::RenderPipeline>,
}

/// Owns the constant buffers, the three pipelines and the vertex binding.
#[derive(Default)]
pub struct BasicEffect {
    resources: Option<EffectResources>,
    config: DrawConfig,
    vertices: Option<BoundVertices>,
}

impl BasicEffect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates every device resource. Constant buffers start zeroed.
    pub fn init_all(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> Result<()> {
        ensure!(
            device.limits().max_storage_buffers_per_shader_stage > 0,
            "device does not support storage buffers in the vertex stage"
        );

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("geoshade basic shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/basic.wgsl").into()),
        });

        let every_frame = uniform_buffer::<CbChangesEveryFrame>(device, "geoshade cb every frame");
        let on_resize = uniform_buffer::<CbChangesOnResize>(device, "geoshade cb on resize");
        let never_change = uniform_buffer::<CbNeverChange>(device, "geoshade cb never change");

        let constants_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("geoshade constants bgl"),
            entries: &[
                uniform_entry::<CbChangesEveryFrame>(0, wgpu::ShaderStages::VERTEX),
                uniform_entry::<CbChangesOnResize>(1, wgpu::ShaderStages::VERTEX),
                uniform_entry::<CbNeverChange>(
                    2,
                    wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ),
            ],
        });

        let constants_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("geoshade constants bg"),
            layout: &constants_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: every_frame.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: on_resize.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: never_change.as_entire_binding() },
            ],
        });

        let vertices_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("geoshade vertices bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: true },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("geoshade basic pipeline layout"),
            bind_group_layouts: &[&constants_layout, &vertices_layout],
            immediate_size: 0,
        });

        let pipelines = DrawConfig::ALL
            .iter()
            .map(|&config| create_pipeline(device, &pipeline_layout, &shader, config, color_format, depth_format))
            .collect();

        self.resources = Some(EffectResources {
            queue: queue.clone(),
            every_frame,
            on_resize,
            never_change,
            constants_bind_group,
            vertices_layout,
            pipelines,
        });
        self.vertices = None;

        log::debug!("basic effect initialized ({color_format:?}, {depth_format:?})");
        Ok(())
    }

    pub fn is_init(&self) -> bool {
        self.resources.is_some()
    }

    pub fn draw_config(&self) -> DrawConfig {
        self.config
    }

    pub fn set_render_split_triangle(&mut self) {
        self.config = DrawConfig::SplitTriangle;
    }

    pub fn set_render_cylinder_no_cap(&mut self) {
        self.config = DrawConfig::CylinderNoCap;
    }

    pub fn set_render_normal(&mut self) {
        self.config = DrawConfig::Normal;
    }

    /// Binds `vb` as the vertex source for subsequent draws.
    pub fn bind_vertices(&mut self, device: &wgpu::Device, vb: &VertexBuffer) -> Result<()> {
        let res = self.resources.as_ref().context("basic effect is not initialized")?;

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("geoshade vertices bg"),
            layout: &res.vertices_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: vb.buffer().as_entire_binding(),
            }],
        });

        self.vertices = Some(BoundVertices {
            bind_group,
            shape: vb.shape(),
            count: vb.count(),
        });
        Ok(())
    }

    /// Records one draw of the bound vertices with the current configuration.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) -> Result<()> {
        let res = self.resources.as_ref().context("basic effect is not initialized")?;
        let vertices = self.vertices.as_ref().context("no vertex buffer bound")?;

        if vertices.shape != self.config.input_shape() {
            bail!(
                "{:?} cannot draw a {:?} vertex buffer",
                self.config,
                vertices.shape
            );
        }

        let count = self.config.output_vertex_count(vertices.count);
        if count == 0 {
            return Ok(());
        }

        pass.set_pipeline(&res.pipelines[self.config.index()]);
        pass.set_bind_group(0, &res.constants_bind_group, &[]);
        pass.set_bind_group(1, &vertices.bind_group, &[]);
        pass.draw(0..count, 0..1);
        Ok(())
    }

    /// Uploads `cb` into the buffer chosen by `pick`. Returns `false`, and
    /// writes nothing, before [`BasicEffect::init_all`].
    fn write<T: bytemuck::Pod>(&self, pick: impl Fn(&EffectResources) -> &wgpu::Buffer, cb: &T) -> bool {
        let Some(res) = &self.resources else {
            log::warn!("constant push before the basic effect was initialized; ignored");
            return false;
        };
        res.queue.write_buffer(pick(res), 0, bytemuck::bytes_of(cb));
        true
    }
}

impl ConstantSink for BasicEffect {
    fn is_init(&self) -> bool {
        BasicEffect::is_init(self)
    }

    fn push_never_change(&mut self, cb: &CbNeverChange) {
        self.write(|r| &r.never_change, cb);
    }

    fn push_every_frame(&mut self, cb: &CbChangesEveryFrame) {
        self.write(|r| &r.every_frame, cb);
    }

    fn push_on_resize(&mut self, cb: &CbChangesOnResize) {
        self.write(|r| &r.on_resize, cb);
    }
}

fn uniform_buffer<T>(device: &wgpu::Device, label: &str) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: std::mem::size_of::<T>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn uniform_entry<T>(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: NonZeroU64::new(std::mem::size_of::<T>() as u64),
        },
        count: None,
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    config: DrawConfig,
    color_format: wgpu::TextureFormat,
    depth_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let (vs, fs) = config.entry_points();

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(config.label()),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(vs),
            compilation_options: Default::default(),
            buffers: &[],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fs),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: config.primitive(),
        depth_stencil: Some(wgpu::DepthStencilState {
            format: depth_format,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vertex::{RING_VERTEX_COUNT, TRIANGLE_VERTEX_COUNT};

    #[test]
    fn split_triangle_emits_nine_per_triangle() {
        let n = TRIANGLE_VERTEX_COUNT as u32;
        assert_eq!(DrawConfig::SplitTriangle.output_vertex_count(n), 9);
        assert_eq!(DrawConfig::SplitTriangle.output_vertex_count(7), 18);
    }

    #[test]
    fn cylinder_emits_one_quad_per_segment() {
        let n = RING_VERTEX_COUNT as u32;
        assert_eq!(DrawConfig::CylinderNoCap.output_vertex_count(n), 40 * 6);
        assert_eq!(DrawConfig::CylinderNoCap.output_vertex_count(1), 0);
        assert_eq!(DrawConfig::CylinderNoCap.output_vertex_count(0), 0);
    }

    #[test]
    fn normals_emit_two_lines_per_vertex() {
        let n = RING_VERTEX_COUNT as u32;
        assert_eq!(DrawConfig::Normal.output_vertex_count(n), 41 * 4);
    }

    #[test]
    fn configs_read_the_matching_shape() {
        assert_eq!(DrawConfig::SplitTriangle.input_shape(), Shape::Triangle);
        assert_eq!(DrawConfig::CylinderNoCap.input_shape(), Shape::Ring);
        assert_eq!(DrawConfig::Normal.input_shape(), Shape::Ring);
    }

    #[test]
    fn pipeline_slots_follow_declaration_order() {
        for (i, c) in DrawConfig::ALL.iter().enumerate() {
            assert_eq!(c.index(), i);
        }
    }

    #[test]
    fn effect_starts_uninitialized_in_split_triangle() {
        let mut fx = BasicEffect::new();
        assert!(!fx.is_init());
        assert_eq!(fx.draw_config(), DrawConfig::SplitTriangle);

        fx.set_render_cylinder_no_cap();
        assert_eq!(fx.draw_config(), DrawConfig::CylinderNoCap);
        fx.set_render_normal();
        assert_eq!(fx.draw_config(), DrawConfig::Normal);
        fx.set_render_split_triangle();
        assert_eq!(fx.draw_config(), DrawConfig::SplitTriangle);
    }

    #[test]
    fn constant_writes_before_init_reach_no_buffer() {
        let fx = BasicEffect::new();
        let proj = CbChangesOnResize { proj: [[0.0; 4]; 4] };
        let every_frame = CbChangesEveryFrame::default();

        assert!(!fx.write(|r| &r.on_resize, &proj));
        assert!(!fx.write(|r| &r.every_frame, &every_frame));
        assert!(!ConstantSink::is_init(&fx));
    }
}
