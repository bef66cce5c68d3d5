//! 2D text overlay drawn on top of the 3D scene.
//!
//! State is split by lifetime:
//! - `GlyphAtlas`: R8 coverage texture and glyph cache, kept for the overlay's life
//! - `OverlayPipeline`: rebuilt only when the surface format changes
//! - `OverlayTarget`: screen-size uniform and bind group, dropped on every resize

use std::collections::HashMap;
use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use fontdue::layout::{CoordinateSystem, GlyphRasterConfig, Layout, LayoutSettings, TextStyle};

use crate::coords::{Rect, Vec2, Viewport};
use crate::paint::Color;
use crate::render::{RenderCtx, RenderTarget};
use crate::text::{FontId, FontSystem};

const ATLAS_SIZE: u32 = 1024;
const GLYPH_GAP: u32 = 1;
const MIN_GLYPH_CAPACITY: usize = 64;

/// One block of text laid out inside `bounds`.
///
/// Lines break on `\n` and wrap at the box width; glyphs whose origin falls
/// outside the box are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub font: FontId,
    pub size: f32,
    pub color: Color,
    pub bounds: Rect,
}

/// Row-by-row packer for the glyph atlas.
#[derive(Debug, Clone, PartialEq)]
struct ShelfPacker {
    size: u32,
    x: u32,
    y: u32,
    row_height: u32,
    full: bool,
}

impl ShelfPacker {
    fn new(size: u32) -> Self {
        Self { size, x: GLYPH_GAP, y: GLYPH_GAP, row_height: 0, full: false }
    }

    /// Reserves a `w`×`h` cell and returns its top-left texel.
    ///
    /// Once a glyph does not fit the packer stays full.
    fn place(&mut self, w: u32, h: u32) -> Option<(u32, u32)> {
        if self.full {
            return None;
        }

        if self.x + w + GLYPH_GAP > self.size {
            self.x = GLYPH_GAP;
            self.y += self.row_height + GLYPH_GAP;
            self.row_height = 0;
        }
        if self.x + w + GLYPH_GAP > self.size || self.y + h + GLYPH_GAP > self.size {
            self.full = true;
            return None;
        }

        let at = (self.x, self.y);
        self.x += w + GLYPH_GAP;
        self.row_height = self.row_height.max(h);
        Some(at)
    }
}

/// Atlas-space rectangle `[min.x, min.y, max.x, max.y]`.
type AtlasUv = [f32; 4];

struct GlyphAtlas {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    packer: ShelfPacker,
    cache: HashMap<GlyphRasterConfig, AtlasUv>,
}

impl GlyphAtlas {
    fn new(device: &wgpu::Device) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("geoshade glyph atlas"),
            size: wgpu::Extent3d {
                width: ATLAS_SIZE,
                height: ATLAS_SIZE,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("geoshade glyph sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
            packer: ShelfPacker::new(ATLAS_SIZE),
            cache: HashMap::new(),
        }
    }

    /// Returns the glyph's atlas rectangle, rasterizing and uploading it on
    /// first use. `None` for empty glyphs or once the atlas is full.
    fn glyph(
        &mut self,
        queue: &wgpu::Queue,
        font: &fontdue::Font,
        key: GlyphRasterConfig,
    ) -> Option<AtlasUv> {
        if let Some(uv) = self.cache.get(&key) {
            return Some(*uv);
        }

        let (metrics, coverage) = font.rasterize_config(key);
        let (w, h) = (metrics.width as u32, metrics.height as u32);
        if w == 0 || h == 0 {
            return None;
        }

        let was_full = self.packer.full;
        let Some((x, y)) = self.packer.place(w, h) else {
            if !was_full {
                log::warn!("glyph atlas is full; further glyphs are dropped");
            }
            return None;
        };

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d { x, y, z: 0 },
                aspect: wgpu::TextureAspect::All,
            },
            &coverage,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(w),
                rows_per_image: Some(h),
            },
            wgpu::Extent3d { width: w, height: h, depth_or_array_layers: 1 },
        );

        let s = ATLAS_SIZE as f32;
        let uv = [x as f32 / s, y as f32 / s, (x + w) as f32 / s, (y + h) as f32 / s];
        self.cache.insert(key, uv);
        Some(uv)
    }
}

struct OverlayPipeline {
    format: wgpu::TextureFormat,
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
}

impl OverlayPipeline {
    fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("geoshade overlay shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/text.wgsl").into()),
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("geoshade overlay bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(std::mem::size_of::<ScreenUniform>() as u64),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("geoshade overlay pipeline layout"),
            bind_group_layouts: &[&layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("geoshade overlay pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_glyph"),
                compilation_options: Default::default(),
                buffers: &[GlyphInstance::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_glyph"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Self { format, pipeline, layout }
    }
}

/// Size-dependent overlay state.
struct OverlayTarget {
    viewport: Viewport,
    bind_group: wgpu::BindGroup,
    _uniform: wgpu::Buffer,
}

impl OverlayTarget {
    fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipeline: &OverlayPipeline,
        atlas: &GlyphAtlas,
        viewport: Viewport,
    ) -> Self {
        let uniform = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("geoshade overlay screen ubo"),
            size: std::mem::size_of::<ScreenUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&uniform, 0, bytemuck::bytes_of(&ScreenUniform::new(viewport)));

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("geoshade overlay bg"),
            layout: &pipeline.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&atlas.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&atlas.sampler),
                },
            ],
        });

        Self { viewport, bind_group, _uniform: uniform }
    }
}

/// Text overlay renderer.
///
/// Device objects are created lazily on the first [`TextOverlay::render`].
/// [`TextOverlay::resize`] drops only the size-dependent target state; the
/// next render rebuilds it for the new surface size.
pub struct TextOverlay {
    pipeline: Option<OverlayPipeline>,
    atlas: Option<GlyphAtlas>,
    target: Option<OverlayTarget>,

    instances: Option<wgpu::Buffer>,
    instance_capacity: usize,

    layout: Layout<()>,
}

impl Default for TextOverlay {
    fn default() -> Self {
        Self {
            pipeline: None,
            atlas: None,
            target: None,
            instances: None,
            instance_capacity: 0,
            layout: Layout::new(CoordinateSystem::PositiveYDown),
        }
    }
}

impl TextOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Releases the size-dependent target state.
    pub fn resize(&mut self) {
        self.target = None;
    }

    /// True once the size-dependent target state exists.
    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    /// Draws `runs` over whatever is already in the target's color view.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        runs: &[TextRun],
        fonts: &FontSystem,
    ) {
        if runs.is_empty() || !ctx.viewport.is_valid() {
            return;
        }

        if self.pipeline.as_ref().map(|p| p.format) != Some(ctx.surface_format) {
            self.pipeline = Some(OverlayPipeline::new(ctx.device, ctx.surface_format));
            self.target = None;
        }
        let atlas = self.atlas.get_or_insert_with(|| GlyphAtlas::new(ctx.device));

        let mut glyphs = Vec::new();
        for run in runs {
            let Some(font) = fonts.get(run.font) else {
                log::warn!("overlay: unknown {:?}, run skipped", run.font);
                continue;
            };
            layout_run(&mut self.layout, font, run, |key, rect| {
                if let Some(uv) = atlas.glyph(ctx.queue, font, key) {
                    glyphs.push(GlyphInstance { rect, uv, color: run.color.to_array() });
                }
            });
        }
        if glyphs.is_empty() {
            return;
        }

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        if self.target.as_ref().map(|t| t.viewport) != Some(ctx.viewport) {
            self.target = Some(OverlayTarget::new(ctx.device, ctx.queue, pipeline, atlas, ctx.viewport));
        }
        let Some(screen) = self.target.as_ref() else { return };

        if glyphs.len() > self.instance_capacity || self.instances.is_none() {
            let capacity = glyphs.len().next_power_of_two().max(MIN_GLYPH_CAPACITY);
            self.instances = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("geoshade overlay glyphs"),
                size: (capacity * std::mem::size_of::<GlyphInstance>()) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.instance_capacity = capacity;
        }
        let Some(instances) = self.instances.as_ref() else { return };
        ctx.queue.write_buffer(instances, 0, bytemuck::cast_slice(&glyphs));

        let mut pass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("geoshade overlay"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        pass.set_pipeline(&pipeline.pipeline);
        pass.set_bind_group(0, &screen.bind_group, &[]);
        pass.set_vertex_buffer(0, instances.slice(..));
        pass.draw(0..6, 0..glyphs.len() as u32);
    }
}

/// Lays out `run` and reports each visible glyph with its pixel rectangle.
fn layout_run(
    layout: &mut Layout<()>,
    font: &fontdue::Font,
    run: &TextRun,
    mut emit: impl FnMut(GlyphRasterConfig, [f32; 4]),
) {
    layout.reset(&LayoutSettings {
        x: run.bounds.origin.x,
        y: run.bounds.origin.y,
        max_width: Some(run.bounds.size.x),
        ..LayoutSettings::default()
    });
    layout.append(&[font], &TextStyle::new(&run.text, run.size, 0));

    for g in layout.glyphs() {
        if !g.char_data.rasterize() || g.width == 0 || g.height == 0 {
            continue;
        }
        if !run.bounds.contains(Vec2::new(g.x, g.y)) {
            continue;
        }
        emit(g.key, [g.x, g.y, g.x + g.width as f32, g.y + g.height as f32]);
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ScreenUniform {
    size: [f32; 2],
    _pad: [f32; 2],
}

impl ScreenUniform {
    fn new(viewport: Viewport) -> Self {
        Self {
            size: [viewport.width.max(1.0), viewport.height.max(1.0)],
            _pad: [0.0; 2],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct GlyphInstance {
    rect: [f32; 4],
    uv: [f32; 4],
    color: [f32; 4],
}

impl GlyphInstance {
    const ATTRS: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x4, 1 => Float32x4, 2 => Float32x4];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GlyphInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpu_structs_match_shader_layout() {
        assert_eq!(std::mem::size_of::<GlyphInstance>(), 48);
        assert_eq!(std::mem::size_of::<ScreenUniform>(), 16);
    }

    #[test]
    fn packer_fills_a_row_left_to_right() {
        let mut p = ShelfPacker::new(64);
        assert_eq!(p.place(10, 12), Some((1, 1)));
        assert_eq!(p.place(10, 8), Some((12, 1)));
        assert_eq!(p.row_height, 12);
    }

    #[test]
    fn packer_starts_a_new_row_below_the_tallest_glyph() {
        let mut p = ShelfPacker::new(32);
        p.place(20, 12);
        assert_eq!(p.place(20, 5), Some((1, 1 + 12 + 1)));
    }

    #[test]
    fn packer_stays_full_after_overflow() {
        let mut p = ShelfPacker::new(16);
        assert_eq!(p.place(20, 4), None);
        assert!(p.full);
        assert_eq!(p.place(1, 1), None);
    }

    #[test]
    fn screen_uniform_never_divides_by_zero() {
        let u = ScreenUniform::new(Viewport::new(0.0, 0.0));
        assert_eq!(u.size, [1.0, 1.0]);
    }

    #[test]
    fn resize_on_fresh_overlay_leaves_no_target() {
        let mut overlay = TextOverlay::new();
        assert!(!overlay.has_target());
        overlay.resize();
        assert!(!overlay.has_target());
    }
}
