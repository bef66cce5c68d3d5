use anyhow::{Context, Result};

use geoshade_engine::core::{App, AppControl, FrameCtx};
use geoshade_engine::device::Gpu;
use geoshade_engine::paint::Color;
use geoshade_engine::render::overlay::{TextOverlay, TextRun};
use geoshade_engine::text::{FontId, FontSystem};

use crate::config::DemoConfig;
use crate::effect::BasicEffect;
use crate::mode::Mode;
use crate::scene::SceneState;
use crate::status::status_text;
use crate::vertex::{Shape, VertexBuffer};

/// The sample: split triangle / extruded ring, switched with `1`, `2`, `Q`.
pub struct GeoShadeApp {
    config: DemoConfig,
    scene: SceneState,
    effect: BasicEffect,
    vertices: Option<VertexBuffer>,

    overlay: TextOverlay,
    fonts: FontSystem,
    font: Option<FontId>,
}

impl GeoShadeApp {
    pub fn new(config: DemoConfig) -> Self {
        let mut fonts = FontSystem::new();
        let font = fonts.load_first_available(&config.font_paths);
        if font.is_none() {
            log::warn!("no overlay font found; status text disabled");
        }

        Self {
            scene: SceneState::new(&config, 1.0),
            config,
            effect: BasicEffect::new(),
            vertices: None,
            overlay: TextOverlay::new(),
            fonts,
            font,
        }
    }

    /// Replaces the vertex buffer with a fresh `shape` buffer, binds it and
    /// selects the matching draw configuration.
    fn rebuild(&mut self, device: &wgpu::Device, shape: Shape) -> Result<()> {
        let vb = VertexBuffer::build(device, shape);
        self.effect.bind_vertices(device, &vb)?;
        match shape {
            Shape::Triangle => self.effect.set_render_split_triangle(),
            Shape::Ring => self.effect.set_render_cylinder_no_cap(),
        }
        log::debug!("vertex buffer rebuilt: {shape:?}, {} vertices", vb.count());
        self.vertices = Some(vb);
        Ok(())
    }
}

impl App for GeoShadeApp {
    fn on_init(&mut self, gpu: &Gpu<'_>) -> Result<()> {
        self.effect
            .init_all(gpu.device(), gpu.queue(), gpu.surface_format(), gpu.depth().format())
            .context("failed to initialize the basic effect")?;

        self.scene.constants().push_all(&mut self.effect);
        self.rebuild(gpu.device(), self.scene.mode().shape())?;

        let info = gpu.adapter().get_info();
        log::info!(
            "initialized on {} ({:?}), surface {:?}",
            info.name,
            info.backend,
            gpu.surface_format()
        );
        Ok(())
    }

    fn on_resize(&mut self, gpu: &Gpu<'_>) -> Result<()> {
        self.overlay.resize();
        let pushed = self
            .scene
            .constants_mut()
            .on_resize(gpu.aspect_ratio(), &mut self.effect);

        let size = gpu.size();
        log::debug!("resized to {}x{} (projection pushed: {pushed})", size.width, size.height);
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<AppControl> {
        if let Some((x, y)) = ctx.input.pointer_pos {
            log::trace!("pointer at ({x:.1}, {y:.1})");
        }

        let input_frame = ctx.input_frame;
        let rebuild = self
            .scene
            .tick(ctx.time.dt, |k| input_frame.key_pressed(k), &mut self.effect);
        if let Some(shape) = rebuild {
            self.rebuild(ctx.gpu.device(), shape)?;
        }

        let mode = self.scene.mode();
        let status = self.font.map(|font| TextRun {
            text: status_text(mode),
            font,
            size: self.config.overlay_font_size,
            color: Color::WHITE,
            bounds: self.config.overlay_box,
        });

        let effect = &mut self.effect;
        let overlay = &mut self.overlay;
        let fonts = &self.fonts;

        ctx.render(self.config.clear_color, |rctx, target| {
            {
                let mut pass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("geoshade scene"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: target.color_view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view: target.depth_view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    timestamp_writes: None,
                    occlusion_query_set: None,
                    multiview_mask: None,
                });

                effect.draw(&mut pass)?;

                if mode == Mode::CylinderNoCapWithNormal {
                    effect.set_render_normal();
                    effect.draw(&mut pass)?;
                    effect.set_render_cylinder_no_cap();
                }
            }

            if let Some(run) = &status {
                overlay.render(rctx, target, std::slice::from_ref(run), fonts);
            }
            Ok(())
        })
    }
}
