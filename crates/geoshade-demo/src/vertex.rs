//! Fixed vertex sets and their device buffers.

use std::f32::consts::PI;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

/// Number of distinct samples on the ring; the strip repeats the first one.
pub const RING_SEGMENTS: usize = 40;

/// Vertices in a closed ring strip.
pub const RING_VERTEX_COUNT: usize = RING_SEGMENTS + 1;

pub const TRIANGLE_VERTEX_COUNT: usize = 3;

const TRIANGLE_SCALE: f32 = 3.0;

/// Position + color (28 bytes, tightly packed).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct VertexPosColor {
    pub pos: [f32; 3],
    pub color: [f32; 4],
}

/// Position + normal + color (40 bytes, tightly packed).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct VertexPosNormalColor {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

/// Which vertex set a buffer holds.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Shape {
    Triangle,
    Ring,
}

/// The colored triangle, centered at the origin and scaled by 3.
pub fn build_triangle() -> [VertexPosColor; TRIANGLE_VERTEX_COUNT] {
    let s = TRIANGLE_SCALE;
    [
        VertexPosColor { pos: [-1.0 * s, -0.866 * s, 0.0], color: [1.0, 0.0, 0.0, 1.0] },
        VertexPosColor { pos: [0.0 * s, 0.866 * s, 0.0], color: [0.0, 1.0, 0.0, 1.0] },
        VertexPosColor { pos: [1.0 * s, -0.866 * s, 0.0], color: [0.0, 0.0, 1.0, 1.0] },
    ]
}

/// The unit ring at `y = -1` in the XZ plane, closed by repeating vertex 0.
///
/// Samples run clockwise seen from +Y (`z = -sin θ`), which keeps the
/// extruded wall's winding consistent.
pub fn build_ring() -> [VertexPosNormalColor; RING_VERTEX_COUNT] {
    let mut vertices = [VertexPosNormalColor::zeroed(); RING_VERTEX_COUNT];
    for (i, v) in vertices.iter_mut().take(RING_SEGMENTS).enumerate() {
        let theta = 2.0 * PI * i as f32 / RING_SEGMENTS as f32;
        let (sin, cos) = theta.sin_cos();
        *v = VertexPosNormalColor {
            pos: [cos, -1.0, -sin],
            normal: [cos, 0.0, -sin],
            color: [1.0, 1.0, 1.0, 1.0],
        };
    }
    vertices[RING_SEGMENTS] = vertices[0];
    vertices
}

/// A device buffer holding one vertex set.
///
/// Usage is `STORAGE | VERTEX`: the shading effect pulls vertices by index.
pub struct VertexBuffer {
    buffer: wgpu::Buffer,
    shape: Shape,
    count: u32,
}

impl VertexBuffer {
    /// Allocates a buffer sized exactly to `vertices` and uploads them.
    pub fn upload<T: Pod>(device: &wgpu::Device, shape: Shape, vertices: &[T]) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(match shape {
                Shape::Triangle => "geoshade triangle vertices",
                Shape::Ring => "geoshade ring vertices",
            }),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::VERTEX,
        });

        Self {
            buffer,
            shape,
            count: vertices.len() as u32,
        }
    }

    /// Builds and uploads the vertex set for `shape`.
    pub fn build(device: &wgpu::Device, shape: Shape) -> Self {
        match shape {
            Shape::Triangle => Self::upload(device, shape, &build_triangle()),
            Shape::Ring => Self::upload(device, shape, &build_ring()),
        }
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_has_three_vertices_scaled_by_three() {
        let tri = build_triangle();
        assert_eq!(tri.len(), 3);
        assert_eq!(tri[0].pos, [-3.0, -0.866 * 3.0, 0.0]);
        assert_eq!(tri[1].pos[0], 0.0);
        assert_eq!(tri[2].pos[0], 3.0);
    }

    #[test]
    fn triangle_has_one_primary_color_per_vertex() {
        let colors: Vec<_> = build_triangle().iter().map(|v| v.color).collect();
        assert_eq!(
            colors,
            vec![[1.0, 0.0, 0.0, 1.0], [0.0, 1.0, 0.0, 1.0], [0.0, 0.0, 1.0, 1.0]]
        );
    }

    #[test]
    fn ring_is_closed_bit_for_bit() {
        let ring = build_ring();
        assert_eq!(ring.len(), 41);
        assert_eq!(
            bytemuck::bytes_of(&ring[RING_SEGMENTS]),
            bytemuck::bytes_of(&ring[0])
        );
    }

    #[test]
    fn ring_samples_lie_on_unit_circle_below_origin() {
        for v in &build_ring()[..RING_SEGMENTS] {
            let [x, y, z] = v.pos;
            assert!((x * x + z * z - 1.0).abs() < 1e-5, "{x} {z}");
            assert_eq!(y, -1.0);
        }
    }

    #[test]
    fn ring_normals_point_outward_in_xz() {
        for v in &build_ring()[..RING_SEGMENTS] {
            assert_eq!(v.normal[0], v.pos[0]);
            assert_eq!(v.normal[1], 0.0);
            assert_eq!(v.normal[2], v.pos[2]);
        }
    }

    #[test]
    fn ring_is_sampled_clockwise_from_above() {
        let ring = build_ring();
        // Quarter turn: θ = π/2 lands on -Z.
        let quarter = ring[RING_SEGMENTS / 4].pos;
        assert!(quarter[0].abs() < 1e-6);
        assert!((quarter[2] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn vertex_layouts_are_tightly_packed() {
        assert_eq!(std::mem::size_of::<VertexPosColor>(), 7 * 4);
        assert_eq!(std::mem::size_of::<VertexPosNormalColor>(), 10 * 4);
    }
}
