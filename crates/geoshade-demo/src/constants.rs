//! Constant blocks and the state that keeps them current.
//!
//! Layouts follow WGSL uniform rules: `vec3` members are padded to 16 bytes
//! by a trailing scalar, every struct size is a multiple of 16.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::config::DemoConfig;
use crate::mode::Mode;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct DirectionalLight {
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub direction: [f32; 3],
    pub _pad: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            ambient: [0.2, 0.2, 0.2, 1.0],
            diffuse: [0.8, 0.8, 0.8, 1.0],
            specular: [0.5, 0.5, 0.5, 1.0],
            direction: [-0.577, -0.577, 0.577],
            _pad: 0.0,
        }
    }
}

/// Surface reflectance. `specular.w` is the specular power.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Material {
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: [0.5, 0.5, 0.5, 1.0],
            diffuse: [1.0, 1.0, 1.0, 1.0],
            specular: [0.5, 0.5, 0.5, 5.0],
        }
    }
}

/// Set once at init.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CbNeverChange {
    pub view: [[f32; 4]; 4],
    pub dir_light: DirectionalLight,
    pub material: Material,
    pub eye_pos: [f32; 3],
    pub cylinder_height: f32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CbChangesEveryFrame {
    pub world: [[f32; 4]; 4],
    pub world_inv_transpose: [[f32; 4]; 4],
}

impl Default for CbChangesEveryFrame {
    fn default() -> Self {
        Self::from_world(Mat4::IDENTITY)
    }
}

impl CbChangesEveryFrame {
    pub fn from_world(world: Mat4) -> Self {
        Self {
            world: world.to_cols_array_2d(),
            world_inv_transpose: world.inverse().transpose().to_cols_array_2d(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CbChangesOnResize {
    pub proj: [[f32; 4]; 4],
}

/// Where constant blocks go once they change.
///
/// Implemented by the shading effect; pushes upload the block verbatim.
pub trait ConstantSink {
    /// True once device-side constant storage exists.
    fn is_init(&self) -> bool;
    fn push_never_change(&mut self, cb: &CbNeverChange);
    fn push_every_frame(&mut self, cb: &CbChangesEveryFrame);
    fn push_on_resize(&mut self, cb: &CbChangesOnResize);
}

/// Accumulated model rotation in radians.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rotation {
    /// About X.
    pub phi: f32,
    /// About Y.
    pub theta: f32,
}

impl Rotation {
    pub fn advance(&mut self, dt: f32, pitch_rate: f32, yaw_rate: f32) {
        self.phi += pitch_rate * dt;
        self.theta += yaw_rate * dt;
    }

    /// Rotate about X first, then about Y.
    pub fn world(&self) -> Mat4 {
        Mat4::from_rotation_y(self.theta) * Mat4::from_rotation_x(self.phi)
    }
}

/// Left-handed perspective parameters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Projection {
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    pub fn matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_lh(self.fov_y, aspect, self.near, self.far)
    }
}

/// CPU-side copies of all three constant blocks plus the rotation state.
#[derive(Debug, Clone)]
pub struct ConstantState {
    never_change: CbNeverChange,
    every_frame: CbChangesEveryFrame,
    on_resize: CbChangesOnResize,
    rotation: Rotation,
    projection: Projection,
    pitch_rate: f32,
    yaw_rate: f32,
}

impl ConstantState {
    pub fn new(config: &DemoConfig, aspect: f32) -> Self {
        let eye = Vec3::from_array(config.eye);
        let view = Mat4::look_at_lh(eye, Vec3::ZERO, Vec3::Y);
        let projection = Projection {
            fov_y: config.fov_y,
            near: config.near,
            far: config.far,
        };

        Self {
            never_change: CbNeverChange {
                view: view.to_cols_array_2d(),
                dir_light: DirectionalLight::default(),
                material: Material::default(),
                eye_pos: config.eye,
                cylinder_height: config.cylinder_height,
            },
            every_frame: CbChangesEveryFrame::default(),
            on_resize: CbChangesOnResize {
                proj: projection.matrix(aspect).to_cols_array_2d(),
            },
            rotation: Rotation::default(),
            projection,
            pitch_rate: config.pitch_rate,
            yaw_rate: config.yaw_rate,
        }
    }

    /// Pushes every block once; called right after the sink is initialized.
    pub fn push_all(&self, sink: &mut impl ConstantSink) {
        sink.push_never_change(&self.never_change);
        sink.push_on_resize(&self.on_resize);
        sink.push_every_frame(&self.every_frame);
    }

    /// Recomputes the world transform for this tick and pushes it.
    ///
    /// The triangle is drawn untransformed; the rotation only advances while
    /// a cylinder mode is active.
    pub fn update_frame(&mut self, mode: Mode, dt: f32, sink: &mut impl ConstantSink) {
        let world = if mode.is_rotating() {
            self.rotation.advance(dt, self.pitch_rate, self.yaw_rate);
            self.rotation.world()
        } else {
            Mat4::IDENTITY
        };
        self.every_frame = CbChangesEveryFrame::from_world(world);
        sink.push_every_frame(&self.every_frame);
    }

    /// Recomputes the projection for `aspect`.
    ///
    /// Returns `true` if the block was pushed; nothing is pushed before the
    /// sink is initialized.
    pub fn on_resize(&mut self, aspect: f32, sink: &mut impl ConstantSink) -> bool {
        self.on_resize.proj = self.projection.matrix(aspect).to_cols_array_2d();
        if !sink.is_init() {
            return false;
        }
        sink.push_on_resize(&self.on_resize);
        true
    }

    pub fn never_change(&self) -> &CbNeverChange {
        &self.never_change
    }

    pub fn every_frame(&self) -> &CbChangesEveryFrame {
        &self.every_frame
    }

    pub fn projection(&self) -> &CbChangesOnResize {
        &self.on_resize
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        init: bool,
        never_change: usize,
        every_frame: Vec<CbChangesEveryFrame>,
        on_resize: Vec<CbChangesOnResize>,
    }

    impl ConstantSink for Recorder {
        fn is_init(&self) -> bool {
            self.init
        }
        fn push_never_change(&mut self, _cb: &CbNeverChange) {
            self.never_change += 1;
        }
        fn push_every_frame(&mut self, cb: &CbChangesEveryFrame) {
            self.every_frame.push(*cb);
        }
        fn push_on_resize(&mut self, cb: &CbChangesOnResize) {
            self.on_resize.push(*cb);
        }
    }

    fn state() -> ConstantState {
        ConstantState::new(&DemoConfig::default(), 4.0 / 3.0)
    }

    fn approx_eq(a: Mat4, b: Mat4) -> bool {
        a.abs_diff_eq(b, 1e-5)
    }

    #[test]
    fn block_sizes_match_shader_layout() {
        assert_eq!(std::mem::size_of::<DirectionalLight>(), 64);
        assert_eq!(std::mem::size_of::<Material>(), 48);
        assert_eq!(std::mem::size_of::<CbNeverChange>(), 192);
        assert_eq!(std::mem::size_of::<CbChangesEveryFrame>(), 128);
        assert_eq!(std::mem::size_of::<CbChangesOnResize>(), 64);
    }

    #[test]
    fn world_is_identity_in_split_triangle_for_any_dt() {
        let mut s = state();
        let mut sink = Recorder::default();
        for dt in [0.0, 0.016, 0.25, 10.0] {
            s.update_frame(Mode::SplitTriangle, dt, &mut sink);
            assert_eq!(s.every_frame().world, Mat4::IDENTITY.to_cols_array_2d());
        }
        assert_eq!(s.rotation(), Rotation::default());
        assert_eq!(sink.every_frame.len(), 4);
    }

    #[test]
    fn rotation_accumulates_in_cylinder_modes() {
        let mut s = state();
        let mut sink = Recorder::default();
        s.update_frame(Mode::CylinderNoCap, 0.5, &mut sink);
        s.update_frame(Mode::CylinderNoCapWithNormal, 0.5, &mut sink);

        let r = s.rotation();
        assert!((r.phi - 0.2).abs() < 1e-6);
        assert!((r.theta - 0.3).abs() < 1e-6);

        let expected = Mat4::from_rotation_y(0.3) * Mat4::from_rotation_x(0.2);
        assert!(approx_eq(Mat4::from_cols_array_2d(&s.every_frame().world), expected));
    }

    #[test]
    fn rotation_applies_x_before_y() {
        let r = Rotation { phi: std::f32::consts::FRAC_PI_2, theta: std::f32::consts::FRAC_PI_2 };
        // +Y -> (X by 90°) +Z -> (Y by 90°) +X
        let p = r.world().transform_vector3(Vec3::Y);
        assert!(p.abs_diff_eq(Vec3::X, 1e-5), "{p:?}");
    }

    #[test]
    fn inverse_transpose_undoes_world() {
        let mut s = state();
        let mut sink = Recorder::default();
        s.update_frame(Mode::CylinderNoCap, 1.7, &mut sink);

        let world = Mat4::from_cols_array_2d(&s.every_frame().world);
        let inv_t = Mat4::from_cols_array_2d(&s.every_frame().world_inv_transpose);
        assert!(approx_eq(inv_t.transpose() * world, Mat4::IDENTITY));
    }

    #[test]
    fn resize_before_init_pushes_nothing() {
        let mut s = state();
        let mut sink = Recorder::default();
        assert!(!s.on_resize(16.0 / 9.0, &mut sink));
        assert!(sink.on_resize.is_empty());
    }

    #[test]
    fn resize_after_init_pushes_once_per_event() {
        let mut s = state();
        let mut sink = Recorder { init: true, ..Default::default() };

        assert!(s.on_resize(2.0, &mut sink));
        assert_eq!(sink.on_resize.len(), 1);
        assert!(s.on_resize(1.0, &mut sink));
        assert_eq!(sink.on_resize.len(), 2);

        let expected = Mat4::perspective_lh(std::f32::consts::PI / 3.0, 1.0, 0.5, 1000.0);
        assert!(approx_eq(Mat4::from_cols_array_2d(&sink.on_resize[1].proj), expected));
    }

    #[test]
    fn resize_before_init_still_updates_projection() {
        let mut s = state();
        let mut sink = Recorder::default();
        s.on_resize(2.0, &mut sink);
        sink.init = true;
        s.push_all(&mut sink);

        let expected = Mat4::perspective_lh(std::f32::consts::PI / 3.0, 2.0, 0.5, 1000.0);
        assert!(approx_eq(Mat4::from_cols_array_2d(&sink.on_resize[0].proj), expected));
        assert_eq!(sink.never_change, 1);
    }

    #[test]
    fn never_change_block_carries_camera_and_height() {
        let s = state();
        let cb = s.never_change();
        assert_eq!(cb.eye_pos, [0.0, 0.0, -5.0]);
        assert_eq!(cb.cylinder_height, 2.0);

        // The eye looks down +Z at the origin: origin lands 5 units ahead.
        let view = Mat4::from_cols_array_2d(&cb.view);
        let o = view.transform_point3(Vec3::ZERO);
        assert!(o.abs_diff_eq(Vec3::new(0.0, 0.0, 5.0), 1e-5), "{o:?}");
    }
}
