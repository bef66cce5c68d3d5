//! Device-independent per-tick state: active mode and constant blocks.

use geoshade_engine::input::Key;

use crate::config::DemoConfig;
use crate::constants::{ConstantSink, ConstantState};
use crate::mode::Mode;
use crate::vertex::Shape;

#[derive(Debug, Clone)]
pub struct SceneState {
    mode: Mode,
    constants: ConstantState,
}

impl SceneState {
    /// `aspect` only seeds the projection; the first resize replaces it.
    pub fn new(config: &DemoConfig, aspect: f32) -> Self {
        Self {
            mode: Mode::default(),
            constants: ConstantState::new(config, aspect),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn constants(&self) -> &ConstantState {
        &self.constants
    }

    pub fn constants_mut(&mut self) -> &mut ConstantState {
        &mut self.constants
    }

    /// Advances one tick: pushes the per-frame block for the current mode,
    /// then applies this tick's key presses to the mode.
    ///
    /// Returns the shape whose vertex buffer must be rebuilt, if any.
    pub fn tick(
        &mut self,
        dt: f32,
        pressed: impl Fn(Key) -> bool,
        sink: &mut impl ConstantSink,
    ) -> Option<Shape> {
        self.constants.update_frame(self.mode, dt, sink);

        let t = self.mode.transition(pressed);
        if t.mode != self.mode {
            log::debug!("mode {:?} -> {:?}", self.mode, t.mode);
        }
        self.mode = t.mode;
        t.rebuild
    }
}

#[cfg(test)]
mod tests {
    use glam::Mat4;

    use super::*;
    use crate::constants::{CbChangesEveryFrame, CbChangesOnResize, CbNeverChange};

    #[derive(Default)]
    struct CountingSink {
        frames: usize,
    }

    impl ConstantSink for CountingSink {
        fn is_init(&self) -> bool {
            true
        }
        fn push_never_change(&mut self, _: &CbNeverChange) {}
        fn push_every_frame(&mut self, _: &CbChangesEveryFrame) {
            self.frames += 1;
        }
        fn push_on_resize(&mut self, _: &CbChangesOnResize) {}
    }

    fn none(_: Key) -> bool {
        false
    }

    #[test]
    fn every_tick_pushes_the_frame_block() {
        let mut scene = SceneState::new(&DemoConfig::default(), 1.0);
        let mut sink = CountingSink::default();
        for _ in 0..5 {
            scene.tick(0.016, none, &mut sink);
        }
        assert_eq!(sink.frames, 5);
    }

    #[test]
    fn switching_to_cylinder_requests_ring_rebuild() {
        let mut scene = SceneState::new(&DemoConfig::default(), 1.0);
        let mut sink = CountingSink::default();

        let rebuild = scene.tick(0.016, |k| k == Key::Digit2, &mut sink);
        assert_eq!(rebuild, Some(Shape::Ring));
        assert_eq!(scene.mode(), Mode::CylinderNoCap);

        assert_eq!(scene.tick(0.016, |k| k == Key::Q, &mut sink), None);
        assert_eq!(scene.mode(), Mode::CylinderNoCapWithNormal);
    }

    #[test]
    fn transition_tick_still_uses_the_previous_mode_for_world() {
        let mut scene = SceneState::new(&DemoConfig::default(), 1.0);
        let mut sink = CountingSink::default();

        // Still SplitTriangle while the frame block is computed.
        scene.tick(1.0, |k| k == Key::Digit2, &mut sink);
        let world = scene.constants().every_frame().world;
        assert_eq!(world, Mat4::IDENTITY.to_cols_array_2d());

        scene.tick(1.0, none, &mut sink);
        assert_ne!(scene.constants().every_frame().world, Mat4::IDENTITY.to_cols_array_2d());
    }

    #[test]
    fn returning_to_triangle_resets_world_to_identity() {
        let mut scene = SceneState::new(&DemoConfig::default(), 1.0);
        let mut sink = CountingSink::default();
        scene.tick(0.1, |k| k == Key::Digit2, &mut sink);
        scene.tick(0.5, none, &mut sink);
        scene.tick(0.1, |k| k == Key::Digit1, &mut sink);
        scene.tick(0.5, none, &mut sink);

        assert_eq!(scene.mode(), Mode::SplitTriangle);
        assert_eq!(
            scene.constants().every_frame().world,
            Mat4::IDENTITY.to_cols_array_2d()
        );
    }
}
