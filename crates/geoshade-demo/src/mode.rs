//! Shape/draw mode state machine.

use geoshade_engine::input::Key;

use crate::vertex::Shape;

/// What the sample is currently showing.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum Mode {
    #[default]
    SplitTriangle,
    CylinderNoCap,
    CylinderNoCapWithNormal,
}

/// Result of feeding one tick of key presses to [`Mode::transition`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Transition {
    pub mode: Mode,
    /// Set when the vertex buffer must be rebuilt for a new shape.
    pub rebuild: Option<Shape>,
}

impl Mode {
    /// Applies the keys pressed this tick.
    ///
    /// A shape switch comes first: `1` selects the triangle and wins over
    /// `2`, which selects the cylinder. Both always rebuild their shape, even
    /// when already active. `Q` is then applied to the resulting mode: it
    /// toggles normals on the cylinder, does nothing on the triangle and never
    /// rebuilds.
    pub fn transition(self, pressed: impl Fn(Key) -> bool) -> Transition {
        let (mode, rebuild) = if pressed(Key::Digit1) {
            (Mode::SplitTriangle, Some(Shape::Triangle))
        } else if pressed(Key::Digit2) {
            (Mode::CylinderNoCap, Some(Shape::Ring))
        } else {
            (self, None)
        };

        let mode = if pressed(Key::Q) { mode.toggle_normals() } else { mode };
        Transition { mode, rebuild }
    }

    fn toggle_normals(self) -> Mode {
        match self {
            Mode::SplitTriangle => Mode::SplitTriangle,
            Mode::CylinderNoCap => Mode::CylinderNoCapWithNormal,
            Mode::CylinderNoCapWithNormal => Mode::CylinderNoCap,
        }
    }

    pub fn shape(self) -> Shape {
        match self {
            Mode::SplitTriangle => Shape::Triangle,
            Mode::CylinderNoCap | Mode::CylinderNoCapWithNormal => Shape::Ring,
        }
    }

    pub fn is_rotating(self) -> bool {
        self != Mode::SplitTriangle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(pressed: &'static [Key]) -> impl Fn(Key) -> bool {
        move |k| pressed.contains(&k)
    }

    const ALL: [Mode; 3] = [
        Mode::SplitTriangle,
        Mode::CylinderNoCap,
        Mode::CylinderNoCapWithNormal,
    ];

    #[test]
    fn starts_in_split_triangle() {
        assert_eq!(Mode::default(), Mode::SplitTriangle);
    }

    #[test]
    fn q_does_nothing_in_split_triangle() {
        let t = Mode::SplitTriangle.transition(keys(&[Key::Q]));
        assert_eq!(t, Transition { mode: Mode::SplitTriangle, rebuild: None });
    }

    #[test]
    fn q_alternates_normals_on_cylinder() {
        let mut mode = Mode::CylinderNoCap;
        let mut seen = Vec::new();
        for _ in 0..4 {
            let t = mode.transition(keys(&[Key::Q]));
            assert_eq!(t.rebuild, None);
            mode = t.mode;
            seen.push(mode);
        }
        assert_eq!(
            seen,
            vec![
                Mode::CylinderNoCapWithNormal,
                Mode::CylinderNoCap,
                Mode::CylinderNoCapWithNormal,
                Mode::CylinderNoCap,
            ]
        );
    }

    #[test]
    fn one_selects_triangle_from_any_state() {
        for m in ALL {
            let t = m.transition(keys(&[Key::Digit1]));
            assert_eq!(t.mode, Mode::SplitTriangle);
            assert_eq!(t.rebuild, Some(Shape::Triangle));
        }
    }

    #[test]
    fn two_selects_cylinder_from_any_state() {
        for m in ALL {
            let t = m.transition(keys(&[Key::Digit2]));
            assert_eq!(t.mode, Mode::CylinderNoCap);
            assert_eq!(t.rebuild, Some(Shape::Ring));
        }
    }

    #[test]
    fn one_wins_over_two_in_the_same_tick() {
        for m in ALL {
            let t = m.transition(keys(&[Key::Digit2, Key::Digit1]));
            assert_eq!(t, Transition { mode: Mode::SplitTriangle, rebuild: Some(Shape::Triangle) });
        }
    }

    #[test]
    fn q_applies_after_a_shape_switch_in_the_same_tick() {
        let t = Mode::SplitTriangle.transition(keys(&[Key::Digit2, Key::Q]));
        assert_eq!(t, Transition { mode: Mode::CylinderNoCapWithNormal, rebuild: Some(Shape::Ring) });

        // Already showing normals: `2` resets to the plain cylinder, `Q` turns them back on.
        let t = Mode::CylinderNoCapWithNormal.transition(keys(&[Key::Digit2, Key::Q]));
        assert_eq!(t.mode, Mode::CylinderNoCapWithNormal);

        let t = Mode::CylinderNoCap.transition(keys(&[Key::Digit1, Key::Q]));
        assert_eq!(t, Transition { mode: Mode::SplitTriangle, rebuild: Some(Shape::Triangle) });

        let t = Mode::CylinderNoCap.transition(keys(&[Key::Q, Key::Digit2, Key::Digit1]));
        assert_eq!(t.mode, Mode::SplitTriangle);
    }

    #[test]
    fn other_keys_are_ignored() {
        for m in ALL {
            let t = m.transition(keys(&[Key::W, Key::Space, Key::Digit3]));
            assert_eq!(t, Transition { mode: m, rebuild: None });
        }
    }
}
