use std::f32::consts::PI;
use std::path::PathBuf;

use geoshade_engine::coords::Rect;
use geoshade_engine::paint::Color;

/// Sample configuration.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,

    /// Rotation speed about X in radians per second.
    pub pitch_rate: f32,
    /// Rotation speed about Y in radians per second.
    pub yaw_rate: f32,

    /// Height the ring is extruded to when drawn as a cylinder wall.
    pub cylinder_height: f32,
    pub eye: [f32; 3],
    pub clear_color: Color,

    pub overlay_font_size: f32,
    /// Status text box in logical pixels.
    pub overlay_box: Rect,
    /// Tried in order; the first readable font is used for the status overlay.
    pub font_paths: Vec<PathBuf>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            fov_y: PI / 3.0,
            near: 0.5,
            far: 1000.0,
            pitch_rate: 0.2,
            yaw_rate: 0.3,
            cylinder_height: 2.0,
            eye: [0.0, 0.0, -5.0],
            clear_color: Color::BLACK,
            overlay_font_size: 15.0,
            overlay_box: Rect::new(0.0, 0.0, 600.0, 200.0),
            font_paths: default_font_paths(),
        }
    }
}

fn default_font_paths() -> Vec<PathBuf> {
    [
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/noto/NotoSans-Regular.ttf",
        "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "/Library/Fonts/Arial.ttf",
        "C:\\Windows\\Fonts\\segoeui.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect()
}
