//! Geometry-expansion sample on top of `geoshade-engine`.
//!
//! Shows a colored triangle split into its three corner triangles, or a
//! 41-vertex ring extruded into a lit open cylinder with optional normal
//! lines. Keys: `1` triangle, `2` cylinder, `Q` toggle ring normals.

pub mod config;
pub mod vertex;
pub mod constants;
pub mod mode;
pub mod effect;
pub mod scene;
pub mod status;

mod app;

pub use app::GeoShadeApp;
pub use config::DemoConfig;
