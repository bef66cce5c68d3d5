//! geoshade engine crate.
//!
//! Owns the platform + GPU runtime pieces the sample is built on: window and
//! event loop, device and swap chain, depth/stencil target, input tracking,
//! frame timing, logging and the 2D text overlay.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod paint;
pub mod render;
pub mod text;
