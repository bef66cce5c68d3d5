//! Font loading for the text overlay.

mod font_system;

pub use font_system::{FontId, FontLoadError, FontSystem};
