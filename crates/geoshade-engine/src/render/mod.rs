//! GPU rendering helpers shared by applications.
//!
//! Convention for the 2D overlay:
//! - CPU geometry is in logical pixels (top-left origin, +Y down).
//! - The vertex shader converts to NDC using a viewport uniform.

mod ctx;
pub mod overlay;

pub use ctx::{RenderCtx, RenderTarget};
