//! Colors shared by the clear pass and the overlay.

mod color;

pub use color::Color;
