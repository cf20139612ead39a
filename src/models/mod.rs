pub mod common;
pub mod gemini;
pub mod generation;
pub mod image;
pub mod text;

pub use common::*;
pub use generation::*;
pub use image::*;
pub use text::*;
