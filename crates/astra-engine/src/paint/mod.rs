//! Color values consumed by render passes.

mod color;

pub use color::ClearColor;
