//! Pixel-space value types.
//!
//! Surfaces and frame images are sized in physical pixels; nothing in the
//! engine works in logical (DPI-scaled) units.

mod extent;

pub use extent::Extent;
