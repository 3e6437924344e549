/// Color a render pass clears its target to.
///
/// Components are straight (non-premultiplied) alpha in the target's color
/// space, stored as `f64` to match what graphics APIs take for clear values.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ClearColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl ClearColor {
    /// Fully transparent black. This is the frame loop's default clear.
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);

    #[inline]
    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }
}
