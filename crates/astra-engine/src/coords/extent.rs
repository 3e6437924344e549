use std::fmt;

/// Size of a drawable region in physical pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns `true` when either dimension is zero.
    ///
    /// A zero-area region cannot back a configured surface; callers defer
    /// configuration until the region grows again.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_width_is_empty() {
        assert!(Extent::new(0, 480).is_empty());
    }

    #[test]
    fn zero_height_is_empty() {
        assert!(Extent::new(640, 0).is_empty());
    }

    #[test]
    fn positive_extent_is_not_empty() {
        assert!(!Extent::new(1, 1).is_empty());
    }

    #[test]
    fn display_is_width_by_height() {
        assert_eq!(Extent::new(640, 480).to_string(), "640x480");
    }
}
