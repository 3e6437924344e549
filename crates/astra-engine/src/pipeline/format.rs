use std::fmt;

/// Color formats a pipeline can target and a surface can present.
///
/// Every variant is float-sampled: fragment shaders write `f32` vectors into
/// all of them.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ColorFormat {
    Bgra8Unorm,
    Bgra8UnormSrgb,
    Rgba8Unorm,
    Rgba8UnormSrgb,
    Rgb10a2Unorm,
    Rgba16Float,
}

impl ColorFormat {
    /// Number of color channels a fragment output must provide.
    #[inline]
    pub const fn components(self) -> u8 {
        match self {
            Self::Bgra8Unorm
            | Self::Bgra8UnormSrgb
            | Self::Rgba8Unorm
            | Self::Rgba8UnormSrgb
            | Self::Rgb10a2Unorm
            | Self::Rgba16Float => 4,
        }
    }
}

impl fmt::Display for ColorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bgra8Unorm => "bgra8unorm",
            Self::Bgra8UnormSrgb => "bgra8unorm-srgb",
            Self::Rgba8Unorm => "rgba8unorm",
            Self::Rgba8UnormSrgb => "rgba8unorm-srgb",
            Self::Rgb10a2Unorm => "rgb10a2unorm",
            Self::Rgba16Float => "rgba16float",
        };
        f.write_str(name)
    }
}

/// Primitive assembly mode of a pipeline.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum Topology {
    PointList,
    LineList,
    LineStrip,
    #[default]
    TriangleList,
    TriangleStrip,
}
