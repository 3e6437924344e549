use crate::backend::{PresentSurface, PresentableImage, SurfaceConfig, ValidationError};
use crate::coords::Extent;
use crate::pipeline::ColorFormat;
use crate::surface::SurfaceError;

use super::conversions;
use super::device::validated;
use super::{Gpu, GpuDevice, GpuOptions};

/// wgpu surface plus what is needed to reconfigure it on its own.
pub struct GpuSurface {
    raw: wgpu::Surface<'static>,
    caps: Option<wgpu::SurfaceCapabilities>,

    prefer_srgb: bool,
    present_mode: wgpu::PresentMode,
    alpha_mode: Option<wgpu::CompositeAlphaMode>,
    desired_maximum_frame_latency: u32,

    /// Last applied configuration, kept for recovering from `Outdated`.
    active: Option<(wgpu::Device, wgpu::SurfaceConfiguration)>,
}

impl GpuSurface {
    pub(super) fn new(raw: wgpu::Surface<'static>, options: &GpuOptions) -> Self {
        Self {
            raw,
            caps: None,
            prefer_srgb: options.prefer_srgb,
            present_mode: options.present_mode,
            alpha_mode: options.alpha_mode,
            desired_maximum_frame_latency: options.desired_maximum_frame_latency,
            active: None,
        }
    }

    pub fn raw(&self) -> &wgpu::Surface<'static> {
        &self.raw
    }

    /// Records what the selected adapter supports on this surface.
    pub(super) fn attach(&mut self, adapter: &wgpu::Adapter) {
        let caps = self.raw.get_capabilities(adapter);
        log::debug!(
            "surface supports {} formats, present modes {:?}",
            caps.formats.len(),
            caps.present_modes
        );
        self.caps = Some(caps);
    }

    fn surface_configuration(&self, config: &SurfaceConfig) -> wgpu::SurfaceConfiguration {
        let (present_mode, alpha_mode) = match &self.caps {
            Some(caps) => {
                let present_mode = if caps.present_modes.contains(&self.present_mode) {
                    self.present_mode
                } else {
                    log::warn!("present mode {:?} unsupported; using Fifo", self.present_mode);
                    wgpu::PresentMode::Fifo
                };
                (present_mode, choose_alpha_mode(caps, self.alpha_mode))
            }
            None => (self.present_mode, wgpu::CompositeAlphaMode::Auto),
        };

        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: conversions::texture_format(config.format),
            width: config.extent.width,
            height: config.extent.height,
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: self.desired_maximum_frame_latency,
        }
    }
}

impl PresentSurface<Gpu> for GpuSurface {
    fn preferred_format(&self) -> ColorFormat {
        self.caps
            .as_ref()
            .and_then(|caps| choose_surface_format(caps, self.prefer_srgb))
            .unwrap_or(if self.prefer_srgb {
                ColorFormat::Bgra8UnormSrgb
            } else {
                ColorFormat::Bgra8Unorm
            })
    }

    fn configure(&mut self, device: &GpuDevice, config: &SurfaceConfig) -> Result<(), ValidationError> {
        self.active = None;
        if let Some(caps) = &self.caps {
            check_format(caps, config.format)?;
        }

        let cfg = self.surface_configuration(config);
        validated(device.raw(), "surface configuration", || {
            self.raw.configure(device.raw(), &cfg)
        })?;
        self.active = Some((device.raw().clone(), cfg));
        Ok(())
    }

    fn acquire(&mut self) -> Result<GpuImage, SurfaceError> {
        match self.raw.get_current_texture() {
            Ok(texture) => {
                let view = texture
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                Ok(GpuImage { texture, view })
            }
            Err(wgpu::SurfaceError::Lost) => Err(SurfaceError::Lost),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("out of memory while acquiring a surface texture");
                Err(SurfaceError::Lost)
            }
            Err(wgpu::SurfaceError::Outdated) => {
                if let Some((device, cfg)) = &self.active {
                    self.raw.configure(device, cfg);
                }
                Err(SurfaceError::Transient)
            }
            Err(wgpu::SurfaceError::Timeout) | Err(wgpu::SurfaceError::Other) => {
                Err(SurfaceError::Transient)
            }
        }
    }

    fn present(&mut self, image: GpuImage) {
        let GpuImage { texture, view } = image;
        drop(view);
        texture.present();
    }
}

/// One acquired swapchain texture and its render view.
pub struct GpuImage {
    texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
}

impl GpuImage {
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

impl PresentableImage for GpuImage {
    fn size(&self) -> Extent {
        Extent::new(self.texture.texture.width(), self.texture.texture.height())
    }
}

fn choose_surface_format(caps: &wgpu::SurfaceCapabilities, prefer_srgb: bool) -> Option<ColorFormat> {
    let mut supported = caps.formats.iter().copied().filter_map(conversions::color_format);

    if prefer_srgb {
        let preferred = [ColorFormat::Bgra8UnormSrgb, ColorFormat::Rgba8UnormSrgb];
        for f in preferred {
            if caps.formats.contains(&conversions::texture_format(f)) {
                return Some(f);
            }
        }
    }

    supported.next()
}

fn check_format(caps: &wgpu::SurfaceCapabilities, format: ColorFormat) -> Result<(), ValidationError> {
    if caps.formats.contains(&conversions::texture_format(format)) {
        Ok(())
    } else {
        Err(ValidationError::new(
            "surface configuration",
            format!("format {format} is not supported by the surface"),
        ))
    }
}

fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    wanted: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    wanted
        .filter(|m| caps.alpha_modes.contains(m))
        .unwrap_or_else(|| {
            caps.alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(formats: &[wgpu::TextureFormat], alpha: &[wgpu::CompositeAlphaMode]) -> wgpu::SurfaceCapabilities {
        wgpu::SurfaceCapabilities {
            formats: formats.to_vec(),
            present_modes: vec![wgpu::PresentMode::Fifo],
            alpha_modes: alpha.to_vec(),
            usages: wgpu::TextureUsages::RENDER_ATTACHMENT,
        }
    }

    #[test]
    fn srgb_is_preferred_when_offered() {
        let c = caps(
            &[wgpu::TextureFormat::Bgra8Unorm, wgpu::TextureFormat::Rgba8UnormSrgb],
            &[],
        );
        assert_eq!(choose_surface_format(&c, true), Some(ColorFormat::Rgba8UnormSrgb));
        assert_eq!(choose_surface_format(&c, false), Some(ColorFormat::Bgra8Unorm));
    }

    #[test]
    fn unknown_formats_are_skipped() {
        let c = caps(
            &[wgpu::TextureFormat::R16Float, wgpu::TextureFormat::Rgba16Float],
            &[],
        );
        assert_eq!(choose_surface_format(&c, true), Some(ColorFormat::Rgba16Float));
        assert_eq!(choose_surface_format(&caps(&[], &[]), true), None);
    }

    #[test]
    fn format_outside_the_capabilities_is_rejected() {
        let c = caps(&[wgpu::TextureFormat::Bgra8UnormSrgb], &[]);
        assert!(check_format(&c, ColorFormat::Bgra8UnormSrgb).is_ok());

        let err = check_format(&c, ColorFormat::Rgba16Float).unwrap_err();
        assert_eq!(err.object, "surface configuration");
        assert!(err.reason.contains("rgba16float"));
    }

    #[test]
    fn unsupported_alpha_mode_falls_back_to_first_supported() {
        let c = caps(&[], &[wgpu::CompositeAlphaMode::Opaque]);
        assert_eq!(
            choose_alpha_mode(&c, Some(wgpu::CompositeAlphaMode::PreMultiplied)),
            wgpu::CompositeAlphaMode::Opaque
        );
        assert_eq!(choose_alpha_mode(&caps(&[], &[]), None), wgpu::CompositeAlphaMode::Auto);
    }
}
