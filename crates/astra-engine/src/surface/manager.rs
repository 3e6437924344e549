use std::cell::Cell;
use std::rc::Rc;

use crate::backend::{Backend, PresentSurface, PresentableImage, SurfaceConfig, ValidationError};
use crate::coords::Extent;
use crate::device::DeviceContext;
use crate::pipeline::ColorFormat;

use super::ticket::TicketSlot;
use super::{FrameTicket, SurfaceError};

/// Owns the presentable surface and keeps it matched to the display region.
///
/// The surface is created once by the host and reconfigured (never recreated)
/// on resize. A zero-sized region cannot be configured: the size is recorded
/// and acquisition reports [`SurfaceError::Unconfigured`] until a usable size
/// arrives.
pub struct SurfaceManager<B: Backend> {
    surface: B::Surface,
    format: Option<ColorFormat>,
    extent: Extent,
    configured: bool,
    lost: bool,
    outstanding: Rc<Cell<bool>>,
    acquired: u64,
}

impl<B: Backend> SurfaceManager<B> {
    pub fn new(surface: B::Surface) -> Self {
        Self {
            surface,
            format: None,
            extent: Extent::default(),
            configured: false,
            lost: false,
            outstanding: Rc::new(Cell::new(false)),
            acquired: 0,
        }
    }

    /// The format the display would pick if the host does not.
    pub fn preferred_format(&self) -> ColorFormat {
        self.surface.preferred_format()
    }

    /// Binds the display region to `device` with `format`.
    ///
    /// Also clears a previous loss: reconfiguration is the only recovery path
    /// for [`SurfaceError::Lost`]. A configuration the backend rejects marks
    /// the surface lost.
    pub fn configure(
        &mut self,
        device: &DeviceContext<B>,
        format: ColorFormat,
        width: u32,
        height: u32,
    ) -> Result<(), ValidationError> {
        let extent = Extent::new(width, height);
        self.format = Some(format);
        self.extent = extent;

        if extent.is_empty() {
            // Minimized windows report 0x0; wait for a real size.
            self.configured = false;
            log::debug!("surface configuration deferred: region is {extent}");
            return Ok(());
        }

        if let Err(err) = self
            .surface
            .configure(device.device(), &SurfaceConfig { format, extent })
        {
            self.configured = false;
            self.lost = true;
            return Err(err);
        }
        self.configured = true;
        self.lost = false;

        log::info!("surface configured: {extent} {format}");
        Ok(())
    }

    /// Reconfigures with the current format. Before the first `configure`
    /// the surface's preferred format is used.
    pub fn resize(
        &mut self,
        device: &DeviceContext<B>,
        width: u32,
        height: u32,
    ) -> Result<(), ValidationError> {
        if self.configured && !self.lost && self.extent == Extent::new(width, height) {
            return Ok(());
        }
        let format = self.format.unwrap_or_else(|| self.preferred_format());
        self.configure(device, format, width, height)
    }

    /// Acquires the image to draw into this frame.
    pub fn acquire_next_image(&mut self) -> Result<FrameTicket<B>, SurfaceError> {
        if self.outstanding.get() {
            return Err(SurfaceError::TicketAlreadyOutstanding);
        }
        if self.lost {
            return Err(SurfaceError::Lost);
        }
        if !self.configured {
            return Err(SurfaceError::Unconfigured);
        }

        let image = self.surface.acquire().inspect_err(|err| {
            if *err == SurfaceError::Lost {
                self.lost = true;
            }
        })?;

        let index = self.acquired;
        self.acquired += 1;

        log::trace!("acquired surface image #{index}");
        Ok(FrameTicket {
            size: image.size(),
            image,
            index,
            slot: TicketSlot::claim(&self.outstanding),
        })
    }

    /// Presents the ticket's image and frees the ticket slot.
    pub fn present(&mut self, ticket: FrameTicket<B>) {
        let FrameTicket {
            image, index, slot, ..
        } = ticket;
        debug_assert!(slot.belongs_to(&self.outstanding));

        self.surface.present(image);
        drop(slot);

        log::trace!("presented surface image #{index}");
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// `None` until the first `configure`.
    pub fn format(&self) -> Option<ColorFormat> {
        self.format
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    pub fn is_lost(&self) -> bool {
        self.lost
    }
}
