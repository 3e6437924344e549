use std::cell::Cell;
use std::rc::Rc;

use crate::backend::Backend;
use crate::coords::Extent;

/// The image to draw into this frame.
///
/// At most one ticket per surface exists at a time. Hand it back through
/// [`SurfaceManager::present`](super::SurfaceManager::present); dropping it
/// instead discards the image and frees the slot.
pub struct FrameTicket<B: Backend> {
    pub(super) image: B::Image,
    pub(super) size: Extent,
    pub(super) index: u64,
    pub(super) slot: TicketSlot,
}

impl<B: Backend> FrameTicket<B> {
    pub fn image(&self) -> &B::Image {
        &self.image
    }

    /// Pixel size of the image; equals the surface's configured extent.
    pub fn size(&self) -> Extent {
        self.size
    }

    /// Sequence number of this acquisition on its surface.
    pub fn index(&self) -> u64 {
        self.index
    }
}

/// Marks the owning surface's single ticket slot as taken until dropped.
pub(super) struct TicketSlot(Rc<Cell<bool>>);

impl TicketSlot {
    pub(super) fn claim(flag: &Rc<Cell<bool>>) -> Self {
        flag.set(true);
        Self(Rc::clone(flag))
    }

    pub(super) fn belongs_to(&self, flag: &Rc<Cell<bool>>) -> bool {
        Rc::ptr_eq(&self.0, flag)
    }
}

impl Drop for TicketSlot {
    fn drop(&mut self) {
        self.0.set(false);
    }
}
