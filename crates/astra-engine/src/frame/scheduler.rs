use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// Generation key carried by a scheduled tick.
///
/// Every tick request gets a new epoch, and stopping the loop moves past the
/// last one. A tick is only honoured if its epoch is the loop's current one,
/// so duplicate deliveries and ticks scheduled before `stop()` are ignored.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Epoch(pub(crate) u64);

impl Epoch {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "epoch {}", self.0)
    }
}

/// Scheduling port bound to the display's refresh.
///
/// The loop asks for at most one tick at a time; the host answers each
/// request by calling `tick(epoch)` on the next refresh.
pub trait TickScheduler {
    fn request_tick(&mut self, epoch: Epoch);
}

impl<F: FnMut(Epoch)> TickScheduler for F {
    fn request_tick(&mut self, epoch: Epoch) {
        self(epoch)
    }
}

/// Scheduler that queues requests for the host to drain.
///
/// Clones share the queue. Useful for hosts without a vsync callback and for
/// driving the loop by hand.
#[derive(Debug, Clone, Default)]
pub struct TickQueue {
    pending: Rc<RefCell<VecDeque<Epoch>>>,
}

impl TickQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Oldest outstanding request.
    pub fn pop(&self) -> Option<Epoch> {
        self.pending.borrow_mut().pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }
}

impl TickScheduler for TickQueue {
    fn request_tick(&mut self, epoch: Epoch) {
        self.pending.borrow_mut().push_back(epoch);
    }
}
