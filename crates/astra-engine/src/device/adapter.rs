use super::AcquireError;

/// Process-scoped home of the selected graphics adapter.
///
/// Lifecycle: created once at startup from the outcome of adapter selection
/// (which may have found nothing), lent by reference to every
/// [`DeviceContext::acquire`](super::DeviceContext::acquire), and torn down
/// once by [`shutdown`](Self::shutdown), which consumes it. The scope is
/// passed explicitly; there is no global accessor.
#[derive(Debug)]
pub struct AdapterScope<A> {
    adapter: Option<A>,
}

impl<A> AdapterScope<A> {
    pub fn new(adapter: Option<A>) -> Self {
        if adapter.is_none() {
            log::warn!("adapter scope created without an adapter; rendering will be unavailable");
        }
        Self { adapter }
    }

    /// A scope for a platform that exposes no adapter at all.
    pub fn empty() -> Self {
        Self::new(None)
    }

    pub fn adapter(&self) -> Result<&A, AcquireError> {
        self.adapter.as_ref().ok_or(AcquireError::NoAdapterAvailable)
    }

    /// Ends the scope and hands back the adapter for release.
    pub fn shutdown(self) -> Option<A> {
        log::debug!("adapter scope shut down");
        self.adapter
    }
}

impl<A> From<A> for AdapterScope<A> {
    fn from(adapter: A) -> Self {
        Self::new(Some(adapter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scope_reports_no_adapter() {
        let scope: AdapterScope<u32> = AdapterScope::empty();
        assert_eq!(scope.adapter().unwrap_err(), AcquireError::NoAdapterAvailable);
    }

    #[test]
    fn shutdown_returns_the_adapter() {
        let scope = AdapterScope::from(7u32);
        assert_eq!(scope.adapter().copied(), Ok(7));
        assert_eq!(scope.shutdown(), Some(7));
    }
}
