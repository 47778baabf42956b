// Host display-sleep inhibitor.
//
// Implemented natively by each front end (IOKit power assertions on macOS,
// thread execution state on Windows). The controller only ever holds the
// opaque handle returned by `start`.

use std::fmt::Debug;

use crate::error::CoffeeError;

pub trait PowerInhibitor {
    /// Opaque token identifying one inhibition request.
    type Handle: Clone + Debug;

    /// Begins preventing display sleep.
    fn start(&mut self, reason: &str) -> Result<Self::Handle, CoffeeError>;

    /// Requests the inhibition identified by `handle` to end. The OS may not
    /// honor this; callers confirm with [`PowerInhibitor::is_active`].
    fn stop(&mut self, handle: &Self::Handle);

    /// Whether the inhibition identified by `handle` is still in effect.
    fn is_active(&self, handle: &Self::Handle) -> bool;
}
