//! Render-complete notifications.

use tokio::sync::broadcast;

/// Buffered notifications per element before slow receivers lag.
pub(crate) const CHANNEL_CAPACITY: usize = 16;

/// Emitted after a render pass commits its output to the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderComplete {
    /// HTML written to the host.
    pub html: String,
}

pub(crate) fn channel() -> broadcast::Sender<RenderComplete> {
    broadcast::channel(CHANNEL_CAPACITY).0
}
