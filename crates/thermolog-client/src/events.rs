//! Dashboard events for front ends.
//!
//! The controller broadcasts an event after each handler has finished
//! mutating the dashboard state, so a front end can re-render from a fresh
//! snapshot.

/// Something a front end should react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardEvent {
    /// The chart or selector changed and should be redrawn.
    Redraw,

    /// Local state was thrown away and rebuilt from the device.
    Reloaded {
        /// Readings in the rebuilt series.
        readings: usize,
    },

    /// The push channel closed; no further live readings will arrive.
    ChannelClosed,
}
