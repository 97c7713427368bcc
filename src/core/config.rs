//! # Dispatcher configuration.
//!
//! Provides [`DispatcherConfig`], centralized settings for a [`Dispatcher`](crate::Dispatcher).
//!
//! ## Sentinel values
//! - `stream_capacity = 0` → clamped to 1 by the bus

/// Configuration for the dispatcher.
///
/// ## Field semantics
/// - `stream_capacity`: Event stream ring buffer size (min 1; clamped)
/// - `log_listener_errors`: Emit an `ERROR` log line before returning a listener failure
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors over
/// repeating sentinel checks.
#[derive(Clone, Debug)]
pub struct DispatcherConfig {
    /// Capacity of the event stream broadcast channel ring buffer.
    ///
    /// Stream subscribers that fall behind more than `stream_capacity` records
    /// skip the oldest ones. Minimum value is 1.
    pub stream_capacity: usize,

    /// Whether a failing listener is logged before the error is returned.
    pub log_listener_errors: bool,
}

impl DispatcherConfig {
    /// Returns the stream capacity clamped to a minimum of 1.
    #[inline]
    pub fn stream_capacity_clamped(&self) -> usize {
        self.stream_capacity.max(1)
    }
}

impl Default for DispatcherConfig {
    /// Default configuration:
    ///
    /// - `stream_capacity = 1024`
    /// - `log_listener_errors = true`
    fn default() -> Self {
        Self {
            stream_capacity: 1024,
            log_listener_errors: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_capacity_is_clamped() {
        let cfg = DispatcherConfig {
            stream_capacity: 0,
            ..DispatcherConfig::default()
        };
        assert_eq!(cfg.stream_capacity_clamped(), 1);
        assert_eq!(DispatcherConfig::default().stream_capacity_clamped(), 1024);
    }
}
