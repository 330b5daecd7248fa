//! Timeout configuration for batch calls.

use std::time::Duration;

/// Timeouts applied by the HTTP transport.
///
/// # Examples
///
/// ```rust
/// use batch_link::LinkTimeouts;
/// use std::time::Duration;
///
/// let timeouts = LinkTimeouts::builder()
///     .connection_timeout(Duration::from_secs(5))
///     .request_timeout(Duration::from_secs(60))
///     .build();
/// assert_eq!(timeouts.request_timeout, Duration::from_secs(60));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTimeouts {
    /// TCP + TLS handshake.
    /// Default: 10 seconds
    pub connection_timeout: Duration,

    /// Whole request, from send to the last body byte.
    /// Default: 30 seconds
    pub request_timeout: Duration,
}

impl Default for LinkTimeouts {
    fn default() -> Self {
        Self {
            connection_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl LinkTimeouts {
    pub fn builder() -> LinkTimeoutsBuilder {
        LinkTimeoutsBuilder::new()
    }

    /// Short timeouts for a backend on localhost.
    pub fn fast() -> Self {
        Self {
            connection_timeout: Duration::from_secs(2),
            request_timeout: Duration::from_secs(5),
        }
    }

    /// Long timeouts for slow stored procedures or remote networks.
    pub fn relaxed() -> Self {
        Self {
            connection_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// Builder for [`LinkTimeouts`].
#[derive(Debug, Clone)]
pub struct LinkTimeoutsBuilder {
    timeouts: LinkTimeouts,
}

impl LinkTimeoutsBuilder {
    fn new() -> Self {
        Self {
            timeouts: LinkTimeouts::default(),
        }
    }

    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.connection_timeout = timeout;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.request_timeout = timeout;
        self
    }

    pub fn build(self) -> LinkTimeouts {
        self.timeouts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_ordered() {
        let fast = LinkTimeouts::fast();
        let default = LinkTimeouts::default();
        let relaxed = LinkTimeouts::relaxed();

        assert!(fast.request_timeout < default.request_timeout);
        assert!(default.request_timeout < relaxed.request_timeout);
        assert!(fast.connection_timeout < relaxed.connection_timeout);
    }

    #[test]
    fn test_builder_keeps_unset_defaults() {
        let timeouts = LinkTimeouts::builder()
            .request_timeout(Duration::from_secs(1))
            .build();
        assert_eq!(timeouts.request_timeout, Duration::from_secs(1));
        assert_eq!(timeouts.connection_timeout, LinkTimeouts::default().connection_timeout);
    }
}
