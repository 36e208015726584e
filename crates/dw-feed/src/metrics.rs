use metrics::{counter, gauge};

/// Metrics collector for the live feed
#[derive(Clone)]
pub struct FeedMetrics {
    prefix: &'static str,
}

impl FeedMetrics {
    pub fn new() -> Self {
        Self { prefix: "dw_feed" }
    }

    pub fn connection_opened(&self) {
        counter!(format!("{}.connections.opened", self.prefix)).increment(1);
        gauge!(format!("{}.connections.active", self.prefix)).set(1.0);
    }

    pub fn connection_closed(&self, reason: &str) {
        counter!(format!("{}.connections.closed", self.prefix)).increment(1);
        counter!(format!("{}.connections.closed.{}", self.prefix, reason)).increment(1);
        gauge!(format!("{}.connections.active", self.prefix)).set(0.0);
    }

    /// A connection attempt that never opened
    pub fn connect_failed(&self) {
        counter!(format!("{}.connections.failed", self.prefix)).increment(1);
    }

    pub fn message_received(&self) {
        counter!(format!("{}.messages.received", self.prefix)).increment(1);
    }

    pub fn parse_failed(&self) {
        counter!(format!("{}.messages.parse_failed", self.prefix)).increment(1);
    }

    pub fn reconnect_scheduled(&self) {
        counter!(format!("{}.reconnects.scheduled", self.prefix)).increment(1);
    }

    pub fn window_len(&self, len: usize) {
        gauge!(format!("{}.window.len", self.prefix)).set(len as f64);
    }
}

impl Default for FeedMetrics {
    fn default() -> Self {
        Self::new()
    }
}
