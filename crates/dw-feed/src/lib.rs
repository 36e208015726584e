//! Live event feed: a self-healing WebSocket subscription that keeps a
//! bounded, most-recent-first window of server-pushed events.

pub mod connection_state;
pub mod error;
pub mod event_window;
pub mod feed_event;
pub mod live_feed_client;
pub mod metrics;
pub mod settings;
pub mod teardown;
pub mod transport;
pub mod ws_transport;

#[cfg(test)]
mod tests;

pub use connection_state::ConnectionState;
pub use error::{FeedError, Result as FeedResult};
pub use event_window::EventWindow;
pub use feed_event::FeedEvent;
pub use live_feed_client::LiveFeedClient;
pub use metrics::FeedMetrics;
pub use settings::{DEFAULT_RECONNECT_DELAY, DEFAULT_WINDOW_SIZE, FeedSettings};
pub use teardown::{TeardownGuard, TeardownSignal};
pub use transport::{FeedConnection, FeedTransport, InboundFrame};
pub use ws_transport::WsTransport;
