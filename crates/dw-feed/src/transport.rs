use crate::FeedResult;

use async_trait::async_trait;

/// Payload of one inbound data frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    Text(String),
    Binary(Vec<u8>),
}

/// Opens connections to the event stream.
#[async_trait]
pub trait FeedTransport: Send + Sync {
    async fn connect(&self, url: &str) -> FeedResult<Box<dyn FeedConnection>>;
}

/// One open stream.
#[async_trait]
pub trait FeedConnection: Send {
    /// Next data frame. `None` means the peer closed the stream; an error
    /// ends the connection as well. Must be cancel-safe.
    async fn next_frame(&mut self) -> Option<FeedResult<InboundFrame>>;

    /// Close from our side. Errors are swallowed; the connection is gone
    /// either way.
    async fn close(&mut self);
}
