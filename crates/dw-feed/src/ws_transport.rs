use crate::{FeedConnection, FeedError, FeedResult, FeedTransport, InboundFrame};

use async_trait::async_trait;
use futures::StreamExt;
use log::debug;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// WebSocket transport backed by tokio-tungstenite.
///
/// Ping/pong is answered by the library. Close frames and end of stream
/// both end the connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsTransport;

#[async_trait]
impl FeedTransport for WsTransport {
    async fn connect(&self, url: &str) -> FeedResult<Box<dyn FeedConnection>> {
        let (stream, response) = connect_async(url)
            .await
            .map_err(|e| FeedError::connect(url, e.to_string()))?;

        debug!("WebSocket handshake with {url} complete ({})", response.status());

        Ok(Box::new(WsConnection { stream }))
    }
}

struct WsConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl FeedConnection for WsConnection {
    async fn next_frame(&mut self) -> Option<FeedResult<InboundFrame>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => {
                    return Some(Ok(InboundFrame::Text(text.as_str().to_owned())));
                }
                Ok(Message::Binary(bytes)) => {
                    return Some(Ok(InboundFrame::Binary(bytes.to_vec())));
                }
                Ok(Message::Close(frame)) => {
                    debug!("Server closed the feed: {frame:?}");
                    return None;
                }
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => continue,
                Err(e) => return Some(Err(FeedError::from(e))),
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            debug!("Error while closing feed socket: {e}");
        }
    }
}
