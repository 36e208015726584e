use dw_feed::{
    ConnectionState, FeedConnection, FeedError, FeedResult, FeedSettings, FeedTransport,
    InboundFrame, LiveFeedClient,
};

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep};

// =========================================================================
// Scripted transport
// =========================================================================

/// Each connect() consumes the next script entry; an empty script refuses
/// the connection.
#[derive(Default)]
struct ScriptedTransport {
    script: Mutex<VecDeque<mpsc::UnboundedReceiver<InboundFrame>>>,
    attempts: Mutex<Vec<Instant>>,
    closed_by_client: Arc<AtomicBool>,
}

impl ScriptedTransport {
    /// Queue one accepted connection; dropping the sender closes it.
    fn accept_next(&self) -> mpsc::UnboundedSender<InboundFrame> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.script.lock().unwrap().push_back(rx);
        tx
    }

    fn attempts(&self) -> Vec<Instant> {
        self.attempts.lock().unwrap().clone()
    }

    fn attempt_count(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }
}

#[async_trait]
impl FeedTransport for ScriptedTransport {
    async fn connect(&self, url: &str) -> FeedResult<Box<dyn FeedConnection>> {
        self.attempts.lock().unwrap().push(Instant::now());

        match self.script.lock().unwrap().pop_front() {
            Some(frames) => Ok(Box::new(ScriptedConnection {
                frames,
                closed_by_client: Arc::clone(&self.closed_by_client),
            })),
            None => Err(FeedError::connect(url, "connection refused")),
        }
    }
}

struct ScriptedConnection {
    frames: mpsc::UnboundedReceiver<InboundFrame>,
    closed_by_client: Arc<AtomicBool>,
}

#[async_trait]
impl FeedConnection for ScriptedConnection {
    async fn next_frame(&mut self) -> Option<FeedResult<InboundFrame>> {
        self.frames.recv().await.map(Ok)
    }

    async fn close(&mut self) {
        self.closed_by_client.store(true, Ordering::SeqCst);
    }
}

fn client_with(transport: &Arc<ScriptedTransport>) -> LiveFeedClient {
    let settings = FeedSettings::new("ws://feed.test/ws");
    LiveFeedClient::with_transport(settings, Arc::clone(transport) as Arc<dyn FeedTransport>)
}

fn text(payload: &str) -> InboundFrame {
    InboundFrame::Text(payload.to_string())
}

async fn wait_for_state(client: &LiveFeedClient, state: ConnectionState) {
    let mut rx = client.subscribe_state();
    rx.wait_for(|s| *s == state).await.unwrap();
}

async fn wait_for_received(client: &LiveFeedClient, total: u64) {
    let mut rx = client.subscribe_events();
    rx.wait_for(|w| w.total_received() >= total).await.unwrap();
}

// =========================================================================
// Connection lifecycle
// =========================================================================

#[tokio::test(start_paused = true)]
async fn given_new_client_when_connected_then_state_open() {
    // Given
    let transport = Arc::new(ScriptedTransport::default());
    let _tx = transport.accept_next();
    let client = client_with(&transport);
    assert_eq!(client.state(), ConnectionState::Closed);

    // When
    client.connect();

    // Then
    wait_for_state(&client, ConnectionState::Open).await;
    assert!(client.is_running());
    assert_eq!(transport.attempt_count(), 1);

    client.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn given_running_client_when_connect_again_then_no_second_loop() {
    let transport = Arc::new(ScriptedTransport::default());
    let _tx = transport.accept_next();
    let client = client_with(&transport);

    client.connect();
    wait_for_state(&client, ConnectionState::Open).await;
    client.connect();
    sleep(Duration::from_secs(10)).await;

    assert_eq!(transport.attempt_count(), 1);
    client.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn given_open_connection_when_server_closes_then_reconnect_exactly_after_delay() {
    // Given
    let transport = Arc::new(ScriptedTransport::default());
    let tx = transport.accept_next();
    let _second = transport.accept_next();
    let client = client_with(&transport);
    client.connect();
    wait_for_state(&client, ConnectionState::Open).await;

    // When
    drop(tx);
    wait_for_state(&client, ConnectionState::Closed).await;
    let closed_at = Instant::now();

    // Then
    sleep(Duration::from_millis(2999)).await;
    assert_eq!(transport.attempt_count(), 1, "no attempt before the delay");

    sleep(Duration::from_millis(2)).await;
    let attempts = transport.attempts();
    assert_eq!(attempts.len(), 2, "exactly one attempt after the delay");
    assert_eq!(attempts[1] - closed_at, Duration::from_secs(3));

    wait_for_state(&client, ConnectionState::Open).await;
    sleep(Duration::from_secs(30)).await;
    assert_eq!(transport.attempt_count(), 2);

    client.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn given_refused_connection_when_connect_then_treated_as_close_and_retried() {
    // Given
    let transport = Arc::new(ScriptedTransport::default());
    let client = client_with(&transport);

    // When
    client.connect();
    sleep(Duration::from_millis(10)).await;

    // Then
    assert_eq!(client.state(), ConnectionState::Closed);
    assert_eq!(transport.attempt_count(), 1);

    sleep(Duration::from_secs(3)).await;
    assert_eq!(transport.attempt_count(), 2);

    sleep(Duration::from_secs(3)).await;
    let attempts = transport.attempts();
    assert_eq!(attempts.len(), 3);
    assert_eq!(attempts[2] - attempts[1], Duration::from_secs(3));

    client.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn given_custom_delay_when_closed_then_delay_is_constant() {
    let transport = Arc::new(ScriptedTransport::default());
    let mut settings = FeedSettings::new("ws://feed.test/ws");
    settings.reconnect_delay = Duration::from_secs(7);
    let client =
        LiveFeedClient::with_transport(settings, Arc::clone(&transport) as Arc<dyn FeedTransport>);

    client.connect();
    sleep(Duration::from_secs(30)).await;

    let attempts = transport.attempts();
    assert_eq!(attempts.len(), 5);
    for pair in attempts.windows(2) {
        assert_eq!(pair[1] - pair[0], Duration::from_secs(7));
    }

    client.teardown().await;
}

// =========================================================================
// Teardown
// =========================================================================

#[tokio::test(start_paused = true)]
async fn given_pending_reconnect_when_teardown_then_no_further_attempt() {
    // Given
    let transport = Arc::new(ScriptedTransport::default());
    let tx = transport.accept_next();
    let client = client_with(&transport);
    client.connect();
    wait_for_state(&client, ConnectionState::Open).await;
    drop(tx);
    wait_for_state(&client, ConnectionState::Closed).await;

    // When
    sleep(Duration::from_secs(1)).await;
    client.teardown().await;
    sleep(Duration::from_secs(60)).await;

    // Then
    assert_eq!(transport.attempt_count(), 1);
    assert_eq!(client.state(), ConnectionState::Closed);
    assert!(!client.is_running());
}

#[tokio::test(start_paused = true)]
async fn given_open_connection_when_teardown_then_socket_closed_and_state_closed() {
    // Given
    let transport = Arc::new(ScriptedTransport::default());
    let tx = transport.accept_next();
    let client = client_with(&transport);
    client.connect();
    wait_for_state(&client, ConnectionState::Open).await;

    // When
    client.teardown().await;

    // Then
    assert!(transport.closed_by_client.load(Ordering::SeqCst));
    assert_eq!(client.state(), ConnectionState::Closed);

    tx.send(text(r#"{"late": true}"#)).ok();
    sleep(Duration::from_secs(10)).await;
    assert!(client.events().is_empty());
    assert_eq!(transport.attempt_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn given_idle_client_when_teardown_then_noop() {
    let transport = Arc::new(ScriptedTransport::default());
    let client = client_with(&transport);

    client.teardown().await;

    assert_eq!(client.state(), ConnectionState::Closed);
    assert_eq!(transport.attempt_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn given_torn_down_client_when_connect_then_fresh_loop_starts() {
    let transport = Arc::new(ScriptedTransport::default());
    let _first = transport.accept_next();
    let client = client_with(&transport);
    client.connect();
    wait_for_state(&client, ConnectionState::Open).await;
    client.teardown().await;

    let _second = transport.accept_next();
    client.connect();
    wait_for_state(&client, ConnectionState::Open).await;

    assert_eq!(transport.attempt_count(), 2);
    assert!(client.is_running());
    client.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn given_running_client_when_dropped_then_loop_stops() {
    let transport = Arc::new(ScriptedTransport::default());
    let client = client_with(&transport);
    client.connect();
    sleep(Duration::from_millis(10)).await;

    drop(client);
    sleep(Duration::from_secs(60)).await;

    assert_eq!(transport.attempt_count(), 1);
}

// =========================================================================
// Messages
// =========================================================================

#[tokio::test(start_paused = true)]
async fn given_sixty_messages_when_received_then_window_keeps_newest_fifty_in_order() {
    // Given
    let transport = Arc::new(ScriptedTransport::default());
    let tx = transport.accept_next();
    let client = client_with(&transport);
    client.connect();
    wait_for_state(&client, ConnectionState::Open).await;

    // When
    for seq in 1..=60 {
        tx.send(text(&format!(r#"{{"seq": {seq}}}"#))).unwrap();
    }
    wait_for_received(&client, 60).await;

    // Then
    let events = client.events();
    assert_eq!(events.len(), 50);
    assert_eq!(events[0].get("seq").unwrap(), 60);
    assert_eq!(events[49].get("seq").unwrap(), 11);
    let seqs: Vec<u64> = events
        .iter()
        .map(|e| e.get("seq").unwrap().as_u64().unwrap())
        .collect();
    assert!(seqs.windows(2).all(|pair| pair[0] == pair[1] + 1));

    client.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn given_malformed_payloads_when_received_then_dropped_and_counted() {
    // Given
    let transport = Arc::new(ScriptedTransport::default());
    let tx = transport.accept_next();
    let client = client_with(&transport);
    client.connect();
    wait_for_state(&client, ConnectionState::Open).await;
    tx.send(text(r#"{"seq": 1}"#)).unwrap();
    wait_for_received(&client, 1).await;
    let before = client.events();

    // When
    tx.send(text("{not json")).unwrap();
    tx.send(text("[1, 2, 3]")).unwrap();
    tx.send(InboundFrame::Binary(vec![0xff, 0xfe])).unwrap();
    tx.send(text(r#"{"seq": 2}"#)).unwrap();
    wait_for_received(&client, 2).await;

    // Then
    assert_eq!(client.parse_failures(), 3);
    let after = client.events();
    assert_eq!(after.len(), 2);
    assert_eq!(after[1], before[0]);
    assert_eq!(after[0].get("seq").unwrap(), 2);
    assert_eq!(client.state(), ConnectionState::Open);

    client.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn given_binary_json_frame_when_received_then_parsed_as_event() {
    let transport = Arc::new(ScriptedTransport::default());
    let tx = transport.accept_next();
    let client = client_with(&transport);
    client.connect();
    wait_for_state(&client, ConnectionState::Open).await;

    tx.send(InboundFrame::Binary(br#"{"title": "bin"}"#.to_vec()))
        .unwrap();
    wait_for_received(&client, 1).await;

    assert_eq!(client.events()[0].title(), Some("bin"));
    assert_eq!(client.parse_failures(), 0);
    client.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn given_reconnect_when_new_messages_arrive_then_window_preserved_across_connections() {
    // Given
    let transport = Arc::new(ScriptedTransport::default());
    let first = transport.accept_next();
    let second = transport.accept_next();
    let client = client_with(&transport);
    client.connect();
    wait_for_state(&client, ConnectionState::Open).await;
    first.send(text(r#"{"seq": 1}"#)).unwrap();
    wait_for_received(&client, 1).await;

    // When
    drop(first);
    sleep(Duration::from_secs(4)).await;
    second.send(text(r#"{"seq": 2}"#)).unwrap();
    wait_for_received(&client, 2).await;

    // Then
    let seqs: Vec<u64> = client
        .events()
        .iter()
        .map(|e| e.get("seq").unwrap().as_u64().unwrap())
        .collect();
    assert_eq!(seqs, vec![2, 1]);

    client.teardown().await;
}
