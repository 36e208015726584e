use crate::{
    ConnectionState, EventWindow, FeedConnection, FeedError, FeedEvent, FeedMetrics,
    FeedSettings, FeedTransport, InboundFrame, TeardownGuard, TeardownSignal, WsTransport,
};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Upper bound on the closing handshake during teardown.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Self-healing subscription to the live event stream.
///
/// While running, a single background task owns the socket:
///
/// ```text
/// connecting --open--> open --close/error--> closed --delay--> connecting
/// connecting --failure--> closed
/// ```
///
/// The delay is fixed (no backoff, no jitter). Every message is parsed as
/// a JSON object and prepended to the [`EventWindow`]; malformed messages
/// are logged, counted, and dropped.
///
/// [`LiveFeedClient::teardown`] cancels the task at whichever suspension
/// point it is parked on (connecting, reading, or waiting to reconnect) and
/// waits for it to finish, so nothing mutates the client afterwards.
pub struct LiveFeedClient {
    settings: FeedSettings,
    transport: Arc<dyn FeedTransport>,
    shared: Arc<Shared>,
    running: Mutex<Option<Running>>,
}

struct Running {
    signal: TeardownSignal,
    handle: JoinHandle<()>,
}

struct Shared {
    state_tx: watch::Sender<ConnectionState>,
    events_tx: watch::Sender<EventWindow>,
    parse_failures: AtomicU64,
    metrics: FeedMetrics,
}

/// Why the read loop ended.
enum ReadOutcome {
    TornDown,
    Disconnected(&'static str),
}

impl LiveFeedClient {
    /// Client over the WebSocket transport.
    pub fn new(settings: FeedSettings) -> Self {
        Self::with_transport(settings, Arc::new(WsTransport))
    }

    pub fn with_transport(settings: FeedSettings, transport: Arc<dyn FeedTransport>) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Closed);
        let (events_tx, _) = watch::channel(EventWindow::new(settings.window_size));

        Self {
            settings,
            transport,
            shared: Arc::new(Shared {
                state_tx,
                events_tx,
                parse_failures: AtomicU64::new(0),
                metrics: FeedMetrics::new(),
            }),
            running: Mutex::new(None),
        }
    }

    /// Start the connection loop. No-op while already running; after
    /// [`LiveFeedClient::teardown`] a fresh loop is started.
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect(&self) {
        let mut running = self.lock_running();

        if running.as_ref().is_some_and(|r| !r.handle.is_finished()) {
            debug!("Live feed already running, ignoring connect()");
            return;
        }

        let signal = TeardownSignal::new();
        let task = FeedTask {
            settings: self.settings.clone(),
            transport: Arc::clone(&self.transport),
            shared: Arc::clone(&self.shared),
            guard: signal.guard(),
        };

        info!("Starting live feed ({})", self.settings.url);
        let handle = tokio::spawn(task.run());
        *running = Some(Running { signal, handle });
    }

    /// Close the active connection and cancel any pending reconnect.
    /// Returns once the background task has exited.
    pub async fn teardown(&self) {
        let Some(running) = self.lock_running().take() else {
            debug!("Live feed not running, nothing to tear down");
            return;
        };

        running.signal.trigger();
        if let Err(e) = running.handle.await {
            error!("Live feed task ended abnormally: {e}");
        }

        self.shared.set_state(ConnectionState::Closed);
        info!("Live feed torn down");
    }

    pub fn is_running(&self) -> bool {
        self.lock_running()
            .as_ref()
            .is_some_and(|r| !r.handle.is_finished())
    }

    pub fn state(&self) -> ConnectionState {
        *self.shared.state_tx.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state_tx.subscribe()
    }

    /// Snapshot of the window, newest first.
    pub fn events(&self) -> Vec<FeedEvent> {
        self.shared.events_tx.borrow().to_vec()
    }

    pub fn subscribe_events(&self) -> watch::Receiver<EventWindow> {
        self.shared.events_tx.subscribe()
    }

    /// Messages dropped because they could not be parsed.
    pub fn parse_failures(&self) -> u64 {
        self.shared.parse_failures.load(Ordering::Relaxed)
    }

    pub fn settings(&self) -> &FeedSettings {
        &self.settings
    }

    fn lock_running(&self) -> MutexGuard<'_, Option<Running>> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for LiveFeedClient {
    fn drop(&mut self) {
        let running = self
            .running
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(running) = running.take() {
            running.signal.trigger();
        }
    }
}

impl Shared {
    fn set_state(&self, state: ConnectionState) {
        self.state_tx.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            debug!("Live feed {current} -> {state}");
            *current = state;
            true
        });
    }

    fn handle_frame(&self, frame: InboundFrame) {
        self.metrics.message_received();

        let text = match frame {
            InboundFrame::Text(text) => text,
            InboundFrame::Binary(bytes) => match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(e) => {
                    self.record_parse_failure(&FeedError::parse(e.to_string()));
                    return;
                }
            },
        };

        match FeedEvent::parse(&text) {
            Ok(event) => {
                let mut len = 0;
                self.events_tx.send_modify(|window| {
                    window.push(event);
                    len = window.len();
                });
                self.metrics.window_len(len);
            }
            Err(e) => self.record_parse_failure(&e),
        }
    }

    fn record_parse_failure(&self, err: &FeedError) {
        let count = self.parse_failures.fetch_add(1, Ordering::Relaxed) + 1;
        self.metrics.parse_failed();
        warn!("Dropping malformed feed message ({count} so far): {err}");
    }
}

struct FeedTask {
    settings: FeedSettings,
    transport: Arc<dyn FeedTransport>,
    shared: Arc<Shared>,
    guard: TeardownGuard,
}

impl FeedTask {
    async fn run(mut self) {
        loop {
            self.shared.set_state(ConnectionState::Connecting);

            let connected = tokio::select! {
                biased;
                _ = self.guard.wait() => break,
                result = self.transport.connect(&self.settings.url) => result,
            };

            match connected {
                Ok(mut connection) => {
                    self.shared.set_state(ConnectionState::Open);
                    self.shared.metrics.connection_opened();
                    info!("Live feed connected");

                    match self.read(connection.as_mut()).await {
                        ReadOutcome::TornDown => {
                            close_quietly(connection.as_mut()).await;
                            self.shared.metrics.connection_closed("teardown");
                            break;
                        }
                        ReadOutcome::Disconnected(reason) => {
                            self.shared.metrics.connection_closed(reason);
                        }
                    }
                }
                Err(e) => {
                    warn!("Live feed connection failed: {e}");
                    self.shared.metrics.connect_failed();
                }
            }

            self.shared.set_state(ConnectionState::Closed);
            self.shared.metrics.reconnect_scheduled();
            info!(
                "Live feed closed, reconnecting in {}s",
                self.settings.reconnect_delay.as_secs_f64()
            );

            tokio::select! {
                biased;
                _ = self.guard.wait() => break,
                _ = tokio::time::sleep(self.settings.reconnect_delay) => {}
            }
        }

        self.shared.set_state(ConnectionState::Closed);
        debug!("Live feed task exiting");
    }

    async fn read(&mut self, connection: &mut dyn FeedConnection) -> ReadOutcome {
        loop {
            let frame = tokio::select! {
                biased;
                _ = self.guard.wait() => return ReadOutcome::TornDown,
                frame = connection.next_frame() => frame,
            };

            match frame {
                Some(Ok(frame)) => self.shared.handle_frame(frame),
                Some(Err(e)) => {
                    warn!("Live feed error: {e}");
                    return ReadOutcome::Disconnected(e.kind());
                }
                None => {
                    info!("Live feed closed by server");
                    return ReadOutcome::Disconnected("remote");
                }
            }
        }
    }
}

async fn close_quietly(connection: &mut dyn FeedConnection) {
    if tokio::time::timeout(CLOSE_TIMEOUT, connection.close())
        .await
        .is_err()
    {
        debug!("Closing handshake timed out");
    }
}
