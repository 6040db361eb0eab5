//! Push transport for live snapshots
//!
//! # Architecture
//!
//! Each [`PushChannel::open`] spawns one Tokio task that owns the WebSocket
//! and a [`ChannelMachine`]. The task `select!`s over the transport and the
//! close signal and feeds every event to the matching `on_*` method:
//!
//! ```text
//! connect_async ──┬── opened in time ──> on_open ──> read loop ──> on_frame / on_error / on_close
//!                 ├── timed out ───────> on_timeout
//!                 └── failed ──────────> on_error
//! close signal ─────────────────────────> on_close_requested
//! ```
//!
//! `on_unavailable` is held as an `Option` and taken by the first failure
//! trigger, so it runs at most once per channel no matter how many of
//! timeout, error and abnormal close occur.

use super::channel_state::{AtomicChannelState, ChannelState};
use super::frame::{classify, classify_binary, subscribe_frame, Frame};
use crate::domain::{Snapshot, SymbolSet};
use futures::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

/// Where and how to connect
#[derive(Debug, Clone)]
pub struct PushEndpoint {
    pub url: String,
    pub symbols: SymbolSet,
    pub connect_timeout: Duration,
}

// =============================================================================
// State machine
// =============================================================================

/// Event dispatcher for one channel instance
pub(crate) struct ChannelMachine<S, U>
where
    S: FnMut(Snapshot),
    U: FnOnce(),
{
    state: Arc<AtomicChannelState>,
    on_snapshot: S,
    on_unavailable: Option<U>,
    frames_received: u64,
    frames_dropped: u64,
}

impl<S, U> ChannelMachine<S, U>
where
    S: FnMut(Snapshot),
    U: FnOnce(),
{
    pub(crate) fn new(state: Arc<AtomicChannelState>, on_snapshot: S, on_unavailable: U) -> Self {
        state.set(ChannelState::Connecting);
        Self {
            state,
            on_snapshot,
            on_unavailable: Some(on_unavailable),
            frames_received: 0,
            frames_dropped: 0,
        }
    }

    pub(crate) fn state(&self) -> ChannelState {
        self.state.get()
    }

    /// Connection established and subscribe frame written
    pub(crate) fn on_open(&mut self) {
        if self.state() == ChannelState::Connecting {
            self.state.set(ChannelState::Open);
        }
    }

    pub(crate) fn on_frame(&mut self, frame: Frame) {
        if !self.state().is_live() {
            return;
        }
        self.frames_received += 1;

        match frame {
            Frame::Subscribed(channels) => {
                debug!("[Ticker Push] Subscription confirmed: {:?}", channels);
            }
            Frame::Snapshot(snapshot) => {
                self.state.set(ChannelState::Receiving);
                (self.on_snapshot)(snapshot);
            }
            Frame::Unrecognized(reason) => {
                self.frames_dropped += 1;
                debug!("[Ticker Push] Dropping frame: {}", reason);
            }
        }
    }

    /// Connection did not open in time
    pub(crate) fn on_timeout(&mut self) {
        if self.state() == ChannelState::Connecting {
            self.fail("connection timed out");
        }
    }

    pub(crate) fn on_error(&mut self, reason: &str) {
        if self.state() == ChannelState::Closed {
            return;
        }
        self.fail(reason);
    }

    /// Close event; `code` is `None` when the peer sent no status.
    ///
    /// A normal closure is not a failure, so it does not start the polling
    /// fallback even when it arrives before the first snapshot. The
    /// subscription then stays silent until it is cancelled.
    pub(crate) fn on_close(&mut self, code: Option<CloseCode>) {
        if self.state().is_terminal() {
            return;
        }
        match code {
            Some(CloseCode::Normal) => {
                info!("[Ticker Push] Server closed the stream normally");
                self.state.set(ChannelState::Closed);
                self.on_unavailable = None;
            }
            other => self.fail(&format!("connection closed ({:?})", other)),
        }
    }

    /// Intentional close from our side; never reported as unavailability
    pub(crate) fn on_close_requested(&mut self) {
        if self.state() != ChannelState::Failed {
            self.state.set(ChannelState::Closed);
        }
        self.on_unavailable = None;
    }

    fn fail(&mut self, reason: &str) {
        self.state.set(ChannelState::Failed);
        if let Some(on_unavailable) = self.on_unavailable.take() {
            warn!(
                "[Ticker Push] Push unavailable: {} (frames: {}, dropped: {})",
                reason, self.frames_received, self.frames_dropped
            );
            on_unavailable();
        } else {
            debug!("[Ticker Push] Ignoring repeated failure: {}", reason);
        }
    }
}

// =============================================================================
// Handle
// =============================================================================

/// Closes a push channel. Cloneable; closing more than once is a no-op.
#[derive(Debug, Clone)]
pub struct CloseHandle {
    state: Arc<AtomicChannelState>,
    close_requested: Arc<AtomicBool>,
    close_signal: Arc<Notify>,
}

impl CloseHandle {
    /// Cancel a pending connect or close the open connection with a
    /// normal-closure frame
    pub fn close(&self) {
        if self.close_requested.swap(true, Ordering::AcqRel) {
            return;
        }
        // Stores a permit if the task is not currently waiting
        self.close_signal.notify_one();
    }

    pub fn state(&self) -> ChannelState {
        self.state.get()
    }

    pub fn is_close_requested(&self) -> bool {
        self.close_requested.load(Ordering::Acquire)
    }
}

// =============================================================================
// Channel
// =============================================================================

/// WebSocket snapshot channel
pub struct PushChannel;

impl PushChannel {
    /// Connect to `endpoint` in a background task.
    ///
    /// `on_snapshot` runs for each snapshot frame in arrival order.
    /// `on_unavailable` runs at most once, on the first of: connect timeout,
    /// transport error, or a close that was not a normal closure.
    ///
    /// Must be called within a Tokio runtime.
    pub fn open<S, U>(endpoint: PushEndpoint, on_snapshot: S, on_unavailable: U) -> CloseHandle
    where
        S: FnMut(Snapshot) + Send + 'static,
        U: FnOnce() + Send + 'static,
    {
        let state = Arc::new(AtomicChannelState::new(ChannelState::Connecting));
        let handle = CloseHandle {
            state: Arc::clone(&state),
            close_requested: Arc::new(AtomicBool::new(false)),
            close_signal: Arc::new(Notify::new()),
        };

        let machine = ChannelMachine::new(state, on_snapshot, on_unavailable);
        let close_signal = Arc::clone(&handle.close_signal);

        tokio::spawn(async move {
            run_channel(endpoint, machine, close_signal).await;
        });

        handle
    }
}

async fn run_channel<S, U>(
    endpoint: PushEndpoint,
    mut machine: ChannelMachine<S, U>,
    close_signal: Arc<Notify>,
) where
    S: FnMut(Snapshot),
    U: FnOnce(),
{
    debug!("[Ticker Push] Connecting to {}", endpoint.url);

    let connect = tokio::time::timeout(
        endpoint.connect_timeout,
        connect_async(endpoint.url.as_str()),
    );

    let ws_stream = tokio::select! {
        biased;
        _ = close_signal.notified() => {
            debug!("[Ticker Push] Closed while connecting");
            machine.on_close_requested();
            return;
        }
        result = connect => match result {
            Err(_) => {
                machine.on_timeout();
                return;
            }
            Ok(Err(e)) => {
                machine.on_error(&format!("connect failed: {}", e));
                return;
            }
            Ok(Ok((ws_stream, _response))) => ws_stream,
        }
    };

    let (mut write, mut read) = ws_stream.split();

    if let Err(e) = write
        .send(Message::Text(subscribe_frame(&endpoint.symbols)))
        .await
    {
        machine.on_error(&format!("failed to send subscribe frame: {}", e));
        return;
    }
    machine.on_open();
    info!("[Ticker Push] Connected to {}", endpoint.url);

    loop {
        tokio::select! {
            biased;
            _ = close_signal.notified() => {
                machine.on_close_requested();
                let frame = CloseFrame {
                    code: CloseCode::Normal,
                    reason: "client closed".into(),
                };
                let _ = write.send(Message::Close(Some(frame))).await;
                debug!("[Ticker Push] Channel closed by client");
                return;
            }
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    machine.on_frame(classify(&text, &endpoint.symbols));
                }
                Some(Ok(Message::Binary(data))) => {
                    machine.on_frame(classify_binary(&data, &endpoint.symbols));
                }
                Some(Ok(Message::Close(frame))) => {
                    machine.on_close(frame.map(|f| f.code));
                }
                Some(Ok(_)) => {
                    // Ping/pong are answered by tungstenite
                }
                Some(Err(e)) => {
                    machine.on_error(&format!("websocket error: {}", e));
                    return;
                }
                None => {
                    machine.on_close(None);
                    return;
                }
            }
        }
    }
}
