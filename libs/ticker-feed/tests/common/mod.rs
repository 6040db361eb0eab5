//! Common test utilities for ticker-feed integration tests
//!
//! Provides a mock market server that answers both the REST snapshot
//! endpoint and the WebSocket stream on one port, since the push URL is
//! derived from the REST base URL.

#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tokio_tungstenite::tungstenite::Message;

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

/// A valid snapshot payload with the given KOSPI price
pub fn snapshot_json(kospi: f64) -> String {
    format!(
        r#"{{"kospi":{{"price":{kospi},"change":1.5,"changePercent":0.06}},"kosdaq":{{"price":850.25,"change":-0.75,"changePercent":-0.09}},"usdKrw":{{"price":1331.4,"change":1.4,"changePercent":0.11}}}}"#
    )
}

/// Fetch envelope wrapping `data`
pub fn envelope(success: bool, data: &str) -> String {
    format!(r#"{{"success":{},"data":{}}}"#, success, data)
}

/// What the REST endpoint answers
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: r#"{"success":false}"#.to_string(),
        }
    }
}

/// How the WebSocket endpoint behaves
#[derive(Debug, Clone)]
pub enum PushBehavior {
    /// Complete the handshake, wait for the subscribe frame, send an ack and
    /// then the given frames; stay open until the client closes
    Stream(Vec<String>),
    /// Accept TCP but never answer the WebSocket handshake
    Silent,
    /// Complete the handshake, then drop the TCP connection
    Drop,
    /// Complete the handshake, read the subscribe frame, then send a
    /// normal (1000) close before any snapshot
    CloseNormal,
}

#[derive(Default)]
struct Recorded {
    http_requests: AtomicUsize,
    ws_connections: AtomicUsize,
    client_messages: Mutex<Vec<String>>,
    close_codes: Mutex<Vec<u16>>,
}

pub struct MockMarketServer {
    pub addr: SocketAddr,
    recorded: Arc<Recorded>,
    shutdown: Arc<Notify>,
}

impl MockMarketServer {
    pub async fn start(http: HttpReply, push: PushBehavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let recorded = Arc::new(Recorded::default());
        let shutdown = Arc::new(Notify::new());

        let recorded_loop = Arc::clone(&recorded);
        let shutdown_loop = Arc::clone(&shutdown);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, _)) => {
                                let http = http.clone();
                                let push = push.clone();
                                let recorded = Arc::clone(&recorded_loop);
                                let shutdown = Arc::clone(&shutdown_loop);
                                tokio::spawn(async move {
                                    handle_connection(stream, http, push, recorded, shutdown).await;
                                });
                            }
                            Err(e) => {
                                eprintln!("Accept error: {}", e);
                                break;
                            }
                        }
                    }
                    _ = shutdown_loop.notified() => break,
                }
            }
        });

        Self {
            addr,
            recorded,
            shutdown,
        }
    }

    /// REST base URL; the push endpoint derived from it hits this server too
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn http_requests(&self) -> usize {
        self.recorded.http_requests.load(Ordering::SeqCst)
    }

    pub fn ws_connections(&self) -> usize {
        self.recorded.ws_connections.load(Ordering::SeqCst)
    }

    /// Text frames received from clients
    pub fn client_messages(&self) -> Vec<String> {
        self.recorded.client_messages.lock().clone()
    }

    /// Close codes received from clients
    pub fn close_codes(&self) -> Vec<u16> {
        self.recorded.close_codes.lock().clone()
    }

    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }
}

impl Drop for MockMarketServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn handle_connection(
    stream: TcpStream,
    http: HttpReply,
    push: PushBehavior,
    recorded: Arc<Recorded>,
    shutdown: Arc<Notify>,
) {
    let head = match peek_head(&stream).await {
        Some(head) => head,
        None => return,
    };

    if head.to_ascii_lowercase().contains("upgrade: websocket") {
        recorded.ws_connections.fetch_add(1, Ordering::SeqCst);
        handle_ws(stream, push, recorded, shutdown).await;
    } else {
        recorded.http_requests.fetch_add(1, Ordering::SeqCst);
        handle_http(stream, http).await;
    }
}

/// Look at the request head without consuming it
async fn peek_head(stream: &TcpStream) -> Option<String> {
    let mut buf = vec![0u8; 8192];
    for _ in 0..200 {
        let n = stream.peek(&mut buf).await.ok()?;
        if n == 0 {
            return None;
        }
        let text = String::from_utf8_lossy(&buf[..n]).to_string();
        if text.contains("\r\n\r\n") || n == buf.len() {
            return Some(text);
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    None
}

async fn handle_http(mut stream: TcpStream, reply: HttpReply) {
    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        match stream.read(&mut byte).await {
            Ok(1) => head.push(byte[0]),
            _ => return,
        }
    }

    let reason = if reply.status == 200 { "OK" } else { "Error" };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        reply.status,
        reason,
        reply.body.len(),
        reply.body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

async fn handle_ws(
    stream: TcpStream,
    behavior: PushBehavior,
    recorded: Arc<Recorded>,
    shutdown: Arc<Notify>,
) {
    use tokio_tungstenite::accept_async;

    let frames = match behavior {
        PushBehavior::Silent => {
            // Hold the socket open without ever answering
            let _stream = stream;
            tokio::select! {
                _ = shutdown.notified() => {}
                _ = tokio::time::sleep(Duration::from_secs(30)) => {}
            }
            return;
        }
        PushBehavior::Drop => {
            let ws = accept_async(stream).await;
            drop(ws);
            return;
        }
        PushBehavior::CloseNormal => {
            close_normally(stream, recorded).await;
            return;
        }
        PushBehavior::Stream(frames) => frames,
    };

    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            eprintln!("WebSocket handshake failed: {}", e);
            return;
        }
    };
    let (mut write, mut read) = ws_stream.split();

    // Wait for the subscribe frame before streaming
    match read.next().await {
        Some(Ok(Message::Text(text))) => {
            recorded.client_messages.lock().push(text);
        }
        _ => return,
    }

    let ack = r#"{"type":"subscribed","channels":["kospi","kosdaq","usdKrw"]}"#;
    if write.send(Message::Text(ack.to_string())).await.is_err() {
        return;
    }
    for frame in frames {
        if write.send(Message::Text(frame)).await.is_err() {
            return;
        }
    }

    loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        recorded.client_messages.lock().push(text);
                    }
                    Some(Ok(Message::Close(frame))) => {
                        if let Some(frame) = frame {
                            recorded.close_codes.lock().push(u16::from(frame.code));
                        }
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(_)) | None => break,
                }
            }
            _ = shutdown.notified() => break,
        }
    }
}

async fn close_normally(stream: TcpStream, recorded: Arc<Recorded>) {
    use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
    use tokio_tungstenite::tungstenite::protocol::CloseFrame;

    let Ok(mut ws_stream) = tokio_tungstenite::accept_async(stream).await else {
        return;
    };
    if let Some(Ok(Message::Text(text))) = ws_stream.next().await {
        recorded.client_messages.lock().push(text);
    }

    let frame = CloseFrame {
        code: CloseCode::Normal,
        reason: "server shutting down".into(),
    };
    let _ = ws_stream.send(Message::Close(Some(frame))).await;
    // Drain until the client echoes the close
    while let Some(Ok(_)) = ws_stream.next().await {}
}

/// Poll `condition` every 10ms until it holds or `timeout` elapses
pub async fn wait_until<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

/// Route library logs to the test output when TEST_VERBOSE is set
pub fn init_test_tracing() {
    if std::env::var("TEST_VERBOSE").is_err() {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("ticker_feed=debug"))
        .with_test_writer()
        .try_init();
}
