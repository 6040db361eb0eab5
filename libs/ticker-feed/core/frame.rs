//! Push frame encoding and classification
//!
//! Outbound: a single subscribe control frame.
//! Inbound: classified by shape. Acknowledgements are swallowed, snapshot
//! shaped frames are delivered, anything else is dropped without touching
//! the connection.

use crate::domain::{Snapshot, SymbolSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
struct SubscribeFrame {
    action: &'static str,
    channels: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AckFrame {
    #[serde(rename = "type")]
    kind: String,
    channels: Vec<String>,
}

/// `{"action":"subscribe","channels":[...]}` for the given symbols
pub fn subscribe_frame(symbols: &SymbolSet) -> String {
    let frame = SubscribeFrame {
        action: "subscribe",
        channels: symbols.channel_names(),
    };
    // A struct of a str and a Vec<String> always serializes
    serde_json::to_string(&frame).unwrap_or_default()
}

/// Classified inbound frame
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Server confirmed the subscription
    Subscribed(Vec<String>),
    /// Complete snapshot, ready for delivery
    Snapshot(Snapshot),
    /// Unparseable or unknown shape
    Unrecognized(String),
}

/// Classify a text frame
pub fn classify(text: &str, symbols: &SymbolSet) -> Frame {
    let value: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => return Frame::Unrecognized(format!("not JSON: {}", e)),
    };

    if value.get("type").and_then(Value::as_str) == Some("subscribed") {
        return match serde_json::from_value::<AckFrame>(value) {
            Ok(ack) if ack.kind == "subscribed" => Frame::Subscribed(ack.channels),
            Ok(_) => Frame::Unrecognized("unexpected ack type".into()),
            Err(e) => Frame::Unrecognized(format!("malformed ack: {}", e)),
        };
    }

    match Snapshot::from_value(&value, symbols) {
        Ok(snapshot) => Frame::Snapshot(snapshot),
        Err(e) => Frame::Unrecognized(e.to_string()),
    }
}

/// Classify a binary frame by decoding it as UTF-8 JSON
pub fn classify_binary(data: &[u8], symbols: &SymbolSet) -> Frame {
    match std::str::from_utf8(data) {
        Ok(text) => classify(text, symbols),
        Err(_) => Frame::Unrecognized("binary frame is not UTF-8".into()),
    }
}
