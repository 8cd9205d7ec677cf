//! Wire protocol for the real-time channels
//!
//! Every frame is a JSON text message of the form
//! `{ "event": <name>, "params": { ... } }`, in both directions. There is
//! no request/response correlation and no acknowledgement tracking: a
//! dropped message is simply lost.

use serde::{Deserialize, Serialize};

use hwatch_core::TransportEvent;

/// A raw channel message (before parsing into typed events)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    pub event: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

impl WireMessage {
    pub fn new(event: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            params,
        }
    }

    /// Serialize to a text frame
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Parses a text frame from a channel into a typed event.
///
/// # Returns
/// * `Some(TransportEvent)` for any well-formed `{event, params}` frame --
///   unrecognized event names come back as [`TransportEvent::Unknown`]
/// * `None` if the frame is not a wire message at all
pub fn parse_wire_message(text: &str) -> Option<TransportEvent> {
    let raw: WireMessage = serde_json::from_str(text).ok()?;
    Some(parse_event(&raw.event, raw.params))
}

/// Parse an event by name and parameters
fn parse_event(event: &str, params: serde_json::Value) -> TransportEvent {
    match event {
        "sensorData" => serde_json::from_value(params.clone())
            .map(TransportEvent::SensorData)
            .unwrap_or_else(|_| unknown_event(event, params)),
        "emergency_alert" => serde_json::from_value(params.clone())
            .map(TransportEvent::EmergencyAlert)
            .unwrap_or_else(|_| unknown_event(event, params)),
        "fire_alert" => serde_json::from_value(params.clone())
            .map(TransportEvent::FireAlert)
            .unwrap_or_else(|_| unknown_event(event, params)),
        "alarmAlert" => serde_json::from_value(params.clone())
            .map(TransportEvent::AlarmAlert)
            .unwrap_or_else(|_| unknown_event(event, params)),
        "deviceStatus" => serde_json::from_value(params.clone())
            .map(TransportEvent::DeviceStatus)
            .unwrap_or_else(|_| unknown_event(event, params)),
        _ => unknown_event(event, params),
    }
}

/// Create an unknown event fallback
fn unknown_event(event: &str, params: serde_json::Value) -> TransportEvent {
    TransportEvent::Unknown {
        event: event.to_string(),
        params,
    }
}
