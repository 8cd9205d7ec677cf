//! Command frame builders for device-scoped channels
//!
//! All commands are fire-and-forget: the backend sends no acknowledgement
//! and the client keeps no delivery state. Builders only assemble the wire
//! frame; sending lives on the connection manager.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::protocol::WireMessage;

/// Door actuation command payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoorAction {
    Open,
    Close,
}

impl DoorAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            DoorAction::Open => "open",
            DoorAction::Close => "close",
        }
    }
}

/// Arbitrary command with a caller-supplied payload
pub fn raw_command(serial: &str, payload: serde_json::Value) -> WireMessage {
    WireMessage::new(
        "command",
        json!({
            "serialNumber": serial,
            "payload": payload,
        }),
    )
}

/// Door open/close
pub fn door_command(serial: &str, action: DoorAction) -> WireMessage {
    WireMessage::new(
        "doorCommand",
        json!({
            "serialNumber": serial,
            "action": action.as_str(),
        }),
    )
}

/// Select a named LED effect (e.g. "breathe", "rainbow")
pub fn led_effect(serial: &str, effect: &str) -> WireMessage {
    WireMessage::new(
        "ledEffect",
        json!({
            "serialNumber": serial,
            "effect": effect,
        }),
    )
}

/// Recall a stored LED preset by slot number
pub fn led_preset(serial: &str, preset: u8) -> WireMessage {
    WireMessage::new(
        "ledPreset",
        json!({
            "serialNumber": serial,
            "preset": preset,
        }),
    )
}

/// Turn the LED strip on or off
pub fn led_state(serial: &str, on: bool) -> WireMessage {
    WireMessage::new(
        "ledState",
        json!({
            "serialNumber": serial,
            "on": on,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_door_command_frame() {
        let msg = door_command("SN-1", DoorAction::Open);
        assert_eq!(msg.event, "doorCommand");
        assert_eq!(msg.params["serialNumber"], "SN-1");
        assert_eq!(msg.params["action"], "open");
    }

    #[test]
    fn test_led_builders() {
        let msg = led_effect("SN-1", "breathe");
        assert_eq!(msg.event, "ledEffect");
        assert_eq!(msg.params["effect"], "breathe");

        let msg = led_preset("SN-1", 4);
        assert_eq!(msg.event, "ledPreset");
        assert_eq!(msg.params["preset"], 4);

        let msg = led_state("SN-1", false);
        assert_eq!(msg.event, "ledState");
        assert_eq!(msg.params["on"], false);
    }

    #[test]
    fn test_raw_command_wraps_payload() {
        let msg = raw_command("SN-9", json!({"volume": 3}));
        assert_eq!(msg.event, "command");
        assert_eq!(msg.params["payload"]["volume"], 3);
    }
}
