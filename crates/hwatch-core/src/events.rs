//! Transport event definitions
//!
//! The typed vocabulary for events arriving on the real-time channels.
//! Parsing from the wire lives in `hwatch-transport`; these are the shapes
//! shared between the transport layer and the application layer.

use serde::{Deserialize, Serialize};

use crate::alerts::{AlertCode, Severity};

/// Telemetry sample from a device sensor
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorData {
    pub serial_number: String,
    /// Sensor channel name (e.g. "temperature", "humidity", "co2")
    pub sensor: String,
    pub value: f64,
    #[serde(default)]
    pub unit: Option<String>,
}

/// Emergency alert pushed by the backend
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyAlert {
    pub serial_number: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub alert_type: Option<AlertCode>,
    #[serde(default)]
    pub message: String,
}

/// Fire alert -- a dedicated event name the backend emits alongside the
/// generic emergency channel
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FireAlert {
    pub serial_number: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub message: String,
}

/// Intrusion/appliance alarm from a device
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmAlert {
    pub serial_number: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub alert_type: Option<AlertCode>,
    #[serde(default)]
    pub message: String,
}

/// Online/offline status change for a device
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStatus {
    pub serial_number: String,
    pub online: bool,
    #[serde(default)]
    pub battery: Option<u8>,
}

/// Fully typed transport event
///
/// Unrecognized event names are preserved as [`TransportEvent::Unknown`]
/// rather than dropped, so the vocabulary can grow server-side without
/// breaking older clients.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    SensorData(SensorData),
    EmergencyAlert(EmergencyAlert),
    FireAlert(FireAlert),
    AlarmAlert(AlarmAlert),
    DeviceStatus(DeviceStatus),
    Unknown {
        event: String,
        params: serde_json::Value,
    },
}

impl TransportEvent {
    /// Wire name of this event
    pub fn event_name(&self) -> &str {
        match self {
            TransportEvent::SensorData(_) => "sensorData",
            TransportEvent::EmergencyAlert(_) => "emergency_alert",
            TransportEvent::FireAlert(_) => "fire_alert",
            TransportEvent::AlarmAlert(_) => "alarmAlert",
            TransportEvent::DeviceStatus(_) => "deviceStatus",
            TransportEvent::Unknown { event, .. } => event,
        }
    }

    /// Serial number of the originating device, when the event carries one
    pub fn serial_number(&self) -> Option<&str> {
        match self {
            TransportEvent::SensorData(e) => Some(&e.serial_number),
            TransportEvent::EmergencyAlert(e) => Some(&e.serial_number),
            TransportEvent::FireAlert(e) => Some(&e.serial_number),
            TransportEvent::AlarmAlert(e) => Some(&e.serial_number),
            TransportEvent::DeviceStatus(e) => Some(&e.serial_number),
            TransportEvent::Unknown { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emergency_alert_defaults() {
        let json = r#"{"serialNumber": "SN-1"}"#;
        let alert: EmergencyAlert = serde_json::from_str(json).unwrap();
        assert_eq!(alert.severity, Severity::Info);
        assert!(alert.alert_type.is_none());
        assert!(alert.message.is_empty());
    }

    #[test]
    fn test_emergency_alert_full_payload() {
        let json = r#"{
            "serialNumber": "SN-1",
            "severity": "critical",
            "alertType": 3,
            "message": "gas concentration above threshold"
        }"#;
        let alert: EmergencyAlert = serde_json::from_str(json).unwrap();
        assert_eq!(alert.severity, Severity::Critical);
        assert_eq!(alert.alert_type, Some(AlertCode::GasLeak));
    }

    #[test]
    fn test_event_name_and_serial() {
        let event = TransportEvent::DeviceStatus(DeviceStatus {
            serial_number: "SN-2".into(),
            online: false,
            battery: Some(40),
        });
        assert_eq!(event.event_name(), "deviceStatus");
        assert_eq!(event.serial_number(), Some("SN-2"));

        let unknown = TransportEvent::Unknown {
            event: "somethingNew".into(),
            params: serde_json::json!({}),
        };
        assert_eq!(unknown.event_name(), "somethingNew");
        assert!(unknown.serial_number().is_none());
    }
}
