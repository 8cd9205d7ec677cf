//! Record shapes mirrored from the backend schema
//!
//! The client never owns or mutates canonical state: every write is an
//! optimistic local patch overwritten by the next server fetch. These are
//! plain data-transfer shapes, camelCase on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The authenticated session for this process
///
/// Created at login, held in memory and in the session store, destroyed at
/// logout. At most one active session per process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user_id: String,
    pub account_id: String,
    pub auth_token: String,
}

/// A monitored device
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Backend record ID
    pub id: String,

    /// Device serial number -- the key for device-scoped channels
    pub serial_number: String,

    /// Human-readable device name
    pub name: String,

    /// Device model identifier (e.g. "hub-v2", "door-sensor")
    #[serde(default)]
    pub model: Option<String>,

    /// Whether the device currently reports as online
    #[serde(default)]
    pub online: bool,

    /// Group/house this device belongs to, if any
    #[serde(default)]
    pub group_id: Option<String>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Device {
    /// Display string; falls back to the serial number for unnamed devices
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.serial_number
        } else {
            &self.name
        }
    }
}

/// A customer account holder
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    /// 10-digit contact number, digits only
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A group of devices (a house, in the product vocabulary)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub device_count: u32,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A support ticket raised from the client
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    #[serde(default)]
    pub id: Option<String>,
    pub subject: String,
    pub description: String,
    #[serde(default)]
    pub device_serial: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_display_name_falls_back_to_serial() {
        let mut device = Device {
            id: "d1".into(),
            serial_number: "SN-100".into(),
            name: "Living Room Hub".into(),
            model: None,
            online: true,
            group_id: None,
            updated_at: None,
        };
        assert_eq!(device.display_name(), "Living Room Hub");

        device.name.clear();
        assert_eq!(device.display_name(), "SN-100");
    }

    #[test]
    fn test_device_deserializes_camel_case_wire_shape() {
        let json = r#"{
            "id": "d1",
            "serialNumber": "SN-100",
            "name": "Hub",
            "online": true,
            "groupId": "g1"
        }"#;
        let device: Device = serde_json::from_str(json).unwrap();
        assert_eq!(device.serial_number, "SN-100");
        assert_eq!(device.group_id.as_deref(), Some("g1"));
        assert!(device.online);
    }

    #[test]
    fn test_auth_session_round_trips() {
        let session = AuthSession {
            user_id: "u1".into(),
            account_id: "acct-9".into(),
            auth_token: "tok".into(),
        };
        let json = serde_json::to_string(&session).unwrap();
        assert!(json.contains("accountId"));
        let back: AuthSession = serde_json::from_str(&json).unwrap();
        assert_eq!(back, session);
    }
}
