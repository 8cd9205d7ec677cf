//! Notification center: classification, retention, dismissal
//!
//! Consumes transport events and push deliveries and maintains the two
//! in-memory lists the UI renders from: routine device notifications and
//! emergency alerts. Both lists are newest-first with a fixed retention
//! cap -- pushing past the cap evicts the oldest entry. Presentation order
//! is arrival order; there is no priority reordering by severity.

use std::collections::VecDeque;

use hwatch_core::prelude::*;
use hwatch_core::{
    AlertCode, Notification, NotificationKind, Severity, TransportEvent,
};

use crate::push::PushDelivery;

/// Default per-category retention cap
pub const DEFAULT_RETENTION_CAP: usize = 10;

/// In-memory notification state, single writer
#[derive(Debug)]
pub struct NotificationCenter {
    cap: usize,
    device_notifications: VecDeque<Notification>,
    emergency_alerts: VecDeque<Notification>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(DEFAULT_RETENTION_CAP)
    }
}

impl NotificationCenter {
    pub fn new(cap: usize) -> Self {
        Self {
            cap: cap.max(1),
            device_notifications: VecDeque::new(),
            emergency_alerts: VecDeque::new(),
        }
    }

    /// Routine device notifications, newest first
    pub fn device_notifications(&self) -> impl Iterator<Item = &Notification> {
        self.device_notifications.iter()
    }

    /// Emergency alerts, newest first
    pub fn emergency_alerts(&self) -> impl Iterator<Item = &Notification> {
        self.emergency_alerts.iter()
    }

    pub fn notification_count(&self) -> usize {
        self.device_notifications.len()
    }

    pub fn alert_count(&self) -> usize {
        self.emergency_alerts.len()
    }

    /// Classify and store an inbound transport event
    ///
    /// Returns the stored notification, or `None` for events that do not
    /// surface to the user (unknown vocabulary).
    pub fn ingest(&mut self, event: &TransportEvent) -> Option<Notification> {
        let notification = match event {
            TransportEvent::SensorData(data) => Notification::from_parts(
                Severity::Info,
                None,
                &data.serial_number,
                "Sensor update",
                format!(
                    "{} {}{}",
                    data.sensor,
                    data.value,
                    data.unit.as_deref().map(|u| format!(" {u}")).unwrap_or_default()
                ),
            ),
            TransportEvent::EmergencyAlert(alert) => Notification::from_parts(
                alert.severity,
                alert.alert_type,
                &alert.serial_number,
                "Emergency alert",
                alert.message.clone(),
            ),
            TransportEvent::FireAlert(alert) => Notification::from_parts(
                Severity::Critical,
                Some(AlertCode::Fire),
                &alert.serial_number,
                "Fire alert",
                if alert.message.is_empty() {
                    alert.location.clone().unwrap_or_default()
                } else {
                    alert.message.clone()
                },
            ),
            TransportEvent::AlarmAlert(alert) => Notification::from_parts(
                alert.severity,
                alert.alert_type,
                &alert.serial_number,
                "Alarm",
                alert.message.clone(),
            ),
            TransportEvent::DeviceStatus(status) => Notification::from_parts(
                Severity::Info,
                None,
                &status.serial_number,
                "Device status",
                if status.online { "online" } else { "offline" },
            ),
            TransportEvent::Unknown { event, .. } => {
                debug!(%event, "ignoring unknown event");
                return None;
            }
        };
        Some(self.push(notification))
    }

    /// Normalize and store a push-message delivery
    pub fn ingest_push(&mut self, delivery: PushDelivery) -> Notification {
        self.push(delivery.into_notification())
    }

    /// Synthesize a local notification of the given category, without a
    /// server round-trip. Manual verification hook.
    pub fn test_notification(&mut self, kind: NotificationKind) -> Notification {
        let notification = match kind {
            NotificationKind::Routine => Notification::from_parts(
                Severity::Info,
                None,
                "TEST",
                "Test notification",
                "synthetic routine notification",
            ),
            NotificationKind::Emergency => Notification::from_parts(
                Severity::Critical,
                None,
                "TEST",
                "Test alert",
                "synthetic emergency alert",
            ),
        };
        self.push(notification)
    }

    /// Remove one entry by ID from whichever list holds it
    ///
    /// Returns `true` if an entry was removed. Order of the remaining
    /// entries is unchanged.
    pub fn dismiss(&mut self, id: u64) -> bool {
        if let Some(pos) = self.device_notifications.iter().position(|n| n.id == id) {
            self.device_notifications.remove(pos);
            return true;
        }
        if let Some(pos) = self.emergency_alerts.iter().position(|n| n.id == id) {
            self.emergency_alerts.remove(pos);
            return true;
        }
        false
    }

    pub fn clear_notifications(&mut self) {
        self.device_notifications.clear();
    }

    pub fn clear_alerts(&mut self) {
        self.emergency_alerts.clear();
    }

    fn push(&mut self, notification: Notification) -> Notification {
        if notification.is_emergency() {
            warn!(
                serial = %notification.serial_number,
                code = ?notification.code,
                "emergency alert: {}",
                notification.body
            );
        }
        let list = match notification.kind {
            NotificationKind::Routine => &mut self.device_notifications,
            NotificationKind::Emergency => &mut self.emergency_alerts,
        };
        list.push_front(notification.clone());
        list.truncate(self.cap);
        notification
    }
}
