//! Connection manager for the real-time channels
//!
//! Maintains zero-or-one general channel (keyed by account ID) and
//! zero-or-many device-scoped channels (keyed by serial number). The
//! manager is an explicit, constructor-injected instance -- nothing here is
//! global -- and is generic over [`Dialer`] so tests substitute a fake
//! transport.
//!
//! Connect operations return `bool` rather than `Result`: call sites treat
//! a failure as a status flip with a manual-reconnect affordance, not as a
//! control-flow event. Failures are caught and logged here.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use url::Url;

use hwatch_core::prelude::*;
use hwatch_core::TransportEvent;

use crate::commands::{self, DoorAction};
use crate::dialer::{DialedChannel, Dialer};
use crate::protocol::{parse_wire_message, WireMessage};

// ─────────────────────────────────────────────────────────
// Event Bus + Subscription
// ─────────────────────────────────────────────────────────

/// Fan-out point between channel reader tasks and subscribers
#[derive(Debug, Default)]
struct EventBus {
    subscribers: Mutex<HashMap<u64, mpsc::UnboundedSender<TransportEvent>>>,
    next_id: AtomicU64,
}

impl EventBus {
    fn subscribe(&self) -> (u64, mpsc::UnboundedReceiver<TransportEvent>) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().insert(id, tx);
        (id, rx)
    }

    fn unsubscribe(&self, id: u64) {
        self.lock().remove(&id);
    }

    fn publish(&self, event: &TransportEvent) {
        self.lock().retain(|_, tx| tx.send(event.clone()).is_ok());
    }

    fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<u64, mpsc::UnboundedSender<TransportEvent>>> {
        self.subscribers.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// A registered event listener
///
/// The subscription contract is explicit: dropping this handle unregisters
/// the listener, so no subscriber leaks across mount/unmount cycles.
#[derive(Debug)]
pub struct EventSubscription {
    id: u64,
    bus: Arc<EventBus>,
    rx: mpsc::UnboundedReceiver<TransportEvent>,
}

impl EventSubscription {
    /// Await the next event from any open channel
    pub async fn recv(&mut self) -> Option<TransportEvent> {
        self.rx.recv().await
    }

    /// Non-blocking poll for the next event
    pub fn try_recv(&mut self) -> Option<TransportEvent> {
        self.rx.try_recv().ok()
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.id);
    }
}

// ─────────────────────────────────────────────────────────
// Channels
// ─────────────────────────────────────────────────────────

/// One live channel: the write half plus its reader task
#[derive(Debug)]
struct Channel {
    socket_id: String,
    outbound: mpsc::UnboundedSender<String>,
    alive: Arc<AtomicBool>,
    reader: JoinHandle<()>,
}

impl Channel {
    fn spawn(dialed: DialedChannel, bus: Arc<EventBus>, label: String) -> Self {
        let alive = Arc::new(AtomicBool::new(true));
        let reader = tokio::spawn(read_loop(dialed.inbound, bus, alive.clone(), label));
        Self {
            socket_id: dialed.socket_id,
            outbound: dialed.outbound,
            alive,
            reader,
        }
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn shutdown(self) {
        self.alive.store(false, Ordering::SeqCst);
        // Dropping the outbound sender closes the underlying socket pump.
        drop(self.outbound);
        self.reader.abort();
    }
}

/// Forward parsed frames from one channel into the shared bus
async fn read_loop(
    mut inbound: mpsc::UnboundedReceiver<String>,
    bus: Arc<EventBus>,
    alive: Arc<AtomicBool>,
    label: String,
) {
    while let Some(frame) = inbound.recv().await {
        match parse_wire_message(&frame) {
            Some(event) => {
                trace!(channel = %label, event = %event.event_name(), "event received");
                bus.publish(&event);
            }
            None => debug!(channel = %label, "discarding malformed frame"),
        }
    }
    // Inbound closed: the connection is gone.
    alive.store(false, Ordering::SeqCst);
    debug!(channel = %label, "channel reader exited");
}

struct GeneralChannel {
    account_id: String,
    channel: Channel,
}

/// Synchronous connection snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub is_connected: bool,
    pub socket_id: Option<String>,
    pub connected_devices: Vec<String>,
}

// ─────────────────────────────────────────────────────────
// Connection Manager
// ─────────────────────────────────────────────────────────

/// Manages the general channel and all device-scoped channels
pub struct ConnectionManager<D: Dialer> {
    dialer: D,
    socket_base: Url,
    general: Option<GeneralChannel>,
    devices: HashMap<String, Channel>,
    bus: Arc<EventBus>,
}

impl<D: Dialer> ConnectionManager<D> {
    pub fn new(dialer: D, socket_base: Url) -> Self {
        Self {
            dialer,
            socket_base,
            general: None,
            devices: HashMap::new(),
            bus: Arc::new(EventBus::default()),
        }
    }

    /// Register an event listener across all open channels
    pub fn subscribe(&self) -> EventSubscription {
        let (id, rx) = self.bus.subscribe();
        EventSubscription {
            id,
            bus: Arc::clone(&self.bus),
            rx,
        }
    }

    /// Establish the general (per-account) channel
    ///
    /// Idempotent when already connected with the same account ID; a
    /// different ID tears the old channel down first. Returns `false` on
    /// failure (logged), `true` when the channel is up.
    pub async fn connect(&mut self, account_id: &str) -> bool {
        if account_id.is_empty() {
            warn!("connect called without an account id");
            return false;
        }

        if let Some(general) = &self.general {
            if general.account_id == account_id && general.channel.is_alive() {
                debug!(account_id, "general channel already connected");
                return true;
            }
        }
        self.disconnect();

        let url = match self.account_url(account_id) {
            Ok(url) => url,
            Err(e) => {
                warn!(account_id, "bad account channel URL: {e}");
                return false;
            }
        };

        match self.dialer.dial(&url).await {
            Ok(dialed) => {
                let channel =
                    Channel::spawn(dialed, Arc::clone(&self.bus), format!("account:{account_id}"));
                info!(account_id, socket_id = %channel.socket_id, "general channel connected");
                self.general = Some(GeneralChannel {
                    account_id: account_id.to_string(),
                    channel,
                });
                true
            }
            Err(e) => {
                warn!(account_id, "general channel connect failed: {e}");
                false
            }
        }
    }

    /// Open a device-scoped channel
    ///
    /// The backend namespace requires both the serial number and the
    /// account ID; if either is empty this fails fast with no connection
    /// attempt.
    pub async fn connect_to_device(&mut self, serial: &str, account_id: &str) -> bool {
        if serial.is_empty() || account_id.is_empty() {
            warn!(serial, account_id, "device channel requires serial and account id");
            return false;
        }

        if let Some(channel) = self.devices.get(serial) {
            if channel.is_alive() {
                debug!(serial, "device channel already connected");
                return true;
            }
            // Stale entry from a dropped connection; replace it.
            if let Some(dead) = self.devices.remove(serial) {
                dead.shutdown();
            }
        }

        let url = match self.device_url(serial, account_id) {
            Ok(url) => url,
            Err(e) => {
                warn!(serial, "bad device channel URL: {e}");
                return false;
            }
        };

        match self.dialer.dial(&url).await {
            Ok(dialed) => {
                let channel =
                    Channel::spawn(dialed, Arc::clone(&self.bus), format!("device:{serial}"));
                info!(serial, socket_id = %channel.socket_id, "device channel connected");
                self.devices.insert(serial.to_string(), channel);
                true
            }
            Err(e) => {
                warn!(serial, "device channel connect failed: {e}");
                false
            }
        }
    }

    /// Tear down the general channel; safe to call when not connected
    pub fn disconnect(&mut self) {
        if let Some(general) = self.general.take() {
            info!(account_id = %general.account_id, "general channel disconnected");
            general.channel.shutdown();
        }
    }

    /// Tear down one device channel; safe to call when not connected
    pub fn disconnect_from_device(&mut self, serial: &str) {
        if let Some(channel) = self.devices.remove(serial) {
            info!(serial, "device channel disconnected");
            channel.shutdown();
        }
    }

    /// Tear down every open channel (general and device-scoped)
    pub fn disconnect_all(&mut self) {
        self.disconnect();
        for (serial, channel) in self.devices.drain() {
            info!(%serial, "device channel disconnected");
            channel.shutdown();
        }
    }

    /// Synchronous snapshot of the connection state
    pub fn status(&self) -> ConnectionStatus {
        let general = self
            .general
            .as_ref()
            .filter(|g| g.channel.is_alive());
        let mut connected_devices: Vec<String> = self
            .devices
            .iter()
            .filter(|(_, channel)| channel.is_alive())
            .map(|(serial, _)| serial.clone())
            .collect();
        connected_devices.sort();

        ConnectionStatus {
            is_connected: general.is_some(),
            socket_id: general.map(|g| g.channel.socket_id.clone()),
            connected_devices,
        }
    }

    // ─────────────────────────────────────────────────────
    // Commands (fire-and-forget)
    // ─────────────────────────────────────────────────────

    /// Send an arbitrary command payload to a device
    pub fn send_command(&self, serial: &str, payload: serde_json::Value) -> bool {
        self.send_frame(serial, commands::raw_command(serial, payload))
    }

    pub fn send_door(&self, serial: &str, action: DoorAction) -> bool {
        self.send_frame(serial, commands::door_command(serial, action))
    }

    pub fn send_led_effect(&self, serial: &str, effect: &str) -> bool {
        self.send_frame(serial, commands::led_effect(serial, effect))
    }

    pub fn send_led_preset(&self, serial: &str, preset: u8) -> bool {
        self.send_frame(serial, commands::led_preset(serial, preset))
    }

    pub fn send_led_state(&self, serial: &str, on: bool) -> bool {
        self.send_frame(serial, commands::led_state(serial, on))
    }

    fn send_frame(&self, serial: &str, msg: WireMessage) -> bool {
        let Some(channel) = self.devices.get(serial) else {
            warn!(serial, event = %msg.event, "no device channel open, dropping command");
            return false;
        };
        if !channel.is_alive() {
            warn!(serial, event = %msg.event, "device channel is down, dropping command");
            return false;
        }
        let text = match msg.encode() {
            Ok(text) => text,
            Err(e) => {
                warn!(serial, "failed to encode command frame: {e}");
                return false;
            }
        };
        channel.outbound.send(text).is_ok()
    }

    // ─────────────────────────────────────────────────────
    // URL building
    // ─────────────────────────────────────────────────────

    fn account_url(&self, account_id: &str) -> Result<Url> {
        let mut url = self.socket_base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::transport("socket base URL cannot be a base"))?
            .pop_if_empty()
            .push("account")
            .push(account_id);
        Ok(url)
    }

    fn device_url(&self, serial: &str, account_id: &str) -> Result<Url> {
        let mut url = self.socket_base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::transport("socket base URL cannot be a base"))?
            .pop_if_empty()
            .push("device");
        url.query_pairs_mut()
            .append_pair("serialNumber", serial)
            .append_pair("accountId", account_id);
        Ok(url)
    }

    /// Number of live event subscriptions (test instrumentation)
    #[cfg(any(test, feature = "test-helpers"))]
    pub fn subscriber_count(&self) -> usize {
        self.bus.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FakeDialer;
    use std::time::Duration;

    fn manager(dialer: FakeDialer) -> ConnectionManager<FakeDialer> {
        ConnectionManager::new(dialer, Url::parse("ws://backend.test/rt").unwrap())
    }

    async fn next_event(sub: &mut EventSubscription) -> TransportEvent {
        tokio::time::timeout(Duration::from_secs(1), sub.recv())
            .await
            .expect("timed out waiting for event")
            .expect("bus closed")
    }

    #[tokio::test]
    async fn test_connect_is_idempotent_for_same_account() {
        let dialer = FakeDialer::new();
        let mut manager = manager(dialer.clone());

        assert!(manager.connect("acct-1").await);
        assert!(manager.connect("acct-1").await);
        assert_eq!(dialer.dial_count(), 1);
    }

    #[tokio::test]
    async fn test_connect_new_account_replaces_old_channel() {
        let dialer = FakeDialer::new();
        let mut manager = manager(dialer.clone());

        assert!(manager.connect("acct-1").await);
        let first_socket = manager.status().socket_id;
        assert!(manager.connect("acct-2").await);
        assert_eq!(dialer.dial_count(), 2);
        assert_ne!(manager.status().socket_id, first_socket);
    }

    #[tokio::test]
    async fn test_connect_to_device_rejects_empty_arguments() {
        let dialer = FakeDialer::new();
        let mut manager = manager(dialer.clone());

        assert!(!manager.connect_to_device("", "acct-1").await);
        assert!(!manager.connect_to_device("SN-1", "").await);
        assert_eq!(dialer.dial_count(), 0, "no connection attempt may be made");
        assert!(manager.status().connected_devices.is_empty());
    }

    #[tokio::test]
    async fn test_connect_failure_returns_false() {
        let dialer = FakeDialer::new();
        dialer.fail_dials(true);
        let mut manager = manager(dialer.clone());

        assert!(!manager.connect("acct-1").await);
        assert!(!manager.status().is_connected);
    }

    #[tokio::test]
    async fn test_device_url_carries_namespace_parameters() {
        let dialer = FakeDialer::new();
        let mut manager = manager(dialer.clone());

        assert!(manager.connect_to_device("SN-1", "acct-1").await);
        let url = dialer.last_dialed_url().unwrap();
        assert!(url.path().ends_with("/device"));
        let query: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(query.contains(&("serialNumber".into(), "SN-1".into())));
        assert!(query.contains(&("accountId".into(), "acct-1".into())));
    }

    #[tokio::test]
    async fn test_events_reach_subscribers() {
        let dialer = FakeDialer::new();
        let mut manager = manager(dialer.clone());
        let mut sub = manager.subscribe();

        assert!(manager.connect("acct-1").await);
        let remote = dialer.remote(0).unwrap();
        remote.push_frame(
            r#"{"event":"emergency_alert","params":{"serialNumber":"SN-1","severity":"critical","message":"smoke"}}"#,
        );

        match next_event(&mut sub).await {
            TransportEvent::EmergencyAlert(alert) => assert_eq!(alert.serial_number, "SN-1"),
            other => panic!("expected EmergencyAlert, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dropping_subscription_unregisters_it() {
        let dialer = FakeDialer::new();
        let manager = manager(dialer);

        let sub = manager.subscribe();
        let sub2 = manager.subscribe();
        assert_eq!(manager.subscriber_count(), 2);
        drop(sub);
        assert_eq!(manager.subscriber_count(), 1);
        drop(sub2);
        assert_eq!(manager.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_send_door_requires_an_open_channel() {
        let dialer = FakeDialer::new();
        let mut manager = manager(dialer.clone());

        assert!(!manager.send_door("SN-1", DoorAction::Open));

        assert!(manager.connect_to_device("SN-1", "acct-1").await);
        assert!(manager.send_door("SN-1", DoorAction::Open));

        let remote = dialer.remote(0).unwrap();
        let frame = remote.try_recv_sent().expect("command frame must be sent");
        let msg: WireMessage = serde_json::from_str(&frame).unwrap();
        assert_eq!(msg.event, "doorCommand");
        assert_eq!(msg.params["action"], "open");
    }

    #[tokio::test]
    async fn test_disconnect_is_safe_when_not_connected() {
        let dialer = FakeDialer::new();
        let mut manager = manager(dialer);

        manager.disconnect();
        manager.disconnect_from_device("SN-1");
        manager.disconnect_all();
        assert!(!manager.status().is_connected);
    }

    #[tokio::test]
    async fn test_status_snapshot_reflects_open_channels() {
        let dialer = FakeDialer::new();
        let mut manager = manager(dialer);

        assert!(manager.connect("acct-1").await);
        assert!(manager.connect_to_device("SN-2", "acct-1").await);
        assert!(manager.connect_to_device("SN-1", "acct-1").await);

        let status = manager.status();
        assert!(status.is_connected);
        assert!(status.socket_id.is_some());
        assert_eq!(status.connected_devices, vec!["SN-1", "SN-2"]);

        manager.disconnect_from_device("SN-1");
        assert_eq!(manager.status().connected_devices, vec!["SN-2"]);

        manager.disconnect_all();
        let status = manager.status();
        assert!(!status.is_connected);
        assert!(status.connected_devices.is_empty());
    }
}
