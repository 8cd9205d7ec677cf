//! # hwatch-transport - Real-time Channel Management
//!
//! Connects HomeWatch to the backend's real-time namespaces: one general
//! channel per account and zero-or-many device-scoped channels, each
//! requiring `{serialNumber, accountId}`. Provides:
//!
//! - [`ConnectionManager`] - explicit, injectable channel lifecycle +
//!   status snapshot + fire-and-forget command sends
//! - [`EventSubscription`] - drop-to-unregister event listener contract
//! - [`Dialer`] / [`WsDialer`] - the transport seam and its WebSocket
//!   implementation
//! - [`protocol`] - the `{event, params}` wire codec
//!
//! There is no acknowledgement tracking, no retry, and no reconnect loop
//! here: dropped messages are lost and a dead channel stays down until the
//! caller reconnects.

pub mod commands;
pub mod connection;
pub mod dialer;
pub mod protocol;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;

pub use commands::DoorAction;
pub use connection::{ConnectionManager, ConnectionStatus, EventSubscription};
pub use dialer::{DialedChannel, Dialer, WsDialer};
pub use protocol::{parse_wire_message, WireMessage};
