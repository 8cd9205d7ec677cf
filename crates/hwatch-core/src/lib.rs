//! # hwatch-core - Core Domain Types
//!
//! Foundation crate for HomeWatch. Provides domain types, alert
//! classification, transport event definitions, and error handling.
//!
//! This crate has **zero internal dependencies** -- it only depends on
//! external crates (serde, chrono, thiserror, tracing).
//!
//! ## Public API
//!
//! ### Alerts (`alerts`)
//! - [`Severity`] - Declared message severity (info, warning, critical)
//! - [`AlertCode`] - Canonical emergency code enumeration (fire, smoke, gas leak)
//! - [`classify()`] - The single emergency-classification rule
//! - [`Notification`] - A classified, dismissible notification
//!
//! ### Records (`types`)
//! - [`AuthSession`] - The authenticated session (user, account, token)
//! - [`Device`], [`Customer`], [`Group`], [`Ticket`] - Backend record mirrors
//!
//! ### Events (`events`)
//! - [`TransportEvent`] - Typed events from the real-time channels
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use hwatch_core::prelude::*;
//! ```

pub mod alerts;
pub mod error;
pub mod events;
pub mod logging;
pub mod types;

/// Prelude for common imports used throughout all HomeWatch crates
pub mod prelude {
    pub use super::error::{Error, Result, ResultExt};
    pub use tracing::{debug, error, info, instrument, trace, warn};
}

// Re-export commonly used types at crate root for convenience
pub use alerts::{
    classify, next_notification_id, AlertCode, Notification, NotificationKind, Severity,
};
pub use error::{Error, Result, ResultExt};
pub use events::{
    AlarmAlert, DeviceStatus, EmergencyAlert, FireAlert, SensorData, TransportEvent,
};
pub use types::{AuthSession, Customer, Device, Group, Ticket};
