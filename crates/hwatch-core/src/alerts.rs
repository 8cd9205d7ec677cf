//! Alert severity, emergency classification, and the notification model
//!
//! This module is the single source of truth for the emergency rule. The
//! backend contract marks a message as an emergency when its severity is
//! `critical` or its alert code names fire, smoke, or a gas leak; every
//! other device message is routine. No other module restates these
//! constants.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Global notification ID counter
static NOTIFICATION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generate a process-local unique notification ID
pub fn next_notification_id() -> u64 {
    NOTIFICATION_ID_COUNTER.fetch_add(1, Ordering::SeqCst)
}

// ─────────────────────────────────────────────────────────
// Severity
// ─────────────────────────────────────────────────────────

/// Declared severity of a device message
///
/// The wire value is a lowercase string. Unknown strings fall back to
/// [`Severity::Info`] -- the wire contract is owned by the backend and the
/// client tolerates vocabulary drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Critical,
}

impl Severity {
    /// Parse a wire severity string, falling back to `Info`
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "warning" | "warn" => Severity::Warning,
            "critical" => Severity::Critical,
            _ => Severity::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

impl From<String> for Severity {
    fn from(s: String) -> Self {
        Severity::parse(&s)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────
// Alert Codes
// ─────────────────────────────────────────────────────────

/// Numeric alert-type code attached to device alerts
///
/// Canonical values confirmed against the backend contract: 1 = fire,
/// 2 = smoke, 3 = gas leak. Codes outside the enumeration are carried
/// through as [`AlertCode::Other`] and never classify as emergencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum AlertCode {
    Fire,
    Smoke,
    GasLeak,
    Other(u8),
}

impl AlertCode {
    /// Whether this code belongs to the emergency enumeration
    pub fn is_emergency(&self) -> bool {
        matches!(self, AlertCode::Fire | AlertCode::Smoke | AlertCode::GasLeak)
    }

    pub fn label(&self) -> &'static str {
        match self {
            AlertCode::Fire => "fire",
            AlertCode::Smoke => "smoke",
            AlertCode::GasLeak => "gas leak",
            AlertCode::Other(_) => "other",
        }
    }
}

impl From<u8> for AlertCode {
    fn from(code: u8) -> Self {
        match code {
            1 => AlertCode::Fire,
            2 => AlertCode::Smoke,
            3 => AlertCode::GasLeak,
            other => AlertCode::Other(other),
        }
    }
}

impl From<AlertCode> for u8 {
    fn from(code: AlertCode) -> u8 {
        match code {
            AlertCode::Fire => 1,
            AlertCode::Smoke => 2,
            AlertCode::GasLeak => 3,
            AlertCode::Other(other) => other,
        }
    }
}

// ─────────────────────────────────────────────────────────
// Classification
// ─────────────────────────────────────────────────────────

/// Category of a classified device message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Routine,
    Emergency,
}

/// Classify an inbound device message
///
/// Emergency iff the declared severity is `critical` OR the alert code is
/// one of the canonical emergency codes (fire, smoke, gas leak). Everything
/// else is routine.
pub fn classify(severity: Severity, code: Option<AlertCode>) -> NotificationKind {
    if severity == Severity::Critical || code.is_some_and(|c| c.is_emergency()) {
        NotificationKind::Emergency
    } else {
        NotificationKind::Routine
    }
}

// ─────────────────────────────────────────────────────────
// Notification
// ─────────────────────────────────────────────────────────

/// A classified, displayable notification
///
/// Transient client-side state: appended to an in-memory newest-first list
/// with a fixed retention cap, dismissible by ID. Never persisted and never
/// deduplicated across reconnects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Process-local unique ID (used for dismissal)
    pub id: u64,
    pub kind: NotificationKind,
    pub severity: Severity,
    /// Serial number of the originating device; may reference a device the
    /// client no longer knows about (stale references render a fallback)
    pub serial_number: String,
    pub title: String,
    pub body: String,
    pub code: Option<AlertCode>,
    pub received_at: DateTime<Utc>,
    /// Emergencies must not auto-dismiss; the UI keeps them until acted on
    pub requires_interaction: bool,
}

impl Notification {
    /// Build a notification from raw message parts, classifying it
    pub fn from_parts(
        severity: Severity,
        code: Option<AlertCode>,
        serial_number: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        let kind = classify(severity, code);
        Self {
            id: next_notification_id(),
            kind,
            severity,
            serial_number: serial_number.into(),
            title: title.into(),
            body: body.into(),
            code,
            received_at: Utc::now(),
            requires_interaction: kind == NotificationKind::Emergency,
        }
    }

    pub fn is_emergency(&self) -> bool {
        self.kind == NotificationKind::Emergency
    }
}
