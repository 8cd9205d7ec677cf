//! Push-messaging permission flow and delivery normalization
//!
//! The push backend itself is externally owned; this module owns only the
//! client-side state: the permission state machine, the delivery token
//! held for the session, and the normalization of delivered messages into
//! notifications. The gateway is a trait so the engine runs against a fake
//! in tests and against whatever platform integration hosts it.

use serde::Deserialize;

use hwatch_core::prelude::*;
use hwatch_core::{AlertCode, Notification, Severity};

/// Outcome of a permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionStatus {
    /// Undecided -- the user has not answered the prompt yet
    #[default]
    Prompt,
    Granted,
    Denied,
}

/// Platform integration for push messaging
#[cfg_attr(test, mockall::automock)]
pub trait PushGateway: Send {
    /// Ask the platform for notification permission
    fn request_permission(&self) -> PermissionStatus;

    /// Obtain a delivery token; only meaningful after a grant
    fn fetch_token(&self) -> Result<String>;
}

/// Drives the permission flow and caches the session's delivery token
pub struct PushManager<G: PushGateway> {
    gateway: G,
    status: PermissionStatus,
    token: Option<String>,
}

impl<G: PushGateway> PushManager<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            status: PermissionStatus::Prompt,
            token: None,
        }
    }

    pub fn status(&self) -> PermissionStatus {
        self.status
    }

    /// The delivery token, if permission was granted and a token obtained
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Run the permission prompt
    ///
    /// Denial is a terminal user choice: once denied, this returns
    /// `Denied` without re-prompting. Re-enabling requires manual
    /// platform-settings intervention (see
    /// [`manual_enable_instructions`](Self::manual_enable_instructions)).
    pub fn request_permission(&mut self) -> PermissionStatus {
        if self.status == PermissionStatus::Denied {
            debug!("push permission already denied; not re-prompting");
            return PermissionStatus::Denied;
        }

        self.status = self.gateway.request_permission();
        match self.status {
            PermissionStatus::Granted => {
                if self.token.is_none() {
                    match self.gateway.fetch_token() {
                        Ok(token) => {
                            info!("push delivery token obtained");
                            self.token = Some(token);
                        }
                        Err(e) => warn!("push token fetch failed: {e}"),
                    }
                }
            }
            PermissionStatus::Denied => {
                info!("push permission denied by the user");
            }
            PermissionStatus::Prompt => {}
        }
        self.status
    }

    /// Re-enable instructions to surface when the user has denied
    /// permission; `None` otherwise
    pub fn manual_enable_instructions(&self) -> Option<&'static str> {
        (self.status == PermissionStatus::Denied).then_some(
            "Notifications are blocked. Open your platform's notification \
             settings for HomeWatch and allow notifications, then restart \
             the app.",
        )
    }

    /// Drop the session-scoped token (logout path)
    pub fn clear_token(&mut self) {
        self.token = None;
    }
}

/// A delivered push message, as handed over by the gateway
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushDelivery {
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub alert_type: Option<AlertCode>,
}

impl PushDelivery {
    /// Classify into a notification; deliveries with no device reference
    /// keep an empty serial and render a fallback label downstream
    pub fn into_notification(self) -> Notification {
        Notification::from_parts(
            self.severity,
            self.alert_type,
            self.serial_number.unwrap_or_default(),
            self.title,
            self.body,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hwatch_core::NotificationKind;

    #[test]
    fn test_grant_obtains_token_once() {
        let mut gateway = MockPushGateway::new();
        gateway
            .expect_request_permission()
            .times(2)
            .returning(|| PermissionStatus::Granted);
        gateway
            .expect_fetch_token()
            .times(1)
            .returning(|| Ok("tok-1".into()));

        let mut manager = PushManager::new(gateway);
        assert_eq!(manager.request_permission(), PermissionStatus::Granted);
        assert_eq!(manager.token(), Some("tok-1"));

        // Second request re-prompts but must not refetch the token.
        assert_eq!(manager.request_permission(), PermissionStatus::Granted);
        assert_eq!(manager.token(), Some("tok-1"));
    }

    #[test]
    fn test_denial_is_terminal() {
        let mut gateway = MockPushGateway::new();
        gateway
            .expect_request_permission()
            .times(1)
            .returning(|| PermissionStatus::Denied);

        let mut manager = PushManager::new(gateway);
        assert_eq!(manager.request_permission(), PermissionStatus::Denied);
        // No further gateway calls may happen.
        assert_eq!(manager.request_permission(), PermissionStatus::Denied);
        assert!(manager.manual_enable_instructions().is_some());
        assert!(manager.token().is_none());
    }

    #[test]
    fn test_token_fetch_failure_leaves_grant_in_place() {
        let mut gateway = MockPushGateway::new();
        gateway
            .expect_request_permission()
            .returning(|| PermissionStatus::Granted);
        gateway
            .expect_fetch_token()
            .returning(|| Err(Error::push_gateway("registration unavailable")));

        let mut manager = PushManager::new(gateway);
        assert_eq!(manager.request_permission(), PermissionStatus::Granted);
        assert!(manager.token().is_none());
    }

    #[test]
    fn test_clear_token_on_logout() {
        let mut gateway = MockPushGateway::new();
        gateway
            .expect_request_permission()
            .returning(|| PermissionStatus::Granted);
        gateway.expect_fetch_token().returning(|| Ok("tok".into()));

        let mut manager = PushManager::new(gateway);
        manager.request_permission();
        assert!(manager.token().is_some());
        manager.clear_token();
        assert!(manager.token().is_none());
    }

    #[test]
    fn test_delivery_classification() {
        let delivery: PushDelivery = serde_json::from_str(
            r#"{"title":"Gas leak","body":"kitchen sensor","serialNumber":"SN-1","severity":"warning","alertType":3}"#,
        )
        .unwrap();
        let notification = delivery.into_notification();
        assert_eq!(notification.kind, NotificationKind::Emergency);
        assert_eq!(notification.serial_number, "SN-1");
    }
}
