//! # hwatch-app - Session, Notification, and Data Layer
//!
//! The application layer of HomeWatch. Sits between the transport crate
//! and whatever front end hosts the engine:
//!
//! - [`SessionManager`] / [`SessionStore`] - login, restore, logout, with
//!   pluggable persistence (file-backed or in-memory)
//! - [`ApiClient`] - REST calls to the externally owned backend
//! - [`NotificationCenter`] - classification plus capped newest-first
//!   retention of routine notifications and emergency alerts
//! - [`PushManager`] / [`PushGateway`] - the push-permission flow and
//!   delivery-token cache
//! - [`validation`] - the declarative rule evaluator shared by all forms
//! - [`views`] - headless list/form state for the CRUD screens
//! - [`Settings`] / [`Diagnostics`] - configuration with user-visible
//!   misconfiguration reporting

pub mod api;
pub mod diagnostics;
pub mod notifications;
pub mod push;
pub mod session;
pub mod settings;
pub mod store;
pub mod validation;
pub mod views;

pub use api::ApiClient;
pub use diagnostics::{ConfigIssue, Diagnostics};
pub use notifications::{NotificationCenter, DEFAULT_RETENTION_CAP};
pub use push::{PermissionStatus, PushDelivery, PushGateway, PushManager};
pub use session::SessionManager;
pub use settings::{PushConfig, Settings};
pub use store::{FileStore, MemoryStore, SessionStore};
