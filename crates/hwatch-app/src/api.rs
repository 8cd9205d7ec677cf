//! REST client for the backend IoT API
//!
//! Thin wrappers over the externally owned endpoints (`/auth/...`,
//! `/devices/...`, `/customers/...`, `/groups/...`, `/tickets`). Request
//! and response shapes are dictated by that backend. Failures map to
//! [`Error::Http`] with the body's `message` field when present; there is
//! no retry and no caching.

use std::sync::RwLock;

use reqwest::{Method, RequestBuilder};
use serde_json::json;
use url::Url;

use hwatch_core::prelude::*;
use hwatch_core::{AuthSession, Customer, Device, Group, Ticket};

/// HTTP client bound to the configured API base URL
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    // Written by the session layer only.
    auth_token: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            auth_token: RwLock::new(None),
        }
    }

    /// Set or clear the bearer token attached to subsequent requests
    pub fn set_auth_token(&self, token: Option<String>) {
        *self.auth_token.write().unwrap_or_else(|e| e.into_inner()) = token;
    }

    // ─────────────────────────────────────────────────────
    // Auth
    // ─────────────────────────────────────────────────────

    /// `POST /auth/login`; on success the client keeps the returned token
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession> {
        let body = json!({ "email": email, "password": password });
        let response = self
            .request(Method::POST, &["auth", "login"])?
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::auth(e.to_string()))?;
        let session: AuthSession = Self::parse_json(response).await?;
        self.set_auth_token(Some(session.auth_token.clone()));
        info!(account_id = %session.account_id, "logged in");
        Ok(session)
    }

    // ─────────────────────────────────────────────────────
    // Devices
    // ─────────────────────────────────────────────────────

    pub async fn list_devices(&self) -> Result<Vec<Device>> {
        self.get_json(&["devices"]).await
    }

    pub async fn create_device(&self, device: &Device) -> Result<Device> {
        self.send_json(Method::POST, &["devices"], device).await
    }

    pub async fn update_device(&self, device: &Device) -> Result<Device> {
        self.send_json(Method::PUT, &["devices", &device.id], device)
            .await
    }

    pub async fn delete_device(&self, id: &str) -> Result<()> {
        self.delete(&["devices", id]).await
    }

    // ─────────────────────────────────────────────────────
    // Customers
    // ─────────────────────────────────────────────────────

    pub async fn list_customers(&self) -> Result<Vec<Customer>> {
        self.get_json(&["customers"]).await
    }

    pub async fn create_customer(&self, customer: &Customer) -> Result<Customer> {
        self.send_json(Method::POST, &["customers"], customer).await
    }

    pub async fn update_customer(&self, customer: &Customer) -> Result<Customer> {
        self.send_json(Method::PUT, &["customers", &customer.id], customer)
            .await
    }

    pub async fn delete_customer(&self, id: &str) -> Result<()> {
        self.delete(&["customers", id]).await
    }

    // ─────────────────────────────────────────────────────
    // Groups
    // ─────────────────────────────────────────────────────

    pub async fn list_groups(&self) -> Result<Vec<Group>> {
        self.get_json(&["groups"]).await
    }

    pub async fn create_group(&self, group: &Group) -> Result<Group> {
        self.send_json(Method::POST, &["groups"], group).await
    }

    pub async fn update_group(&self, group: &Group) -> Result<Group> {
        self.send_json(Method::PUT, &["groups", &group.id], group)
            .await
    }

    pub async fn delete_group(&self, id: &str) -> Result<()> {
        self.delete(&["groups", id]).await
    }

    // ─────────────────────────────────────────────────────
    // Tickets
    // ─────────────────────────────────────────────────────

    pub async fn create_ticket(&self, ticket: &Ticket) -> Result<Ticket> {
        self.send_json(Method::POST, &["tickets"], ticket).await
    }

    // ─────────────────────────────────────────────────────
    // Plumbing
    // ─────────────────────────────────────────────────────

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| Error::config("API base URL cannot be a base"))?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.endpoint(segments)?;
        let mut builder = self.http.request(method, url);
        if let Some(token) = self
            .auth_token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_deref()
        {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let response = self
            .request(Method::GET, segments)?
            .send()
            .await
            .map_err(|e| Error::api(e.to_string()))?;
        Self::parse_json(response).await
    }

    async fn send_json<T, B>(&self, method: Method, segments: &[&str], body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let response = self
            .request(method, segments)?
            .json(body)
            .send()
            .await
            .map_err(|e| Error::api(e.to_string()))?;
        Self::parse_json(response).await
    }

    async fn delete(&self, segments: &[&str]) -> Result<()> {
        let response = self
            .request(Method::DELETE, segments)?
            .send()
            .await
            .map_err(|e| Error::api(e.to_string()))?;
        Self::check(response).await?;
        Ok(())
    }

    async fn parse_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let response = Self::check(response).await?;
        response.json().await.map_err(|e| Error::api(e.to_string()))
    }

    /// Map non-2xx responses to [`Error::Http`]
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = extract_message(&body, status.canonical_reason().unwrap_or("request failed"));
        warn!(status = status.as_u16(), error = %message, "API request failed");
        Err(Error::http(status.as_u16(), message))
    }
}

/// Pull the `message` field out of an error body, falling back to the raw
/// body and then to the status reason
fn extract_message(body: &str, fallback: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
            return message.to_string();
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_message_prefers_body_field() {
        let body = r#"{"message":"token expired","code":401}"#;
        assert_eq!(extract_message(body, "Unauthorized"), "token expired");
    }

    #[test]
    fn test_extract_message_falls_back_to_raw_body() {
        assert_eq!(extract_message("gateway timeout", "Bad Gateway"), "gateway timeout");
    }

    #[test]
    fn test_extract_message_falls_back_to_status_reason() {
        assert_eq!(extract_message("", "Not Found"), "Not Found");
        assert_eq!(extract_message("   ", "Not Found"), "Not Found");
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let api = ApiClient::new(Url::parse("https://api.backend.test/v1").unwrap());
        let url = api.endpoint(&["devices", "d-1"]).unwrap();
        assert_eq!(url.as_str(), "https://api.backend.test/v1/devices/d-1");
    }

    #[test]
    fn test_endpoint_handles_trailing_slash_base() {
        let api = ApiClient::new(Url::parse("https://api.backend.test/v1/").unwrap());
        let url = api.endpoint(&["tickets"]).unwrap();
        assert_eq!(url.as_str(), "https://api.backend.test/v1/tickets");
    }
}
