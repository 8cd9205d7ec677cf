//! Configuration diagnostics
//!
//! Missing or malformed required configuration is a detected, user-visible
//! condition -- surfaced in the status output -- not a crash. The engine
//! refuses to start network work while required values are absent, and
//! says why.

use crate::settings::{Settings, API_URL_ENV, SOCKET_URL_ENV};

/// One detected configuration problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    /// Settings key the issue concerns
    pub key: &'static str,
    pub message: String,
}

/// Result of checking the loaded settings
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    issues: Vec<ConfigIssue>,
}

impl Diagnostics {
    /// Inspect the settings for missing or malformed required values
    pub fn check(settings: &Settings) -> Self {
        let mut issues = Vec::new();

        match &settings.api_base_url {
            None => issues.push(ConfigIssue {
                key: "api_base_url",
                message: format!(
                    "no REST base URL: set {API_URL_ENV} or api_base_url in config.toml; \
                     API calls are disabled"
                ),
            }),
            Some(raw) if settings.api_url().is_none() => issues.push(ConfigIssue {
                key: "api_base_url",
                message: format!("REST base URL is not a valid URL: {raw}"),
            }),
            Some(_) => {}
        }

        match &settings.socket_base_url {
            None => issues.push(ConfigIssue {
                key: "socket_base_url",
                message: format!(
                    "no real-time base URL: set {SOCKET_URL_ENV} or socket_base_url in \
                     config.toml; live notifications are disabled"
                ),
            }),
            Some(raw) if settings.socket_url().is_none() => issues.push(ConfigIssue {
                key: "socket_base_url",
                message: format!("real-time base URL is not a valid URL: {raw}"),
            }),
            Some(_) => {}
        }

        Self { issues }
    }

    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues(&self) -> &[ConfigIssue] {
        &self.issues
    }

    /// Multi-line human-readable report
    pub fn report(&self) -> String {
        if self.is_ok() {
            return "configuration ok".to_string();
        }
        let mut out = String::from("configuration problems:\n");
        for issue in &self.issues {
            out.push_str(&format!("  - [{}] {}\n", issue.key, issue.message));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_settings_report_both_urls() {
        let diagnostics = Diagnostics::check(&Settings::default());
        assert!(!diagnostics.is_ok());
        let keys: Vec<_> = diagnostics.issues().iter().map(|i| i.key).collect();
        assert_eq!(keys, vec!["api_base_url", "socket_base_url"]);
        assert!(diagnostics.report().contains("HWATCH_API_URL"));
    }

    #[test]
    fn test_malformed_url_is_flagged() {
        let settings = Settings {
            api_base_url: Some("https://ok.example.com".into()),
            socket_base_url: Some("::not a url::".into()),
            ..Settings::default()
        };
        let diagnostics = Diagnostics::check(&settings);
        assert_eq!(diagnostics.issues().len(), 1);
        assert_eq!(diagnostics.issues()[0].key, "socket_base_url");
    }

    #[test]
    fn test_complete_settings_are_ok() {
        let settings = Settings {
            api_base_url: Some("https://api.example.com".into()),
            socket_base_url: Some("wss://rt.example.com".into()),
            ..Settings::default()
        };
        let diagnostics = Diagnostics::check(&settings);
        assert!(diagnostics.is_ok());
        assert_eq!(diagnostics.report(), "configuration ok");
    }
}
