//! Controller configuration
//!
//! Read from environment variables at start-up.

use crate::error::ControllerError;
use std::net::SocketAddr;
use std::time::Duration;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Runtime configuration of the provider
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Restrict watches to one namespace; `None` watches all namespaces
    pub watch_namespace: Option<String>,
    /// Requeue interval after a successful reconcile
    pub poll_interval: Duration,
    /// Concurrent reconciles per kind
    pub max_concurrent_reconciles: u16,
    /// Address of the metrics and probe server
    pub metrics_addr: SocketAddr,
    /// Token used by `InjectedIdentity` provider configs
    pub injected_token: Option<String>,
    /// Per-request GitLab timeout
    pub http_timeout: Duration,
    /// Transport retries on 5xx/429
    pub max_retries: u32,
    pub log_format: LogFormat,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            watch_namespace: None,
            poll_interval: Duration::from_secs(60),
            max_concurrent_reconciles: 3,
            metrics_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            injected_token: None,
            http_timeout: Duration::from_secs(30),
            max_retries: 3,
            log_format: LogFormat::Text,
        }
    }
}

impl ControllerConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ControllerError> {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let poll_interval = match get("POLL_INTERVAL_SECONDS") {
            Some(v) => Duration::from_secs(parse(&v, "POLL_INTERVAL_SECONDS")?),
            None => defaults.poll_interval,
        };
        let max_concurrent_reconciles = match get("MAX_CONCURRENT_RECONCILES") {
            Some(v) => parse(&v, "MAX_CONCURRENT_RECONCILES")?,
            None => defaults.max_concurrent_reconciles,
        };
        let metrics_addr = match get("METRICS_ADDR") {
            Some(v) => parse(&v, "METRICS_ADDR")?,
            None => defaults.metrics_addr,
        };
        let http_timeout = match get("GITLAB_HTTP_TIMEOUT_SECONDS") {
            Some(v) => Duration::from_secs(parse(&v, "GITLAB_HTTP_TIMEOUT_SECONDS")?),
            None => defaults.http_timeout,
        };
        let max_retries = match get("GITLAB_MAX_RETRIES") {
            Some(v) => parse(&v, "GITLAB_MAX_RETRIES")?,
            None => defaults.max_retries,
        };
        let log_format = match get("LOG_FORMAT").as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ControllerError::InvalidConfig(format!(
                    "LOG_FORMAT must be text or json, got {}",
                    other
                )))
            }
        };

        if poll_interval.is_zero() {
            return Err(ControllerError::InvalidConfig(
                "POLL_INTERVAL_SECONDS must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            watch_namespace: get("WATCH_NAMESPACE"),
            poll_interval,
            max_concurrent_reconciles,
            metrics_addr,
            injected_token: get("GITLAB_TOKEN"),
            http_timeout,
            max_retries,
            log_format,
        })
    }
}

fn parse<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, ControllerError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ControllerError::InvalidConfig(format!("{}={:?}: {}", key, value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ControllerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.watch_namespace, None);
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert_eq!(config.max_concurrent_reconciles, 3);
        assert_eq!(config.metrics_addr.port(), 8080);
        assert_eq!(config.injected_token, None);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_overrides() {
        let config = ControllerConfig::from_lookup(lookup(&[
            ("WATCH_NAMESPACE", "gitlab"),
            ("POLL_INTERVAL_SECONDS", "300"),
            ("METRICS_ADDR", "127.0.0.1:9090"),
            ("GITLAB_TOKEN", "glpat-abc"),
            ("LOG_FORMAT", "json"),
        ]))
        .unwrap();
        assert_eq!(config.watch_namespace.as_deref(), Some("gitlab"));
        assert_eq!(config.poll_interval, Duration::from_secs(300));
        assert_eq!(config.metrics_addr.to_string(), "127.0.0.1:9090");
        assert_eq!(config.injected_token.as_deref(), Some("glpat-abc"));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = ControllerConfig::from_lookup(lookup(&[("GITLAB_MAX_RETRIES", "many")])).unwrap_err();
        assert!(matches!(err, ControllerError::InvalidConfig(_)));

        let err = ControllerConfig::from_lookup(lookup(&[("POLL_INTERVAL_SECONDS", "0")])).unwrap_err();
        assert!(err.to_string().contains("POLL_INTERVAL_SECONDS"));

        assert!(ControllerConfig::from_lookup(lookup(&[("LOG_FORMAT", "xml")])).is_err());
    }

    #[test]
    fn test_blank_namespace_means_all() {
        let config = ControllerConfig::from_lookup(lookup(&[("WATCH_NAMESPACE", " ")])).unwrap();
        assert_eq!(config.watch_namespace, None);
    }
}
