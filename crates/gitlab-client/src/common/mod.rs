//! Common utilities for the GitLab API client
//!
//! Provides the authenticated, retrying HTTP wrapper used by every API module.

pub mod retry;

use crate::error::GitLabError;
use reqwest::{Client, Method, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

pub use retry::RetryPolicy;

/// Page size used when walking paginated collections
const PER_PAGE: &str = "100";

/// HTTP client wrapper with bearer authentication and retry
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    retry: RetryPolicy,
}

impl HttpClient {
    /// Create a new HTTP client wrapper
    ///
    /// `base_url` may be the instance root (`https://gitlab.com`) or the API
    /// root (`https://gitlab.com/api/v4`).
    pub fn new(client: Client, base_url: String, token: Option<String>, retry: RetryPolicy) -> Self {
        Self {
            client,
            base_url: api_root(&base_url),
            token,
            retry,
        }
    }

    /// Get the API root URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full URL from an API path
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    /// Send a request, retrying transient failures per the retry policy.
    ///
    /// Returns the final response whatever its status; callers decide what a
    /// non-success status means.
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<Response, GitLabError> {
        let url = self.build_url(path);
        let mut attempt = 0;

        loop {
            let mut request = self
                .client
                .request(method.clone(), &url)
                .header("Accept", "application/json");
            if let Some(token) = &self.token {
                request = request.bearer_auth(token);
            }
            if !query.is_empty() {
                request = request.query(query);
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if RetryPolicy::is_retryable_status(status) && attempt < self.retry.max_retries {
                        let delay = self.retry.delay_for(attempt, retry_after(&response));
                        warn!(
                            "{} {} returned {}, retrying in {:?} (attempt {}/{})",
                            method, path, status, delay, attempt + 1, self.retry.max_retries
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }
                    return Ok(response);
                }
                Err(e)
                    if (e.is_connect() || (e.is_timeout() && RetryPolicy::retries_timeout(&method)))
                        && attempt < self.retry.max_retries =>
                {
                    let delay = self.retry.delay_for(attempt, None);
                    warn!(
                        "{} {} failed: {}, retrying in {:?} (attempt {}/{})",
                        method, path, e, delay, attempt + 1, self.retry.max_retries
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(GitLabError::Http(e)),
            }
        }
    }

    /// Turn a non-success response into a typed error
    async fn check(response: Response, path: &str) -> Result<Response, GitLabError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(GitLabError::from_status(status.as_u16(), path, &body))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GitLabError> {
        let text = response.text().await?;
        // Some endpoints answer 204/empty for "nothing configured"
        let text = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(text).map_err(GitLabError::Serialization)
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, GitLabError> {
        self.get_with_query(path, &[]).await
    }

    /// Make a GET request with query parameters
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, GitLabError> {
        debug!("GET {}", path);
        let response = self.send(Method::GET, path, query, None).await?;
        let response = Self::check(response, path).await?;
        Self::decode(response).await
    }

    /// Fetch every page of a collection, following `x-next-page`
    pub async fn get_all_pages<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, GitLabError> {
        let mut results = Vec::new();
        let mut page = "1".to_string();

        loop {
            debug!("GET {} (page {})", path, page);
            let mut params: Vec<(&str, String)> = query.to_vec();
            params.push(("per_page", PER_PAGE.to_string()));
            params.push(("page", page.clone()));

            let response = self.send(Method::GET, path, &params, None).await?;
            let response = Self::check(response, path).await?;
            let next = response
                .headers()
                .get("x-next-page")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
                .filter(|v| !v.is_empty());
            let items: Vec<T> = Self::decode(response).await?;
            results.extend(items);

            match next {
                Some(next_page) => page = next_page,
                None => break,
            }
        }

        Ok(results)
    }

    /// Make a POST request
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, GitLabError> {
        let body = serde_json::to_value(body)?;
        debug!("POST {}", path);
        let response = self.send(Method::POST, path, &[], Some(&body)).await?;
        let response = Self::check(response, path).await?;
        Self::decode(response).await
    }

    /// Make a PUT request
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, GitLabError> {
        let body = serde_json::to_value(body)?;
        debug!("PUT {}", path);
        let response = self.send(Method::PUT, path, &[], Some(&body)).await?;
        let response = Self::check(response, path).await?;
        Self::decode(response).await
    }

    /// Make a DELETE request, returning the success status code
    pub async fn delete(&self, path: &str, query: &[(&str, String)]) -> Result<u16, GitLabError> {
        debug!("DELETE {}", path);
        let response = self.send(Method::DELETE, path, query, None).await?;
        let response = Self::check(response, path).await?;
        Ok(response.status().as_u16())
    }
}

/// Normalise an instance URL to its `/api/v4` root
fn api_root(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.ends_with("/api/v4") {
        trimmed.to_string()
    } else {
        format!("{}/api/v4", trimmed)
    }
}

/// Parse `Retry-After` expressed in seconds
fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_root() {
        assert_eq!(api_root("https://gitlab.com"), "https://gitlab.com/api/v4");
        assert_eq!(api_root("https://gitlab.example.com/"), "https://gitlab.example.com/api/v4");
        assert_eq!(api_root("https://gitlab.example.com/api/v4/"), "https://gitlab.example.com/api/v4");
    }

    #[test]
    fn test_build_url() {
        let http = HttpClient::new(Client::new(), "https://gitlab.com".to_string(), None, RetryPolicy::none());
        assert_eq!(http.build_url("/projects/1"), "https://gitlab.com/api/v4/projects/1");
        assert_eq!(http.build_url("https://other/x"), "https://other/x");
    }
}
