//! Retrying HTTP client: resends a request when the downstream response's
//! status is in a configured trigger set, up to `max_retries` additional
//! attempts. Transport errors are returned immediately. No back-off is
//! added here — pacing is the token bucket's job (see [`crate::TokenBucket`]).

use std::collections::HashSet;

use reqwest::{Client, Method, Response, StatusCode, Url};

#[derive(Debug, thiserror::Error)]
pub enum RetryError {
    #[error("transport error")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub trigger_statuses: HashSet<u16>,
    pub max_retries: u32,
}

impl RetryPolicy {
    pub fn new(trigger_statuses: impl IntoIterator<Item = u16>, max_retries: u32) -> Self {
        Self {
            trigger_statuses: trigger_statuses.into_iter().collect(),
            max_retries,
        }
    }

    fn should_retry(&self, status: StatusCode) -> bool {
        self.trigger_statuses.contains(&status.as_u16())
    }
}

/// A `reqwest::Client` wrapped with [`RetryPolicy`].
#[derive(Clone)]
pub struct RetryingClient {
    inner: Client,
    policy: RetryPolicy,
}

impl RetryingClient {
    pub fn new(inner: Client, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// Sends a bodyless GET-style request, retrying on trigger statuses.
    /// Each retry re-issues the request from scratch (there is no body to
    /// replay for GET, so "re-clone the request" collapses to "build it
    /// again").
    pub async fn execute(&self, method: Method, url: Url) -> Result<Response, RetryError> {
        self.execute_with_headers(method, url, &[]).await
    }

    /// Like [`Self::execute`], adding `(name, value)` headers to every
    /// attempt.
    pub async fn execute_with_headers(
        &self,
        method: Method,
        url: Url,
        headers: &[(&str, &str)],
    ) -> Result<Response, RetryError> {
        let mut attempt = 0;
        loop {
            let mut request = self.inner.request(method.clone(), url.clone());
            for (name, value) in headers {
                request = request.header(*name, *value);
            }
            let response = request.send().await?;

            if self.policy.should_retry(response.status()) && attempt < self.policy.max_retries {
                attempt += 1;
                tracing::debug!(%url, status = %response.status(), attempt, "retrying request");
                // Drain and drop the body before retrying, matching the
                // source's "drain and close the body" step.
                let _ = response.bytes().await;
                continue;
            }

            return Ok(response);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_matches_configured_statuses_only() {
        let policy = RetryPolicy::new([420, 429], 3);
        assert!(policy.should_retry(StatusCode::from_u16(429).unwrap()));
        assert!(!policy.should_retry(StatusCode::from_u16(500).unwrap()));
    }

    #[tokio::test]
    async fn retries_up_to_max_then_returns_last_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/flaky")
            .with_status(429)
            .expect(3) // initial attempt + 2 retries allowed
            .create_async()
            .await;

        let client = RetryingClient::new(Client::new(), RetryPolicy::new([429], 2));
        let url = Url::parse(&format!("{}/flaky", server.url())).unwrap();
        let response = client.execute(Method::GET, url).await.unwrap();

        assert_eq!(response.status().as_u16(), 429);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn does_not_retry_untriggered_statuses() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/ok")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let client = RetryingClient::new(Client::new(), RetryPolicy::new([429], 5));
        let url = Url::parse(&format!("{}/ok", server.url())).unwrap();
        let response = client.execute(Method::GET, url).await.unwrap();

        assert_eq!(response.status().as_u16(), 200);
        mock.assert_async().await;
    }
}
