use crate::{ClientError, ClientResult, LedgerStore};
use async_trait::async_trait;
use booklist_ledger::{LedgerDocument, SaveResponse};
use reqwest::Client;
use std::time::Duration;

const DATA_PATH: &str = "/api/data";
const ROW_PATH: &str = "/api/data/row";
const IMPORT_PATH: &str = "/api/data/import";

/// [`LedgerStore`] backed by the HTTP endpoint.
#[derive(Debug, Clone)]
pub struct RemoteStore {
    client: Client,
    base_url: String,
}

impl RemoteStore {
    /// Constructs a store for the endpoint rooted at `base_url`
    /// (for example `http://localhost:3000`), with a 30-second timeout.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Http` if building the underlying HTTP client fails.
    pub fn new(base_url: &str) -> ClientResult<Self> {
        Self::with_timeout(base_url, 30)
    }

    /// Constructs a store with a custom per-request timeout in seconds.
    pub fn with_timeout(base_url: &str, timeout_secs: u64) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            // Disable system proxy lookup to avoid macOS system-configuration issues
            .no_proxy()
            .build()
            .map_err(|e| ClientError::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post(&self, path: &str, document: &LedgerDocument) -> ClientResult<String> {
        let url = self.url(path);
        tracing::debug!(%url, books = document.book_count(), "posting ledger document");

        let response = self
            .client
            .post(&url)
            .json(document)
            .send()
            .await
            .map_err(|e| ClientError::Http(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::Http(e.to_string()))?;

        let reply: SaveResponse = match serde_json::from_slice(&body) {
            Ok(reply) => reply,
            Err(_) if !status.is_success() => {
                return Err(ClientError::Http(format!(
                    "HTTP {} - {}",
                    status,
                    status.canonical_reason().unwrap_or("Unknown")
                )));
            }
            Err(e) => {
                return Err(ClientError::Http(format!("Failed to parse JSON: {e}")));
            }
        };

        if reply.success && status.is_success() {
            Ok(reply.message.unwrap_or_default())
        } else {
            Err(ClientError::Rejected(
                reply
                    .error
                    .or(reply.message)
                    .unwrap_or_else(|| format!("HTTP {status}")),
            ))
        }
    }
}

#[async_trait]
impl LedgerStore for RemoteStore {
    async fn load(&self) -> ClientResult<LedgerDocument> {
        let response = self
            .client
            .get(self.url(DATA_PATH))
            .send()
            .await
            .map_err(|e| ClientError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ClientError::Http(format!(
                "HTTP {} - {}",
                response.status(),
                response.status().canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Http(format!("Failed to parse JSON: {e}")))
    }

    async fn save_row(&self, document: &LedgerDocument) -> ClientResult<String> {
        self.post(ROW_PATH, document).await
    }

    async fn save_all(&self, document: &LedgerDocument) -> ClientResult<String> {
        self.post(DATA_PATH, document).await
    }

    async fn import(&self, document: &LedgerDocument) -> ClientResult<String> {
        self.post(IMPORT_PATH, document).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_store_new() {
        let store = RemoteStore::new("http://localhost:3000");
        assert!(store.is_ok());
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let store = RemoteStore::with_timeout("http://localhost:3000/", 5).unwrap();
        assert_eq!(store.base_url(), "http://localhost:3000");
        assert_eq!(store.url(ROW_PATH), "http://localhost:3000/api/data/row");
    }
}
