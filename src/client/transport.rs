//! Transport adapter between the list view and the state service.
//!
//! [`HttpTransport`] talks to the REST API with `reqwest`;
//! [`LocalTransport`] calls a [`CollectionService`] in-process. Neither
//! retries: a failed call is reported to the caller as a [`TransportError`].

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::api::{
    AllIdsResponse, ErrorBody, InitialStateResponse, ItemsResponse, ResetStateResponse,
    SaveStateRequest, SaveStateResponse, SelectedItemsResponse, UpdateOrderRequest,
};
use crate::application::CollectionService;
use crate::domain::{ItemId, StoreError};

// =============================================================================
// Transport Error
// =============================================================================

/// Error type for transport operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The call did not complete before its deadline.
    #[error("Timeout after {0}ms")]
    Timeout(u64),

    /// The server could not be reached.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The server answered with an error status.
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl From<StoreError> for TransportError {
    fn from(error: StoreError) -> Self {
        Self::Status {
            status: 400,
            message: error.to_string(),
        }
    }
}

// =============================================================================
// Transport Trait
// =============================================================================

/// Calls the list view needs from the state service.
pub trait ListTransport: Send + Sync {
    /// `GET /items`.
    fn fetch_page(
        &self,
        page: u32,
        search: &str,
    ) -> impl Future<Output = Result<ItemsResponse, TransportError>> + Send;

    /// `GET /all-items-ids`.
    fn fetch_all_ids(&self) -> impl Future<Output = Result<Vec<ItemId>, TransportError>> + Send;

    /// `GET /selected-items`.
    fn fetch_selected_items(
        &self,
    ) -> impl Future<Output = Result<Vec<ItemId>, TransportError>> + Send;

    /// `GET /initial-state`.
    fn fetch_initial_state(
        &self,
    ) -> impl Future<Output = Result<InitialStateResponse, TransportError>> + Send;

    /// `POST /update-order`.
    fn update_order(
        &self,
        moved: ItemId,
        target: ItemId,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// `POST /save-state`.
    fn save_state(
        &self,
        request: SaveStateRequest,
    ) -> impl Future<Output = Result<SaveStateResponse, TransportError>> + Send;

    /// `POST /reset-state`.
    fn reset_state(&self) -> impl Future<Output = Result<ResetStateResponse, TransportError>> + Send;
}

// =============================================================================
// HTTP Transport
// =============================================================================

/// Client-side settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root, e.g. `http://localhost:5000/api`.
    pub base_url: String,
    /// Deadline for `save-state`.
    pub save_timeout: Duration,
    /// Deadline for `reset-state`.
    pub reset_timeout: Duration,
}

impl ClientConfig {
    /// Default deadline for `save-state`.
    pub const DEFAULT_SAVE_TIMEOUT: Duration = Duration::from_secs(10);
    /// Default deadline for `reset-state`.
    pub const DEFAULT_RESET_TIMEOUT: Duration = Duration::from_secs(5);

    /// Creates a configuration with the default deadlines.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            save_timeout: Self::DEFAULT_SAVE_TIMEOUT,
            reset_timeout: Self::DEFAULT_RESET_TIMEOUT,
        }
    }
}

/// Transport over the REST API.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpTransport {
    /// Creates a transport with a fresh `reqwest` client.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Creates a transport sharing an existing `reqwest` client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client, config: ClientConfig) -> Self {
        Self { client, config }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        timeout: Option<Duration>,
    ) -> Result<T, TransportError> {
        let request = match timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        };
        let response = request
            .send()
            .await
            .map_err(|error| map_reqwest_error(&error, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => status.canonical_reason().unwrap_or("unknown error").to_owned(),
            };
            return Err(TransportError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|error| map_reqwest_error(&error, timeout))
    }
}

fn map_reqwest_error(error: &reqwest::Error, timeout: Option<Duration>) -> TransportError {
    if error.is_timeout() {
        let millis = timeout.map_or(0, |timeout| u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        TransportError::Timeout(millis)
    } else if error.is_decode() {
        TransportError::Decode(error.to_string())
    } else {
        TransportError::Connection(error.to_string())
    }
}

fn cache_buster() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis())
}

impl ListTransport for HttpTransport {
    async fn fetch_page(&self, page: u32, search: &str) -> Result<ItemsResponse, TransportError> {
        let request = self.client.get(self.url("items")).query(&[
            ("page", page.to_string()),
            ("search", search.to_owned()),
            ("_", cache_buster().to_string()),
        ]);
        self.execute(request, None).await
    }

    async fn fetch_all_ids(&self) -> Result<Vec<ItemId>, TransportError> {
        let response: AllIdsResponse = self
            .execute(self.client.get(self.url("all-items-ids")), None)
            .await?;
        Ok(Arc::unwrap_or_clone(response.ids))
    }

    async fn fetch_selected_items(&self) -> Result<Vec<ItemId>, TransportError> {
        let response: SelectedItemsResponse = self
            .execute(self.client.get(self.url("selected-items")), None)
            .await?;
        Ok(response.selected_items)
    }

    async fn fetch_initial_state(&self) -> Result<InitialStateResponse, TransportError> {
        self.execute(self.client.get(self.url("initial-state")), None)
            .await
    }

    async fn update_order(&self, moved: ItemId, target: ItemId) -> Result<(), TransportError> {
        let body = UpdateOrderRequest {
            moved_item_id: moved,
            target_item_id: target,
        };
        let request = self
            .client
            .post(self.url("update-order"))
            .header("X-Requested-With", "XMLHttpRequest")
            .json(&body);
        let _: serde_json::Value = self.execute(request, None).await?;
        Ok(())
    }

    async fn save_state(
        &self,
        request: SaveStateRequest,
    ) -> Result<SaveStateResponse, TransportError> {
        let request = self.client.post(self.url("save-state")).json(&request);
        self.execute(request, Some(self.config.save_timeout)).await
    }

    async fn reset_state(&self) -> Result<ResetStateResponse, TransportError> {
        let request = self
            .client
            .post(self.url("reset-state"))
            .json(&serde_json::json!({}));
        self.execute(request, Some(self.config.reset_timeout)).await
    }
}

// =============================================================================
// Local Transport
// =============================================================================

/// In-process transport over a [`CollectionService`].
///
/// Can be switched offline to make every call fail with
/// [`TransportError::Connection`], which exercises the list view's error paths.
#[derive(Debug, Clone)]
pub struct LocalTransport {
    service: CollectionService,
    offline: Arc<AtomicBool>,
}

impl LocalTransport {
    /// Creates a transport bound to `service`.
    #[must_use]
    pub fn new(service: CollectionService) -> Self {
        Self {
            service,
            offline: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The service this transport calls.
    #[must_use]
    pub const fn service(&self) -> &CollectionService {
        &self.service
    }

    /// Makes subsequent calls fail (`true`) or succeed again (`false`).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<(), TransportError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(TransportError::Connection("transport offline".to_owned()));
        }
        Ok(())
    }
}

impl ListTransport for LocalTransport {
    async fn fetch_page(&self, page: u32, search: &str) -> Result<ItemsResponse, TransportError> {
        self.ensure_online()?;
        Ok(ItemsResponse::from(self.service.get_page(page, search).await))
    }

    async fn fetch_all_ids(&self) -> Result<Vec<ItemId>, TransportError> {
        self.ensure_online()?;
        Ok(Arc::unwrap_or_clone(self.service.all_ids().await))
    }

    async fn fetch_selected_items(&self) -> Result<Vec<ItemId>, TransportError> {
        self.ensure_online()?;
        Ok(self.service.selected_items().await)
    }

    async fn fetch_initial_state(&self) -> Result<InitialStateResponse, TransportError> {
        self.ensure_online()?;
        Ok(InitialStateResponse::from(self.service.initial_state().await))
    }

    async fn update_order(&self, moved: ItemId, target: ItemId) -> Result<(), TransportError> {
        self.ensure_online()?;
        self.service
            .update_order(moved, target)
            .await
            .map_err(TransportError::from)
    }

    async fn save_state(
        &self,
        request: SaveStateRequest,
    ) -> Result<SaveStateResponse, TransportError> {
        self.ensure_online()?;
        let outcome = self.service.save_state(request.into()).await?;
        Ok(SaveStateResponse::from(outcome))
    }

    async fn reset_state(&self) -> Result<ResetStateResponse, TransportError> {
        self.ensure_online()?;
        Ok(ResetStateResponse::new(self.service.reset().await))
    }
}
