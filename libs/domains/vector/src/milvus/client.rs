use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use core_config::milvus::SocketFamily;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tokio::sync::{RwLock, Semaphore};
use tracing::{debug, info, instrument, warn};

use super::MilvusClientConfig;
use super::wire::{self, SearchRequest, SearchResponse, VectorsResponse};
use crate::error::{VectorError, VectorResult};
use crate::models::{Embedding, ItemId, SimilarityQuery};

/// Pooled HTTP client for the Milvus REST API.
///
/// One instance owns one connection pool. Share it behind an `Arc`; every
/// method takes `&self`. Concurrent requests are capped at
/// `connection_pool_size`, extra callers wait for a free slot.
///
/// The client is either open or closed. [`close`](Self::close) releases the
/// pool once; afterwards every operation fails with
/// [`VectorError::ClientClosed`] and a new client must be built.
pub struct MilvusClient {
    base_url: Url,
    http: RwLock<Option<Client>>,
    slots: Semaphore,
    pool_size: usize,
    request_timeout: Option<Duration>,
}

impl MilvusClient {
    pub fn new(config: MilvusClientConfig) -> VectorResult<Self> {
        if config.connection_pool_size == 0 {
            return Err(VectorError::Config(
                "connection pool size must be at least 1".to_string(),
            ));
        }

        let base_url = Url::parse(&config.base_url).map_err(|e| {
            VectorError::Config(format!("invalid base url '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(VectorError::Config(format!(
                "base url '{}' cannot carry a path",
                config.base_url
            )));
        }

        // Binding the unspecified address of one family pins outbound sockets to it
        let local_address = match config.socket_family {
            SocketFamily::Ipv4 => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            SocketFamily::Ipv6 => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        };

        let http = Client::builder()
            .pool_max_idle_per_host(config.connection_pool_size)
            .local_address(local_address)
            .build()
            .map_err(|e| VectorError::Config(format!("Failed to build HTTP client: {}", e)))?;

        info!(
            base_url = %base_url,
            pool_size = config.connection_pool_size,
            socket_family = ?config.socket_family,
            timeout = ?config.request_timeout,
            "Milvus client created"
        );

        Ok(Self {
            base_url,
            http: RwLock::new(Some(http)),
            slots: Semaphore::new(config.connection_pool_size),
            pool_size: config.connection_pool_size,
            request_timeout: config.request_timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Request slots not currently held by an in-flight call.
    pub fn available_slots(&self) -> usize {
        self.slots.available_permits()
    }

    pub fn is_closed(&self) -> bool {
        self.slots.is_closed()
    }

    /// Release the connection pool.
    ///
    /// Callers queued for a slot fail with `ClientClosed`; requests already
    /// holding a slot finish on their own handle. Calling `close` again is a no-op.
    pub async fn close(&self) {
        let mut http = self.http.write().await;
        if http.take().is_none() {
            debug!("Milvus client already closed");
            return;
        }
        self.slots.close();
        info!(base_url = %self.base_url, "Milvus client closed");
    }

    /// Fetch the stored vector of `item_id`.
    ///
    /// `Ok(None)` when Milvus answers with an empty body.
    #[instrument(skip(self), fields(collection = %collection, item_id = item_id))]
    pub async fn fetch_vector(
        &self,
        collection: &str,
        item_id: ItemId,
    ) -> VectorResult<Option<Embedding>> {
        self.fetch_vector_inner(collection, item_id, None).await
    }

    /// [`fetch_vector`](Self::fetch_vector) with a timeout for this call only.
    #[instrument(skip(self), fields(collection = %collection, item_id = item_id))]
    pub async fn fetch_vector_with_timeout(
        &self,
        collection: &str,
        item_id: ItemId,
        timeout: Duration,
    ) -> VectorResult<Option<Embedding>> {
        self.fetch_vector_inner(collection, item_id, Some(timeout))
            .await
    }

    async fn fetch_vector_inner(
        &self,
        collection: &str,
        item_id: ItemId,
        timeout: Option<Duration>,
    ) -> VectorResult<Option<Embedding>> {
        let mut url = self.vectors_url(collection)?;
        url.query_pairs_mut()
            .append_pair("ids", &item_id.to_string());

        let response: Option<VectorsResponse> =
            self.execute(|http| http.get(url), timeout).await?;

        match response {
            Some(response) => response.into_first_vector().map(Some),
            None => {
                debug!("Milvus returned no vector");
                Ok(None)
            }
        }
    }

    /// Ids of the items nearest to `query.item_id`, the item itself excluded.
    ///
    /// Milvus is asked for `top_n + 1` neighbours so the self-match can be
    /// dropped. When the self-match is not among them the answer holds
    /// `top_n + 1` ids; it is not truncated. `Ok(None)` when Milvus returns an
    /// empty body for either the vector lookup or the search.
    #[instrument(
        skip(self, query),
        fields(collection = %query.collection, item_id = query.item_id, top_n = query.top_n)
    )]
    pub async fn find_similar(&self, query: SimilarityQuery) -> VectorResult<Option<Vec<ItemId>>> {
        let topk = query.topk();
        let SimilarityQuery {
            collection,
            item_id,
            search_params,
            vector,
            top_n,
            timeout,
        } = query;

        let vector = match vector.filter(|v| !v.is_empty()) {
            Some(vector) => vector,
            None => match self.fetch_vector_inner(&collection, item_id, timeout).await? {
                Some(vector) => vector,
                None => return Ok(None),
            },
        };

        let params = search_params.unwrap_or_default();
        let body = SearchRequest::new(topk, &vector, &params);
        let url = self.vectors_url(&collection)?;

        let response: Option<SearchResponse> = self
            .execute(|http| http.put(url).json(&body), timeout)
            .await?;

        let Some(response) = response else {
            debug!("Milvus returned an empty search result");
            return Ok(None);
        };

        let neighbours = response.into_neighbours(item_id)?;
        if neighbours.len() > top_n {
            debug!(
                returned = neighbours.len(),
                "Self-match absent from search result, returning top_n + 1 neighbours"
            );
        }

        Ok(Some(neighbours))
    }

    /// `{base}/collections/{collection}/vectors`
    fn vectors_url(&self, collection: &str) -> VectorResult<Url> {
        if collection.trim().is_empty() {
            return Err(VectorError::Validation(
                "collection name must not be empty".to_string(),
            ));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| VectorError::Config("base url cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(["collections", collection, "vectors"]);
        Ok(url)
    }

    /// Send one request while holding a pool slot and decode its body.
    ///
    /// The slot is released when this future completes or is dropped.
    async fn execute<T, F>(&self, build: F, timeout: Option<Duration>) -> VectorResult<Option<T>>
    where
        T: DeserializeOwned,
        F: FnOnce(&Client) -> RequestBuilder,
    {
        let _slot = self
            .slots
            .acquire()
            .await
            .map_err(|_| VectorError::ClientClosed)?;

        let http = self
            .http
            .read()
            .await
            .clone()
            .ok_or(VectorError::ClientClosed)?;

        let mut request = build(&http);
        if let Some(timeout) = timeout.or(self.request_timeout) {
            request = request.timeout(timeout);
        }

        let response = request.send().await.inspect_err(|e| {
            if e.is_timeout() {
                warn!("Milvus request timed out");
            }
        })?;

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            debug!(%status, "Milvus answered with a non-success status");
        }

        wire::decode(&body)
    }
}
