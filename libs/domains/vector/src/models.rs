use std::time::Duration;

use serde_json::{Map, Value};

/// Key of one vector inside a collection
pub type ItemId = i64;

/// Embedding as stored in Milvus. Dimensionality is whatever the collection holds.
pub type Embedding = Vec<f64>;

/// Index-specific search knobs (e.g. `nprobe`), forwarded verbatim.
pub type SearchParams = Map<String, Value>;

/// Nearest-neighbour lookup for one item.
///
/// ```
/// use domain_vector::SimilarityQuery;
///
/// let query = SimilarityQuery::new("items", 42).with_top_n(3);
/// assert_eq!(query.top_n, 3);
/// assert!(query.vector.is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityQuery {
    pub collection: String,
    /// The query item; never part of the answer.
    pub item_id: ItemId,
    pub search_params: Option<SearchParams>,
    /// Query vector. When absent it is fetched for `item_id` first.
    pub vector: Option<Embedding>,
    pub top_n: usize,
    /// Per-call timeout. Falls back to the client's setting, which defaults to none.
    pub timeout: Option<Duration>,
}

impl SimilarityQuery {
    pub const DEFAULT_TOP_N: usize = 10;

    pub fn new(collection: impl Into<String>, item_id: ItemId) -> Self {
        Self {
            collection: collection.into(),
            item_id,
            search_params: None,
            vector: None,
            top_n: Self::DEFAULT_TOP_N,
            timeout: None,
        }
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_vector(mut self, vector: Embedding) -> Self {
        self.vector = Some(vector);
        self
    }

    pub fn with_search_params(mut self, params: SearchParams) -> Self {
        self.search_params = Some(params);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Number of neighbours asked from the store: one extra to absorb the self-match.
    pub fn topk(&self) -> usize {
        self.top_n.saturating_add(1)
    }
}
