//! Shared test utilities for domain testing
//!
//! - `MockMilvus`: in-process fake of the Milvus REST API (feature: "milvus")
//! - `TestDataBuilder`: deterministic test data generation (always available)
//! - `assertions`: custom assertion helpers (always available)
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { workspace = true, features = ["milvus"] }
//! ```
//!
//! ```rust,ignore
//! use test_utils::{MockMilvus, MockReply, TestDataBuilder};
//!
//! #[tokio::test]
//! async fn my_milvus_test() {
//!     let milvus = MockMilvus::start().await;
//!     let builder = TestDataBuilder::from_test_name("my_milvus_test");
//!
//!     let collection = builder.collection("items");
//!     let vector = builder.embedding(8);
//! }
//! ```

#[cfg(feature = "milvus")]
mod milvus;

#[cfg(feature = "milvus")]
pub use milvus::{MockMilvus, MockReply, RecordedRequest};

/// Builder for test data with deterministic randomization
///
/// The same seed always yields the same ids, names and vectors.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    /// Create a new builder with a seed (for deterministic tests)
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_find_similar");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Positive item id derived from the seed
    pub fn item_id(&self) -> i64 {
        (self.seed >> 1) as i64 % 1_000_000 + 1
    }

    /// Collection name unique to this builder
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::new(7);
    /// assert_eq!(builder.collection("items"), "test_items_7");
    /// ```
    pub fn collection(&self, prefix: &str) -> String {
        format!("test_{}_{}", prefix, self.seed)
    }

    /// Vector of `dim` values in [-1, 1), stable for a given seed
    pub fn embedding(&self, dim: usize) -> Vec<f64> {
        let mut state = self.seed | 1;
        (0..dim)
            .map(|_| {
                // xorshift64
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                (state >> 11) as f64 / (1u64 << 53) as f64 * 2.0 - 1.0
            })
            .collect()
    }
}

/// Test assertion helpers
pub mod assertions {
    /// Assert that an optional value is Some
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }

    /// Assert that `id` does not appear in `ids`
    pub fn assert_excludes(ids: &[i64], id: i64, context: &str) {
        assert!(
            !ids.contains(&id),
            "{}: id {} must not be in {:?}",
            context,
            id,
            ids
        );
    }
}
