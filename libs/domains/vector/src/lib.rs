//! Vector Domain Library
//!
//! Client side of the Milvus REST API used for item-to-item similarity:
//! fetch the stored embedding of an item, then ask the index for its nearest
//! neighbours with the item itself left out.
//!
//! ```text
//! caller ── fetch_vector / find_similar ──▶ MilvusClient ──HTTP──▶ Milvus
//!                                            │
//!                                            └─ bounded pool (N slots)
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_vector::{MilvusClient, MilvusClientConfig, SimilarityQuery};
//!
//! # async fn example() -> Result<(), domain_vector::VectorError> {
//! let client = MilvusClient::new(MilvusClientConfig::new("http://localhost:19121"))?;
//!
//! let vector = client.fetch_vector("items", 42).await?;
//! let similar = client
//!     .find_similar(SimilarityQuery::new("items", 42).with_top_n(5))
//!     .await?;
//!
//! client.close().await;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod milvus;
pub mod models;

pub use core_config::milvus::SocketFamily;
pub use error::{VectorError, VectorResult};
pub use milvus::{MilvusClient, MilvusClientConfig};
pub use models::{Embedding, ItemId, SearchParams, SimilarityQuery};
