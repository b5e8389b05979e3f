//! Milvus HTTP payloads and the envelope rules shared by every response.
//!
//! Bodies are decoded from raw bytes; the `Content-Type` the server sends is
//! not trustworthy and is never consulted.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{VectorError, VectorResult};
use crate::models::{Embedding, ItemId, SearchParams};

/// `PUT /collections/{collection}/vectors` body
#[derive(Debug, Serialize)]
pub(crate) struct SearchRequest<'a> {
    search: SearchBody<'a>,
}

#[derive(Debug, Serialize)]
struct SearchBody<'a> {
    topk: usize,
    vectors: [&'a [f64]; 1],
    params: &'a SearchParams,
}

impl<'a> SearchRequest<'a> {
    pub(crate) fn new(topk: usize, vector: &'a [f64], params: &'a SearchParams) -> Self {
        Self {
            search: SearchBody {
                topk,
                vectors: [vector],
                params,
            },
        }
    }
}

/// `GET /collections/{collection}/vectors?ids=..` answer
#[derive(Debug, Deserialize)]
pub(crate) struct VectorsResponse {
    vectors: Vec<VectorRecord>,
}

#[derive(Debug, Deserialize)]
struct VectorRecord {
    vector: Embedding,
}

impl VectorsResponse {
    /// Single-id lookups only read the first record.
    pub(crate) fn into_first_vector(self) -> VectorResult<Embedding> {
        self.vectors
            .into_iter()
            .next()
            .map(|record| record.vector)
            .ok_or_else(|| VectorError::MalformedResponse("empty 'vectors' list".to_string()))
    }
}

/// Search answer: one hit list per query vector
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    result: Vec<Vec<SearchHit>>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    id: RawId,
}

/// Milvus returns ids as strings or numbers depending on version.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Float(f64),
    Str(String),
}

impl RawId {
    fn to_item_id(&self) -> VectorResult<ItemId> {
        match self {
            RawId::Int(id) => Ok(*id),
            // Only integral values within i64 range, e.g. 7.0
            RawId::Float(id) if id.fract() == 0.0 && id.abs() < i64::MAX as f64 => Ok(*id as i64),
            RawId::Float(id) => Err(VectorError::MalformedResponse(format!(
                "non-integer id {} in search result",
                id
            ))),
            RawId::Str(raw) => raw.trim().parse().map_err(|_| {
                VectorError::MalformedResponse(format!("non-integer id '{}' in search result", raw))
            }),
        }
    }
}

impl SearchResponse {
    /// Ids of the first batch in store order, with `exclude` filtered out.
    pub(crate) fn into_neighbours(self, exclude: ItemId) -> VectorResult<Vec<ItemId>> {
        let hits = self
            .result
            .into_iter()
            .next()
            .ok_or_else(|| VectorError::MalformedResponse("empty 'result' list".to_string()))?;

        let mut neighbours = Vec::with_capacity(hits.len());
        for hit in &hits {
            let id = hit.id.to_item_id()?;
            if id != exclude {
                neighbours.push(id);
            }
        }
        Ok(neighbours)
    }
}

/// Decode a Milvus body.
///
/// - empty body, `null`, `{}`, `[]` and other falsy JSON → `Ok(None)`
/// - truthy `code` field → [`VectorError::Api`]
/// - anything else must deserialize as `T`
pub(crate) fn decode<T: DeserializeOwned>(body: &[u8]) -> VectorResult<Option<T>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let value: Value = serde_json::from_slice(body)?;
    if is_falsy(&value) {
        return Ok(None);
    }

    if let Some(code) = value.get("code").and_then(error_code) {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Milvus reported error code {}", code));
        return Err(VectorError::Api { code, message });
    }

    serde_json::from_value(value).map(Some).map_err(Into::into)
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

// Truthy codes signal failure. Non-numeric ones are reported as -1.
fn error_code(code: &Value) -> Option<i64> {
    if is_falsy(code) {
        return None;
    }
    match code {
        Value::Number(n) => Some(n.as_i64().unwrap_or_else(|| n.as_f64().unwrap_or(-1.0) as i64)),
        Value::Bool(_) => Some(1),
        Value::String(s) => Some(s.trim().parse::<i64>().unwrap_or(-1)),
        _ => Some(-1),
    }
}
