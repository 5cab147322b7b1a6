//! Dataset generation — one `generate` capability with two interchangeable
//! backends: the local interpreter + synthesizer, and a remote
//! chat-completion provider. Which one serves a request is decided by
//! configuration, not by call sites.

pub mod local;
pub mod remote;
pub mod values;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::config::{GenerationConfig, ProviderConfig, ProviderKind};

/// One synthesized row: an `id` plus one value per field, in field order.
/// `serde_json` is built with `preserve_order`, so the map keeps insertion
/// order through serialization and storage.
pub type Record = Map<String, Value>;

// ─── Request ──────────────────────────────────────────────────────────────────

/// Input to a generation backend. Validated by the HTTP layer before it gets
/// here; the backends re-check only what they own (count bounds, empty
/// prompt on the remote path).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Free-text description of the desired data.
    pub prompt: String,
    /// Number of records to produce.
    pub count: i64,
    /// Explicit column names, overriding prompt inference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    /// Optional context interpolated into description values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

// ─── Errors ───────────────────────────────────────────────────────────────────

/// Generation failure taxonomy. The local path can only fail the count
/// check; everything else is the remote provider's.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// Requested record count is negative or above the configured cap.
    #[error("record count {count} outside permitted range 0..={max}")]
    CountOutOfRange { count: i64, max: i64 },

    /// The remote path requires a non-empty prompt.
    #[error("prompt must not be empty")]
    EmptyPrompt,

    /// Network error or unparseable response from the remote provider.
    /// The batch fails as a whole; there is no partial recovery.
    #[error("generation provider failed: {0}")]
    Upstream(String),
}

impl GenerateError {
    /// True for caller mistakes (HTTP 400), false for provider faults.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            GenerateError::CountOutOfRange { .. } | GenerateError::EmptyPrompt
        )
    }
}

// ─── Backend seam ─────────────────────────────────────────────────────────────

/// A generation backend. Both implementations take the same request shape
/// and produce the same batch shape, so callers never know which one ran.
#[async_trait]
pub trait Generate: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<Vec<Record>, GenerateError>;
}

/// Build the backend selected by `[provider]` in the config file.
pub fn backend_from_config(
    provider: &ProviderConfig,
    generation: &GenerationConfig,
) -> Arc<dyn Generate> {
    match provider.kind {
        ProviderKind::Local => Arc::new(local::LocalGenerator::new(generation.clone())),
        ProviderKind::Remote => Arc::new(remote::RemoteGenerator::new(
            provider.clone(),
            generation.clone(),
        )),
    }
}

/// Ordered column list of a batch: the key set of the first record.
/// Empty batches have no columns.
pub fn field_names(records: &[Record]) -> Vec<String> {
    records
        .first()
        .map(|r| r.keys().cloned().collect())
        .unwrap_or_default()
}

// ─── Tests ────────────────────────────────────────────────────────────────────
