//! Provider-adapter abstraction.
//!
//! The crate speaks more than one wire contract for the same job: turn a
//! [`GenerationRequest`] into one completed [`GeneratedAsset`] or a
//! definitive failure. Each contract lives behind this trait and the facade
//! client picks the implementation named by its options.

use crate::error::BananaGenError;
use crate::types::{GeneratedAsset, GenerationRequest};
use async_trait::async_trait;

/// A backend capable of completing one generation submission.
///
/// Implementations are stateless between calls and safe to share across
/// tasks. Submissions are independent; running two concurrently shares no
/// mutable state. Dropping the returned future abandons the submission: no
/// further requests are issued and nothing is recorded. A request already in
/// flight at that moment resolves on its own and its result is discarded.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedAsset, BananaGenError>;

    /// Adapter name for diagnostics, e.g. `"rest-polling"`.
    fn name(&self) -> &'static str;

    /// Model identifier this adapter submits work against.
    fn model(&self) -> &str;
}
