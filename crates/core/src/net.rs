//! The network seam.

use async_trait::async_trait;

use crate::Error;
use crate::http::{FetchRequest, ResponseSnapshot};

/// Live fetch against the network.
///
/// Any HTTP status counts as a completed fetch. Implementations return
/// [`Error::Network`] only when no response was obtained at all.
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<ResponseSnapshot, Error>;
}
