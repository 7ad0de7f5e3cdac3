//! Client handle trait for remote text-to-image inference.

use crate::credential::Credential;
use crate::error::Result;
use crate::image::types::{GenerationRequest, GenerationResult};
use async_trait::async_trait;
use std::sync::Arc;

/// A client bound to one model and credential that performs remote calls.
#[async_trait]
pub trait TextToImageClient: Send + Sync {
    /// Runs one remote inference call and returns the decoded image.
    ///
    /// Every failure, whatever the provider reports, surfaces as
    /// [`Text2ImageError::RemoteCall`](crate::Text2ImageError::RemoteCall).
    async fn text_to_image(&self, request: &GenerationRequest) -> Result<GenerationResult>;

    /// Returns the model identifier this client is bound to.
    fn model(&self) -> &str;
}

/// Shared handle to a cached client.
pub type Handle = Arc<dyn TextToImageClient>;

/// Creates client handles for a model.
pub trait HandleFactory: Send + Sync {
    /// Sets up a new client for `model` authenticated with `credential`.
    fn create(&self, model: &str, credential: &Credential) -> Result<Handle>;
}
