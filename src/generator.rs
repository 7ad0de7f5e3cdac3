//! Sequential, fail-fast batch generation.

use crate::credential::{Credential, CredentialResolver};
use crate::error::{Result, Text2ImageError};
use crate::image::providers::HuggingFaceFactory;
use crate::image::{GenerationRequest, GenerationResult, Handle, HandleCache, HandleFactory};
use async_stream::try_stream;
use futures::{Stream, TryStreamExt};
use std::pin::Pin;

/// Lazy stream of results. Each poll performs at most one remote call.
pub type GenerationStream = Pin<Box<dyn Stream<Item = Result<GenerationResult>> + Send>>;

/// Turns a request into a batch of images against a cached client handle.
pub struct Generator<F = HuggingFaceFactory> {
    resolver: CredentialResolver,
    credential: Option<Credential>,
    handles: HandleCache<F>,
}

impl Generator<HuggingFaceFactory> {
    /// Uses the standard credential sources and the Hugging Face API.
    pub fn new() -> Self {
        Self::with_factory(CredentialResolver::default(), HuggingFaceFactory::default())
    }
}

impl Default for Generator<HuggingFaceFactory> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: HandleFactory> Generator<F> {
    /// Creates a generator with explicit credential sources and handle factory.
    pub fn with_factory(resolver: CredentialResolver, factory: F) -> Self {
        Self {
            resolver,
            credential: None,
            handles: HandleCache::new(factory),
        }
    }

    /// Resolves the credential on first use and keeps it for the process.
    ///
    /// An absent credential is not remembered, so a token provided later is
    /// picked up by the next attempt.
    pub fn credential(&mut self) -> Option<&Credential> {
        if self.credential.is_none() {
            self.credential = self.resolver.resolve();
        }
        self.credential.as_ref()
    }

    /// Returns the cached client handle for `model`.
    pub fn handle(&mut self, model: &str) -> Result<Handle> {
        self.credential();
        self.handles.get_handle(model, self.credential.as_ref())
    }

    /// Returns the handle cache.
    pub fn handles(&self) -> &HandleCache<F> {
        &self.handles
    }

    /// Starts a batch of `count` images generated with identical parameters.
    ///
    /// Validation, credential resolution and handle lookup happen here, before
    /// any remote call. The returned stream issues calls one at a time, in
    /// order; on the first failure it yields that error and ends.
    pub fn generate(&mut self, request: &GenerationRequest, count: u32) -> Result<GenerationStream> {
        request.validate()?;
        if count == 0 {
            return Err(Text2ImageError::InvalidRequest(
                "image count must be at least 1".into(),
            ));
        }

        let handle = self.handle(&request.model)?;
        Ok(Box::pin(batch(handle, request.clone(), count)))
    }

    /// Runs a whole batch, stopping at the first failure.
    pub async fn generate_all(
        &mut self,
        request: &GenerationRequest,
        count: u32,
    ) -> Result<Vec<GenerationResult>> {
        self.generate(request, count)?.try_collect().await
    }
}

fn batch(
    handle: Handle,
    request: GenerationRequest,
    count: u32,
) -> impl Stream<Item = Result<GenerationResult>> + Send {
    try_stream! {
        for index in 1..=count {
            tracing::info!(index, count, model = %request.model, "generating image");
            let result = handle
                .text_to_image(&request)
                .await
                .map_err(|e| {
                    tracing::warn!(index, count, "generation failed, abandoning batch: {e}");
                    match e {
                        Text2ImageError::RemoteCall(_) => e,
                        other => Text2ImageError::remote(other),
                    }
                })?;
            yield result;
        }
    }
}
