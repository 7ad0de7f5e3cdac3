//! Test doubles shared by the unit tests.

use crate::credential::{Credential, CredentialResolver};
use crate::error::{Result, Text2ImageError};
use crate::image::{
    GenerationMetadata, GenerationRequest, GenerationResult, Handle, HandleFactory,
    TextToImageClient,
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

pub(crate) fn no_credential() -> CredentialResolver {
    CredentialResolver::empty()
}

pub(crate) fn with_token() -> CredentialResolver {
    CredentialResolver::empty().with_source_fn("test", || Some("hf_test".to_string()))
}

/// Records every remote call; optionally fails the n-th one (1-based).
#[derive(Default)]
pub(crate) struct RecordingFactory {
    calls: Arc<Mutex<Vec<GenerationRequest>>>,
    created: Arc<Mutex<usize>>,
    fail_on: Option<(usize, String)>,
}

impl RecordingFactory {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_on(mut self, call: usize, message: &str) -> Self {
        self.fail_on = Some((call, message.to_string()));
        self
    }

    pub(crate) fn calls(&self) -> Arc<Mutex<Vec<GenerationRequest>>> {
        self.calls.clone()
    }

    pub(crate) fn created(&self) -> Arc<Mutex<usize>> {
        self.created.clone()
    }
}

impl HandleFactory for RecordingFactory {
    fn create(&self, model: &str, _credential: &Credential) -> Result<Handle> {
        *self.created.lock().unwrap() += 1;
        Ok(Arc::new(RecordingClient {
            model: model.to_string(),
            calls: self.calls.clone(),
            fail_on: self.fail_on.clone(),
        }))
    }
}

struct RecordingClient {
    model: String,
    calls: Arc<Mutex<Vec<GenerationRequest>>>,
    fail_on: Option<(usize, String)>,
}

#[async_trait]
impl TextToImageClient for RecordingClient {
    async fn text_to_image(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(request.clone());
            calls.len()
        };

        if let Some((n, message)) = &self.fail_on {
            if *n == call {
                return Err(Text2ImageError::RemoteCall(message.clone()));
            }
        }

        let image = ::image::DynamicImage::new_rgb8(request.width(), request.height());
        Ok(GenerationResult::new(
            image,
            request.width(),
            request.height(),
            GenerationMetadata {
                model: Some(self.model.clone()),
                ..Default::default()
            },
        ))
    }

    fn model(&self) -> &str {
        &self.model
    }
}
