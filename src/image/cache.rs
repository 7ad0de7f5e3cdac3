//! Process-lifetime cache of client handles, keyed by model identifier.

use crate::credential::Credential;
use crate::error::{Result, Text2ImageError};
use crate::image::provider::{Handle, HandleFactory};
use std::collections::HashMap;

/// Memo of one client handle per model identifier.
///
/// The credential is assumed constant for the life of the process, so it is
/// not part of the key. Entries are never evicted.
pub struct HandleCache<F> {
    factory: F,
    handles: HashMap<String, Handle>,
}

impl<F: HandleFactory> HandleCache<F> {
    /// Creates an empty cache that builds handles with `factory`.
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            handles: HashMap::new(),
        }
    }

    /// Returns the cached handle for `model`, creating it on first use.
    pub fn get_handle(&mut self, model: &str, credential: Option<&Credential>) -> Result<Handle> {
        let credential = credential.ok_or(Text2ImageError::CredentialMissing)?;

        if let Some(handle) = self.handles.get(model) {
            tracing::trace!(model, "client handle cache hit");
            return Ok(handle.clone());
        }

        let handle = self.factory.create(model, credential)?;
        self.handles.insert(model.to_string(), handle.clone());
        Ok(handle)
    }

    /// Number of cached handles.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns true if no handle has been created yet.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Returns the handle factory.
    pub fn factory(&self) -> &F {
        &self.factory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::provider::TextToImageClient;
    use crate::image::types::{GenerationRequest, GenerationResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct NullClient(String);

    #[async_trait]
    impl TextToImageClient for NullClient {
        async fn text_to_image(&self, _request: &GenerationRequest) -> Result<GenerationResult> {
            Err(Text2ImageError::remote("not used"))
        }

        fn model(&self) -> &str {
            &self.0
        }
    }

    #[derive(Default)]
    struct CountingFactory {
        created: AtomicUsize,
    }

    impl HandleFactory for CountingFactory {
        fn create(&self, model: &str, _credential: &Credential) -> Result<Handle> {
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(NullClient(model.to_string())))
        }
    }

    fn credential() -> Credential {
        Credential::new("hf_test").unwrap()
    }

    #[test]
    fn test_same_model_returns_identical_handle() {
        let mut cache = HandleCache::new(CountingFactory::default());
        let a = cache.get_handle("m/one", Some(&credential())).unwrap();
        let b = cache.get_handle("m/one", Some(&credential())).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.factory().created.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_different_model_returns_distinct_handle() {
        let mut cache = HandleCache::new(CountingFactory::default());
        let a = cache.get_handle("m/one", Some(&credential())).unwrap();
        let b = cache.get_handle("m/two", Some(&credential())).unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.model(), "m/one");
        assert_eq!(b.model(), "m/two");
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_missing_credential_fails() {
        let mut cache = HandleCache::new(CountingFactory::default());
        let err = cache.get_handle("m/one", None).err().unwrap();

        assert!(matches!(err, Text2ImageError::CredentialMissing));
        assert!(cache.is_empty());
        assert_eq!(cache.factory().created.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_missing_credential_fails_even_when_cached() {
        let mut cache = HandleCache::new(CountingFactory::default());
        cache.get_handle("m/one", Some(&credential())).unwrap();

        assert!(matches!(
            cache.get_handle("m/one", None),
            Err(Text2ImageError::CredentialMissing)
        ));
    }
}
