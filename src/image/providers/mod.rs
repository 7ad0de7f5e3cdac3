//! Remote inference providers.

mod huggingface;

pub use huggingface::{
    HuggingFaceClient, HuggingFaceFactory, HuggingFaceFactoryBuilder, DEFAULT_ENDPOINT,
    ENDPOINT_ENV_VAR,
};
