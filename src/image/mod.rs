//! Text-to-image generation module.

mod cache;
mod provider;
pub mod providers;
mod types;

pub use cache::HandleCache;
pub use provider::{Handle, HandleFactory, TextToImageClient};
pub use types::{
    GenerationMetadata, GenerationRequest, GenerationResult, ImageFormat, Model, Resolution,
    GUIDANCE_RANGE, STEPS_RANGE,
};
