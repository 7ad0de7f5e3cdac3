#![warn(missing_docs)]
//! text2image - Text-to-image generation over the Hugging Face Inference API.
//!
//! This crate collects generation parameters, sends one inference request
//! per requested image, and turns each result into a rendered image with a
//! PNG download.
//!
//! # Quick Start
//!
//! ```no_run
//! use text2image::{GenerationRequest, Generator, Resolution};
//!
//! #[tokio::main]
//! async fn main() -> text2image::Result<()> {
//!     let mut generator = Generator::new();
//!     let request = GenerationRequest::new("A watercolor cat astronaut walking on the moon")
//!         .with_negative_prompt("low quality, blurry")
//!         .with_resolution(Resolution::Square768);
//!
//!     for result in generator.generate_all(&request, 2).await? {
//!         let png = text2image::present::encode_png(&result.image)?;
//!         println!("{} ({} bytes)", result.caption(), png.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Credentials
//!
//! The token is read from the `HF_TOKEN` entry of a TOML secrets file
//! (`.text2image/secrets.toml`, or the path in `TEXT2IMAGE_SECRETS`), then
//! from the `HUGGINGFACEHUB_API_TOKEN` environment variable.
//!
//! # Features
//!
//! - `cli` (default): the `text2image` command-line front end

pub mod credential;
mod error;
pub mod form;
pub mod generator;
pub mod image;
pub mod present;
pub mod session;

#[cfg(test)]
mod testing;

// Re-export error types at crate root
pub use error::{Result, Text2ImageError};

pub use credential::{resolve_credential, Credential, CredentialResolver, SecretsStore};
pub use form::GenerationForm;
pub use generator::{GenerationStream, Generator};
pub use crate::image::providers::HuggingFaceFactory;
pub use crate::image::{
    GenerationMetadata, GenerationRequest, GenerationResult, Handle, HandleCache, HandleFactory,
    ImageFormat, Model, Resolution, TextToImageClient,
};
pub use present::{DirectoryPresenter, Download, Presenter, RenderedImage};
pub use session::{Session, SessionState};

