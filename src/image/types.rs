//! Core types for text-to-image generation.

use crate::error::{Result, Text2ImageError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Inclusive range of denoising steps accepted by the generate form.
pub const STEPS_RANGE: std::ops::RangeInclusive<u32> = 4..=50;

/// Inclusive range of guidance scales accepted by the generate form.
pub const GUIDANCE_RANGE: std::ops::RangeInclusive<f32> = 1.0..=15.0;

/// Encoded formats the inference API may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format.
    WebP,
}

impl ImageFormat {
    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }

    pub(crate) fn to_codec(self) -> ::image::ImageFormat {
        match self {
            Self::Png => ::image::ImageFormat::Png,
            Self::Jpeg => ::image::ImageFormat::Jpeg,
            Self::WebP => ::image::ImageFormat::WebP,
        }
    }
}

/// Models offered by the model selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Model {
    /// Stable Diffusion XL base 1.0.
    #[default]
    #[serde(rename = "stabilityai/stable-diffusion-xl-base-1.0")]
    StableDiffusionXl,
    /// Stable Diffusion 2.1.
    #[serde(rename = "stabilityai/stable-diffusion-2-1")]
    StableDiffusion21,
    /// Stable Diffusion v1.5.
    #[serde(rename = "runwayml/stable-diffusion-v1-5")]
    StableDiffusion15,
}

impl Model {
    /// All selectable models, in selector order.
    pub const ALL: [Model; 3] = [
        Self::StableDiffusionXl,
        Self::StableDiffusion21,
        Self::StableDiffusion15,
    ];

    /// Returns the Hugging Face model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StableDiffusionXl => "stabilityai/stable-diffusion-xl-base-1.0",
            Self::StableDiffusion21 => "stabilityai/stable-diffusion-2-1",
            Self::StableDiffusion15 => "runwayml/stable-diffusion-v1-5",
        }
    }

    /// Returns a short display name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::StableDiffusionXl => "Stable Diffusion XL 1.0",
            Self::StableDiffusion21 => "Stable Diffusion 2.1",
            Self::StableDiffusion15 => "Stable Diffusion 1.5",
        }
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Square output resolutions offered by the resolution selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// 512×512.
    #[default]
    #[serde(rename = "512x512")]
    Square512,
    /// 768×768.
    #[serde(rename = "768x768")]
    Square768,
    /// 1024×1024.
    #[serde(rename = "1024x1024")]
    Square1024,
}

impl Resolution {
    /// All selectable resolutions, in selector order.
    pub const ALL: [Resolution; 3] = [Self::Square512, Self::Square768, Self::Square1024];

    /// Returns the side length in pixels.
    pub fn side(&self) -> u32 {
        match self {
            Self::Square512 => 512,
            Self::Square768 => 768,
            Self::Square1024 => 1024,
        }
    }

    /// Returns the selector label (e.g., "512x512").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square512 => "512x512",
            Self::Square768 => "768x768",
            Self::Square1024 => "1024x1024",
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = Text2ImageError;

    fn from_str(s: &str) -> Result<Self> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X', '×'])
            .ok_or_else(|| Text2ImageError::InvalidRequest(format!("bad resolution: {s}")))?;
        let parse = |v: &str| v.trim().parse::<u32>().ok();

        match (parse(w), parse(h)) {
            (Some(w), Some(h)) if w == h => Self::ALL
                .into_iter()
                .find(|r| r.side() == w)
                .ok_or_else(|| Text2ImageError::InvalidRequest(format!("unsupported resolution: {s}"))),
            _ => Err(Text2ImageError::InvalidRequest(format!(
                "unsupported resolution: {s}"
            ))),
        }
    }
}

/// A request to generate one image. Every image of a batch reuses it unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The text prompt describing the desired image.
    pub prompt: String,
    /// What the image should avoid.
    pub negative_prompt: Option<String>,
    /// Output resolution.
    pub resolution: Resolution,
    /// Number of denoising steps.
    pub steps: u32,
    /// How strongly the image should follow the prompt.
    pub guidance_scale: f32,
    /// Hugging Face model identifier.
    pub model: String,
}

impl GenerationRequest {
    /// Creates a request with the form defaults.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            negative_prompt: None,
            resolution: Resolution::default(),
            steps: 30,
            guidance_scale: 7.5,
            model: Model::default().as_str().to_string(),
        }
    }

    /// Sets the negative prompt. Blank text clears it.
    pub fn with_negative_prompt(mut self, negative: impl Into<String>) -> Self {
        let negative = negative.into();
        self.negative_prompt = (!negative.trim().is_empty()).then_some(negative);
        self
    }

    /// Sets the output resolution.
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Sets the number of denoising steps.
    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }

    /// Sets the guidance scale.
    pub fn with_guidance_scale(mut self, guidance_scale: f32) -> Self {
        self.guidance_scale = guidance_scale;
        self
    }

    /// Sets the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Output width in pixels.
    pub fn width(&self) -> u32 {
        self.resolution.side()
    }

    /// Output height in pixels.
    pub fn height(&self) -> u32 {
        self.resolution.side()
    }

    /// Checks the request invariants.
    pub fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(Text2ImageError::InvalidRequest("prompt is required".into()));
        }
        if !STEPS_RANGE.contains(&self.steps) {
            return Err(Text2ImageError::InvalidRequest(format!(
                "steps must be between {} and {}, got {}",
                STEPS_RANGE.start(),
                STEPS_RANGE.end(),
                self.steps
            )));
        }
        if !GUIDANCE_RANGE.contains(&self.guidance_scale) {
            return Err(Text2ImageError::InvalidRequest(format!(
                "guidance scale must be between {:.1} and {:.1}, got {}",
                GUIDANCE_RANGE.start(),
                GUIDANCE_RANGE.end(),
                self.guidance_scale
            )));
        }
        if self.model.trim().is_empty() {
            return Err(Text2ImageError::InvalidRequest("model is required".into()));
        }
        Ok(())
    }
}

/// Metadata about the generation process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationMetadata {
    /// Model used for generation.
    pub model: Option<String>,
    /// Generation duration in milliseconds.
    pub duration_ms: Option<u64>,
    /// Format the provider returned before decoding.
    pub source_format: Option<ImageFormat>,
}

/// A decoded image together with the size it was requested at.
#[derive(Debug, Clone)]
#[must_use = "generated image should be rendered or downloaded"]
pub struct GenerationResult {
    /// Decoded raster image.
    pub image: ::image::DynamicImage,
    /// Requested width in pixels.
    pub width: u32,
    /// Requested height in pixels.
    pub height: u32,
    /// Generation metadata.
    pub metadata: GenerationMetadata,
}

impl GenerationResult {
    /// Creates a new result.
    pub fn new(
        image: ::image::DynamicImage,
        width: u32,
        height: u32,
        metadata: GenerationMetadata,
    ) -> Self {
        Self {
            image,
            width,
            height,
            metadata,
        }
    }

    /// Caption shown under the rendered image, e.g. "512×512".
    pub fn caption(&self) -> String {
        format!("{}×{}", self.width, self.height)
    }
}
