//! Generation form state: the user-facing controls and their bounds.

use crate::error::{Result, Text2ImageError};
use crate::image::{GenerationRequest, Model, Resolution, GUIDANCE_RANGE, STEPS_RANGE};
use serde::{Deserialize, Serialize};

/// Inclusive range of the "images to generate" slider.
pub const IMAGE_COUNT_RANGE: std::ops::RangeInclusive<u32> = 1..=4;

/// Default number of denoising steps.
pub const DEFAULT_STEPS: u32 = 30;

/// Default guidance scale.
pub const DEFAULT_GUIDANCE: f32 = 7.5;

/// Current values of every control on the generate form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationForm {
    /// Selected model.
    pub model: Model,
    /// Denoising steps.
    pub steps: u32,
    /// Guidance scale.
    pub guidance_scale: f32,
    /// Output resolution.
    pub resolution: Resolution,
    /// Number of images in the batch.
    pub image_count: u32,
    /// Prompt text (required).
    pub prompt: String,
    /// Negative prompt text (optional, empty means none).
    pub negative_prompt: String,
}

impl Default for GenerationForm {
    fn default() -> Self {
        Self {
            model: Model::default(),
            steps: DEFAULT_STEPS,
            guidance_scale: DEFAULT_GUIDANCE,
            resolution: Resolution::default(),
            image_count: *IMAGE_COUNT_RANGE.start(),
            prompt: String::new(),
            negative_prompt: String::new(),
        }
    }
}

impl GenerationForm {
    /// Creates a form with defaults and the given prompt.
    pub fn with_prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    /// Whether the generate action is available.
    pub fn generate_enabled(&self) -> bool {
        !self.prompt.trim().is_empty()
    }

    /// Sets the guidance scale, snapped to the slider's 0.1 step.
    pub fn set_guidance_scale(&mut self, guidance_scale: f32) {
        self.guidance_scale = snap_guidance(guidance_scale);
    }

    /// Builds the request the generate action sends, and the batch size.
    pub fn to_request(&self) -> Result<(GenerationRequest, u32)> {
        if !self.generate_enabled() {
            return Err(Text2ImageError::InvalidRequest("prompt is required".into()));
        }
        if !IMAGE_COUNT_RANGE.contains(&self.image_count) {
            return Err(Text2ImageError::InvalidRequest(format!(
                "image count must be between {} and {}, got {}",
                IMAGE_COUNT_RANGE.start(),
                IMAGE_COUNT_RANGE.end(),
                self.image_count
            )));
        }

        let request = GenerationRequest::new(self.prompt.clone())
            .with_negative_prompt(self.negative_prompt.clone())
            .with_resolution(self.resolution)
            .with_steps(self.steps)
            .with_guidance_scale(snap_guidance(self.guidance_scale))
            .with_model(self.model.as_str());
        request.validate()?;

        Ok((request, self.image_count))
    }
}

fn snap_guidance(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}

/// Sanity bounds used by front ends to build their controls.
pub fn control_bounds() -> serde_json::Value {
    serde_json::json!({
        "steps": { "min": STEPS_RANGE.start(), "max": STEPS_RANGE.end(), "default": DEFAULT_STEPS },
        "guidance_scale": {
            "min": GUIDANCE_RANGE.start(),
            "max": GUIDANCE_RANGE.end(),
            "step": 0.1,
            "default": DEFAULT_GUIDANCE
        },
        "image_count": { "min": IMAGE_COUNT_RANGE.start(), "max": IMAGE_COUNT_RANGE.end(), "default": 1 },
        "resolution": Resolution::ALL.iter().map(|r| r.as_str()).collect::<Vec<_>>(),
        "model": Model::ALL.iter().map(|m| m.as_str()).collect::<Vec<_>>(),
    })
}
