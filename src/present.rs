//! Presentation: rendering results and offering PNG downloads.

use crate::error::{Result, Text2ImageError};
use crate::image::{GenerationResult, ImageFormat};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// File name every download is offered under.
pub const DOWNLOAD_FILE_NAME: &str = "text2image.png";

/// A downloadable PNG artifact.
#[derive(Debug, Clone)]
pub struct Download {
    /// Offered file name.
    pub file_name: &'static str,
    /// MIME type of `data`.
    pub mime_type: &'static str,
    /// PNG bytes.
    pub data: Vec<u8>,
}

impl Download {
    /// Returns the size of the artifact in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// A result ready to show: caption, pixels and download.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    /// Caption shown under the image.
    pub caption: String,
    /// The image as returned by the provider.
    pub image: ::image::DynamicImage,
    /// PNG download of the same pixels.
    pub download: Download,
}

/// Encodes an image as PNG without touching its pixels.
pub fn encode_png(image: &::image::DynamicImage) -> Result<Vec<u8>> {
    let mut buf = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png.to_codec())
        .map_err(|e| Text2ImageError::Encode(e.to_string()))?;
    Ok(buf.into_inner())
}

/// Prepares a result for display.
pub fn render(result: GenerationResult) -> Result<RenderedImage> {
    let data = encode_png(&result.image)?;
    Ok(RenderedImage {
        caption: result.caption(),
        image: result.image,
        download: Download {
            file_name: DOWNLOAD_FILE_NAME,
            mime_type: ImageFormat::Png.mime_type(),
            data,
        },
    })
}

/// A user interface that shows progress, images and errors.
pub trait Presenter {
    /// Called before the `index`-th (1-based) of `total` remote calls.
    fn progress(&mut self, _index: u32, _total: u32) {}

    /// Shows a rendered image and offers its download.
    fn show(&mut self, index: u32, total: u32, rendered: RenderedImage) -> Result<()>;

    /// Shows an inline error message.
    fn error(&mut self, message: &str);
}

/// A download written to disk.
#[derive(Debug, Clone, Serialize)]
pub struct SavedImage {
    /// Where the artifact was written.
    pub path: PathBuf,
    /// Image caption.
    pub caption: String,
    /// Artifact size in bytes.
    pub size_bytes: usize,
    /// MIME type of the artifact.
    pub mime_type: &'static str,
}

/// Writes every download into an output directory.
///
/// A single image lands at `<dir>/text2image.png`; a batch puts each one at
/// `<dir>/image-<n>/text2image.png` so every artifact keeps the offered name.
#[derive(Debug)]
pub struct DirectoryPresenter {
    dir: PathBuf,
    quiet: bool,
    saved: Vec<SavedImage>,
    errors: Vec<String>,
}

impl DirectoryPresenter {
    /// Writes downloads under `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            quiet: false,
            saved: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Suppresses human-readable output (for JSON mode).
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Downloads written so far.
    pub fn saved(&self) -> &[SavedImage] {
        &self.saved
    }

    /// Error messages shown so far.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Path the `index`-th of `total` downloads is written to.
    pub fn download_path(&self, index: u32, total: u32) -> PathBuf {
        download_path(&self.dir, index, total)
    }
}

fn download_path(dir: &Path, index: u32, total: u32) -> PathBuf {
    if total <= 1 {
        dir.join(DOWNLOAD_FILE_NAME)
    } else {
        dir.join(format!("image-{index}")).join(DOWNLOAD_FILE_NAME)
    }
}

impl Presenter for DirectoryPresenter {
    fn progress(&mut self, index: u32, total: u32) {
        if !self.quiet {
            eprintln!("Generating image {index}/{total}…");
        }
    }

    fn show(&mut self, index: u32, total: u32, rendered: RenderedImage) -> Result<()> {
        let path = self.download_path(index, total);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, &rendered.download.data)?;
        tracing::debug!(path = %path.display(), bytes = rendered.download.size(), "saved download");

        if !self.quiet {
            println!(
                "Generated image {index}/{total}: {} ({}, {} bytes)",
                path.display(),
                rendered.caption,
                rendered.download.size()
            );
        }

        self.saved.push(SavedImage {
            path,
            caption: rendered.caption,
            size_bytes: rendered.download.size(),
            mime_type: rendered.download.mime_type,
        });
        Ok(())
    }

    fn error(&mut self, message: &str) {
        if !self.quiet {
            eprintln!("{message}");
        }
        self.errors.push(message.to_string());
    }
}
