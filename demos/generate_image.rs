//! Basic image generation example.
//!
//! Run with: `cargo run --example generate_image`
//!
//! Requires `HUGGINGFACEHUB_API_TOKEN` or `HF_TOKEN` in `.text2image/secrets.toml`.

use text2image::present::render;
use text2image::{GenerationRequest, Generator, Resolution};

#[tokio::main]
async fn main() -> text2image::Result<()> {
    let mut generator = Generator::new();

    let request = GenerationRequest::new("A golden retriever puppy playing in snow")
        .with_negative_prompt("blurry, watermark")
        .with_resolution(Resolution::Square512);

    for result in generator.generate_all(&request, 1).await? {
        let rendered = render(result)?;
        std::fs::write(rendered.download.file_name, &rendered.download.data)?;
        println!(
            "Generated image: {} ({}, {} bytes)",
            rendered.download.file_name,
            rendered.caption,
            rendered.download.size()
        );
    }

    Ok(())
}
