//! CLI for text2image - Hugging Face text-to-image generation.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use text2image::credential::{CredentialResolver, SecretsStore};
use text2image::form::control_bounds;
use text2image::image::providers::HuggingFaceFactory;
use text2image::{DirectoryPresenter, GenerationForm, Generator, Model, Resolution, Session};
use tracing_subscriber::EnvFilter;

const TIPS: &[&str] = &[
    "Add style cues: photo, studio lighting, watercolor, Pixar style, isometric, 8k, bokeh, cinematic.",
    "Use negative prompts to avoid artifacts: blurry, deformed, extra fingers, watermark.",
    "If you hit rate limits, lower resolution or steps, or try later.",
];

#[derive(Parser)]
#[command(name = "text2image")]
#[command(about = "Generate images from text via the Hugging Face Inference API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate images from a text prompt
    Generate(GenerateArgs),

    /// List selectable models
    Models,

    /// Show prompt-writing tips
    Tips,
}

#[derive(Args)]
struct GenerateArgs {
    /// The text prompt describing the image
    prompt: String,

    /// What the image should avoid
    #[arg(long, default_value = "")]
    negative_prompt: String,

    /// Model to use
    #[arg(short, long, value_enum, default_value = "sdxl")]
    model: ModelArg,

    /// Number of denoising steps
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(4..=50))]
    steps: u32,

    /// How strongly the image should follow the prompt (1.0-15.0)
    #[arg(short, long, default_value_t = 7.5)]
    guidance: f32,

    /// Output resolution: 512x512, 768x768 or 1024x1024
    #[arg(short, long, default_value = "512x512")]
    resolution: Resolution,

    /// Images to generate
    #[arg(short = 'n', long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=4))]
    count: u32,

    /// Directory downloads are written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Secrets file holding HF_TOKEN
    #[arg(long, env = "TEXT2IMAGE_SECRETS")]
    secrets: Option<PathBuf>,

    /// Inference endpoint base URL
    #[arg(long, env = "HF_INFERENCE_ENDPOINT")]
    endpoint: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelArg {
    /// stabilityai/stable-diffusion-xl-base-1.0
    Sdxl,
    /// stabilityai/stable-diffusion-2-1
    Sd21,
    /// runwayml/stable-diffusion-v1-5
    Sd15,
}

impl From<ModelArg> for Model {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Sdxl => Model::StableDiffusionXl,
            ModelArg::Sd21 => Model::StableDiffusion21,
            ModelArg::Sd15 => Model::StableDiffusion15,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("text2image=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => {
            generate(args, cli.json).await?;
        }
        Commands::Models => {
            list_models(cli.json)?;
        }
        Commands::Tips => {
            show_tips(cli.json)?;
        }
    }

    Ok(())
}

fn build_form(args: &GenerateArgs) -> GenerationForm {
    let mut form = GenerationForm {
        model: args.model.into(),
        steps: args.steps,
        resolution: args.resolution,
        image_count: args.count,
        prompt: args.prompt.clone(),
        negative_prompt: args.negative_prompt.clone(),
        ..GenerationForm::default()
    };
    form.set_guidance_scale(args.guidance);
    form
}

async fn generate(args: GenerateArgs, json_output: bool) -> anyhow::Result<()> {
    let form = build_form(&args);
    if !form.generate_enabled() {
        anyhow::bail!("A prompt is required to generate images");
    }

    let secrets = match &args.secrets {
        Some(path) => SecretsStore::new(path),
        None => SecretsStore::from_env(),
    };
    let mut factory = HuggingFaceFactory::builder();
    if let Some(endpoint) = &args.endpoint {
        factory = factory.endpoint(endpoint);
    }
    let generator = Generator::with_factory(CredentialResolver::standard(secrets), factory.build());

    let mut session = Session::with_generator(generator);
    let mut presenter = DirectoryPresenter::new(&args.output_dir).quiet(json_output);
    let outcome = session.submit(&form, &mut presenter).await;

    if json_output {
        let result = serde_json::json!({
            "type": "image",
            "success": outcome.is_ok(),
            "model": form.model.as_str(),
            "resolution": form.resolution.as_str(),
            "requested": form.image_count,
            "images": presenter.saved(),
            "error": session.last_error(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    // Already shown inline by the presenter.
    if outcome.is_err() {
        std::process::exit(1);
    }
    Ok(())
}

fn list_models(json_output: bool) -> anyhow::Result<()> {
    #[derive(serde::Serialize)]
    struct ModelInfo {
        name: &'static str,
        id: &'static str,
        default: bool,
    }

    let models: Vec<ModelInfo> = Model::ALL
        .iter()
        .map(|m| ModelInfo {
            name: m.label(),
            id: m.as_str(),
            default: *m == Model::default(),
        })
        .collect();

    if json_output {
        let listing = serde_json::json!({
            "models": models,
            "controls": control_bounds(),
        });
        println!("{}", serde_json::to_string_pretty(&listing)?);
    } else {
        println!("Available models:\n");
        for m in &models {
            let marker = if m.default { "*" } else { " " };
            println!("  {} {} ({})", marker, m.name, m.id);
        }
        println!("\nAPI token: HF_TOKEN in the secrets file or HUGGINGFACEHUB_API_TOKEN");
    }

    Ok(())
}

fn show_tips(json_output: bool) -> anyhow::Result<()> {
    if json_output {
        println!("{}", serde_json::to_string_pretty(TIPS)?);
    } else {
        for tip in TIPS {
            println!("- {tip}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("text2image").chain(args.iter().copied()))
    }

    fn generate_args(args: &[&str]) -> GenerateArgs {
        match parse(args).unwrap().command {
            Commands::Generate(args) => args,
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_resolution_defaults_to_512() {
        let args = generate_args(&["generate", "a red cube"]);
        assert_eq!(args.resolution, Resolution::Square512);
    }

    #[test]
    fn test_resolution_accepts_selector_labels() {
        let args = generate_args(&["generate", "a red cube", "-r", "1024x1024"]);
        assert_eq!(args.resolution, Resolution::Square1024);

        let args = generate_args(&["generate", "a red cube", "--resolution", "768×768"]);
        assert_eq!(build_form(&args).resolution, Resolution::Square768);
    }

    #[test]
    fn test_resolution_rejects_unsupported_sizes() {
        assert!(parse(&["generate", "a red cube", "-r", "640x480"]).is_err());
        assert!(parse(&["generate", "a red cube", "-r", "huge"]).is_err());
    }

    #[test]
    fn test_form_from_args() {
        let args = generate_args(&[
            "generate",
            "a red cube",
            "--negative-prompt",
            "blurry",
            "-m",
            "sd21",
            "--steps",
            "12",
            "-g",
            "9.04",
            "-n",
            "3",
        ]);
        let form = build_form(&args);
        assert_eq!(form.model, Model::StableDiffusion21);
        assert_eq!(form.steps, 12);
        assert_eq!(form.guidance_scale, 9.0);
        assert_eq!(form.image_count, 3);
        assert_eq!(form.negative_prompt, "blurry");
    }

    #[test]
    fn test_count_out_of_range_is_rejected() {
        assert!(parse(&["generate", "a red cube", "-n", "5"]).is_err());
    }
}
