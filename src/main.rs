use clap::Parser;
use postcraft::{
    data_uri::mime_type_for_path, logger, GeminiClient, GeminiConfig, GenerationRequest,
    ImageDataUri, ImageStyle, Platform, PostSession, SocialPostGenerator, Tone,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Generate social media posts and matching images from a piece of content.
#[derive(Parser, Debug)]
#[command(name = "postcraft", version)]
struct Cli {
    /// What the post is about
    #[arg(short, long)]
    content: String,

    /// Twitter, Instagram, LinkedIn or Facebook
    #[arg(short, long, default_value = "Instagram")]
    platform: Platform,

    /// Professional, Casual, Humorous, Inspirational or Formal
    #[arg(short, long, default_value = "Casual")]
    tone: Tone,

    /// Photorealistic, Minimalist, Cartoon, Abstract or Vintage
    #[arg(short, long, default_value = "Photorealistic")]
    style: ImageStyle,

    /// Image to base the generated images on
    #[arg(short, long)]
    reference: Option<PathBuf>,

    /// Where generated images are written
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Regenerate the posts once with this feedback
    #[arg(long)]
    post_feedback: Option<String>,

    /// Regenerate the images once with this feedback
    #[arg(long)]
    image_feedback: Option<String>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Log as JSON lines instead of colored text
    #[arg(long)]
    json_logs: bool,

    /// Also append log lines to this file
    #[arg(long)]
    log_file: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let dotenv_loaded = dotenv::dotenv().is_ok();

    let mut logger_config = match (cli.json_logs, cli.verbose) {
        (true, true) => logger::LoggerConfig::production().with_level(logger::LogLevel::Debug),
        (true, false) => logger::LoggerConfig::production(),
        (false, true) => logger::LoggerConfig::development(),
        (false, false) => logger::LoggerConfig::default(),
    };
    if let Some(path) = &cli.log_file {
        logger_config = logger_config.with_file_output(path);
    }
    logger::init_with_config(logger_config)?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let config = GeminiConfig::from_env();
    logger::log_startup_info("postcraft", env!("CARGO_PKG_VERSION"), &config);

    let client = match GeminiClient::new(config) {
        Ok(client) => client,
        Err(e) => {
            log::error!("❌ Failed to initialize Gemini client: {}", e);
            return Err(e.into());
        }
    };
    let generator = SocialPostGenerator::new(Arc::new(client));

    let mut request = GenerationRequest::new(cli.content.as_str())
        .with_platform(cli.platform)
        .with_tone(cli.tone)
        .with_image_style(cli.style);
    if let Some(path) = &cli.reference {
        request = request.with_reference_image(load_reference(path)?);
    }

    let mut session = PostSession::new(request);
    session.generate(&generator).await?;

    if let Some(feedback) = &cli.post_feedback {
        log::info!("🔄 Regenerating posts with feedback");
        session.regenerate_posts(&generator, feedback).await?;
    }
    if let Some(feedback) = &cli.image_feedback {
        log::info!("🔄 Regenerating images with feedback");
        session.regenerate_images(&generator, feedback).await?;
    }

    let result = session
        .result()
        .ok_or("generation finished without a result")?;

    for (i, post) in result.posts.iter().enumerate() {
        println!("--- Post {} ---\n{}\n", i + 1, post);
    }

    fs::create_dir_all(&cli.output_dir)?;
    let timestamp = chrono::Utc::now().timestamp();
    for (i, uri) in result.images.iter().enumerate() {
        let image = ImageDataUri::parse(uri)?;
        let path = cli.output_dir.join(format!(
            "postcraft_{}_{}.{}",
            timestamp,
            i + 1,
            image.extension()
        ));
        fs::write(&path, image.decode()?)?;
        log::info!("💾 Image saved to: {}", path.display());
    }

    Ok(())
}

fn load_reference(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let mime_type = mime_type_for_path(&path.to_string_lossy())
        .ok_or_else(|| format!("unsupported reference image type: {}", path.display()))?;
    let bytes = fs::read(path)?;
    log::info!(
        "🖼️  Using reference image {} ({} bytes)",
        path.display(),
        bytes.len()
    );
    Ok(ImageDataUri::from_bytes(mime_type, &bytes).to_string())
}
