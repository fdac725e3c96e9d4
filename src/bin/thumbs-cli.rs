use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use thumbnail_gateway::youtube::{
    extract_video_id, Thumbnail, ThumbnailQuality, DEFAULT_THUMBNAIL_BASE,
};

#[derive(Parser)]
#[command(name = "thumbs-cli")]
#[command(about = "Fetch YouTube thumbnails and remix them through the thumbnail gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080", env = "THUMBS_SERVER")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print thumbnail URLs for a video (no network)
    Url {
        video: String,
        /// maxresdefault, sddefault or hqdefault. All tiers when omitted.
        #[arg(short, long)]
        quality: Option<ThumbnailQuality>,
    },
    /// Download a thumbnail straight from YouTube
    Download {
        video: String,
        #[arg(short, long, default_value = "maxresdefault")]
        quality: ThumbnailQuality,
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
    /// Ask the gateway for three prompts inspired by a thumbnail
    Prompts {
        /// Video link, video ID, or a thumbnail image URL
        target: String,
    },
    /// Generate an image from a prompt
    Image {
        prompt: String,
        /// Output file. Defaults to generated-image-<millis>.png
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Url { video, quality } => {
            let thumb = resolve(&video, quality.unwrap_or_default())?;
            let tiers = match quality {
                Some(q) => vec![q],
                None => ThumbnailQuality::ALL.to_vec(),
            };
            for q in tiers {
                let t = thumb.with_quality(q);
                let (w, h) = q.dimensions();
                println!("{:<18} {:>4}x{:<4} {}", q.label(), w, h, t.url(DEFAULT_THUMBNAIL_BASE));
            }
        }
        Commands::Download { video, quality, output } => {
            let thumb = resolve(&video, quality)?;
            let res = client.get(thumb.url(DEFAULT_THUMBNAIL_BASE)).send().await?;
            if !res.status().is_success() {
                return Err(format!(
                    "thumbnail returned status {} (this quality may not be available for this video)",
                    res.status()
                )
                .into());
            }
            let path = output.join(thumb.filename());
            write_file(&path, &res.bytes().await?)?;
        }
        Commands::Prompts { target } => {
            let thumbnail_url = match extract_video_id(&target) {
                Some(id) => Thumbnail::new(id, ThumbnailQuality::default()).url(DEFAULT_THUMBNAIL_BASE),
                None => target,
            };
            let res = client
                .post(format!("{}/functions/v1/generate-prompts", cli.server))
                .json(&json!({ "thumbnailUrl": thumbnail_url }))
                .send()
                .await?;
            let body = read_json(res).await?;
            let prompts = body["prompts"].as_array().cloned().unwrap_or_default();
            for (i, prompt) in prompts.iter().enumerate() {
                println!("{}. {}", i + 1, prompt.as_str().unwrap_or_default());
            }
        }
        Commands::Image { prompt, output } => {
            let res = client
                .post(format!("{}/functions/v1/generate-image", cli.server))
                .json(&json!({ "prompt": prompt }))
                .send()
                .await?;
            let body = read_json(res).await?;
            let image = body["image"].as_str().ok_or("response has no image")?;

            let bytes = match image.strip_prefix("data:") {
                Some(data_url) => {
                    let (_, encoded) = data_url.split_once(',').ok_or("malformed data URL")?;
                    STANDARD.decode(encoded)?
                }
                None => client.get(image).send().await?.error_for_status()?.bytes().await?.to_vec(),
            };

            let path = output.unwrap_or_else(default_image_name);
            write_file(&path, &bytes)?;
            if let Some(source) = body["source"].as_str() {
                println!("source: {}", source);
            }
        }
    }

    Ok(())
}

fn resolve(video: &str, quality: ThumbnailQuality) -> Result<Thumbnail, Box<dyn std::error::Error>> {
    let id = extract_video_id(video).ok_or("Invalid YouTube URL. Please enter a valid YouTube video URL")?;
    Ok(Thumbnail::new(id, quality))
}

fn default_image_name() -> PathBuf {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    PathBuf::from(format!("generated-image-{}.png", millis))
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::write(path, bytes)?;
    println!("saved {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

async fn read_json(res: reqwest::Response) -> Result<Value, Box<dyn std::error::Error>> {
    let status = res.status();
    let body: Value = res.json().await.unwrap_or(Value::Null);
    if !status.is_success() {
        let error = body["error"].as_str().unwrap_or("request failed");
        return Err(match body["details"].as_str() {
            Some(details) => format!("{} ({}): {}", error, status, details),
            None => format!("{} ({})", error, status),
        }
        .into());
    }
    Ok(body)
}
