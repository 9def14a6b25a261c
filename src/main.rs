use anyhow::{Context, Result};
use artisan_studio::ai::mime::{detect_image_mime, is_data_uri, DataUri};
use artisan_studio::ai::GeminiVideoClient;
use artisan_studio::app::App;
use artisan_studio::models::{
    AdvertisementDescriptionInput, AdvertisementInput, Config, DesignedProductInput, MediaRef,
    SalesPotentialInput,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "artisan-studio")]
#[command(about = "AI marketing tools for artisans: video ads, product designs and sales analysis")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a promotional video from a prompt and 1-3 product photos.
    Advertise {
        #[arg(long)]
        prompt: String,
        /// Local image path, http(s) URL or data URI.
        #[arg(long = "image", required = true)]
        images: Vec<String>,
        /// Download the finished video to this path.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Record the result in the advertisement history.
        #[arg(long)]
        save: bool,
    },
    /// Write a video prompt for an artisan's products.
    DescribeAd {
        #[arg(long)]
        artisan: String,
        #[arg(long = "category")]
        categories: Vec<String>,
        #[arg(long = "image")]
        images: Vec<String>,
    },
    /// Design a custom product image and predict its price.
    Design {
        #[arg(long)]
        prompt: String,
        #[arg(long)]
        style: String,
        #[arg(long)]
        language: Option<String>,
        /// Write the generated image to this path.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Analyse a product's sales potential, with a spoken summary.
    Analyze {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        category: String,
        /// Price in INR.
        #[arg(long)]
        price: f64,
        #[arg(long)]
        language: Option<String>,
        /// Write the spoken analysis as a WAV file.
        #[arg(long)]
        audio_out: Option<PathBuf>,
    },
    /// Inspect or edit saved advertisements.
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Debug, Subcommand)]
enum HistoryAction {
    List,
    Remove { id: String },
}

/// Turn a CLI image argument into a media reference, inlining local files.
fn load_image_arg(arg: &str) -> Result<MediaRef> {
    if is_data_uri(arg) {
        let decoded = DataUri::parse(arg)?;
        return Ok(MediaRef::new(arg, decoded.mime_type));
    }
    if arg.starts_with("http://") || arg.starts_with("https://") {
        return Ok(MediaRef::new(arg, mime_from_extension(arg)));
    }

    let bytes =
        std::fs::read(arg).with_context(|| format!("Failed to read image file '{}'", arg))?;
    let mime_type = detect_image_mime(&bytes);
    Ok(MediaRef::new(DataUri::encode(mime_type, &bytes), mime_type))
}

fn mime_from_extension(url: &str) -> &'static str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    match Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}

fn load_images(args: &[String]) -> Result<Vec<MediaRef>> {
    args.iter().map(|arg| load_image_arg(arg)).collect()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn write_data_uri(uri: &str, path: &Path) -> Result<()> {
    let decoded = DataUri::parse(uri)?;
    std::fs::write(path, &decoded.data)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {} ({} bytes)", path.display(), decoded.data.len());
    Ok(())
}

fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling pending work");
            token.cancel();
        }
    });
    cancel
}

async fn run(args: CliArgs) -> Result<()> {
    let config = Config::from_env()?;
    let app = App::from_config(&config);

    match args.command {
        Command::Advertise {
            prompt,
            images,
            output,
            save,
        } => {
            let input = AdvertisementInput {
                prompt,
                images: load_images(&images)?,
            };
            let cancel = cancel_on_ctrl_c();

            let result = if save {
                let (result, saved) = app.advertise_and_save(&input, &cancel).await?;
                info!("Saved as {}", saved.id);
                result
            } else {
                app.advertise(&input, &cancel).await?
            };

            if let Some(path) = output {
                let video = GeminiVideoClient::new(config.gemini_api_key, config.video_model);
                let bytes = video.download(&result.video_url).await?;
                std::fs::write(&path, &bytes)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!("Downloaded video to {} ({} bytes)", path.display(), bytes.len());
            }
            print_json(&result)
        }
        Command::DescribeAd {
            artisan,
            categories,
            images,
        } => {
            let input = AdvertisementDescriptionInput {
                artisan_name: artisan,
                product_categories: categories,
                images: load_images(&images)?,
            };
            print_json(&app.describe_advertisement(&input).await?)
        }
        Command::Design {
            prompt,
            style,
            language,
            output,
        } => {
            let result = app
                .design_product(&DesignedProductInput {
                    prompt,
                    style,
                    language,
                })
                .await;
            match output {
                Some(path) if is_data_uri(&result.image_url) => {
                    write_data_uri(&result.image_url, &path)?
                }
                Some(_) => warn!("Design fell back to {}; nothing written", result.image_url),
                None => {}
            }
            print_json(&result)
        }
        Command::Analyze {
            name,
            description,
            category,
            price,
            language,
            audio_out,
        } => {
            let result = app
                .analyze_sales(&SalesPotentialInput {
                    product_name: name,
                    product_description: description,
                    product_category: category,
                    product_price: price,
                    target_language: language,
                })
                .await?;
            if let Some(path) = audio_out {
                write_data_uri(&result.analysis_audio, &path)?;
            }
            print_json(&result)
        }
        Command::History { action } => match action {
            HistoryAction::List => print_json(&app.history().list().await?),
            HistoryAction::Remove { id } => {
                if app.history().remove(&id).await? {
                    info!("Removed {}", id);
                } else {
                    warn!("No saved advertisement with id {}", id);
                }
                Ok(())
            }
        },
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "artisan_studio=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    match run(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_image_arg_inlines_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pot.jpg");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0xE0]).unwrap();

        let media = load_image_arg(path.to_str().unwrap()).unwrap();
        assert_eq!(media.content_type, "image/jpeg");
        assert_eq!(media.url, "data:image/jpeg;base64,/9j/4A==");
    }

    #[test]
    fn test_load_image_arg_keeps_urls() {
        let media = load_image_arg("https://cdn.test/shawl.PNG?w=512").unwrap();
        assert_eq!(media.url, "https://cdn.test/shawl.PNG?w=512");
        assert_eq!(media.content_type, "image/png");
    }

    #[test]
    fn test_load_image_arg_missing_file() {
        let err = load_image_arg("/definitely/not/here.jpg").unwrap_err();
        assert!(err.to_string().contains("here.jpg"));
    }

    #[test]
    fn test_cli_parses_repeated_images() {
        let args = CliArgs::try_parse_from([
            "artisan-studio",
            "advertise",
            "--prompt",
            "diyas",
            "--image",
            "a.jpg",
            "--image",
            "b.jpg",
        ])
        .unwrap();

        match args.command {
            Command::Advertise { images, save, .. } => {
                assert_eq!(images, vec!["a.jpg", "b.jpg"]);
                assert!(!save);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
