use clap::{Parser, Subcommand};
use image_uploader::upload::{FileUpload, UploadPipeline};
use image_uploader::{config, output};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "image-uploader")]
#[command(about = "Upload images with an orientation fix and a thumbnail")]
#[command(long_about = "\
Upload images with an orientation fix and a thumbnail

Each upload is staged under <public_root>/images/chat_image/, rotated
according to its EXIF orientation, stripped of metadata, stored, resized to a
thumbnail (longest edge from uploads.thumbnail_max_size, 300px by default),
and stored again. Temp files are always removed.

Store and limits come from the config file (default ./image-uploader.toml;
a missing file means stock defaults).

Run 'image-uploader gen-config' to generate a documented config file.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = "image-uploader.toml", global = true)]
    config: PathBuf,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload an image: main file plus thumbnail
    Upload {
        /// Image file to upload
        file: PathBuf,
    },
    /// Upload any file as-is to a chosen key
    Put {
        /// File to upload
        file: PathBuf,
        /// Object key
        #[arg(long)]
        key: String,
    },
    /// Validate the config file without uploading anything
    Check,
    /// Print a stock config file with all options documented
    GenConfig,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "image_uploader=info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Command::Upload { file } => {
            let config = config::load_config(&cli.config)?;
            let pipeline = UploadPipeline::from_config(&config)?;
            let upload = FileUpload::local(&file)?;
            let name = upload.file_name().to_string();

            let outcome = pipeline.upload(upload).await;
            if cli.json {
                println!("{}", output::upload_outcome_json(&outcome));
            } else {
                output::print_upload_outcome(&name, &outcome);
            }
            if !outcome.is_success() {
                std::process::exit(1);
            }
        }
        Command::Put { file, key } => {
            let config = config::load_config(&cli.config)?;
            let pipeline = UploadPipeline::from_config(&config)?;
            let url = pipeline.upload_native(&file, &key).await?;
            if cli.json {
                println!("{}", serde_json::json!({ "key": key, "url": url }));
            } else {
                for line in output::format_put_output(&key, &url) {
                    println!("{}", line);
                }
            }
        }
        Command::Check => {
            let config = config::load_config(&cli.config)?;
            UploadPipeline::from_config(&config)?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&output::check_output_json(&config))?
                );
            } else {
                output::print_check_output(&config);
                println!("==> Config is valid");
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
