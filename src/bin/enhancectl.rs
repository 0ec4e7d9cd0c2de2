use std::path::PathBuf;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use clap::{Parser, Subcommand};
use image_enhance_relay::enhance::EnhanceResponse;
use image_enhance_relay::Config;
use serde_json::{json, Value};

/// Images above this size are likely to be refused upstream.
const LARGE_IMAGE_BYTES: u64 = 4 * 1024 * 1024;

#[derive(Parser, Debug)]
#[command(name = "enhancectl", about = "CLI for the image enhance relay", version)]
struct Cli {
    /// Relay endpoint to call
    #[arg(global = true, long, env = "RELAY_URL", default_value = "http://127.0.0.1:8080/enhance")]
    url: String,

    /// Bearer token sent to the relay (e.g. an identity token for the hosting platform)
    #[arg(global = true, long, env = "RELAY_AUTH_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send an image to the relay and save the enhanced result
    Send {
        /// Image to enhance
        #[arg(long, value_name = "PATH", default_value = "test-image.png")]
        image: PathBuf,
        /// Prompt; the relay applies its default when omitted
        #[arg(long, value_name = "TEXT")]
        prompt: Option<String>,
        /// JSON file passed through as sceneData
        #[arg(long, value_name = "PATH")]
        scene_data: Option<PathBuf>,
        /// Where to write the enhanced image
        #[arg(long, value_name = "PATH", default_value = "enhanced-image.png")]
        out: PathBuf,
        /// Where to write the full relay response
        #[arg(long, value_name = "PATH", default_value = "response.json")]
        response_out: PathBuf,
        /// Request timeout in seconds
        #[arg(long, default_value_t = 300)]
        timeout: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load env and parse CLI
    Config::dotenv_load();
    let cli = Cli::parse();

    match cli.command {
        Commands::Send { image, prompt, scene_data, out, response_out, timeout } => {
            let bytes = tokio::fs::read(&image).await.map_err(|e| {
                eprintln!("Error: cannot read {}: {}", image.display(), e);
                e
            })?;
            let size = bytes.len() as u64;
            println!("Image file size: {} bytes ({:.1} MB)", size, size as f64 / 1024.0 / 1024.0);
            if size > LARGE_IMAGE_BYTES {
                eprintln!("Warning: image is larger than 4 MB; the provider may reject it.");
            }

            let image_b64 = STANDARD.encode(&bytes);
            println!("Base64 size: {} characters", image_b64.len());

            let mut payload = json!({ "imageBase64": format!("data:image/png;base64,{}", image_b64) });
            if let Some(p) = prompt {
                payload["prompt"] = Value::String(p);
            }
            if let Some(path) = scene_data {
                let raw = tokio::fs::read_to_string(&path).await?;
                payload["sceneData"] = serde_json::from_str(&raw)?;
            }

            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(timeout))
                .build()?;
            let mut request = client.post(&cli.url).json(&payload);
            if let Some(token) = cli.token.as_deref() {
                request = request.bearer_auth(token);
            }

            println!("Sending request to {}", cli.url);
            let response = match request.send().await {
                Ok(r) => r,
                Err(e) if e.is_timeout() => {
                    eprintln!("Error: request timed out after {}s", timeout);
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Error: network failure: {}", e);
                    std::process::exit(1);
                }
            };
            let status = response.status();
            println!("Response status: {}", status);
            let text = response.text().await?;

            let parsed: Option<EnhanceResponse> = serde_json::from_str(&text).ok();
            match serde_json::from_str::<Value>(&text) {
                Ok(v) => tokio::fs::write(&response_out, serde_json::to_string_pretty(&v)?).await?,
                Err(_) => tokio::fs::write(&response_out, &text).await?,
            }
            println!("Response saved to {}", response_out.display());

            let Some(reply) = parsed else {
                eprintln!("Error: HTTP {} with non-relay body:", status);
                eprintln!("{}", text.chars().take(500).collect::<String>());
                std::process::exit(1);
            };
            if !reply.success {
                eprintln!("Error: HTTP {}: {}", status, reply.error.as_deref().unwrap_or("Unknown error"));
                std::process::exit(1);
            }
            let Some(encoded) = reply.image_data.as_deref().filter(|s| !s.is_empty()) else {
                eprintln!("Error: successful response carried no image data");
                std::process::exit(1);
            };

            let enhanced = STANDARD.decode(encoded)?;
            tokio::fs::write(&out, &enhanced).await?;
            println!("Saved {} ({} bytes)", out.display(), enhanced.len());
            if let Some(revised) = reply.revised_prompt.as_deref() {
                println!("Revised prompt: {}", revised);
            }
            Ok(())
        }
    }
}
