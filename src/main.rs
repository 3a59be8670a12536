//! Document AI command-line client.
//!
//! Processes one document and prints a report followed by the framed JSON
//! result on stdout. Logs go to stderr.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use docai_extract::config::AppConfig;
use docai_extract::document_ai::DocumentAiProcessor;
use docai_extract::report::{frame_result, render_report};

const TROUBLESHOOTING_TIPS: &str = "\
Troubleshooting tips:
1. Make sure you have the Google Cloud SDK installed and configured
2. Verify your GCP credentials and permissions
3. Check that the processor ID and project ID are correct
4. Ensure the Document AI API is enabled in your GCP project
5. Point GOOGLE_APPLICATION_CREDENTIALS at a service account key, pass --credentials,
   or run `gcloud auth application-default login`";

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

async fn run(config: &AppConfig) -> anyhow::Result<()> {
    let settings = config.processor_settings()?;
    let processor =
        DocumentAiProcessor::new(settings).context("Failed to configure Document AI processor")?;

    let file_path = config.file_path();
    let mime_type = config.resolved_mime_type();

    info!(
        name: "docai.cli.started",
        file = %file_path.display(),
        processor = %processor.processor_name(),
        mime_type = %mime_type,
        "Processing document"
    );

    let result = processor
        .process(&file_path, &mime_type)
        .await
        .with_context(|| format!("Error processing document {}", file_path.display()))?;

    if config.report {
        println!("{}", render_report(&result));
    }
    if config.emit_json {
        println!("{}", frame_result(&result)?);
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    // Load .env (if present)
    let _ = dotenv();

    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    init_tracing(config.log_json);

    if let Err(e) = run(&config).await {
        eprintln!("\nError: {e:#}\n");
        eprintln!("{TROUBLESHOOTING_TIPS}");
        std::process::exit(1);
    }
}
