mod api;
mod config;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::info;

use formbridge_browser::{RecordBrowser, SectionBody};
use formbridge_core::{DocumentUpload, RecognitionProvider, RecordStore};
use formbridge_logging::init_logger;
use formbridge_recognition::{MockOcrProvider, TimeoutProvider};
use formbridge_reconcile::display_label;
use formbridge_session::{FormSession, SessionState};
use formbridge_store::InMemoryRecordStore;

use api::AppState;
use config::Config;

#[derive(Parser)]
#[command(name = "formbridge")]
#[command(about = "FormBridge — document intake form pipeline")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the FormBridge HTTP server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run the end-to-end intake flow against the mock provider
    Demo,
}

fn build_collaborators(config: &Config) -> (Arc<dyn RecognitionProvider>, Arc<dyn RecordStore>) {
    let provider = TimeoutProvider::new(
        MockOcrProvider::new(Duration::from_millis(config.mock_delay_ms)),
        Duration::from_millis(config.recognition_timeout_ms),
    );
    (Arc::new(provider), Arc::new(InMemoryRecordStore::new()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            init_logger(config.log_dir.as_deref().map(Path::new), &config.log_level);
            let config = Config {
                port: port.unwrap_or(config.port),
                ..config
            };
            run_server(config).await?;
        }
        Commands::Demo => {
            // Console only; the demo log goes to stdout anyway.
            init_logger(None, &config.log_level);
            run_demo(config).await?;
        }
    }

    Ok(())
}

async fn run_server(config: Config) -> Result<()> {
    info!(
        port = config.port,
        bind = %config.bind_address,
        "starting FormBridge server"
    );

    let (provider, store) = build_collaborators(&config);
    let state = Arc::new(AppState { provider, store });
    let app = api::build_router(state);

    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Walk one upload through the whole pipeline on stdout: recognize, edit a
/// field, submit, then browse the stored record back.
async fn run_demo(config: Config) -> Result<()> {
    let (provider, store) = build_collaborators(&config);
    let session = FormSession::new(provider, store.clone());

    println!("Uploading sample-intake.pdf ...");
    session
        .select_file(DocumentUpload::new("sample-intake.pdf", vec![0u8; 64]))
        .await?;

    if session.state() == SessionState::RecognitionFailed {
        println!(
            "Recognition failed: {}",
            session.error_message().unwrap_or_default()
        );
        return Ok(());
    }

    println!("\nEditable fields:");
    for field in session.fields() {
        println!("  {}: {}", display_label(&field.name), field.value);
    }
    println!("\nStructured previews:");
    for preview in session.previews() {
        println!("  {}: {}", display_label(&preview.name), preview.value);
    }

    println!("\nEditing Patient Name -> \"Jane Smith\"");
    session.edit_field("patientName", json!("Jane Smith"))?;

    let stored = session.submit().await?;
    println!("Submitted record {}", stored.id);

    let mut browser = RecordBrowser::new(store);
    browser.refresh().await?;
    browser.select(stored.id);
    if let Some(detail) = browser.selection_detail() {
        println!("\nStored record detail:");
        for field in &detail.fields {
            println!("  {}: {}", field.label, field.value);
        }
        for section in &detail.sections {
            println!("  {}:", section.label);
            match &section.body {
                SectionBody::Entries(entries) => {
                    for entry in entries {
                        println!("    - {entry}");
                    }
                }
                SectionBody::Raw(raw) => println!("    {raw}"),
            }
        }
    }

    Ok(())
}
