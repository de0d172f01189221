//! Capture a document and send it to the storage service.
//!
//! Demonstrates:
//! - Saving the endpoint to the settings store
//! - Activating a client and watching status changes
//! - Sending a store command once connected
//! - Reacting to a lost connection
//!
//! Usage:
//!   cargo run --example capture -- --endpoint ws://127.0.0.1:8080 --url https://tokio.rs --title Tokio --tags "rust, async"
//!   cargo run --example capture -- --settings ./settings.json --url https://tokio.rs
//!   cargo run --example capture -- --debug --no-wait

mod common;

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use common::Args;
use dfs_capture::{
    ActiveDocument, CaptureClient, Error, Result, SettingsStore, StaticDocument, Status,
};

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    common::init_logging(args.debug);

    if let Err(e) = run(args).await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    println!("=== Capture ===\n");

    // ========================================================================
    // Settings
    // ========================================================================

    let settings = Arc::new(SettingsStore::open(args.settings_path())?);
    println!("[Settings] {}", settings.path().display());

    if let Some(endpoint) = &args.endpoint {
        settings.set_endpoint(endpoint)?;
        println!("        ✓ Endpoint saved: {endpoint}");
    }

    // ========================================================================
    // Document
    // ========================================================================

    let url = args
        .url
        .clone()
        .ok_or_else(|| Error::config("Pass the document to capture with --url <address>"))?;
    let title = args.title.clone().unwrap_or_else(|| url.clone());
    let documents = Arc::new(StaticDocument::with_document(ActiveDocument::new(title, url)));

    // ========================================================================
    // Connect
    // ========================================================================

    let mut client = CaptureClient::builder()
        .endpoint_provider(Arc::clone(&settings))
        .document_source(documents)
        .build()?;

    let connection = client.activate().await?;
    println!("[Connect] {}", connection.endpoint());
    println!("        {}", connection.status().message());
    connection.subscribe(|change| println!("        {}", change.message()));

    if client.settle().await? != Status::Connected {
        println!("\n[Capture] Skipped, not connected");
        return Ok(());
    }

    // ========================================================================
    // Capture
    // ========================================================================

    client.capture(&args.tags, None).await?;
    println!("\n[Capture] ✓ Store command sent");

    // ========================================================================
    // Wait
    // ========================================================================

    if !args.no_wait {
        println!("\n[Watch] Watching the connection until Ctrl+C...");
        if let Some(connection) = client.connection_mut() {
            tokio::select! {
                reason = connection.run_until_closed() => {
                    if let Some(reason) = reason {
                        println!("[Watch] Ended: {reason}");
                    }
                }
                () = common::wait_for_exit(false) => {}
            }
        }
    }

    client.deactivate();
    println!("\n=== Done ===");
    Ok(())
}
