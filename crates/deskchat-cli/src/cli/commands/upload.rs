//! Ticket export upload command.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use deskchat_core::config::Config;
use deskchat_core::services::ingest::{IngestClient, progress_channel};

pub async fn run(config: &Config, file: &Path) -> Result<()> {
    let client = IngestClient::new(&config.service)?;

    let (sender, mut receiver) = progress_channel();
    let progress_task = tokio::spawn(async move {
        while let Some(percent) = receiver.recv().await {
            eprint!("\rUploading... {percent:>3}%");
            let _ = std::io::stderr().flush();
        }
        eprintln!();
    });

    let outcome = client.upload_document(file, Some(sender)).await;
    // The sender is dropped when upload_document returns, closing the
    // channel and letting the progress task finish its line.
    let _ = progress_task.await;

    let outcome = outcome.context("Upload failed")?;
    if !outcome.success {
        anyhow::bail!("Upload rejected: {}", outcome.message);
    }

    println!(
        "{} ({} tickets processed)",
        outcome.message, outcome.tickets_processed
    );
    Ok(())
}
