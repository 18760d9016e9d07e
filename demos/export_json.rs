//! Export a JSON table dump into a tribute archive
//!
//! Usage: `cargo run --example export_json -- tributes.json [output-dir]`
//!
//! Reads the rows, prints gallery stats, then writes
//! `tributes_archive_<date>.zip` into the output directory (default `exports`).

use std::time::Duration;

use tribute_archive::gallery::photo_count;
use tribute_archive::{
    ConcurrencyMode, Config, DirectorySink, JsonFileSource, TributeExporter, TributeSource,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing (optional)
    // Uncomment if you add tracing-subscriber to your dependencies:
    // tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let input = args.next().unwrap_or_else(|| "tributes.json".to_string());
    let output = args.next().unwrap_or_else(|| "exports".to_string());

    let records = JsonFileSource::new(&input).fetch_all().await?;
    println!(
        "Loaded {} tributes ({} with photos) from {input}",
        records.len(),
        photo_count(&records)
    );

    let mut config = Config::default();
    config.export.mode = ConcurrencyMode::Batched;
    config.export.fetch_timeout = Some(Duration::from_secs(20));
    config.export.retry.max_retries = 2;

    let exporter = TributeExporter::new(config)?;
    let sink = DirectorySink::new(&output);
    let report = exporter
        .export(&records, &sink, |progress| println!("  {progress}"))
        .await?;

    println!(
        "Saved {}/{} ({} bytes): {} images, {} placeholders",
        output,
        report.filename,
        report.archive_bytes,
        report.images_downloaded,
        report.images_failed
    );
    Ok(())
}
