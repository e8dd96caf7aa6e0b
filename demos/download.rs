//! Example downloading one file with a progress bar and checksum check.
//!
//! ```text
//! cargo run --example download -- <url> [destination] [sha256]
//! ```

use color_eyre::{eyre::eyre, Result};
use indicatif::{ProgressBar, ProgressStyle};
use steadyfetch::{DownloadRequest, DownloaderBuilder};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let url = args
        .next()
        .ok_or_else(|| eyre!("usage: download <url> [destination] [sha256]"))?;

    let mut request = DownloadRequest::try_from(url.as_str())?.overwrite(true);
    if let Some(destination) = args.next() {
        request = request.destination(destination);
    }
    if let Some(sha256) = args.next() {
        request = request.checksum("sha256", sha256);
    }

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template(
            "{bar:40.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
        )?
        .progress_chars("=> "),
    );
    let sink = bar.clone();

    let downloader = DownloaderBuilder::new()
        .on_progress(move |downloaded, total| {
            sink.set_length(total);
            sink.set_position(downloaded);
        })
        .build()?;

    let outcome = downloader.download(&request).await?;
    bar.finish_and_clear();

    if outcome.succeeded() {
        println!(
            "Saved {} bytes to {}",
            outcome.bytes_on_disk(),
            outcome.final_path().display()
        );
        Ok(())
    } else {
        Err(eyre!(
            "download failed ({:?}), data left at {}",
            outcome.reason(),
            outcome.final_path().display()
        ))
    }
}
