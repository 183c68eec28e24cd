//! Scans a real file with VirusTotal and explains the result.
//!
//! Reads `VIRUSTOTAL_API_KEY` (and optionally `GEMINI_API_KEY`) from the
//! environment or a `.env` file.
//!
//! Run with: cargo run --example scan_file -- path/to/file
//!
//! Set `RUST_LOG=scanlens=debug` to watch each poll attempt.

use scanlens::prelude::*;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("scanlens=info")),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .ok_or("usage: scan_file <path>")?;

    let config = ScanConfig::from_env()?;
    let service = ScanService::from_config(&config)?;

    let orchestrator = service.orchestrator();
    println!(
        "Scanning {} with {} (max {} bytes, up to {} polls, worst case {:?})",
        path,
        orchestrator.provider_name(),
        service.limits().max_size,
        orchestrator.policy().max_attempts(),
        orchestrator.policy().worst_case_wait()
    );

    // Ctrl-C abandons the scan instead of waiting out the poll budget
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    match service
        .analyze_with_cancel(FileInput::from_path(&path), &cancel)
        .await
    {
        Ok(report) => {
            println!("\n{}: {}", report.filename, report.stats);
            println!("\n{}", report.explanation);
            if report.is_malicious() {
                std::process::exit(2);
            }
        }
        Err(failure) => {
            eprintln!("{}", failure.user_message());
            if let Some(detail) = failure.detail() {
                eprintln!("  ({})", detail);
            }
            std::process::exit(1);
        }
    }

    Ok(())
}
