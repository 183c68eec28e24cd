//! Mock scan example showing the full scan path without network access.
//!
//! This example shows how to:
//! - Script a provider's poll responses
//! - Build a ScanService around a ScanOrchestrator
//! - Handle both a report and a failure
//!
//! Run with: cargo run --example mock_scan

use scanlens::backends::{MockProvider, MockResponse};
use scanlens::prelude::*;

use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("=== Scanlens Mock Scan Example ===\n");

    // Two polls report the job as queued, the third completes
    let provider = MockProvider::new()
        .with_name("example-provider")
        .with_job_id("analysis-42")
        .with_repeated(MockResponse::queued(), 2)
        .with_response(MockResponse::Completed(ScanStatistics::new(2, 1, 70, 5)));

    let policy = PollPolicy::fixed(5, Duration::from_millis(200));
    let orchestrator = ScanOrchestrator::new(Arc::new(provider), policy);
    let service = ScanService::without_explainer(orchestrator, UploadLimits::default());

    let input = FileInput::from_bytes(b"MZ fake executable".to_vec()).with_filename("setup.exe");
    println!("Scanning file: {:?}", input.filename());

    match service.analyze(input).await {
        Ok(report) => {
            println!("\n=== Scan Results ===");
            println!("Report ID: {}", report.id);
            println!("Statistics: {}", report.stats);
            println!("Duration: {:?}", report.duration);
            println!("\n{}", report.explanation);
            let body = serde_json::to_string_pretty(&report.to_response_json())?;
            println!("\nResponse body:\n{}", body);
        }
        Err(failure) => println!("Scan failed: {}", failure.user_message()),
    }

    // A provider that never finishes runs out of budget
    println!("\n\n=== Scanning With A Stuck Provider ===\n");

    let stuck = MockProvider::new().with_response(MockResponse::queued());
    let orchestrator = ScanOrchestrator::new(
        Arc::new(stuck),
        PollPolicy::fixed(3, Duration::from_millis(100)),
    );
    let service = ScanService::without_explainer(orchestrator, UploadLimits::default());

    let input = FileInput::from_bytes(b"hello".to_vec()).with_filename("notes.txt");
    match service.analyze(input).await {
        Ok(report) => println!("Unexpected report: {}", report.stats),
        Err(failure) => println!(
            "Scan failed: {}\nResponse body: {}",
            failure,
            failure.to_response_json()
        ),
    }

    Ok(())
}
