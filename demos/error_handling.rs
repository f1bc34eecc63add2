//! Inspecting the error classification.
//!
//! Run with: `cargo run --example error_handling`

use gnet::{Client, Error, ErrorKind};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("gnet=info")
        .init();

    let client = Client::builder()
        .max_retries(1)
        .retry_wait(Duration::from_millis(500), Duration::from_secs(2))
        .build()?;

    println!("=== Unknown quake ===");
    match client.get_quake("1999p000000").await {
        Ok(quake) => println!("Found: {}", quake.properties.locality),
        Err(Error::NotFound { endpoint, id }) => println!("No quake {id} at {endpoint}"),
        Err(e) => println!("{} error: {e}", e.kind()),
    }
    println!();

    println!("=== Invalid parameter ===");
    // Rejected before anything is sent
    if let Err(e) = client.get_quakes(Some(11), None).await {
        println!("{e}");
    }
    println!();

    println!("=== Unreachable host ===");
    let offline = Client::builder()
        .base_url("http://127.0.0.1:1/")?
        .max_retries(2)
        .retry_wait(Duration::from_millis(100), Duration::from_millis(400))
        .build()?;

    match offline.get_quake_stats().await {
        Ok(_) => println!("Unexpected success"),
        Err(e) => {
            println!("Kind: {}", e.kind());
            println!("Retryable: {}", e.is_retryable());
            if let Error::ExhaustedRetries {
                attempts,
                last_error,
            } = &e
            {
                println!("Gave up after {attempts} attempts");
                println!("Last error kind: {}", last_error.kind());
                assert_eq!(last_error.kind(), ErrorKind::Connection);
            }
        }
    }

    Ok(())
}
