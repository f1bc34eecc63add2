//! Fetching recent quakes, one quake in detail, and a client-side search.
//!
//! Run with: `cargo run --example recent_quakes`

use gnet::{Client, Error, QuakeSearch};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("gnet=debug")
        .init();

    // GEONET_* variables override the defaults
    let client = Client::from_env()?;

    println!("=== Felt quakes (MMI 3 and above) ===");
    let felt = client.get_quakes(Some(3), Some(5)).await?;
    for quake in felt.iter() {
        let p = &quake.properties;
        println!("{}  M{:.1}  {}", p.public_id, p.magnitude, p.locality);
    }
    println!("Latency: {:?}, attempts: {}", felt.latency, felt.attempts);
    println!();

    if let Some(first) = felt.features().first() {
        println!("=== Solution history of {} ===", first.properties.public_id);
        let history = client.get_quake_history(&first.properties.public_id).await?;
        for revision in history.iter() {
            let p = &revision.properties;
            println!(
                "{:?}  M{:.2} {}",
                p.modification_time,
                p.magnitude,
                p.magnitude_type.as_deref().unwrap_or("?")
            );
        }
        println!();
    }

    println!("=== M4+ in the last batch ===");
    let search = QuakeSearch::new().min_magnitude(4.0).limit(10);
    let strong = client.search_quakes(&search).await?;
    println!("{} quakes matched", strong.count());

    Ok(())
}
