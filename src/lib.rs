//! # gnet - a typed client for the GeoNet API
//!
//! `gnet` queries the read-only GeoNet hazard API (quakes, volcanic alert
//! levels, shaking intensity, strong motion and CAP alerts) and parses every
//! answer into validated types. It is built on `reqwest`, retries transient
//! failures with exponential backoff, and reports everything else as a
//! classified [`Error`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use gnet::{Client, QuakeSearch};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), gnet::Error> {
//!     let client = Client::from_env()?;
//!
//!     // Server-side intensity filter, first 5 quakes.
//!     let felt = client.get_quakes(Some(3), Some(5)).await?;
//!     println!("{} felt quakes (took {:?})", felt.count(), felt.latency);
//!
//!     // Client-side magnitude search over everything recent.
//!     let search = QuakeSearch::new().min_magnitude(4.5).limit(10);
//!     for quake in client.search_quakes(&search).await?.iter() {
//!         let p = &quake.properties;
//!         println!("{} M{:.1} {}", p.public_id, p.magnitude, p.locality);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Failures are values, never panics. Connection failures, timeouts and 5xx
//! answers are retried; client errors and unparseable bodies are not.
//!
//! ```no_run
//! use gnet::{Client, Error, ErrorKind};
//!
//! # async fn example() -> Result<(), Error> {
//! # let client = Client::builder().build()?;
//! match client.get_quake_stats().await {
//!     Ok(stats) => println!("{:?}", stats.magnitude_count.days7),
//!     Err(e) if e.kind() == ErrorKind::Parse => {
//!         eprintln!("schema drift: {}", e.raw_response().unwrap_or_default());
//!     }
//!     Err(e) => eprintln!("{} error at {:?}: {e}", e.kind(), e.endpoint()),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Retries
//!
//! With the defaults, a call makes up to four attempts, waiting 4s, 8s and
//! then 10s between them. A `Retry-After` header on a 5xx answer replaces the
//! computed wait, capped at the same maximum.
//!
//! ```no_run
//! use gnet::Client;
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), gnet::Error> {
//! let client = Client::builder()
//!     .max_retries(5)
//!     .retry_wait(Duration::from_millis(500), Duration::from_secs(30))
//!     .jitter(true)
//!     .build()?;
//! # Ok(())
//! # }
//! ```

mod client;
pub mod config;
mod error;
pub mod models;
mod request;
mod response;
pub mod retry;
pub mod retry_after;
pub mod search;

pub use client::{Client, ClientBuilder};
pub use config::ClientConfig;
pub use error::{Error, ErrorKind, Result};
pub use request::{Request, ACCEPT_GEOJSON, ACCEPT_JSON, ACCEPT_XML};
pub use response::Response;
pub use retry::{RetryPolicy, RetryPredicate, RetryStrategy};
pub use search::QuakeSearch;
