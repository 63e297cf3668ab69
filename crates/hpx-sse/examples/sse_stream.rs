//! SSE Stream Example
//!
//! Follows a Server-Sent Events endpoint, printing every event until the
//! retry budget runs out or Ctrl-C is pressed.
//!
//! Run with: `cargo run -p hpx-sse --example sse_stream -- <url>`
//!
//! Set `RUST_LOG=hpx_sse=debug` to watch connection and reconnection logs.

use std::time::Duration;

use hpx_sse::{Pull, SseConfig, SseStream};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hpx_sse=info")),
        )
        .init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://127.0.0.1:8080/events".to_string());

    let config = SseConfig::new(url)
        .connect_timeout(Duration::from_secs(10))
        .initial_retry_delay(Duration::from_secs(1))
        .max_retry_delay(Duration::from_secs(30))
        .jitter(0.2)
        .max_retries(Some(5))
        .honor_server_retry(true);

    let mut stream = SseStream::new(config)?;
    let handle = stream.handle();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("Ctrl-C received, closing");
            handle.close();
        }
    });

    let mut received = 0usize;
    while let Pull::Event(event) = stream.pull().await {
        received += 1;
        println!(
            "[{}] type={} id={:?} data={}",
            received,
            event.event_type(),
            event.id(),
            event.data(),
        );
    }

    println!();
    println!(
        "Stream ended after {received} events, {} connection attempts, cursor {:?}",
        stream.attempts(),
        stream.last_event_id(),
    );
    Ok(())
}
