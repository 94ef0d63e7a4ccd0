//! Generate one image with FLUX 1.1 [pro] and print its URL.
//!
//! ```sh
//! BFL_API_KEY=... cargo run --example generate -- "a lighthouse at dusk"
//! ```

use bfl_rs::{Client, FluxProPlusInputs, Status};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "a beautiful sunset over mountains".to_string());

    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    let mut task = client
        .generate_pro_plus(&FluxProPlusInputs::new(prompt).size(1024, 768))
        .await?;
    println!("Submitted task: {}", task.id);

    // Poll until the service reports a terminal status
    let mut polls = 0;
    while !task.is_done() {
        polls += 1;
        if polls > 120 {
            eprintln!("Gave up waiting for {}", task.id);
            return Ok(());
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
        task = client.get_result(&task).await?;
        println!("Status: {}", task.status.map(|s| s.to_string()).unwrap_or_default());
    }

    match (task.status, &task.result) {
        (Some(Status::Ready), Some(result)) => println!("Image: {}", result.sample),
        (Some(status), _) => eprintln!("Generation ended with: {}", status),
        (None, _) => unreachable!("done tasks carry a status"),
    }

    Ok(())
}
