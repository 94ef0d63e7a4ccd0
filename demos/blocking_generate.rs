//! Same flow as `generate`, on the blocking client with FLUX.1 [dev].
//!
//! ```sh
//! BFL_API_KEY=... cargo run --features blocking --example blocking_generate
//! ```

use bfl_rs::blocking::Client;
use bfl_rs::FluxDevInputs;
use std::thread;
use std::time::Duration;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let client = Client::from_env()?;
    let mut task = client.generate_dev(
        &FluxDevInputs::new("a paper crane on a desk")
            .steps(28)
            .guidance(3.0),
    )?;
    println!("Submitted task: {}", task.id);

    for _ in 0..120 {
        if task.is_done() {
            break;
        }
        thread::sleep(Duration::from_secs(1));
        task = client.get_result(&task)?;
    }

    match task.sample() {
        Some(url) if task.is_ready() => println!("Image: {}", url),
        _ => eprintln!("Finished without an image: {:?}", task.status),
    }

    Ok(())
}
