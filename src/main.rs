//! wilder CLI entry point
//!
//! Wild edible plant finder - CLI + web app

use wilder::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
