//! services/client/src/bin/copilot.rs

use std::io::Write;

use client_lib::{
    app::{AppState, Frontend, Step},
    config::Config,
    error::ClientError,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!("Configuration loaded. Backend at {}", config.api_base_url);

    // --- 2. Restore the Session & Open the First View ---
    let state = AppState::from_config(config)?;
    let mut frontend = Frontend::new(&state);
    println!("{}", frontend.banner());
    println!("Type /help for commands.");

    // --- 3. Read Commands Until EOF or /quit ---
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match frontend.handle(&line).await {
            Step::Continue(output) => {
                for line in output {
                    println!("{}", line);
                }
            }
            Step::Quit => break,
        }
    }

    info!("Session closed.");
    Ok(())
}
