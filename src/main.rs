// Entrypoint for the booking client.
// - Keeps `main` small: load configuration, create an API client and hand
//   it to the UI loop.

use booking_cli::{api::ApiClient, config::AppConfig, ui::main_menu};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Logs go to stderr and default to warnings so they stay out of the prompts.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::from_env();
    info!(api_url = %config.api_url, "starting booking client");

    let api = ApiClient::new(&config)?;
    main_menu(api, &config)?;
    Ok(())
}
