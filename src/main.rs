use flight_price_alert::{
    Config, DuffelClient, FlightAlert, NotificationRenderer, PostmarkSender, ResponseCache,
    RunOutcome, SearchSettings,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Missing secrets stop the run before any network call
    let config = Config::load().map_err(|e| {
        error!(error = %e, "Configuration error");
        e
    })?;

    let search = DuffelClient::new(config.search.clone())?;
    let sender = PostmarkSender::new(config.email.clone());
    let renderer = NotificationRenderer::new(&config.template_path);
    let cache = config.cache_path.as_ref().map(ResponseCache::new);

    let alert = FlightAlert::new(SearchSettings::default(), search, sender, renderer, cache);

    match alert.run().await? {
        RunOutcome::Delivered { itineraries, .. } => {
            info!(flights = itineraries.len(), "Run complete");
        }
        RunOutcome::DeliveryFailed { itineraries, .. } => {
            info!(flights = itineraries.len(), "Run complete without delivery");
        }
        RunOutcome::NoFlights => info!("Run complete, nothing to send"),
    }

    Ok(())
}
