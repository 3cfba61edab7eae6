// Orchestrates one alert run: search, cache, rank, render, deliver.

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::cache::{CacheError, ResponseCache};
use crate::config::SearchSettings;
use crate::notify::{DeliveryReceipt, NotificationSender};
use crate::offer::offers_from_value;
use crate::ranker::{filter_under_price, ranked_digest, take_cheapest, Itinerary, OfferRanker};
use crate::render::{NotificationRenderer, RenderError};
use crate::search::{FlightSearchApi, SearchError, SearchRequest};

#[derive(Error, Debug)]
pub enum AlertError {
    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

// How a run that did not fail ended
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Delivered {
        receipt: DeliveryReceipt,
        itineraries: Vec<Itinerary>,
    },
    // The email API refused or could not be reached; the run still completes
    DeliveryFailed {
        reason: String,
        itineraries: Vec<Itinerary>,
    },
    NoFlights,
}

pub struct FlightAlert<S, N> {
    settings: SearchSettings,
    search: S,
    sender: N,
    renderer: NotificationRenderer,
    cache: Option<ResponseCache>,
}

impl<S, N> FlightAlert<S, N>
where
    S: FlightSearchApi,
    N: NotificationSender,
{
    pub fn new(
        settings: SearchSettings,
        search: S,
        sender: N,
        renderer: NotificationRenderer,
        cache: Option<ResponseCache>,
    ) -> Self {
        Self {
            settings,
            search,
            sender,
            renderer,
            cache,
        }
    }

    pub async fn run(&self) -> Result<RunOutcome, AlertError> {
        let settings = &self.settings;
        let request = SearchRequest::from_settings(settings);

        let response = self.search.search(&request).await.map_err(|e| {
            error!(error = %e, "Failed to fetch valid flight data");
            e
        })?;

        let Some(offers) = offers_from_value(&response) else {
            error!("Failed to fetch valid flight data: response has no data.offers list");
            return Err(SearchError::InvalidResponse("missing data.offers".to_string()).into());
        };
        info!(offers = offers.len(), "Flight data received");

        if let Some(cache) = &self.cache {
            cache.store(&response)?;
        }

        for summary in ranked_digest(&offers, settings.top_n) {
            debug!(
                rank = summary.rank,
                price = %summary.price,
                origin = %summary.origin,
                destination = %summary.destination,
                segments = summary.segments.len(),
                "Ranked offer"
            );
        }

        let ranker = OfferRanker::new(settings.excluded_carrier.clone());
        let normalized = ranker.normalize(&offers, settings.max_results);
        let under_ceiling = filter_under_price(normalized, settings.max_price);
        if under_ceiling.is_empty() {
            info!(max_price = settings.max_price, "No flights found under price ceiling");
        }
        let itineraries = take_cheapest(under_ceiling, settings.top_n);

        let Some(notification) =
            self.renderer
                .render(&itineraries, &settings.origin, &settings.destination)?
        else {
            return Ok(RunOutcome::NoFlights);
        };

        match self.sender.send(&notification).await {
            Ok(receipt) => {
                info!(
                    flights = itineraries.len(),
                    max_price = settings.max_price,
                    "Email sent with flights under price ceiling"
                );
                Ok(RunOutcome::Delivered {
                    receipt,
                    itineraries,
                })
            }
            Err(e) => {
                warn!(error = %e, "Failed to send email");
                Ok(RunOutcome::DeliveryFailed {
                    reason: e.to_string(),
                    itineraries,
                })
            }
        }
    }
}
