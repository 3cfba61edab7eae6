// Flight price alert: fetches flight offers, ranks the cheapest itineraries
// and emails a summary.

pub mod alert;
pub mod cache;
pub mod config;
pub mod notify;
pub mod offer;
pub mod ranker;
pub mod render;
pub mod search;

// Re-export key types for convenience
pub use alert::{AlertError, FlightAlert, RunOutcome};
pub use cache::{CacheError, ResponseCache};
pub use config::{Config, ConfigError, EmailConfig, SearchConfig, SearchSettings};
pub use notify::{DeliveryError, DeliveryReceipt, NotificationSender, PostmarkSender};
pub use offer::{RawOffer, RawSegment, RawSlice};
pub use ranker::{Amount, Connection, Itinerary, OfferRanker, Price};
pub use render::{Notification, NotificationRenderer, RenderError};
pub use search::{DuffelClient, FlightSearchApi, SearchError, SearchRequest};
