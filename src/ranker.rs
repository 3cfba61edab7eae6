// Offer normalization and ranking: turns raw offers into display-ready
// itineraries, drops duplicates, and selects the cheapest under a ceiling.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

use crate::offer::{non_empty, RawAmount, RawCarrier, RawOffer, RawSegment};

pub const PLACEHOLDER_LOGO: &str = "https://via.placeholder.com/100x30?text=No+Logo";
pub const DEFAULT_CURRENCY: &str = "USD";
pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %I:%M %p";

// Offer total as reported by the API. Unparsable totals are kept as-is so
// the caller decides how to rank them.
#[derive(Debug, Clone, PartialEq)]
pub enum Amount {
    Parsed(f64),
    Unparsable(String),
}

impl Amount {
    pub fn parse(raw: Option<&RawAmount>) -> Self {
        match raw {
            Some(RawAmount::Number(value)) if value.is_finite() => Amount::Parsed(*value),
            Some(RawAmount::Number(value)) => Amount::Unparsable(value.to_string()),
            Some(RawAmount::Text(text)) => match text.trim().parse::<f64>() {
                Ok(value) if value.is_finite() => Amount::Parsed(value),
                _ => Amount::Unparsable(text.clone()),
            },
            None => Amount::Unparsable(String::new()),
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Amount::Parsed(value) => Some(*value),
            Amount::Unparsable(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Price {
    pub amount: Amount,
    pub currency: String,
}

impl Price {
    // Two-decimal amount without the currency, "N/A" when unparsable
    pub fn display_amount(&self) -> String {
        match self.amount {
            Amount::Parsed(value) => format!("{:.2}", value),
            Amount::Unparsable(_) => "N/A".to_string(),
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.currency, self.display_amount())
    }
}

// Templates see the display form, e.g. "USD 300.00"
impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// One flown segment of an itinerary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connection {
    pub origin: String,
    pub destination: String,
    pub departure: String,
    pub arrival: String,
    pub carrier: String,
    pub flight_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Itinerary {
    pub price: Price,
    pub origin: String,
    pub origin_code: String,
    pub destination: String,
    pub destination_code: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub airline_name: String,
    pub logo_url: String,
    pub connections: Vec<Connection>,
    pub num_connections: usize,
}

impl Itinerary {
    pub fn effective_price(&self) -> f64 {
        effective_price(&self.price.amount)
    }
}

// Ranking value of an amount: unparsable totals sort after everything else
pub fn effective_price(amount: &Amount) -> f64 {
    amount.value().unwrap_or(f64::INFINITY)
}

fn by_price(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

// Identity of an itinerary for duplicate detection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DedupKey {
    price_bits: u64,
    departure: String,
    arrival: String,
    num_connections: usize,
}

impl DedupKey {
    fn of(itinerary: &Itinerary) -> Self {
        Self {
            price_bits: itinerary.effective_price().to_bits(),
            departure: itinerary.departure_time.clone(),
            arrival: itinerary.arrival_time.clone(),
            num_connections: itinerary.num_connections,
        }
    }
}

// Format an ISO-8601 timestamp for display; unparsable input is returned as-is
pub fn format_time(iso: &str) -> String {
    let trimmed = iso.trim();
    let parsed = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M"))
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.naive_local())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        });

    match parsed {
        Some(dt) => dt.format(DISPLAY_TIME_FORMAT).to_string(),
        None => iso.to_string(),
    }
}

// Carrier name preferring the operating carrier
fn carrier_name(segment: &RawSegment) -> String {
    segment
        .operating_name()
        .or_else(|| segment.marketing_name())
        .unwrap_or("Unknown Carrier")
        .to_string()
}

// Operating carrier code + number when both are present, marketing otherwise
fn flight_code(segment: &RawSegment) -> String {
    let operating_code = non_empty(
        segment
            .operating_carrier
            .as_ref()
            .and_then(|c| c.iata_code.as_deref()),
    );
    let operating_number = non_empty(segment.operating_carrier_flight_number.as_deref());

    let code = match (operating_code, operating_number) {
        (Some(code), Some(number)) => format!("{}{}", code, number),
        _ => format!(
            "{}{}",
            segment
                .marketing_carrier
                .as_ref()
                .and_then(|c| c.iata_code.as_deref())
                .unwrap_or(""),
            segment.marketing_carrier_flight_number.as_deref().unwrap_or("")
        ),
    };

    match code.trim() {
        "" => "N/A".to_string(),
        trimmed => trimmed.to_string(),
    }
}

fn logo(carrier: Option<&RawCarrier>) -> Option<&str> {
    non_empty(carrier.and_then(|c| c.logo_symbol_url.as_deref()))
}

fn logo_url(segment: &RawSegment, placeholder: &str) -> String {
    logo(segment.operating_carrier.as_ref())
        .or_else(|| logo(segment.marketing_carrier.as_ref()))
        .unwrap_or(placeholder)
        .to_string()
}

fn connection(segment: &RawSegment) -> Connection {
    Connection {
        origin: segment.origin.iata_code.clone().unwrap_or_default(),
        destination: segment.destination.iata_code.clone().unwrap_or_default(),
        departure: format_time(segment.departing_at.as_deref().unwrap_or_default()),
        arrival: format_time(segment.arriving_at.as_deref().unwrap_or_default()),
        carrier: carrier_name(segment),
        flight_code: flight_code(segment),
    }
}

// Normalizes raw offers into itineraries
#[derive(Debug, Clone)]
pub struct OfferRanker {
    pub excluded_carrier: Option<String>,
    pub placeholder_logo: String,
}

impl Default for OfferRanker {
    fn default() -> Self {
        Self {
            excluded_carrier: None,
            placeholder_logo: PLACEHOLDER_LOGO.to_string(),
        }
    }
}

impl OfferRanker {
    pub fn new(excluded_carrier: Option<String>) -> Self {
        Self {
            excluded_carrier,
            ..Self::default()
        }
    }

    fn is_excluded(&self, segments: &[RawSegment]) -> bool {
        match &self.excluded_carrier {
            Some(name) => segments.iter().any(|s| s.is_carried_by(name)),
            None => false,
        }
    }

    // Build the itinerary for an offer's outbound slice. Returns None when
    // the offer has nothing to display or flies the excluded carrier.
    pub fn itinerary(&self, offer: &RawOffer) -> Option<Itinerary> {
        let slice = offer.slices.first()?;
        let (first, last) = (slice.segments.first()?, slice.segments.last()?);

        if self.is_excluded(&slice.segments) {
            return None;
        }

        // Named after the carrier of the first leg, the same leg the logo
        // comes from
        let airline_name = first
            .operating_name()
            .or_else(|| first.marketing_name())
            .unwrap_or("Unknown Airline")
            .to_string();

        Some(Itinerary {
            price: Price {
                amount: Amount::parse(offer.total_amount.as_ref()),
                currency: offer
                    .total_currency
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            },
            origin: slice.origin.name.clone().unwrap_or_default(),
            origin_code: slice.origin.iata_code.clone().unwrap_or_default(),
            destination: slice.destination.name.clone().unwrap_or_default(),
            destination_code: slice.destination.iata_code.clone().unwrap_or_default(),
            departure_time: format_time(first.departing_at.as_deref().unwrap_or_default()),
            arrival_time: format_time(last.arriving_at.as_deref().unwrap_or_default()),
            airline_name,
            logo_url: logo_url(first, &self.placeholder_logo),
            connections: slice.segments.iter().map(connection).collect(),
            num_connections: slice.segments.len() - 1,
        })
    }

    // Normalize offers into at most `max_results` distinct itineraries.
    // Offers are visited cheapest first (stable, so equal prices keep their
    // response order) and the pass stops as soon as `max_results` is reached.
    pub fn normalize(&self, offers: &[RawOffer], max_results: usize) -> Vec<Itinerary> {
        let mut ordered: Vec<(f64, &RawOffer)> = offers
            .iter()
            .map(|o| (effective_price(&Amount::parse(o.total_amount.as_ref())), o))
            .collect();
        ordered.sort_by(|a, b| by_price(a.0, b.0));

        let mut seen = HashSet::new();
        let mut itineraries = Vec::new();

        for (_, offer) in ordered {
            if itineraries.len() >= max_results {
                break;
            }

            let Some(itinerary) = self.itinerary(offer) else {
                debug!(offer_id = ?offer.id, "Skipping offer");
                continue;
            };

            if let Amount::Unparsable(raw) = &itinerary.price.amount {
                warn!(offer_id = ?offer.id, total_amount = %raw, "Unparsable offer total");
            }

            if !seen.insert(DedupKey::of(&itinerary)) {
                continue;
            }
            itineraries.push(itinerary);
        }

        itineraries
    }
}

// Keep itineraries priced strictly below `max_price`
pub fn filter_under_price(itineraries: Vec<Itinerary>, max_price: f64) -> Vec<Itinerary> {
    itineraries
        .into_iter()
        .filter(|i| i.price.amount.value().map_or(false, |v| v < max_price))
        .collect()
}

// Cheapest `top_n` itineraries, ascending by price
pub fn take_cheapest(mut itineraries: Vec<Itinerary>, top_n: usize) -> Vec<Itinerary> {
    itineraries.sort_by(|a, b| by_price(a.effective_price(), b.effective_price()));
    itineraries.truncate(top_n);
    itineraries
}

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentSummary {
    pub origin: String,
    pub destination: String,
    pub departure: String,
    pub arrival: String,
    pub airline: String,
    pub flight_code: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OfferSummary {
    pub rank: usize,
    pub price: String,
    pub origin: String,
    pub destination: String,
    pub segments: Vec<SegmentSummary>,
}

// Ranked overview of the cheapest `top_n` offers, one entry per slice.
// Unlike `OfferRanker::normalize` this covers return slices too and keeps
// every carrier.
pub fn ranked_digest(offers: &[RawOffer], top_n: usize) -> Vec<OfferSummary> {
    let mut priced: Vec<(Price, &RawOffer)> = offers
        .iter()
        .map(|o| {
            let price = Price {
                amount: Amount::parse(o.total_amount.as_ref()),
                currency: o
                    .total_currency
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            };
            (price, o)
        })
        .collect();
    priced.sort_by(|a, b| by_price(effective_price(&a.0.amount), effective_price(&b.0.amount)));

    let mut digest = Vec::new();
    for (idx, (price, offer)) in priced.into_iter().take(top_n).enumerate() {
        for slice in &offer.slices {
            digest.push(OfferSummary {
                rank: idx + 1,
                price: price.to_string(),
                origin: slice
                    .origin
                    .name
                    .clone()
                    .unwrap_or_else(|| "Unknown Origin".to_string()),
                destination: slice
                    .destination
                    .name
                    .clone()
                    .unwrap_or_else(|| "Unknown Destination".to_string()),
                segments: slice
                    .segments
                    .iter()
                    .map(|segment| SegmentSummary {
                        origin: segment.origin.iata_code.clone().unwrap_or_default(),
                        destination: segment.destination.iata_code.clone().unwrap_or_default(),
                        departure: segment.departing_at.clone().unwrap_or_default(),
                        arrival: segment.arriving_at.clone().unwrap_or_default(),
                        airline: segment
                            .operating_name()
                            .unwrap_or("Unknown Airline")
                            .to_string(),
                        flight_code: flight_code(segment),
                    })
                    .collect(),
            });
        }
    }

    digest
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use test_case::test_case;

    const SAMPLE_RESPONSE_PATH: &str = "samples/duffel_response.json";

    fn segment(carrier: &str, code: &str, number: &str, dep: &str, arr: &str) -> Value {
        json!({
            "origin": {"iata_code": "LAX"},
            "destination": {"iata_code": "GLA"},
            "departing_at": dep,
            "arriving_at": arr,
            "operating_carrier": {"name": carrier, "iata_code": code, "logo_symbol_url": format!("https://logos.example/{}.svg", code)},
            "marketing_carrier": {"name": carrier, "iata_code": code},
            "operating_carrier_flight_number": number,
            "marketing_carrier_flight_number": number
        })
    }

    fn offer(amount: Value, segments: Vec<Value>) -> RawOffer {
        serde_json::from_value(json!({
            "total_amount": amount,
            "total_currency": "USD",
            "slices": [{
                "origin": {"name": "Los Angeles International Airport", "iata_code": "LAX"},
                "destination": {"name": "Glasgow Airport", "iata_code": "GLA"},
                "segments": segments
            }]
        }))
        .unwrap()
    }

    fn direct(amount: &str, dep: &str) -> RawOffer {
        offer(
            json!(amount),
            vec![segment("British Airways", "BA", "268", dep, "2024-12-02T11:20:00")],
        )
    }

    fn prices(itineraries: &[Itinerary]) -> Vec<String> {
        itineraries.iter().map(|i| i.price.display_amount()).collect()
    }

    #[test]
    fn test_duplicates_collapse_and_sort() {
        let offers = vec![
            direct("500.00", "2024-12-01T16:00:00"),
            direct("300.00", "2024-12-01T18:30:00"),
            direct("300.00", "2024-12-01T18:30:00"),
        ];
        let ranker = OfferRanker::default();

        let normalized = ranker.normalize(&offers, 5);
        let result = take_cheapest(filter_under_price(normalized, 600.0), 5);

        assert_eq!(prices(&result), vec!["300.00", "500.00"]);
    }

    #[test]
    fn test_first_duplicate_wins() {
        let mut first = direct("300.00", "2024-12-01T18:30:00");
        first.id = Some("off_first".to_string());
        let mut second = offer(
            json!("300"),
            vec![segment("Aer Lingus", "EI", "146", "2024-12-01T18:30:00", "2024-12-02T11:20:00")],
        );
        second.id = Some("off_second".to_string());

        let result = OfferRanker::default().normalize(&[first, second], 5);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].airline_name, "British Airways");
    }

    #[test]
    fn test_unparsable_price_sorts_last() {
        let offers = vec![
            direct("not-a-number", "2024-12-01T08:00:00"),
            direct("899.99", "2024-12-01T09:00:00"),
            direct("120.10", "2024-12-01T10:00:00"),
        ];

        let result = take_cheapest(OfferRanker::default().normalize(&offers, 5), 5);

        assert_eq!(prices(&result), vec!["120.10", "899.99", "N/A"]);
        assert_eq!(result[2].effective_price(), f64::INFINITY);
        assert_eq!(
            result[2].price.amount,
            Amount::Unparsable("not-a-number".to_string())
        );
    }

    #[test]
    fn test_unparsable_price_never_under_ceiling() {
        let offers = vec![direct("abc", "2024-12-01T08:00:00")];
        let result = filter_under_price(OfferRanker::default().normalize(&offers, 5), f64::MAX);
        assert!(result.is_empty());
    }

    #[test_case(json!("412.5"), Amount::Parsed(412.5); "#1 decimal string")]
    #[test_case(json!(" 99 "), Amount::Parsed(99.0); "#2 padded string")]
    #[test_case(json!(250), Amount::Parsed(250.0); "#3 number")]
    #[test_case(json!(""), Amount::Unparsable(String::new()); "#4 empty string")]
    #[test_case(json!("inf"), Amount::Unparsable("inf".to_string()); "#5 non-finite string")]
    fn test_amount_parse(raw: Value, expected: Amount) {
        let raw = serde_json::from_value::<RawAmount>(raw).unwrap();
        assert_eq!(Amount::parse(Some(&raw)), expected);
    }

    #[test]
    fn test_excluded_carrier_never_returned() {
        let offers = vec![
            offer(
                json!("10.00"),
                vec![
                    segment("British Airways", "BA", "268", "2024-12-01T08:00:00", "2024-12-01T18:00:00"),
                    segment("Duffel Airways", "ZZ", "1", "2024-12-01T20:00:00", "2024-12-02T06:00:00"),
                ],
            ),
            direct("450.00", "2024-12-01T09:00:00"),
        ];

        let ranker = OfferRanker::new(Some("Duffel Airways".to_string()));
        let result = ranker.normalize(&offers, 5);

        assert_eq!(prices(&result), vec!["450.00"]);

        // Without an exclusion the cheap offer comes back
        assert_eq!(OfferRanker::default().normalize(&offers, 5).len(), 2);
    }

    #[test]
    fn test_marketing_carrier_fallback() {
        let raw = serde_json::from_value::<RawOffer>(json!({
            "total_amount": "321.00",
            "total_currency": "GBP",
            "slices": [{
                "origin": {"name": "Los Angeles International Airport", "iata_code": "LAX"},
                "destination": {"name": "Glasgow Airport", "iata_code": "GLA"},
                "segments": [{
                    "origin": {"iata_code": "LAX"},
                    "destination": {"iata_code": "DUB"},
                    "departing_at": "2024-12-01T15:45:00",
                    "arriving_at": "2024-12-02T10:55:00",
                    "operating_carrier": {"name": "Aer Lingus", "iata_code": "EI"},
                    "marketing_carrier": {"name": "American Airlines", "iata_code": "AA", "logo_symbol_url": "https://logos.example/AA.svg"},
                    "marketing_carrier_flight_number": "8027"
                }, {
                    "origin": {"iata_code": "DUB"},
                    "destination": {"iata_code": "GLA"},
                    "departing_at": "2024-12-02T13:00:00",
                    "arriving_at": "2024-12-02T14:15:00",
                    "marketing_carrier": {"name": "Aer Lingus"}
                }]
            }]
        }))
        .unwrap();

        let itinerary = OfferRanker::default().itinerary(&raw).unwrap();

        assert_eq!(itinerary.price.to_string(), "GBP 321.00");
        assert_eq!(itinerary.airline_name, "Aer Lingus");
        assert_eq!(itinerary.logo_url, "https://logos.example/AA.svg");
        assert_eq!(itinerary.num_connections, 1);
        assert_eq!(itinerary.departure_time, "2024-12-01 03:45 PM");
        assert_eq!(itinerary.arrival_time, "2024-12-02 02:15 PM");

        let first = &itinerary.connections[0];
        assert_eq!(first.carrier, "Aer Lingus");
        assert_eq!(first.flight_code, "AA8027");
        assert_eq!((first.origin.as_str(), first.destination.as_str()), ("LAX", "DUB"));

        let second = &itinerary.connections[1];
        assert_eq!(second.carrier, "Aer Lingus");
        assert_eq!(second.flight_code, "N/A");
    }

    #[test]
    fn test_airline_name_from_first_leg() {
        let raw = offer(
            json!("488.00"),
            vec![
                segment("American Airlines", "AA", "32", "2024-12-01T06:00:00", "2024-12-01T14:25:00"),
                segment("Aer Lingus", "EI", "8760", "2024-12-01T19:30:00", "2024-12-02T07:40:00"),
            ],
        );

        let itinerary = OfferRanker::default().itinerary(&raw).unwrap();

        assert_eq!(itinerary.airline_name, "American Airlines");
        assert_eq!(itinerary.logo_url, "https://logos.example/AA.svg");
        assert_eq!(itinerary.connections[1].carrier, "Aer Lingus");
        assert_eq!(itinerary.connections[1].flight_code, "EI8760");
    }

    #[test]
    fn test_itinerary_serializes_display_price() {
        let itinerary = OfferRanker::default()
            .itinerary(&direct("300", "2024-12-01T18:30:00"))
            .unwrap();

        let value = serde_json::to_value(&itinerary).unwrap();
        assert_eq!(value["price"], "USD 300.00");
        assert_eq!(value["num_connections"], 0);
        assert_eq!(value["connections"][0]["flight_code"], "BA268");
    }

    #[test]
    fn test_placeholder_logo_and_defaults() {
        let raw = serde_json::from_value::<RawOffer>(json!({
            "total_amount": "75",
            "slices": [{"segments": [{"departing_at": "garbage"}]}]
        }))
        .unwrap();

        let itinerary = OfferRanker::default().itinerary(&raw).unwrap();
        assert_eq!(itinerary.logo_url, PLACEHOLDER_LOGO);
        assert_eq!(itinerary.airline_name, "Unknown Airline");
        assert_eq!(itinerary.connections[0].carrier, "Unknown Carrier");
        assert_eq!(itinerary.departure_time, "garbage");
        assert_eq!(itinerary.price.currency, "USD");
    }

    #[test]
    fn test_offer_without_segments_skipped() {
        let empty_slices = serde_json::from_value::<RawOffer>(json!({"total_amount": "1"})).unwrap();
        let empty_segments =
            serde_json::from_value::<RawOffer>(json!({"total_amount": "1", "slices": [{}]})).unwrap();

        let result = OfferRanker::default().normalize(&[empty_slices, empty_segments], 5);
        assert!(result.is_empty());
    }

    #[test]
    fn test_normalize_stops_at_max_results() {
        let offers: Vec<RawOffer> = (0..10)
            .map(|i| direct(&format!("{}.00", 900 - i * 50), &format!("2024-12-01T{:02}:00:00", i + 6)))
            .collect();

        let result = OfferRanker::default().normalize(&offers, 3);

        // Cheapest three across the whole response, even though they arrive last
        assert_eq!(prices(&result), vec!["450.00", "500.00", "550.00"]);
        assert!(OfferRanker::default().normalize(&offers, 0).is_empty());
    }

    #[test]
    fn test_filter_is_strict() {
        let offers = vec![
            direct("600.00", "2024-12-01T08:00:00"),
            direct("599.99", "2024-12-01T09:00:00"),
        ];
        let result = filter_under_price(OfferRanker::default().normalize(&offers, 5), 600.0);

        assert_eq!(prices(&result), vec!["599.99"]);
        assert!(result.iter().all(|i| i.effective_price() < 600.0));
    }

    #[test]
    fn test_take_cheapest_truncates() {
        let offers: Vec<RawOffer> = ["410", "120", "330", "250", "199", "505", "289"]
            .iter()
            .enumerate()
            .map(|(i, p)| direct(p, &format!("2024-12-01T{:02}:00:00", i + 6)))
            .collect();

        let result = take_cheapest(OfferRanker::default().normalize(&offers, 10), 5);

        assert_eq!(prices(&result), vec!["120.00", "199.00", "250.00", "289.00", "330.00"]);
    }

    #[test_case("2024-12-01T18:30:00", "2024-12-01 06:30 PM"; "#1 naive timestamp")]
    #[test_case("2024-12-01T00:05:00.000", "2024-12-01 12:05 AM"; "#2 fractional seconds")]
    #[test_case("2024-12-01T09:15:00+01:00", "2024-12-01 09:15 AM"; "#3 offset keeps local time")]
    #[test_case("2024-12-01T09:15", "2024-12-01 09:15 AM"; "#4 no seconds")]
    #[test_case("2024-12-01", "2024-12-01 12:00 AM"; "#5 date only")]
    #[test_case("soon", "soon"; "#6 passthrough")]
    fn test_format_time(input: &str, expected: &str) {
        assert_eq!(format_time(input), expected);
    }

    #[test]
    fn test_ranked_digest_covers_every_slice() {
        let mut round_trip = direct("310.00", "2024-12-01T08:00:00");
        let mut inbound = round_trip.slices[0].clone();
        inbound.origin.name = Some("Glasgow Airport".to_string());
        inbound.destination.name = Some("Los Angeles International Airport".to_string());
        round_trip.slices.push(inbound);

        let offers = vec![direct("abc", "2024-12-01T07:00:00"), round_trip, direct("150", "2024-12-01T06:00:00")];
        let digest = ranked_digest(&offers, 2);

        assert_eq!(digest.len(), 3);
        assert_eq!((digest[0].rank, digest[0].price.as_str()), (1, "USD 150.00"));
        assert_eq!((digest[1].rank, digest[1].price.as_str()), (2, "USD 310.00"));
        assert_eq!(digest[2].rank, 2);
        assert_eq!(digest[2].origin, "Glasgow Airport");
        assert_eq!(digest[1].segments[0].flight_code, "BA268");
        assert_eq!(digest[1].segments[0].airline, "British Airways");
    }

    #[test]
    fn test_sample_response_ranking() {
        let content = std::fs::read_to_string(SAMPLE_RESPONSE_PATH);
        assert!(content.is_ok(), "Failed to load sample response: {:?}", content.err());

        let body: Value = serde_json::from_str(&content.unwrap()).unwrap();
        let offers = crate::offer::offers_from_value(&body).unwrap();

        let ranker = OfferRanker::new(Some("Duffel Airways".to_string()));
        let result = take_cheapest(filter_under_price(ranker.normalize(&offers, 5), 600.0), 5);

        // The two Aer Lingus offers share price and times, so only one survives
        assert_eq!(prices(&result), vec!["489.10", "523.87", "598.00"]);
        assert_eq!(result[0].connections[0].flight_code, "EI146");
        assert!(result.iter().all(|i| i.effective_price() < 600.0));
        assert!(result.iter().all(|i| i.connections.iter().all(|c| c.carrier != "Duffel Airways")));
        assert!(result
            .windows(2)
            .all(|w| w[0].effective_price() <= w[1].effective_price()));
    }
}
