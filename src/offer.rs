use serde::{Deserialize, Serialize};
use tracing::warn;

// Data structures for the offer-search JSON response.
// Fields are optional since the search API omits carrier details freely.
// Offers are decoded one at a time so a malformed offer is dropped on its own.

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RawOffer {
    pub id: Option<String>,
    pub total_amount: Option<RawAmount>,
    pub total_currency: Option<String>,
    pub slices: Vec<RawSlice>,
}

// The API documents `total_amount` as a decimal string, but recorded
// responses also carry plain numbers.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RawSlice {
    pub origin: RawPlace,
    pub destination: RawPlace,
    pub segments: Vec<RawSegment>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RawPlace {
    pub name: Option<String>,
    pub iata_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RawSegment {
    pub origin: RawPlace,
    pub destination: RawPlace,
    pub departing_at: Option<String>,
    pub arriving_at: Option<String>,
    pub operating_carrier: Option<RawCarrier>,
    pub marketing_carrier: Option<RawCarrier>,
    pub operating_carrier_flight_number: Option<String>,
    pub marketing_carrier_flight_number: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RawCarrier {
    pub name: Option<String>,
    pub iata_code: Option<String>,
    pub logo_symbol_url: Option<String>,
}

impl RawSegment {
    pub fn operating_name(&self) -> Option<&str> {
        non_empty(self.operating_carrier.as_ref().and_then(|c| c.name.as_deref()))
    }

    pub fn marketing_name(&self) -> Option<&str> {
        non_empty(self.marketing_carrier.as_ref().and_then(|c| c.name.as_deref()))
    }

    // True if either carrier on the segment is displayed under `name`
    pub fn is_carried_by(&self, name: &str) -> bool {
        self.operating_name() == Some(name) || self.marketing_name() == Some(name)
    }
}

// Treat "" the same as a missing value, matching how the API pads fields
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

// Pull the offers list out of a raw response body, skipping offers that
// fail to decode. Returns None when the body lacks the `data.offers` list.
pub fn offers_from_value(body: &serde_json::Value) -> Option<Vec<RawOffer>> {
    let offers = body.get("data")?.get("offers")?.as_array()?;

    let decoded = offers
        .iter()
        .enumerate()
        .filter_map(|(index, offer)| match RawOffer::deserialize(offer) {
            Ok(offer) => Some(offer),
            Err(e) => {
                let id = offer.get("id").and_then(|id| id.as_str()).unwrap_or("?");
                warn!(index, offer_id = %id, error = %e, "Skipping undecodable offer");
                None
            }
        })
        .collect();

    Some(decoded)
}
