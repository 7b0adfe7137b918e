use serde::{Deserialize, Serialize};

/// Operating status reported by the search provider.
///
/// Unknown provider values map to [`BusinessStatus::Unspecified`] rather than
/// failing the whole response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BusinessStatus {
    Operational,
    ClosedTemporarily,
    ClosedPermanently,
    Unspecified,
}

impl BusinessStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BusinessStatus::Operational => "OPERATIONAL",
            BusinessStatus::ClosedTemporarily => "CLOSED_TEMPORARILY",
            BusinessStatus::ClosedPermanently => "CLOSED_PERMANENTLY",
            BusinessStatus::Unspecified => "BUSINESS_STATUS_UNSPECIFIED",
        }
    }

    /// Strict parse used for configuration: unknown names are `None`.
    #[must_use]
    pub fn parse_known(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OPERATIONAL" => Some(BusinessStatus::Operational),
            "CLOSED_TEMPORARILY" => Some(BusinessStatus::ClosedTemporarily),
            "CLOSED_PERMANENTLY" => Some(BusinessStatus::ClosedPermanently),
            "BUSINESS_STATUS_UNSPECIFIED" => Some(BusinessStatus::Unspecified),
            _ => None,
        }
    }
}

impl From<String> for BusinessStatus {
    fn from(s: String) -> Self {
        Self::parse_known(&s).unwrap_or(BusinessStatus::Unspecified)
    }
}

impl From<BusinessStatus> for String {
    fn from(s: BusinessStatus) -> Self {
        s.as_str().to_string()
    }
}

impl std::fmt::Display for BusinessStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flat projection of a fetched place, ready for upsert keyed by `place_id`.
///
/// Nested provider structures (hours, photos) are kept as JSON; `raw_json`
/// is the untouched detail payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRow {
    pub place_id: String,
    pub name: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub rating: Option<f64>,
    pub user_rating_count: Option<i64>,
    /// Provider price tier, e.g. `"PRICE_LEVEL_MODERATE"`.
    pub price_level: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub categories: Vec<String>,
    pub primary_type: Option<String>,
    pub regular_hours: Option<serde_json::Value>,
    pub secondary_hours: Option<serde_json::Value>,
    pub editorial_summary: Option<String>,
    pub business_status: Option<BusinessStatus>,
    pub photos: Option<serde_json::Value>,
    pub raw_json: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_deserializes_known_and_unknown_values() {
        let known: BusinessStatus = serde_json::from_str("\"CLOSED_PERMANENTLY\"").unwrap();
        assert_eq!(known, BusinessStatus::ClosedPermanently);

        let unknown: BusinessStatus = serde_json::from_str("\"SOMETHING_NEW\"").unwrap();
        assert_eq!(unknown, BusinessStatus::Unspecified);
    }

    #[test]
    fn status_serializes_to_provider_name() {
        let s = serde_json::to_string(&BusinessStatus::Operational).unwrap();
        assert_eq!(s, "\"OPERATIONAL\"");
    }

    #[test]
    fn parse_known_is_case_insensitive_and_strict() {
        assert_eq!(
            BusinessStatus::parse_known(" operational "),
            Some(BusinessStatus::Operational)
        );
        assert_eq!(BusinessStatus::parse_known("OPEN"), None);
    }
}
