use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque credentials supplied at configuration time.
///
/// Both tokens are passed through to the API unparsed; Auriga never
/// inspects or refreshes them itself.
#[derive(Debug, Clone)]
pub struct Auth {
    pub session_token: String,
    pub access_token: String,
}

/// Account-level fields returned by the "user" endpoint.
///
/// Every field is optional: the endpoint omits fields the account has no
/// data for, and an absent field must stay representable so the metric
/// layer can report per-metric unavailability instead of failing decode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub nickname: Option<String>,

    /// Cumulative top speed as mirrored into the profile record.
    /// The statistics endpoint carries the authoritative value.
    #[serde(default)]
    pub statistics_top_speed: Option<f64>,
}

/// Aggregate usage fields returned by the "statistics" endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Statistics {
    /// Total distance driven in kilometers
    #[serde(default)]
    pub km_driven: Option<f64>,

    /// Number of speeding fines avoided
    #[serde(default)]
    pub fines_avoided: Option<f64>,

    /// Total time driven in seconds
    #[serde(default)]
    pub sec_driven: Option<f64>,

    /// Number of traffic jams encountered
    #[serde(default)]
    pub times_in_traffic: Option<f64>,

    /// Best 0-100 km/h sprint in milliseconds
    #[serde(default)]
    pub top_100_sprint_ms: Option<f64>,

    /// Longest streak of consecutive driving days
    #[serde(default)]
    pub top_consecutive_days: Option<f64>,

    /// Highest recorded speed in km/h
    #[serde(default)]
    pub top_speed: Option<f64>,

    /// Number of ratings given
    #[serde(default)]
    pub total_ratings: Option<f64>,

    /// Set of country codes driven in
    #[serde(default)]
    pub countries_visited: Option<Vec<String>>,

    /// Set of province codes driven in
    #[serde(default)]
    pub provinces_visited: Option<Vec<String>>,
}

/// Immutable combined result of one successful refresh.
///
/// A snapshot is built atomically once both fetches succeed and replaces
/// the previous one wholesale; consumers only ever see it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub profile: Profile,
    pub statistics: Statistics,
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    /// Combine the two fetch results into a snapshot stamped with now.
    pub fn new(profile: Profile, statistics: Statistics) -> Self {
        Self {
            profile,
            statistics,
            fetched_at: Utc::now(),
        }
    }
}
