use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::capabilities::navigation::{PreviewScene, Route};
use crate::capabilities::search::{Place, ResultType};
use crate::error::{AppError, ErrorPage};
use crate::{
    DEFAULT_SEARCH_SPAN_DEG, FALLBACK_CENTER_LAT, FALLBACK_CENTER_LON, MAX_RECENT_SEARCHES,
};

// --- Typed IDs ---

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, Default)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

/// Region identifier of a search result. May be empty and may collide;
/// it is carried through for the shell, never used as a lookup key.
typed_id!(PlaceId);

typed_id!(RecordId);

impl RecordId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

// --- Coordinate: validated, NaN-safe ---

#[derive(Debug, Clone, Copy, Error, PartialEq)]
pub enum CoordinateError {
    #[error("latitude {0} is out of valid range [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} is out of valid range [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("coordinate value is not finite")]
    NonFinite,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(CoordinateError::NonFinite);
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(CoordinateError::LongitudeOutOfRange(lon));
        }
        Ok(Self { lat, lon })
    }

    /// Fixed fallback used as search centre and route origin when the
    /// device location is unknown.
    #[must_use]
    pub const fn fallback() -> Self {
        Self {
            lat: FALLBACK_CENTER_LAT,
            lon: FALLBACK_CENTER_LON,
        }
    }

    #[must_use]
    pub const fn lat(self) -> f64 {
        self.lat
    }

    #[must_use]
    pub const fn lon(self) -> f64 {
        self.lon
    }
}

/// Bounding region handed to the search service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub center: Coordinate,
    pub span_lat: f64,
    pub span_lon: f64,
}

impl Region {
    #[must_use]
    pub const fn around(center: Coordinate) -> Self {
        Self {
            center,
            span_lat: DEFAULT_SEARCH_SPAN_DEG,
            span_lon: DEFAULT_SEARCH_SPAN_DEG,
        }
    }

    #[must_use]
    pub const fn with_span(center: Coordinate, span_lat: f64, span_lon: f64) -> Self {
        Self {
            center,
            span_lat,
            span_lon,
        }
    }
}

/// Explicit timestamp unit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnixTimeMs(pub u64);

impl UnixTimeMs {
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn now() -> Self {
        let ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self(ms)
    }

    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0
    }
}

// --- Authorization ---

/// Mutated only by the OS permission callback; the OS may flip it at any
/// time, so no state is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationState {
    #[default]
    Unknown,
    Authorized,
    Denied,
}

impl AuthorizationState {
    #[must_use]
    pub const fn is_authorized(self) -> bool {
        matches!(self, Self::Authorized)
    }

    #[must_use]
    pub const fn is_denied(self) -> bool {
        matches!(self, Self::Denied)
    }
}

// --- Suggestions & saved locations ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSuggestion {
    pub id: PlaceId,
    pub address: String,
    pub is_selected: bool,
}

impl SearchSuggestion {
    #[must_use]
    pub fn from_place(place: &Place) -> Self {
        Self {
            id: place.id.clone(),
            address: place.address.formatted(),
            is_selected: false,
        }
    }
}

/// Persisted bookmark record. `id` is `None` for a record that was never
/// handed to the store; deleting such a record is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedLocation {
    pub id: Option<RecordId>,
    pub name: String,
    pub address: String,
    pub location_id: PlaceId,
    pub saved_at: UnixTimeMs,
}

impl SavedLocation {
    #[must_use]
    pub fn from_suggestion(suggestion: &SearchSuggestion, saved_at: UnixTimeMs) -> Self {
        Self {
            id: Some(RecordId::generate()),
            name: derive_name(&suggestion.address),
            address: suggestion.address.clone(),
            location_id: suggestion.id.clone(),
            saved_at,
        }
    }
}

/// Name placeholder: the first address component, or a generic label when
/// the address is empty.
fn derive_name(address: &str) -> String {
    address
        .split(',')
        .next()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map_or_else(|| "Saved place".to_string(), ToString::to_string)
}

// --- Retry ---

/// The last attempted user-facing action; re-executed by the error page's
/// retry affordance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryIntent {
    Search {
        query: String,
        result_type: ResultType,
    },
    SaveLocation(Box<SavedLocation>),
    DeleteLocation(RecordId),
    FetchSaved,
}

// --- Model ---

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Model {
    pub authorization: AuthorizationState,
    pub user_location: Option<Coordinate>,
    pub region: Option<Region>,

    // Search
    pub query: String,
    pub is_searching: bool,
    pub results: Vec<Place>,
    pub suggestions: Vec<SearchSuggestion>,
    pub recent_searches: Vec<String>,

    // Selection
    pub selected: Option<usize>,
    pub preview: Option<PreviewScene>,
    pub route: Option<Route>,

    // Saved locations
    pub saved_locations: Vec<SavedLocation>,

    // Error state; only `raise`/`clear_error` may touch these three.
    pub active_error: Option<AppError>,
    pub error_page: Option<ErrorPage>,
    pub show_error: bool,

    pub last_intent: Option<RetryIntent>,

    // Latest-request-wins: completions carrying an older generation are
    // dropped.
    pub search_generation: u64,
    pub preview_generation: u64,
    pub route_generation: u64,
}

impl Model {
    /// Sets the classified error, its presentation model and the visibility
    /// flag together. A new error unconditionally replaces the previous one.
    pub fn raise(&mut self, error: AppError) {
        self.error_page = Some(ErrorPage::for_error(&error));
        self.active_error = Some(error);
        self.show_error = true;
    }

    pub fn clear_error(&mut self) {
        self.active_error = None;
        self.error_page = None;
        self.show_error = false;
    }

    #[must_use]
    pub fn selected_place(&self) -> Option<&Place> {
        self.selected.and_then(|index| self.results.get(index))
    }

    /// Last known device location, falling back to the fixed city centre.
    #[must_use]
    pub fn origin(&self) -> Coordinate {
        self.user_location.unwrap_or_else(Coordinate::fallback)
    }

    #[must_use]
    pub fn search_region(&self) -> Region {
        self.region.unwrap_or_else(|| Region::around(self.origin()))
    }

    pub fn next_search_generation(&mut self) -> u64 {
        self.search_generation += 1;
        self.search_generation
    }

    pub fn next_preview_generation(&mut self) -> u64 {
        self.preview_generation += 1;
        self.preview_generation
    }

    pub fn next_route_generation(&mut self) -> u64 {
        self.route_generation += 1;
        self.route_generation
    }

    /// Marks the suggestion at `index` selected. Returns false when the
    /// index is out of range, in which case nothing changes.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.suggestions.len() {
            return false;
        }
        self.selected = Some(index);
        for (i, suggestion) in self.suggestions.iter_mut().enumerate() {
            suggestion.is_selected = i == index;
        }
        true
    }

    /// Drops the selection together with its preview and route, and
    /// invalidates any in-flight preview/route requests.
    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.preview = None;
        self.route = None;
        self.preview_generation += 1;
        self.route_generation += 1;
        for suggestion in &mut self.suggestions {
            suggestion.is_selected = false;
        }
    }

    /// Replaces the saved-location cache, restoring the canonical order
    /// regardless of how the shell returned the records.
    pub fn set_saved_locations(&mut self, mut records: Vec<SavedLocation>) {
        records.sort_by(|a, b| a.saved_at.cmp(&b.saved_at).then_with(|| a.name.cmp(&b.name)));
        self.saved_locations = records;
    }

    /// Puts `query` at the front of the recent-search history, deduplicated
    /// and capped.
    pub fn remember_query(&mut self, query: &str) {
        self.recent_searches.retain(|q| q != query);
        self.recent_searches.insert(0, query.to_string());
        self.recent_searches.truncate(MAX_RECENT_SEARCHES);
    }
}
