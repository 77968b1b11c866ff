use serde::{Deserialize, Serialize};

use crate::capabilities::location::LocationResponse;
use crate::capabilities::navigation::NavigationResponse;
use crate::capabilities::search::SearchResponse;
use crate::capabilities::store::StoreResponse;
use crate::model::Region;

/// Everything that can happen to the core: user intents from the shell and
/// completions of capability requests. Capability responses are boxed to
/// keep the enum small.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    // Lifecycle
    AppStarted,
    AppForegrounded,

    // Location & permissions
    PermissionResolved(Box<LocationResponse>),
    PositionResolved(Box<LocationResponse>),
    SettingsOpened(Box<LocationResponse>),

    // Search
    QueryChanged { query: String },
    SearchSubmitted,
    RecentSearchTapped { index: usize },
    SearchCompleted {
        generation: u64,
        response: Box<SearchResponse>,
    },

    // Map
    MapRegionChanged { region: Region },

    // Selection, preview & route
    SuggestionTapped { index: usize },
    SelectionCleared,
    PreviewResolved {
        generation: u64,
        response: Box<NavigationResponse>,
    },
    RouteResolved {
        generation: u64,
        response: Box<NavigationResponse>,
    },

    // Saved locations
    BookmarkTapped { index: usize },
    SavedLocationTapped { index: usize },
    SavedLocationDeleted { index: usize },
    SaveResolved(Box<StoreResponse>),
    DeleteResolved(Box<StoreResponse>),
    FetchResolved(Box<StoreResponse>),

    // Error presentation
    RetryTapped,
    DismissErrorTapped,
    OpenSettingsTapped,
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AppStarted => "app_started",
            Self::AppForegrounded => "app_foregrounded",
            Self::PermissionResolved(_) => "permission_resolved",
            Self::PositionResolved(_) => "position_resolved",
            Self::SettingsOpened(_) => "settings_opened",
            Self::QueryChanged { .. } => "query_changed",
            Self::SearchSubmitted => "search_submitted",
            Self::RecentSearchTapped { .. } => "recent_search_tapped",
            Self::SearchCompleted { .. } => "search_completed",
            Self::MapRegionChanged { .. } => "map_region_changed",
            Self::SuggestionTapped { .. } => "suggestion_tapped",
            Self::SelectionCleared => "selection_cleared",
            Self::PreviewResolved { .. } => "preview_resolved",
            Self::RouteResolved { .. } => "route_resolved",
            Self::BookmarkTapped { .. } => "bookmark_tapped",
            Self::SavedLocationTapped { .. } => "saved_location_tapped",
            Self::SavedLocationDeleted { .. } => "saved_location_deleted",
            Self::SaveResolved(_) => "save_resolved",
            Self::DeleteResolved(_) => "delete_resolved",
            Self::FetchResolved(_) => "fetch_resolved",
            Self::RetryTapped => "retry_tapped",
            Self::DismissErrorTapped => "dismiss_error_tapped",
            Self::OpenSettingsTapped => "open_settings_tapped",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_size_is_reasonable() {
        // Boxing the capability responses keeps the enum small.
        let size = std::mem::size_of::<Event>();
        assert!(
            size <= 64,
            "Event enum is {size} bytes - box more variants"
        );
    }

    #[test]
    fn event_names_are_stable() {
        assert_eq!(Event::AppStarted.name(), "app_started");
        assert_eq!(Event::SearchSubmitted.name(), "search_submitted");
        assert_eq!(
            Event::QueryChanged {
                query: "x".into()
            }
            .name(),
            "query_changed"
        );
    }
}
