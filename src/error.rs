use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capabilities::location::LocationServiceError;
use crate::capabilities::search::SearchServiceError;
use crate::capabilities::store::StoreError;

/// Errors related to location services and permissions.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationError {
    #[error("location access is needed to show nearby places")]
    PermissionDenied,

    #[error("unable to get your location")]
    Unavailable,

    #[error("location service error")]
    UpdateFailed,
}

/// Errors related to map search operations.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchError {
    #[error("no internet connection")]
    NetworkUnavailable,

    #[error("search failed: {0}")]
    Failed(String),

    #[error("no locations found for your search")]
    NoResults,

    #[error("please enter a valid search")]
    InvalidQuery,
}

/// Errors related to the saved-location record store.
#[allow(clippy::enum_variant_names)]
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersistenceError {
    #[error("unable to save location: {0}")]
    SaveFailed(String),

    #[error("unable to delete location: {0}")]
    DeleteFailed(String),

    #[error("unable to load saved locations: {0}")]
    FetchFailed(String),
}

/// Closed application error taxonomy. Classification dispatches on the
/// domain variant; anything without a known domain lands in `Other`.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppError {
    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("this feature is currently unavailable")]
    FeatureUnavailable,

    #[error("{0}")]
    Other(String),
}

impl From<SearchServiceError> for SearchError {
    fn from(error: SearchServiceError) -> Self {
        match error {
            SearchServiceError::Offline => Self::NetworkUnavailable,
            SearchServiceError::Failed { message } => Self::Failed(message),
        }
    }
}

impl From<LocationServiceError> for LocationError {
    fn from(error: LocationServiceError) -> Self {
        match error {
            LocationServiceError::Unavailable { .. } => Self::Unavailable,
            LocationServiceError::UpdateFailed { .. } => Self::UpdateFailed,
        }
    }
}

impl From<StoreError> for PersistenceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::SaveFailed { reason } => Self::SaveFailed(reason),
            StoreError::DeleteFailed { reason } => Self::DeleteFailed(reason),
            StoreError::FetchFailed { reason } => Self::FetchFailed(reason),
        }
    }
}

/// Action offered next to the retry button on an error page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecondaryAction {
    OpenSettings,
}

impl SecondaryAction {
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::OpenSettings => "Open Settings",
        }
    }
}

/// Presentable description of a classified error. Never persisted; it is
/// derived from the active error and cleared together with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPage {
    pub title: String,
    pub description: String,
    pub icon: String,
    pub can_retry: bool,
    pub secondary_action: Option<SecondaryAction>,
}

impl ErrorPage {
    #[must_use]
    pub fn for_error(error: &AppError) -> Self {
        match error {
            AppError::Location(e) => Self::location(e),
            AppError::Search(e) => Self::search(e),
            AppError::Persistence(e) => Self::persistence(e),
            AppError::FeatureUnavailable | AppError::Other(_) => Self::generic(),
        }
    }

    #[must_use]
    pub fn secondary_action_title(&self) -> Option<&'static str> {
        self.secondary_action.map(SecondaryAction::title)
    }

    fn location(error: &LocationError) -> Self {
        match error {
            LocationError::PermissionDenied => Self::page(
                "Location Access Needed",
                "Wayfind needs your location to show nearby places and give directions.",
                "location.slash.fill",
                false,
                Some(SecondaryAction::OpenSettings),
            ),
            LocationError::Unavailable => Self::page(
                "Location Unavailable",
                "We can't get your location right now. Make sure Location Services are enabled.",
                "location.slash.circle.fill",
                true,
                None,
            ),
            LocationError::UpdateFailed => Self::page(
                "Location Update Failed",
                "There was a problem updating your location. Please try again.",
                "exclamationmark.triangle.fill",
                true,
                None,
            ),
        }
    }

    fn search(error: &SearchError) -> Self {
        match error {
            SearchError::NetworkUnavailable => Self::page(
                "No Internet Connection",
                "Check your connection and try again.",
                "wifi.slash",
                true,
                None,
            ),
            SearchError::Failed(_) => Self::page(
                "Search Failed",
                "Something went wrong while searching. Please try again.",
                "exclamationmark.magnifyingglass",
                true,
                None,
            ),
            SearchError::NoResults => Self::page(
                "No Results Found",
                "We couldn't find any locations matching your search. Try a different search term.",
                "mappin.slash",
                false,
                None,
            ),
            SearchError::InvalidQuery => Self::page(
                "Invalid Search",
                "Please enter a valid location or place name.",
                "text.magnifyingglass",
                false,
                None,
            ),
        }
    }

    fn persistence(error: &PersistenceError) -> Self {
        match error {
            PersistenceError::SaveFailed(_) => Self::page(
                "Save Failed",
                "We couldn't save this location. Please try again.",
                "bookmark.slash.fill",
                true,
                None,
            ),
            PersistenceError::DeleteFailed(_) => Self::page(
                "Delete Failed",
                "We couldn't delete this location. Please try again.",
                "trash.slash.fill",
                true,
                None,
            ),
            PersistenceError::FetchFailed(_) => Self::page(
                "Load Failed",
                "We couldn't load your saved locations. Please try again.",
                "externaldrive.fill.badge.exclamationmark",
                true,
                None,
            ),
        }
    }

    fn generic() -> Self {
        Self::page(
            "Something Went Wrong",
            "An unexpected error occurred. Please try again.",
            "exclamationmark.circle.fill",
            true,
            None,
        )
    }

    fn page(
        title: &str,
        description: &str,
        icon: &str,
        can_retry: bool,
        secondary_action: Option<SecondaryAction>,
    ) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            icon: icon.to_string(),
            can_retry,
            secondary_action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_denied_offers_settings_but_no_retry() {
        let page = ErrorPage::for_error(&AppError::Location(LocationError::PermissionDenied));
        assert_eq!(page.title, "Location Access Needed");
        assert!(!page.can_retry);
        assert_eq!(page.secondary_action, Some(SecondaryAction::OpenSettings));
        assert_eq!(page.secondary_action_title(), Some("Open Settings"));
    }

    #[test]
    fn other_location_errors_offer_retry() {
        for error in [LocationError::Unavailable, LocationError::UpdateFailed] {
            let page = ErrorPage::for_error(&AppError::Location(error));
            assert!(page.can_retry);
            assert_eq!(page.secondary_action, None);
        }
    }

    #[test]
    fn retryable_search_errors() {
        for error in [
            SearchError::NetworkUnavailable,
            SearchError::Failed("timeout".into()),
        ] {
            let page = ErrorPage::for_error(&AppError::Search(error));
            assert!(page.can_retry);
        }
    }

    #[test]
    fn non_retryable_search_errors() {
        for error in [SearchError::NoResults, SearchError::InvalidQuery] {
            let page = ErrorPage::for_error(&AppError::Search(error));
            assert!(!page.can_retry);
            assert_eq!(page.secondary_action, None);
        }
    }

    #[test]
    fn persistence_errors_all_offer_retry() {
        for error in [
            PersistenceError::SaveFailed("disk".into()),
            PersistenceError::DeleteFailed("disk".into()),
            PersistenceError::FetchFailed("disk".into()),
        ] {
            let page = ErrorPage::for_error(&AppError::Persistence(error));
            assert!(page.can_retry);
        }
    }

    #[test]
    fn unclassified_errors_fall_through_to_generic() {
        let page = ErrorPage::for_error(&AppError::Other("boom".into()));
        assert_eq!(page.title, "Something Went Wrong");
        assert!(page.can_retry);

        let page = ErrorPage::for_error(&AppError::FeatureUnavailable);
        assert_eq!(page.title, "Something Went Wrong");
    }

    #[test]
    fn service_errors_map_into_domain_variants() {
        assert_eq!(
            SearchError::from(SearchServiceError::Offline),
            SearchError::NetworkUnavailable
        );
        assert_eq!(
            SearchError::from(SearchServiceError::Failed {
                message: "500".into()
            }),
            SearchError::Failed("500".into())
        );
        assert_eq!(
            PersistenceError::from(StoreError::SaveFailed {
                reason: "disk full".into()
            }),
            PersistenceError::SaveFailed("disk full".into())
        );
        assert_eq!(
            LocationError::from(LocationServiceError::Unavailable {
                reason: "gps off".into()
            }),
            LocationError::Unavailable
        );
    }

    #[test]
    fn error_messages_are_user_readable() {
        assert_eq!(
            AppError::Search(SearchError::NetworkUnavailable).to_string(),
            "no internet connection"
        );
        assert_eq!(
            AppError::Search(SearchError::Failed("rate limited".into())).to_string(),
            "search failed: rate limited"
        );
    }
}
