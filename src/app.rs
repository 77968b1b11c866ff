use serde::{Deserialize, Serialize};

use crate::capabilities::location::{LocationOutput, PermissionStatus};
use crate::capabilities::navigation::{NavigationOutput, PreviewScene};
use crate::capabilities::search::ResultType;
use crate::capabilities::store::StoreOutput;
use crate::capabilities::Capabilities;
use crate::error::{AppError, ErrorPage, LocationError, SearchError};
use crate::event::Event;
use crate::model::{
    AuthorizationState, Model, PlaceId, RetryIntent, SavedLocation, SearchSuggestion, UnixTimeMs,
};
use crate::{format_distance, format_duration};

#[derive(Default)]
pub struct App;

impl App {
    /// Validates and dispatches a search. Blank queries are rejected before
    /// any capability call; everything else bumps the search generation so
    /// that only the newest completion is applied.
    fn run_search(model: &mut Model, caps: &Capabilities, query: &str, result_type: ResultType) {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            tracing::warn!(target: "wayfind::search", "rejected blank query");
            model.raise(AppError::Search(SearchError::InvalidQuery));
            caps.render.render();
            return;
        }

        model.is_searching = true;
        model.last_intent = Some(RetryIntent::Search {
            query: trimmed.to_string(),
            result_type,
        });

        let generation = model.next_search_generation();
        let region = model.search_region();
        tracing::debug!(target: "wayfind::search", generation, "dispatching search");

        caps.search
            .query(trimmed.to_string(), result_type, region, move |response| {
                Event::SearchCompleted {
                    generation,
                    response: Box::new(response),
                }
            });
        caps.render.render();
    }

    /// Clears the current preview immediately, then asks the shell for a
    /// fresh one keyed to the current selection.
    fn request_preview(model: &mut Model, caps: &Capabilities) {
        model.preview = None;
        let Some(place) = model.selected_place().cloned() else {
            return;
        };

        let generation = model.next_preview_generation();
        caps.navigation.preview_scene(place, move |response| {
            Event::PreviewResolved {
                generation,
                response: Box::new(response),
            }
        });
    }

    /// Clears the current route immediately, then computes a fresh one from
    /// the last known location (or the fixed fallback) to the selection.
    fn request_route(model: &mut Model, caps: &Capabilities) {
        model.route = None;
        let Some(place) = model.selected_place().cloned() else {
            return;
        };

        let generation = model.next_route_generation();
        let origin = model.origin();
        caps.navigation
            .directions(origin, place.coordinate, move |response| {
                Event::RouteResolved {
                    generation,
                    response: Box::new(response),
                }
            });
    }

    fn fetch_saved(model: &mut Model, caps: &Capabilities) {
        model.last_intent = Some(RetryIntent::FetchSaved);
        caps.store
            .fetch_all(|response| Event::FetchResolved(Box::new(response)));
    }

    /// Folds the OS permission status into the tri-state authorization flag.
    /// Idempotent; the OS may report the same status repeatedly.
    fn apply_authorization(model: &mut Model, caps: &Capabilities, status: PermissionStatus) {
        match status {
            PermissionStatus::Authorized => {
                model.authorization = AuthorizationState::Authorized;
                if matches!(
                    model.active_error,
                    Some(AppError::Location(LocationError::PermissionDenied))
                ) {
                    model.clear_error();
                }
                caps.location
                    .position(|response| Event::PositionResolved(Box::new(response)));
                caps.render.render();
            }
            PermissionStatus::NotDetermined => {
                caps.location
                    .request_permission(|response| Event::PermissionResolved(Box::new(response)));
            }
            PermissionStatus::Denied | PermissionStatus::Restricted => {
                tracing::warn!(target: "wayfind::location", ?status, "location permission denied");
                model.authorization = AuthorizationState::Denied;
                model.raise(AppError::Location(LocationError::PermissionDenied));
                caps.render.render();
            }
        }
    }

    fn retry(model: &mut Model, caps: &Capabilities) {
        model.clear_error();
        match model.last_intent.clone() {
            Some(RetryIntent::Search { query, result_type }) => {
                Self::run_search(model, caps, &query, result_type);
            }
            Some(RetryIntent::SaveLocation(record)) => {
                caps.store
                    .save(*record, |response| Event::SaveResolved(Box::new(response)));
                caps.render.render();
            }
            Some(RetryIntent::DeleteLocation(id)) => {
                caps.store
                    .delete(id, |response| Event::DeleteResolved(Box::new(response)));
                caps.render.render();
            }
            Some(RetryIntent::FetchSaved) => {
                Self::fetch_saved(model, caps);
                caps.render.render();
            }
            None => caps.render.render(),
        }
    }

    fn build_markers(model: &Model) -> Vec<PlaceMarker> {
        model
            .results
            .iter()
            .enumerate()
            .map(|(index, place)| PlaceMarker {
                id: place.id.clone(),
                title: place.name.clone(),
                lat: place.coordinate.lat(),
                lon: place.coordinate.lon(),
                is_selected: model.selected == Some(index),
            })
            .collect()
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        tracing::debug!(target: "wayfind::core", event = event.name(), "handling event");

        match event {
            Event::AppStarted => {
                caps.location
                    .check_permission(|response| Event::PermissionResolved(Box::new(response)));
                Self::fetch_saved(model, caps);
                caps.render.render();
            }

            Event::AppForegrounded => {
                // The user may have changed the permission in system
                // settings while the app was backgrounded.
                caps.location
                    .check_permission(|response| Event::PermissionResolved(Box::new(response)));
            }

            Event::PermissionResolved(response) => match *response {
                Ok(LocationOutput::Permission(status)) => {
                    Self::apply_authorization(model, caps, status);
                }
                Ok(output) => {
                    tracing::warn!(target: "wayfind::location", ?output, "unexpected permission output");
                }
                Err(error) => {
                    tracing::warn!(target: "wayfind::location", error = %error, "permission check failed");
                }
            },

            Event::PositionResolved(response) => match *response {
                Ok(LocationOutput::Position(coordinate)) => {
                    model.user_location = Some(coordinate);
                    caps.render.render();
                }
                Ok(output) => {
                    tracing::warn!(target: "wayfind::location", ?output, "unexpected position output");
                }
                Err(error) => {
                    // Position failures are logged, not surfaced.
                    tracing::warn!(target: "wayfind::location", error = %error, "position update failed");
                }
            },

            Event::SettingsOpened(response) => {
                if let Err(error) = *response {
                    tracing::warn!(target: "wayfind::location", error = %error, "could not open system settings");
                }
            }

            Event::QueryChanged { query } => {
                model.query = query;
                caps.render.render();
            }

            Event::SearchSubmitted => {
                let query = model.query.clone();
                Self::run_search(model, caps, &query, ResultType::default());
            }

            Event::RecentSearchTapped { index } => {
                let Some(query) = model.recent_searches.get(index).cloned() else {
                    tracing::warn!(target: "wayfind::ui", index, "recent search out of range");
                    return;
                };
                model.query = query.clone();
                Self::run_search(model, caps, &query, ResultType::default());
            }

            Event::SearchCompleted {
                generation,
                response,
            } => {
                if generation != model.search_generation {
                    tracing::debug!(
                        target: "wayfind::search",
                        generation,
                        current = model.search_generation,
                        "dropping stale search completion"
                    );
                    return;
                }

                model.is_searching = false;
                match *response {
                    Ok(places) => {
                        model.suggestions =
                            places.iter().map(SearchSuggestion::from_place).collect();
                        model.results = places;
                        model.clear_selection();

                        if model.results.is_empty() {
                            model.raise(AppError::Search(SearchError::NoResults));
                        } else {
                            model.clear_error();
                            let last_query = match &model.last_intent {
                                Some(RetryIntent::Search { query, .. }) => Some(query.clone()),
                                _ => None,
                            };
                            if let Some(query) = last_query {
                                model.remember_query(&query);
                            }
                        }
                        caps.render.render();
                    }
                    Err(error) => {
                        tracing::error!(target: "wayfind::search", error = %error, "search failed");
                        model.raise(AppError::Search(SearchError::from(error)));
                        caps.render.render();
                    }
                }
            }

            Event::MapRegionChanged { region } => {
                model.region = Some(region);
            }

            Event::SuggestionTapped { index } => {
                if !model.select(index) {
                    tracing::warn!(target: "wayfind::ui", index, "selection out of range");
                    return;
                }
                Self::request_preview(model, caps);
                Self::request_route(model, caps);
                caps.render.render();
            }

            Event::SelectionCleared => {
                model.clear_selection();
                caps.render.render();
            }

            Event::PreviewResolved {
                generation,
                response,
            } => {
                if generation != model.preview_generation {
                    tracing::debug!(target: "wayfind::ui", generation, "dropping stale preview");
                    return;
                }
                match *response {
                    Ok(NavigationOutput::Preview(scene)) => {
                        model.preview = Some(scene);
                        caps.render.render();
                    }
                    Ok(output) => {
                        tracing::warn!(target: "wayfind::ui", ?output, "unexpected preview output");
                    }
                    Err(error) => {
                        // Soft-fail: the preview stays cleared.
                        tracing::warn!(target: "wayfind::ui", error = %error, "preview unavailable");
                    }
                }
            }

            Event::RouteResolved {
                generation,
                response,
            } => {
                if generation != model.route_generation {
                    tracing::debug!(target: "wayfind::ui", generation, "dropping stale route");
                    return;
                }
                match *response {
                    Ok(NavigationOutput::Route(route)) => {
                        model.route = Some(route);
                        caps.render.render();
                    }
                    Ok(output) => {
                        tracing::warn!(target: "wayfind::ui", ?output, "unexpected route output");
                    }
                    Err(error) => {
                        // Soft-fail: the route stays cleared.
                        tracing::warn!(target: "wayfind::ui", error = %error, "directions failed");
                    }
                }
            }

            Event::BookmarkTapped { index } => {
                let Some(suggestion) = model.suggestions.get(index).cloned() else {
                    tracing::warn!(target: "wayfind::store", index, "bookmark out of range");
                    return;
                };
                let record = SavedLocation::from_suggestion(&suggestion, UnixTimeMs::now());
                model.last_intent = Some(RetryIntent::SaveLocation(Box::new(record.clone())));
                caps.store
                    .save(record, |response| Event::SaveResolved(Box::new(response)));
            }

            Event::SavedLocationTapped { index } => {
                let Some(record) = model.saved_locations.get(index).cloned() else {
                    tracing::warn!(target: "wayfind::ui", index, "saved location out of range");
                    return;
                };
                model.query = record.address.clone();
                Self::run_search(model, caps, &record.address, ResultType::default());
            }

            Event::SavedLocationDeleted { index } => {
                let Some(record) = model.saved_locations.get(index).cloned() else {
                    tracing::warn!(target: "wayfind::store", index, "delete out of range");
                    return;
                };
                match record.id {
                    None => {
                        // A record that never reached the store has nothing
                        // to delete.
                        tracing::warn!(
                            target: "wayfind::store",
                            address = %record.address,
                            "ignoring delete of unpersisted record"
                        );
                    }
                    Some(id) => {
                        model.last_intent = Some(RetryIntent::DeleteLocation(id.clone()));
                        caps.store
                            .delete(id, |response| Event::DeleteResolved(Box::new(response)));
                    }
                }
            }

            Event::SaveResolved(response) => match *response {
                Ok(StoreOutput::Saved { record }) => {
                    tracing::info!(target: "wayfind::store", address = %record.address, "location saved");
                    Self::fetch_saved(model, caps);
                }
                Ok(output) => {
                    tracing::warn!(target: "wayfind::store", ?output, "unexpected save output");
                }
                Err(error) => {
                    tracing::error!(target: "wayfind::store", error = %error, "save failed");
                    model.raise(AppError::Persistence(error.into()));
                    caps.render.render();
                }
            },

            Event::DeleteResolved(response) => match *response {
                Ok(StoreOutput::Deleted { existed }) => {
                    if !existed {
                        tracing::warn!(target: "wayfind::store", "deleted record was already gone");
                    }
                    Self::fetch_saved(model, caps);
                }
                Ok(output) => {
                    tracing::warn!(target: "wayfind::store", ?output, "unexpected delete output");
                }
                Err(error) => {
                    tracing::error!(target: "wayfind::store", error = %error, "delete failed");
                    model.raise(AppError::Persistence(error.into()));
                    caps.render.render();
                }
            },

            Event::FetchResolved(response) => match *response {
                Ok(StoreOutput::Records(records)) => {
                    model.set_saved_locations(records);
                    caps.render.render();
                }
                Ok(output) => {
                    tracing::warn!(target: "wayfind::store", ?output, "unexpected fetch output");
                }
                Err(error) => {
                    tracing::error!(target: "wayfind::store", error = %error, "fetch failed");
                    model.raise(AppError::Persistence(error.into()));
                    caps.render.render();
                }
            },

            Event::RetryTapped => {
                Self::retry(model, caps);
            }

            Event::DismissErrorTapped => {
                model.clear_error();
                caps.render.render();
            }

            Event::OpenSettingsTapped => {
                caps.location
                    .open_settings(|response| Event::SettingsOpened(Box::new(response)));
                model.clear_error();
                caps.render.render();
            }
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        ViewModel {
            query: model.query.clone(),
            is_searching: model.is_searching,
            authorization: model.authorization,
            needs_permission_prompt: model.authorization.is_denied(),
            suggestions: model.suggestions.clone(),
            markers: Self::build_markers(model),
            selected_address: model
                .selected
                .and_then(|index| model.suggestions.get(index))
                .map(|suggestion| suggestion.address.clone()),
            preview: model.preview.clone(),
            route: model.route.as_ref().map(|route| RouteSummary {
                duration_text: format_duration(route.duration_secs),
                distance_text: format_distance(route.distance_meters),
            }),
            saved_locations: model
                .saved_locations
                .iter()
                .map(|record| SavedLocationItem {
                    name: record.name.clone(),
                    address: record.address.clone(),
                })
                .collect(),
            recent_searches: model.recent_searches.clone(),
            show_error: model.show_error,
            error_page: model.error_page.clone(),
        }
    }
}

/// Map pin for a search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceMarker {
    pub id: PlaceId,
    pub title: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub is_selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub duration_text: String,
    pub distance_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedLocationItem {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewModel {
    pub query: String,
    pub is_searching: bool,
    pub authorization: AuthorizationState,
    pub needs_permission_prompt: bool,
    pub suggestions: Vec<SearchSuggestion>,
    pub markers: Vec<PlaceMarker>,
    pub selected_address: Option<String>,
    pub preview: Option<PreviewScene>,
    pub route: Option<RouteSummary>,
    pub saved_locations: Vec<SavedLocationItem>,
    pub recent_searches: Vec<String>,
    pub show_error: bool,
    pub error_page: Option<ErrorPage>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::navigation::Route;
    use crate::capabilities::search::{AddressComponents, Place};
    use crate::model::Coordinate;
    use crux_core::App as _;

    fn place(id: &str, city: &str) -> Place {
        Place {
            id: PlaceId::new(id),
            name: Some(city.to_string()),
            coordinate: Coordinate::fallback(),
            address: AddressComponents {
                city: Some(city.to_string()),
                ..AddressComponents::default()
            },
        }
    }

    #[test]
    fn view_marks_selected_marker_and_address() {
        let results = vec![place("a", "Lagos"), place("b", "Ikeja")];
        let suggestions = results.iter().map(SearchSuggestion::from_place).collect();
        let mut model = Model {
            results,
            suggestions,
            ..Model::default()
        };
        assert!(model.select(1));

        let view = App.view(&model);

        assert!(!view.markers[0].is_selected);
        assert!(view.markers[1].is_selected);
        assert_eq!(view.selected_address.as_deref(), Some("Ikeja"));
    }

    #[test]
    fn view_formats_route_summary() {
        let model = Model {
            route: Some(Route {
                duration_secs: 720.0,
                distance_meters: 3400.0,
            }),
            ..Model::default()
        };

        let view = App.view(&model);
        let route = view.route.expect("route summary");
        assert_eq!(route.duration_text, "12 min");
        assert_eq!(route.distance_text, "3.4 km");
    }

    #[test]
    fn view_prompts_for_permission_only_when_denied() {
        let mut model = Model::default();
        assert!(!App.view(&model).needs_permission_prompt);

        model.authorization = AuthorizationState::Denied;
        assert!(App.view(&model).needs_permission_prompt);
    }
}
