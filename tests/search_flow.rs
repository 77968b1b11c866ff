use crux_core::testing::AppTester;

use wayfind_core::capabilities::search::{AddressComponents, Place, SearchServiceError};
use wayfind_core::model::{Coordinate, PlaceId};
use wayfind_core::{App, Effect, Event, Model};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn place(id: &str, street: Option<&str>, city: Option<&str>) -> Place {
    Place {
        id: PlaceId::new(id),
        name: None,
        coordinate: Coordinate::new(6.5244, 3.3792).unwrap(),
        address: AddressComponents {
            street: street.map(String::from),
            city: city.map(String::from),
            ..AddressComponents::default()
        },
    }
}

fn submit_search(
    app: &AppTester<App, Effect>,
    model: &mut Model,
    query: &str,
) -> Vec<Effect> {
    app.update(
        Event::QueryChanged {
            query: query.to_string(),
        },
        model,
    );
    app.update(Event::SearchSubmitted, model).effects
}

#[test]
fn blank_query_is_rejected_without_a_search_call() {
    init_logging();
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let effects = submit_search(&app, &mut model, "  ");

    assert!(
        !effects.iter().any(|e| matches!(e, Effect::Search(_))),
        "blank query must not reach the search service"
    );
    assert!(!model.is_searching);
    assert!(model.suggestions.is_empty());

    let page = model.error_page.as_ref().expect("error page");
    assert_eq!(page.title, "Invalid Search");
    assert!(!page.can_retry);
    assert!(model.show_error);
}

#[test]
fn submitting_a_query_sets_loading_and_dispatches_search() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let effects = submit_search(&app, &mut model, "coffee");

    assert!(model.is_searching);
    assert!(effects.iter().any(|e| matches!(e, Effect::Search(_))));
    assert!(effects.iter().any(|e| matches!(e, Effect::Render(_))));
}

#[test]
fn successful_search_derives_suggestions_in_result_order() {
    init_logging();
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    submit_search(&app, &mut model, "coffee");

    let results = vec![
        place("r1", Some("Main St"), Some("Lagos")),
        place("r2", None, Some("Lagos")),
        place("r3", None, None),
    ];
    app.update(
        Event::SearchCompleted {
            generation: model.search_generation,
            response: Box::new(Ok(results)),
        },
        &mut model,
    );

    assert!(!model.is_searching);
    assert!(model.active_error.is_none());

    let addresses: Vec<&str> = model
        .suggestions
        .iter()
        .map(|s| s.address.as_str())
        .collect();
    assert_eq!(addresses, vec!["Main St, Lagos", "Lagos", ""]);

    // Successful searches land in the recent-search history.
    assert_eq!(model.recent_searches.first().map(String::as_str), Some("coffee"));
}

#[test]
fn zero_results_raise_no_results_and_keep_the_empty_set() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    submit_search(&app, &mut model, "coffee");

    app.update(
        Event::SearchCompleted {
            generation: model.search_generation,
            response: Box::new(Ok(vec![])),
        },
        &mut model,
    );

    assert!(!model.is_searching);
    assert!(model.results.is_empty());
    assert!(model.suggestions.is_empty());

    let page = model.error_page.as_ref().expect("error page");
    assert_eq!(page.title, "No Results Found");
    assert!(!page.can_retry);
}

#[test]
fn connectivity_failure_maps_to_network_unavailable() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    submit_search(&app, &mut model, "coffee");

    app.update(
        Event::SearchCompleted {
            generation: model.search_generation,
            response: Box::new(Err(SearchServiceError::Offline)),
        },
        &mut model,
    );

    let page = model.error_page.as_ref().expect("error page");
    assert_eq!(page.title, "No Internet Connection");
    assert!(page.can_retry);
    assert!(!model.is_searching);
}

#[test]
fn other_failures_map_to_search_failed() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    submit_search(&app, &mut model, "coffee");

    app.update(
        Event::SearchCompleted {
            generation: model.search_generation,
            response: Box::new(Err(SearchServiceError::Failed {
                message: "server melted".into(),
            })),
        },
        &mut model,
    );

    let page = model.error_page.as_ref().expect("error page");
    assert_eq!(page.title, "Search Failed");
    assert!(page.can_retry);
}

#[test]
fn stale_completion_is_dropped() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    submit_search(&app, &mut model, "coffee");
    let first_generation = model.search_generation;

    submit_search(&app, &mut model, "tea");
    assert!(model.search_generation > first_generation);

    // The older request completes after the newer one started.
    app.update(
        Event::SearchCompleted {
            generation: first_generation,
            response: Box::new(Ok(vec![place("r1", Some("Main St"), Some("Lagos"))])),
        },
        &mut model,
    );

    assert!(model.suggestions.is_empty(), "stale results must be ignored");
    assert!(model.is_searching, "newest request is still in flight");

    // The newest completion wins.
    app.update(
        Event::SearchCompleted {
            generation: model.search_generation,
            response: Box::new(Ok(vec![place("r2", None, Some("Lagos"))])),
        },
        &mut model,
    );
    assert_eq!(model.suggestions.len(), 1);
    assert!(!model.is_searching);
}

#[test]
fn retry_reruns_the_last_search() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    submit_search(&app, &mut model, "coffee");

    app.update(
        Event::SearchCompleted {
            generation: model.search_generation,
            response: Box::new(Err(SearchServiceError::Offline)),
        },
        &mut model,
    );
    assert!(model.show_error);

    let update = app.update(Event::RetryTapped, &mut model);

    assert!(model.active_error.is_none());
    assert!(model.is_searching);
    assert!(update.effects.iter().any(|e| matches!(e, Effect::Search(_))));
}

#[test]
fn dismissing_clears_all_error_state_together() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    submit_search(&app, &mut model, "   ");
    assert!(model.show_error);

    app.update(Event::DismissErrorTapped, &mut model);

    assert!(model.active_error.is_none());
    assert!(model.error_page.is_none());
    assert!(!model.show_error);
}

#[test]
fn recent_search_tap_reruns_the_query() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    submit_search(&app, &mut model, "coffee");
    app.update(
        Event::SearchCompleted {
            generation: model.search_generation,
            response: Box::new(Ok(vec![place("r1", None, Some("Lagos"))])),
        },
        &mut model,
    );

    let update = app.update(Event::RecentSearchTapped { index: 0 }, &mut model);

    assert_eq!(model.query, "coffee");
    assert!(model.is_searching);
    assert!(update.effects.iter().any(|e| matches!(e, Effect::Search(_))));
}

#[test]
fn view_model_serializes_for_the_shell() {
    use crux_core::App as _;

    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    submit_search(&app, &mut model, "coffee");
    app.update(
        Event::SearchCompleted {
            generation: model.search_generation,
            response: Box::new(Ok(vec![place("r1", Some("Main St"), Some("Lagos"))])),
        },
        &mut model,
    );

    let view = App.view(&model);
    let json = serde_json::to_value(&view).expect("view model serializes");
    assert_eq!(json["suggestions"][0]["address"], "Main St, Lagos");
}
