use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Coordinate, PlaceId, Region};

/// Free-text place search against the platform's location-search service.
/// The service is a black box: the core hands it a query, a result-type
/// filter and a bounding region, and gets back matched places in service
/// order.
#[derive(Clone)]
pub struct PlaceSearch<Ev> {
    context: CapabilityContext<SearchOperation, Ev>,
}

impl<Ev> std::fmt::Debug for PlaceSearch<Ev> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaceSearch").finish_non_exhaustive()
    }
}

impl<Ev> Capability<Ev> for PlaceSearch<Ev> {
    type Operation = SearchOperation;
    type MappedSelf<MappedEv> = PlaceSearch<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        PlaceSearch::new(self.context.map_event(f))
    }
}

impl<Ev> PlaceSearch<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<SearchOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn query<F>(&self, query: String, result_type: ResultType, region: Region, make_event: F)
    where
        F: FnOnce(SearchResponse) -> Ev + Send + 'static,
        Ev: Send,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let response = context
                .request_from_shell(SearchOperation::Query {
                    query,
                    result_type,
                    region,
                })
                .await;
            context.update_app(make_event(response));
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum SearchOperation {
    Query {
        query: String,
        result_type: ResultType,
        region: Region,
    },
}

impl Operation for SearchOperation {
    type Output = SearchResponse;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResultType {
    #[default]
    PointOfInterest,
    Address,
}

/// Structured address of a matched place. Every component is optional;
/// the search service fills in whatever it knows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressComponents {
    pub house_number: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

impl AddressComponents {
    /// Joins the non-absent components with ", " in fixed field order.
    /// The order never changes and no field is duplicated; an address with
    /// no components formats to the empty string.
    #[must_use]
    pub fn formatted(&self) -> String {
        [
            &self.house_number,
            &self.street,
            &self.city,
            &self.region,
            &self.postal_code,
            &self.country,
        ]
        .iter()
        .filter_map(|part| part.as_deref())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: PlaceId,
    pub name: Option<String>,
    pub coordinate: Coordinate,
    pub address: AddressComponents,
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum SearchServiceError {
    #[error("no internet connection")]
    Offline,

    #[error("search failed: {message}")]
    Failed { message: String },
}

pub type SearchResponse = Result<Vec<Place>, SearchServiceError>;
