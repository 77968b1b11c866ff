use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{RecordId, SavedLocation};

/// Local record store for saved locations. The store is append-only from
/// the core's point of view: records are created, deleted by identity and
/// fetched with an optional filter. Duplicate addresses are allowed.
#[derive(Clone)]
pub struct SavedLocationStore<Ev> {
    context: CapabilityContext<StoreOperation, Ev>,
}

impl<Ev> std::fmt::Debug for SavedLocationStore<Ev> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SavedLocationStore").finish_non_exhaustive()
    }
}

impl<Ev> Capability<Ev> for SavedLocationStore<Ev> {
    type Operation = StoreOperation;
    type MappedSelf<MappedEv> = SavedLocationStore<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        SavedLocationStore::new(self.context.map_event(f))
    }
}

impl<Ev> SavedLocationStore<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<StoreOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn save<F>(&self, record: SavedLocation, make_event: F)
    where
        F: FnOnce(StoreResponse) -> Ev + Send + 'static,
        Ev: Send,
    {
        self.request(StoreOperation::Save { record }, make_event);
    }

    pub fn delete<F>(&self, id: RecordId, make_event: F)
    where
        F: FnOnce(StoreResponse) -> Ev + Send + 'static,
        Ev: Send,
    {
        self.request(StoreOperation::Delete { id }, make_event);
    }

    pub fn fetch_all<F>(&self, make_event: F)
    where
        F: FnOnce(StoreResponse) -> Ev + Send + 'static,
        Ev: Send,
    {
        self.fetch_filtered(RecordFilter::default(), make_event);
    }

    pub fn fetch_filtered<F>(&self, filter: RecordFilter, make_event: F)
    where
        F: FnOnce(StoreResponse) -> Ev + Send + 'static,
        Ev: Send,
    {
        self.request(StoreOperation::Fetch { filter }, make_event);
    }

    fn request<F>(&self, operation: StoreOperation, make_event: F)
    where
        F: FnOnce(StoreResponse) -> Ev + Send + 'static,
        Ev: Send,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let response = context.request_from_shell(operation).await;
            context.update_app(make_event(response));
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum StoreOperation {
    Save { record: SavedLocation },
    Delete { id: RecordId },
    Fetch { filter: RecordFilter },
}

impl Operation for StoreOperation {
    type Output = StoreResponse;
}

/// Fetch predicate. Defaults to match-all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RecordFilter {
    #[default]
    All,
    AddressContains(String),
}

impl RecordFilter {
    #[must_use]
    pub fn matches(&self, record: &SavedLocation) -> bool {
        match self {
            Self::All => true,
            Self::AddressContains(needle) => record
                .address
                .to_lowercase()
                .contains(&needle.to_lowercase()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StoreOutput {
    Saved { record: SavedLocation },
    Deleted { existed: bool },
    Records(Vec<SavedLocation>),
}

#[allow(clippy::enum_variant_names)]
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum StoreError {
    #[error("save failed: {reason}")]
    SaveFailed { reason: String },

    #[error("delete failed: {reason}")]
    DeleteFailed { reason: String },

    #[error("fetch failed: {reason}")]
    FetchFailed { reason: String },
}

pub type StoreResponse = Result<StoreOutput, StoreError>;
