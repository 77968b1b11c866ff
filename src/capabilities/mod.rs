pub mod location;
pub mod navigation;
pub mod search;
pub mod store;

pub use self::location::{
    Location, LocationOperation, LocationOutput, LocationResponse, LocationServiceError,
    PermissionStatus,
};
pub use self::navigation::{
    Navigation, NavigationOperation, NavigationOutput, NavigationResponse, NavigationServiceError,
    PreviewScene, Route,
};
pub use self::search::{
    AddressComponents, Place, PlaceSearch, ResultType, SearchOperation, SearchResponse,
    SearchServiceError,
};
pub use self::store::{
    RecordFilter, SavedLocationStore, StoreError, StoreOperation, StoreOutput, StoreResponse,
};

// We use Crux's built-in Render capability directly because it provides
// all necessary functionality for triggering view updates.
pub use crux_core::render::Render;

use crate::app::App;
use crate::event::Event;

pub type AppRender = Render<Event>;
pub type AppSearch = PlaceSearch<Event>;
pub type AppLocation = Location<Event>;
pub type AppNavigation = Navigation<Event>;
pub type AppStore = SavedLocationStore<Event>;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub render: Render<Event>,
    pub search: PlaceSearch<Event>,
    pub location: Location<Event>,
    pub navigation: Navigation<Event>,
    pub store: SavedLocationStore<Event>,
}
