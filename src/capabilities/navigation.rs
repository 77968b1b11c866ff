use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capabilities::search::Place;
use crate::model::Coordinate;

/// Preview-scene and directions boundary. Both requests are soft-fail:
/// the core logs a failure and leaves the cleared state in place rather
/// than surfacing an error page.
#[derive(Clone)]
pub struct Navigation<Ev> {
    context: CapabilityContext<NavigationOperation, Ev>,
}

impl<Ev> std::fmt::Debug for Navigation<Ev> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigation").finish_non_exhaustive()
    }
}

impl<Ev> Capability<Ev> for Navigation<Ev> {
    type Operation = NavigationOperation;
    type MappedSelf<MappedEv> = Navigation<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Navigation::new(self.context.map_event(f))
    }
}

impl<Ev> Navigation<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<NavigationOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn preview_scene<F>(&self, place: Place, make_event: F)
    where
        F: FnOnce(NavigationResponse) -> Ev + Send + 'static,
        Ev: Send,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let response = context
                .request_from_shell(NavigationOperation::FetchPreview { place })
                .await;
            context.update_app(make_event(response));
        });
    }

    pub fn directions<F>(&self, origin: Coordinate, destination: Coordinate, make_event: F)
    where
        F: FnOnce(NavigationResponse) -> Ev + Send + 'static,
        Ev: Send,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let response = context
                .request_from_shell(NavigationOperation::ComputeRoute {
                    origin,
                    destination,
                })
                .await;
            context.update_app(make_event(response));
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum NavigationOperation {
    FetchPreview { place: Place },
    ComputeRoute {
        origin: Coordinate,
        destination: Coordinate,
    },
}

impl Operation for NavigationOperation {
    type Output = NavigationResponse;
}

/// Opaque handle to an immersive street-level scene. The shell resolves it
/// to the actual scene object; the core only tracks presence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewScene {
    pub handle: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub duration_secs: f64,
    pub distance_meters: f64,
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum NavigationServiceError {
    #[error("preview unavailable: {reason}")]
    PreviewUnavailable { reason: String },

    #[error("directions failed: {reason}")]
    RouteFailed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NavigationOutput {
    Preview(PreviewScene),
    Route(Route),
}

pub type NavigationResponse = Result<NavigationOutput, NavigationServiceError>;
