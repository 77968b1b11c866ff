use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Coordinate;

/// Device location and permission boundary. Permission state is owned by
/// the OS; the shell reports it here and may report it again at any time
/// (the user can flip it in system settings while the app runs).
#[derive(Clone)]
pub struct Location<Ev> {
    context: CapabilityContext<LocationOperation, Ev>,
}

impl<Ev> std::fmt::Debug for Location<Ev> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Location").finish_non_exhaustive()
    }
}

impl<Ev> Capability<Ev> for Location<Ev> {
    type Operation = LocationOperation;
    type MappedSelf<MappedEv> = Location<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Location::new(self.context.map_event(f))
    }
}

impl<Ev> Location<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<LocationOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn check_permission<F>(&self, make_event: F)
    where
        F: FnOnce(LocationResponse) -> Ev + Send + 'static,
        Ev: Send,
    {
        self.request(LocationOperation::CheckPermission, make_event);
    }

    pub fn request_permission<F>(&self, make_event: F)
    where
        F: FnOnce(LocationResponse) -> Ev + Send + 'static,
        Ev: Send,
    {
        self.request(LocationOperation::RequestPermission, make_event);
    }

    pub fn position<F>(&self, make_event: F)
    where
        F: FnOnce(LocationResponse) -> Ev + Send + 'static,
        Ev: Send,
    {
        self.request(LocationOperation::GetPosition, make_event);
    }

    pub fn open_settings<F>(&self, make_event: F)
    where
        F: FnOnce(LocationResponse) -> Ev + Send + 'static,
        Ev: Send,
    {
        self.request(LocationOperation::OpenSystemSettings, make_event);
    }

    fn request<F>(&self, operation: LocationOperation, make_event: F)
    where
        F: FnOnce(LocationResponse) -> Ev + Send + 'static,
        Ev: Send,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let response = context.request_from_shell(operation).await;
            context.update_app(make_event(response));
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum LocationOperation {
    CheckPermission,
    RequestPermission,
    GetPosition,
    OpenSystemSettings,
}

impl Operation for LocationOperation {
    type Output = LocationResponse;
}

/// Raw OS permission status. The core folds this into its tri-state
/// authorization flag; `Restricted` counts as denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionStatus {
    NotDetermined,
    Authorized,
    Denied,
    Restricted,
}

impl PermissionStatus {
    #[must_use]
    pub const fn is_authorized(self) -> bool {
        matches!(self, Self::Authorized)
    }

    #[must_use]
    pub const fn is_denied(self) -> bool {
        matches!(self, Self::Denied | Self::Restricted)
    }

    #[must_use]
    pub const fn can_request(self) -> bool {
        matches!(self, Self::NotDetermined)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LocationOutput {
    Permission(PermissionStatus),
    Position(Coordinate),
    SettingsOpened,
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum LocationServiceError {
    #[error("location services unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("location update failed: {reason}")]
    UpdateFailed { reason: String },
}

pub type LocationResponse = Result<LocationOutput, LocationServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_status_predicates() {
        assert!(PermissionStatus::Authorized.is_authorized());
        assert!(!PermissionStatus::Denied.is_authorized());

        assert!(PermissionStatus::Denied.is_denied());
        assert!(PermissionStatus::Restricted.is_denied());
        assert!(!PermissionStatus::NotDetermined.is_denied());

        assert!(PermissionStatus::NotDetermined.can_request());
        assert!(!PermissionStatus::Authorized.can_request());
    }
}
