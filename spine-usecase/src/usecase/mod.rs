//! Use cases built on the local device
//!
//! A use case wires the features it needs onto the local entity, advertises
//! itself in the device's use-case registry and reacts to bus events.

use std::sync::Arc;

use parking_lot::Mutex;
use spine_core::{
    DeviceLocal, DeviceRemote, EntityLocal, EventHandler, FeatureLocal, FeatureRemote, FeatureType, HandlerId,
    Result, RoleType, SpineError, UseCaseActor, UseCaseName, UseCaseSupport,
};
use tracing::debug;

pub mod evse_cc;

pub use evse_cc::{EvseCC, EvseCCDelegate};

/// Registration shared by all use cases
pub struct UseCaseImpl {
    device: Arc<DeviceLocal>,
    entity: Arc<EntityLocal>,
    actor: UseCaseActor,
    name: UseCaseName,
    handler: Mutex<Option<HandlerId>>,
}

impl UseCaseImpl {
    /// Advertise `name` on `entity` and return the registration
    pub fn new(
        device: Arc<DeviceLocal>,
        entity: Arc<EntityLocal>,
        actor: UseCaseActor,
        name: UseCaseName,
        version: &str,
        scenarios: Vec<u32>,
    ) -> Self {
        device.register_use_case(&entity, actor, name, version, scenarios);
        Self {
            device,
            entity,
            actor,
            name,
            handler: Mutex::new(None),
        }
    }

    pub fn device(&self) -> &Arc<DeviceLocal> {
        &self.device
    }

    pub fn entity(&self) -> &Arc<EntityLocal> {
        &self.entity
    }

    pub fn actor(&self) -> UseCaseActor {
        self.actor
    }

    pub fn name(&self) -> UseCaseName {
        self.name
    }

    /// Current registry entry of this use case
    pub fn support(&self) -> Option<UseCaseSupport> {
        self.device
            .use_cases()
            .into_iter()
            .find(|u| u.entity == *self.entity.address() && u.actor == self.actor && u.name == self.name)
    }

    pub fn set_available(&self, available: bool) {
        self.device.set_use_case_available(self.name, available);
    }

    /// Start receiving bus events; a previous handler is replaced
    pub(crate) fn attach(&self, handler: Arc<dyn EventHandler>) {
        let id = self.device.bus().subscribe(handler);
        if let Some(previous) = self.handler.lock().replace(id) {
            self.device.bus().unsubscribe(previous);
        }
    }

    /// Stop receiving bus events
    pub fn detach(&self) -> bool {
        match self.handler.lock().take() {
            Some(id) => {
                debug!("{:?} detached from the event bus", self.name);
                self.device.bus().unsubscribe(id)
            }
            None => false,
        }
    }

    pub fn local_feature(&self, feature_type: FeatureType, role: RoleType) -> Result<Arc<FeatureLocal>> {
        self.entity
            .feature_by_type_and_role(feature_type, role)
            .ok_or_else(|| SpineError::FeatureNotFound(format!("local {} {}", feature_type, role)))
    }

    /// Our client and the remote device's server of `feature_type`
    pub fn local_client_and_remote_server(
        &self,
        feature_type: FeatureType,
        remote: &DeviceRemote,
    ) -> Result<(Arc<FeatureLocal>, Arc<FeatureRemote>)> {
        self.local_and_remote(feature_type, RoleType::Client, remote)
    }

    /// Our server and the remote device's client of `feature_type`
    pub fn local_server_and_remote_client(
        &self,
        feature_type: FeatureType,
        remote: &DeviceRemote,
    ) -> Result<(Arc<FeatureLocal>, Arc<FeatureRemote>)> {
        self.local_and_remote(feature_type, RoleType::Server, remote)
    }

    fn local_and_remote(
        &self,
        feature_type: FeatureType,
        local_role: RoleType,
        remote: &DeviceRemote,
    ) -> Result<(Arc<FeatureLocal>, Arc<FeatureRemote>)> {
        let local = self.local_feature(feature_type, local_role)?;
        let remote_feature = remote
            .feature_by_type_and_role(feature_type, local_role.counterpart())
            .ok_or_else(|| {
                SpineError::FeatureNotFound(format!(
                    "{} {} on {}",
                    feature_type,
                    local_role.counterpart(),
                    remote.ski()
                ))
            })?;
        Ok((local, remote_feature))
    }
}

impl std::fmt::Debug for UseCaseImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UseCaseImpl")
            .field("entity", self.entity.address())
            .field("actor", &self.actor)
            .field("name", &self.name)
            .finish()
    }
}
