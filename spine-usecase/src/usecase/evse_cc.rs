//! EVSE Commissioning and Configuration
//!
//! Both actors exchange their operating state: each side serves its own
//! device diagnosis state, reads the peer's state and manufacturer data when
//! the peer connects, and subscribes to state notifications. Received state
//! changes are handed to the application through [`EvseCCDelegate`].

use std::sync::Arc;

use parking_lot::RwLock;
use spine_core::{
    DeviceDiagnosisStateData, DeviceRemote, ElementChange, EventHandler, EventPayload, EventType, FeatureType,
    Filter, FunctionData, FunctionType, OperatingState, Result, RoleType, SpineError, UseCaseActor, UseCaseName,
};
use tracing::{debug, info, warn};

use super::UseCaseImpl;
use crate::error::ServiceError;
use crate::service::Service;

/// Application callbacks of the EVSECC use case
pub trait EvseCCDelegate: Send + Sync {
    /// The device behind `ski` reported a new operating state
    fn handle_device_state(&self, ski: &str, failure: bool, error_code: &str);
}

pub struct EvseCC {
    usecase: UseCaseImpl,
    delegate: RwLock<Option<Arc<dyn EvseCCDelegate>>>,
}

impl EvseCC {
    pub const VERSION: &'static str = "1.0.1";
    pub const SCENARIOS: [u32; 2] = [1, 2];

    /// Add the use case's features to the service's entity and start
    /// listening for peers
    pub fn register(service: &Service, actor: UseCaseActor) -> std::result::Result<Arc<Self>, ServiceError> {
        let entity = service.local_entity();

        let classification = entity.get_or_add_feature(FeatureType::DeviceClassification, RoleType::Client);
        classification.set_description("Device Classification Client");

        let diagnosis_server = entity.get_or_add_feature(FeatureType::DeviceDiagnosis, RoleType::Server);
        diagnosis_server.set_description("Device Diagnosis Server");
        diagnosis_server.add_function(FunctionType::DeviceDiagnosisStateData);
        diagnosis_server.set_data(FunctionData::DeviceDiagnosisStateData(DeviceDiagnosisStateData {
            operating_state: Some(OperatingState::NormalOperation),
            ..Default::default()
        }))?;

        let diagnosis_client = entity.get_or_add_feature(FeatureType::DeviceDiagnosis, RoleType::Client);
        diagnosis_client.set_description("Device Diagnosis Client");

        let usecase = UseCaseImpl::new(
            service.device().clone(),
            entity.clone(),
            actor,
            UseCaseName::EvseCommissioningAndConfiguration,
            Self::VERSION,
            Self::SCENARIOS.to_vec(),
        );

        let evse_cc = Arc::new(Self {
            usecase,
            delegate: RwLock::new(None),
        });
        evse_cc.usecase.attach(evse_cc.clone());

        info!("EVSECC registered as {:?}", actor);
        Ok(evse_cc)
    }

    pub fn usecase(&self) -> &UseCaseImpl {
        &self.usecase
    }

    pub fn set_delegate(&self, delegate: Arc<dyn EvseCCDelegate>) {
        *self.delegate.write() = Some(delegate);
    }

    /// Stop handling bus events and withdraw the use case
    pub fn unregister(&self) {
        self.usecase.detach();
        self.usecase.set_available(false);
    }

    /// Replace the local operating state and notify every connected device.
    ///
    /// Returns the devices that could not be notified.
    pub fn update_error_state(&self, failure: bool, error_code: &str) -> Result<Vec<(String, SpineError)>> {
        let state = if failure {
            DeviceDiagnosisStateData {
                operating_state: Some(OperatingState::Failure),
                last_error_code: Some(error_code.to_string()),
                ..Default::default()
            }
        } else {
            DeviceDiagnosisStateData {
                operating_state: Some(OperatingState::NormalOperation),
                ..Default::default()
            }
        };

        let server = self
            .usecase
            .local_feature(FeatureType::DeviceDiagnosis, RoleType::Server)?;
        server.update_data(
            FunctionType::DeviceDiagnosisStateData,
            Some(&FunctionData::DeviceDiagnosisStateData(state)),
            None,
            Some(&Filter::default()),
        )?;

        let mut failed = Vec::new();
        for remote in self.usecase.device().remote_devices() {
            let outcome = self
                .usecase
                .local_server_and_remote_client(FeatureType::DeviceDiagnosis, &remote)
                .and_then(|(local, client)| local.notify_data(FunctionType::DeviceDiagnosisStateData, &client));

            if let Err(e) = outcome {
                warn!("EVSECC: state notify to {} failed: {}", remote.ski(), e);
                failed.push((remote.ski().to_string(), e));
            }
        }
        Ok(failed)
    }

    fn on_device_added(&self, remote: &DeviceRemote) {
        match self
            .usecase
            .local_client_and_remote_server(FeatureType::DeviceClassification, remote)
        {
            Ok((local, server)) => {
                if let Err(e) = local.request_data(FunctionType::DeviceClassificationManufacturerData, &server) {
                    warn!("EVSECC: manufacturer request to {} failed: {}", remote.ski(), e);
                }
            }
            Err(e) => debug!("EVSECC: {} has no classification: {}", remote.ski(), e),
        }

        let (local, server) = match self
            .usecase
            .local_client_and_remote_server(FeatureType::DeviceDiagnosis, remote)
        {
            Ok(pair) => pair,
            Err(e) => {
                debug!("EVSECC: {} has no diagnosis: {}", remote.ski(), e);
                return;
            }
        };

        if let Err(e) = local.request_data(FunctionType::DeviceDiagnosisStateData, &server) {
            warn!("EVSECC: state request to {} failed: {}", remote.ski(), e);
        }
        if let Err(e) = self
            .usecase
            .device()
            .subscribe(local.address(), server.address(), FeatureType::DeviceDiagnosis)
        {
            warn!("EVSECC: subscribe to {} failed: {}", remote.ski(), e);
        }
    }

    fn on_data_update(&self, payload: &EventPayload) {
        let (Some(device), Some(feature)) = (&payload.device, &payload.feature) else {
            return;
        };
        // writes to our own features are announced too
        if feature.device.as_deref() != Some(device.address()) {
            return;
        }
        let Some(FunctionData::DeviceDiagnosisStateData(state)) = &payload.data else {
            return;
        };
        let Some(delegate) = self.delegate.read().clone() else {
            return;
        };

        let failure = state.operating_state == Some(OperatingState::Failure);
        let error_code = state.last_error_code.as_deref().unwrap_or("");
        delegate.handle_device_state(&payload.ski, failure, error_code);
    }
}

impl EventHandler for EvseCC {
    fn handle_event(&self, payload: &EventPayload) -> Result<()> {
        match (payload.event_type, payload.change_type) {
            (EventType::DeviceChange, ElementChange::Add) => {
                if let Some(device) = &payload.device {
                    self.on_device_added(device);
                }
            }
            (EventType::DataChange, ElementChange::Update)
                if payload.function == Some(FunctionType::DeviceDiagnosisStateData) =>
            {
                self.on_data_update(payload);
            }
            _ => {}
        }
        Ok(())
    }
}

impl std::fmt::Debug for EvseCC {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvseCC")
            .field("usecase", &self.usecase)
            .field("delegate", &self.delegate.read().is_some())
            .finish()
    }
}
