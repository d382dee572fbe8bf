//! SPINE service
//!
//! Owns the event bus and the local device built from [`ServiceConfig`],
//! connects and disconnects remote devices, routes their inbound bytes, and
//! runs a housekeeping task that fails overdue requests.
//!
//! ```text
//! transport ──bytes──► Service::handle_message ──► DeviceLocal
//!                                                     │ publish
//! use cases ◄──────────────── EventBus ◄──────────────┘
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use spine_core::{
    DeviceLocal, DeviceRemote, EntityLocal, EventBus, FeatureType, FunctionData, FunctionType,
    RemoteDeviceDescription, RoleType, TransportSink,
};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::ServiceConfig;
use crate::error::ServiceError;

pub struct Service {
    config: ServiceConfig,
    bus: Arc<EventBus>,
    device: Arc<DeviceLocal>,
    entity: Arc<EntityLocal>,
    housekeeping: Mutex<Option<JoinHandle<()>>>,
}

impl Service {
    /// Build the local device: one entity with a device classification
    /// server that serves the configured manufacturer data
    pub fn new(config: ServiceConfig) -> Result<Self, ServiceError> {
        config.validate()?;

        let bus = Arc::new(EventBus::new());
        let device = Arc::new(DeviceLocal::new(
            config.device_address(),
            config.device.device_type,
            bus.clone(),
            config.request_timeout,
        ));
        let entity = device.add_entity(config.entity_type);

        let classification = entity.get_or_add_feature(FeatureType::DeviceClassification, RoleType::Server);
        classification.set_description("Device Classification Server");
        classification.add_function(FunctionType::DeviceClassificationManufacturerData);
        classification.set_data(FunctionData::DeviceClassificationManufacturerData(
            config.manufacturer_data(),
        ))?;

        info!("Service created for {}", device.address());

        Ok(Self {
            config,
            bus,
            device,
            entity,
            housekeeping: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn device(&self) -> &Arc<DeviceLocal> {
        &self.device
    }

    /// Entity use cases register their features on
    pub fn local_entity(&self) -> &Arc<EntityLocal> {
        &self.entity
    }

    /// What peers need to know about this device to talk to it
    pub fn description(&self) -> RemoteDeviceDescription {
        self.device.description()
    }

    /// Attach a remote device reachable through `sink`
    pub fn connect(
        &self,
        ski: &str,
        description: &RemoteDeviceDescription,
        sink: Arc<dyn TransportSink>,
    ) -> Arc<DeviceRemote> {
        self.device.add_remote_device(ski, description, sink)
    }

    pub fn disconnect(&self, ski: &str) -> bool {
        self.device.remove_remote_device(ski).is_some()
    }

    pub fn remote_devices(&self) -> Vec<Arc<DeviceRemote>> {
        self.device.remote_devices()
    }

    /// Feed bytes received from `ski` into the local device
    pub fn handle_message(&self, ski: &str, bytes: &[u8]) -> Result<(), ServiceError> {
        if self.device.remote_device(ski).is_none() {
            return Err(ServiceError::NotConnected(ski.to_string()));
        }
        self.device.handle_message(ski, bytes)?;
        Ok(())
    }

    /// Start the housekeeping task; calling it again is a no-op
    pub fn start(&self) {
        let mut housekeeping = self.housekeeping.lock();
        if housekeeping.is_some() {
            return;
        }

        let device = Arc::downgrade(&self.device);
        let period = self.config.housekeeping_interval;
        *housekeeping = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let Some(device) = device.upgrade() else {
                    break;
                };
                let expired = device.expire_pending();
                if expired > 0 {
                    debug!("Housekeeping: {} requests expired", expired);
                }
            }
        }));
        info!("Service started");
    }

    /// Stop housekeeping and disconnect every remote device
    pub fn shutdown(&self) {
        if let Some(task) = self.housekeeping.lock().take() {
            task.abort();
        }
        for remote in self.device.remote_devices() {
            self.device.remove_remote_device(remote.ski());
        }
        info!("Service stopped");
    }

    pub fn is_running(&self) -> bool {
        self.housekeeping.lock().as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for Service {
    fn drop(&mut self) {
        if let Some(task) = self.housekeeping.lock().take() {
            task.abort();
        }
    }
}

impl std::fmt::Debug for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Service")
            .field("device", &self.device)
            .field("running", &self.is_running())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spine_core::{Result, SpineError};
    use std::time::Duration;

    struct Discard;

    impl TransportSink for Discard {
        fn send(&self, _bytes: Vec<u8>) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_service_serves_manufacturer_data() {
        let service = Service::new(ServiceConfig::default()).unwrap();
        let description = service.description();

        assert_eq!(description.address, service.config().device_address());
        let feature = &description.entities[0].features[0];
        assert_eq!(feature.feature_type, FeatureType::DeviceClassification);
        assert_eq!(feature.role, RoleType::Server);
        assert!(service
            .local_entity()
            .feature_by_type_and_role(FeatureType::DeviceClassification, RoleType::Server)
            .unwrap()
            .get_data(FunctionType::DeviceClassificationManufacturerData)
            .is_ok());
    }

    #[test]
    fn test_unknown_sender() {
        let service = Service::new(ServiceConfig::default()).unwrap();

        assert!(matches!(
            service.handle_message("ski1", b"{}"),
            Err(ServiceError::NotConnected(_))
        ));
    }

    #[tokio::test]
    async fn test_housekeeping_expires_requests() {
        let config = ServiceConfig::default()
            .with_request_timeout(Duration::from_millis(10))
            .with_housekeeping_interval(Duration::from_millis(5));
        let service = Service::new(config).unwrap();
        let peer = Service::new(ServiceConfig::new("EK", "EK3-EVSE", "SN2", spine_core::DeviceType::ChargingStation))
            .unwrap();

        let client = service
            .local_entity()
            .get_or_add_feature(FeatureType::DeviceClassification, RoleType::Client);
        let remote = service.connect("ski1", &peer.description(), Arc::new(Discard));
        let server = remote
            .feature_by_type_and_role(FeatureType::DeviceClassification, RoleType::Server)
            .unwrap();

        let mut handle = client
            .request_data(FunctionType::DeviceClassificationManufacturerData, &server)
            .unwrap();
        service.start();
        service.start();
        assert!(service.is_running());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(service.device().pending().is_empty());
        assert!(matches!(handle.try_result(), Some(Err(SpineError::RequestTimeout(_)))));

        service.shutdown();
        assert!(!service.is_running());
        assert!(service.remote_devices().is_empty());
    }
}
