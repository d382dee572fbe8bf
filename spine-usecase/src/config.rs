//! Configuration for a SPINE service
//!
//! Identity of the local device plus protocol timing.

use std::time::Duration;

use spine_core::{DeviceClassificationManufacturerData, DeviceType, EntityType, DEFAULT_REQUEST_TIMEOUT};

use crate::error::ServiceError;

/// Complete service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Local device identity
    pub device: DeviceConfig,

    /// Type of the entity use cases are registered on
    pub entity_type: EntityType,

    /// Time to wait for a reply or result
    pub request_timeout: Duration,

    /// How often overdue requests are swept
    pub housekeeping_interval: Duration,
}

/// Device identity, announced through device classification
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    pub vendor_name: String,

    /// IANA private enterprise number or similar vendor identifier
    pub vendor_code: String,

    pub brand_name: String,
    pub model: String,
    pub serial_number: String,

    /// Optional device code (e.g. article number)
    pub device_code: Option<String>,

    pub device_type: DeviceType,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            device: DeviceConfig::default(),
            entity_type: EntityType::CEM,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            housekeeping_interval: Duration::from_secs(1),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            vendor_name: "Elektrokombinacija".to_string(),
            vendor_code: "EK".to_string(),
            brand_name: "EK".to_string(),
            model: "EK3-CEM".to_string(),
            serial_number: "0001".to_string(),
            device_code: None,
            device_type: DeviceType::EnergyManagementSystem,
        }
    }
}

impl ServiceConfig {
    /// Create config with basic parameters
    pub fn new(
        vendor_code: impl Into<String>,
        model: impl Into<String>,
        serial_number: impl Into<String>,
        device_type: DeviceType,
    ) -> Self {
        Self {
            device: DeviceConfig {
                vendor_code: vendor_code.into(),
                model: model.into(),
                serial_number: serial_number.into(),
                device_type,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Set vendor and brand names
    pub fn with_vendor(mut self, vendor_name: impl Into<String>, brand_name: impl Into<String>) -> Self {
        self.device.vendor_name = vendor_name.into();
        self.device.brand_name = brand_name.into();
        self
    }

    pub fn with_device_code(mut self, code: impl Into<String>) -> Self {
        self.device.device_code = Some(code.into());
        self
    }

    pub fn with_entity_type(mut self, entity_type: EntityType) -> Self {
        self.entity_type = entity_type;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_housekeeping_interval(mut self, interval: Duration) -> Self {
        self.housekeeping_interval = interval;
        self
    }

    /// SPINE device address, `d:_i:<vendor>_<model>-<serial>`
    pub fn device_address(&self) -> String {
        format!(
            "d:_i:{}_{}-{}",
            self.device.vendor_code, self.device.model, self.device.serial_number
        )
    }

    /// Manufacturer data served by the local device classification feature
    pub fn manufacturer_data(&self) -> DeviceClassificationManufacturerData {
        DeviceClassificationManufacturerData {
            device_name: Some(self.device.model.clone()),
            device_code: self.device.device_code.clone(),
            serial_number: Some(self.device.serial_number.clone()),
            vendor_name: Some(self.device.vendor_name.clone()),
            vendor_code: Some(self.device.vendor_code.clone()),
            brand_name: Some(self.device.brand_name.clone()),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.device.vendor_code.is_empty() {
            return Err(ServiceError::Config("vendor code is empty".to_string()));
        }
        if self.device.model.is_empty() || self.device.serial_number.is_empty() {
            return Err(ServiceError::Config("model and serial number are required".to_string()));
        }
        if self.request_timeout.is_zero() || self.housekeeping_interval.is_zero() {
            return Err(ServiceError::Config("timeouts must be non-zero".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ServiceConfig::new("EK", "EK3-EVSE", "SN001", DeviceType::ChargingStation)
            .with_vendor("Elektrokombinacija", "EK3")
            .with_device_code("EK3-22")
            .with_entity_type(EntityType::EVSE)
            .with_request_timeout(Duration::from_secs(3));

        assert_eq!(config.device_address(), "d:_i:EK_EK3-EVSE-SN001");
        assert_eq!(config.entity_type, EntityType::EVSE);
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.manufacturer_data().brand_name.as_deref(), Some("EK3"));
        assert_eq!(config.manufacturer_data().device_code.as_deref(), Some("EK3-22"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let config = ServiceConfig::new("", "EK3", "SN001", DeviceType::Generic);
        assert!(matches!(config.validate(), Err(ServiceError::Config(_))));

        let config = ServiceConfig::default().with_request_timeout(Duration::ZERO);
        assert!(config.validate().is_err());
    }
}
