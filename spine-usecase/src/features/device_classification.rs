use std::sync::Arc;

use spine_core::{
    DeviceClassificationManufacturerData, DeviceLocal, EntityRemote, FeatureType, FunctionType, ReplyHandle, Result,
    RoleType,
};

use super::{expect_data, FeatureImpl};

#[derive(Debug, Clone)]
pub struct DeviceClassification {
    feature: FeatureImpl,
}

impl DeviceClassification {
    pub fn new(local_role: RoleType, device: &Arc<DeviceLocal>, remote_entity: &EntityRemote) -> Result<Self> {
        let feature = FeatureImpl::new(FeatureType::DeviceClassification, local_role, device, remote_entity)?;
        Ok(Self { feature })
    }

    pub fn feature(&self) -> &FeatureImpl {
        &self.feature
    }

    /// Request manufacturer data from the remote entity
    pub fn request_manufacturer_details(&self) -> Result<ReplyHandle> {
        self.feature
            .request(FunctionType::DeviceClassificationManufacturerData)
    }

    /// Manufacturer data received so far
    pub fn get_manufacturer_details(&self) -> Result<DeviceClassificationManufacturerData> {
        let data = self
            .feature
            .remote_data(FunctionType::DeviceClassificationManufacturerData)?;
        expect_data!(data, DeviceClassificationManufacturerData)
    }
}
