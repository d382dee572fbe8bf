use std::sync::Arc;

use spine_core::{
    DeviceDiagnosisHeartbeatData, DeviceDiagnosisStateData, DeviceLocal, EntityRemote, FeatureType, FunctionType,
    ReplyHandle, Result, RoleType,
};

use super::{expect_data, FeatureImpl};

#[derive(Debug, Clone)]
pub struct DeviceDiagnosis {
    feature: FeatureImpl,
}

impl DeviceDiagnosis {
    pub fn new(local_role: RoleType, device: &Arc<DeviceLocal>, remote_entity: &EntityRemote) -> Result<Self> {
        let feature = FeatureImpl::new(FeatureType::DeviceDiagnosis, local_role, device, remote_entity)?;
        Ok(Self { feature })
    }

    pub fn feature(&self) -> &FeatureImpl {
        &self.feature
    }

    pub fn request_state(&self) -> Result<ReplyHandle> {
        self.feature.request(FunctionType::DeviceDiagnosisStateData)
    }

    pub fn request_heartbeat(&self) -> Result<ReplyHandle> {
        self.feature.request(FunctionType::DeviceDiagnosisHeartbeatData)
    }

    /// Subscribe to state and heartbeat notifications
    pub fn subscribe(&self) -> Result<ReplyHandle> {
        self.feature.subscribe()
    }

    pub fn get_state(&self) -> Result<DeviceDiagnosisStateData> {
        let data = self.feature.remote_data(FunctionType::DeviceDiagnosisStateData)?;
        expect_data!(data, DeviceDiagnosisStateData)
    }

    pub fn get_heartbeat(&self) -> Result<DeviceDiagnosisHeartbeatData> {
        let data = self.feature.remote_data(FunctionType::DeviceDiagnosisHeartbeatData)?;
        expect_data!(data, DeviceDiagnosisHeartbeatData)
    }
}
