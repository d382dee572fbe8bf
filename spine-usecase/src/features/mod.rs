//! Typed helpers around one local/remote feature pair
//!
//! Each helper wraps a [`FeatureImpl`] and exposes the reads, writes and
//! cached values of one feature type.

use std::sync::Arc;

use spine_core::{
    Cmd, DeviceLocal, EntityRemote, FeatureLocal, FeatureRemote, FeatureType, FunctionData, FunctionType,
    ReplyHandle, Result, RoleType, SpineError,
};

/// Pull the payload of one `FunctionData` variant out of a cached value
macro_rules! expect_data {
    ($data:expr, $variant:ident) => {
        match $data {
            spine_core::FunctionData::$variant(value) => Ok(value),
            other => Err(spine_core::SpineError::FunctionTypeMismatch {
                expected: spine_core::FunctionType::$variant,
                actual: other.function_type(),
            }),
        }
    };
}

pub(crate) use expect_data;

pub mod device_classification;
pub mod device_diagnosis;
pub mod incentive_table;
pub mod load_control;

pub use device_classification::DeviceClassification;
pub use device_diagnosis::DeviceDiagnosis;
pub use incentive_table::IncentiveTable;
pub use load_control::LoadControl;

/// A local feature paired with its counterpart on a remote entity
#[derive(Debug, Clone)]
pub struct FeatureImpl {
    feature_type: FeatureType,
    device: Arc<DeviceLocal>,
    local: Arc<FeatureLocal>,
    remote: Arc<FeatureRemote>,
}

impl FeatureImpl {
    /// Pair the local feature in `local_role` with the remote one in the
    /// opposite role
    pub fn new(
        feature_type: FeatureType,
        local_role: RoleType,
        device: &Arc<DeviceLocal>,
        remote_entity: &EntityRemote,
    ) -> Result<Self> {
        let local = device
            .feature_by_type_and_role(feature_type, local_role)
            .ok_or_else(|| SpineError::FeatureNotFound(format!("local {} {}", feature_type, local_role)))?;
        let remote = remote_entity
            .feature_by_type_and_role(feature_type, local_role.counterpart())
            .ok_or_else(|| {
                SpineError::FeatureNotFound(format!(
                    "{} {} on {}",
                    feature_type,
                    local_role.counterpart(),
                    remote_entity.address()
                ))
            })?;

        Ok(Self {
            feature_type,
            device: device.clone(),
            local,
            remote,
        })
    }

    pub fn feature_type(&self) -> FeatureType {
        self.feature_type
    }

    pub fn local(&self) -> &Arc<FeatureLocal> {
        &self.local
    }

    pub fn remote(&self) -> &Arc<FeatureRemote> {
        &self.remote
    }

    pub fn request(&self, function: FunctionType) -> Result<ReplyHandle> {
        self.local.request_data(function, &self.remote)
    }

    pub fn write(&self, cmd: Cmd) -> Result<ReplyHandle> {
        self.local.write_data(cmd, &self.remote)
    }

    pub fn subscribe(&self) -> Result<ReplyHandle> {
        self.device
            .subscribe(self.local.address(), self.remote.address(), self.feature_type)
    }

    pub fn unsubscribe(&self) -> Result<ReplyHandle> {
        self.device.unsubscribe(self.local.address(), self.remote.address())
    }

    /// Last value received from the remote feature
    pub fn remote_data(&self, function: FunctionType) -> Result<FunctionData> {
        self.remote.get_data(function)
    }
}
