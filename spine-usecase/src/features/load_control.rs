use std::sync::Arc;

use spine_core::{
    Cmd, DeviceLocal, Elements, EntityRemote, FeatureType, Filter, FunctionData, FunctionType,
    LoadControlLimitData, LoadControlLimitDataElements, LoadControlLimitDescriptionData, LoadControlLimitListData,
    LoadControlLimitListDataSelectors, ReplyHandle, Result, RoleType, ScaledNumberElements, Selectors,
};

use super::{expect_data, FeatureImpl};

/// Limit descriptions and limit values of a remote entity
#[derive(Debug, Clone)]
pub struct LoadControl {
    feature: FeatureImpl,
}

impl LoadControl {
    pub fn new(local_role: RoleType, device: &Arc<DeviceLocal>, remote_entity: &EntityRemote) -> Result<Self> {
        let feature = FeatureImpl::new(FeatureType::LoadControl, local_role, device, remote_entity)?;
        Ok(Self { feature })
    }

    pub fn feature(&self) -> &FeatureImpl {
        &self.feature
    }

    pub fn request_limit_descriptions(&self) -> Result<ReplyHandle> {
        self.feature
            .request(FunctionType::LoadControlLimitDescriptionListData)
    }

    pub fn request_limit_values(&self) -> Result<ReplyHandle> {
        self.feature.request(FunctionType::LoadControlLimitListData)
    }

    pub fn get_limit_descriptions(&self) -> Result<Vec<LoadControlLimitDescriptionData>> {
        let data = self
            .feature
            .remote_data(FunctionType::LoadControlLimitDescriptionListData)?;
        Ok(expect_data!(data, LoadControlLimitDescriptionListData)?.load_control_limit_description_data)
    }

    pub fn get_limit_values(&self) -> Result<Vec<LoadControlLimitData>> {
        let data = self.feature.remote_data(FunctionType::LoadControlLimitListData)?;
        Ok(expect_data!(data, LoadControlLimitListData)?.load_control_limit_data)
    }

    /// Write limit values; records are matched by limit id on the server
    pub fn write_limit_values(&self, limits: Vec<LoadControlLimitData>) -> Result<ReplyHandle> {
        self.feature.write(Cmd::data(FunctionData::LoadControlLimitListData(
            LoadControlLimitListData {
                load_control_limit_data: limits,
            },
        )))
    }

    /// Clear the value of one limit on the server, keeping the record
    pub fn delete_limit_value(&self, limit_id: u32) -> Result<ReplyHandle> {
        let delete = Filter::with_selectors(Selectors::LoadControlLimitListDataSelectors(
            LoadControlLimitListDataSelectors {
                limit_id: Some(limit_id),
            },
        ))
        .with_elements(Elements::LoadControlLimitDataElements(LoadControlLimitDataElements {
            value: Some(ScaledNumberElements::default()),
            ..Default::default()
        }));

        let cmd = Cmd::data(FunctionData::LoadControlLimitListData(LoadControlLimitListData::default()))
            .with_delete(delete);
        self.feature.write(cmd)
    }
}
