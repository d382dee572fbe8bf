use std::sync::Arc;

use spine_core::{
    Cmd, DeviceLocal, EntityRemote, FeatureType, Filter, FunctionData, FunctionType, IncentiveTable as Tariff,
    IncentiveTableConstraints, IncentiveTableData, IncentiveTableDataSelectors, IncentiveTableDescription,
    ReplyHandle, Result, RoleType, Selectors,
};

use super::{expect_data, FeatureImpl};

/// Tariff descriptions, constraints and slot tables of a remote entity
#[derive(Debug, Clone)]
pub struct IncentiveTable {
    feature: FeatureImpl,
}

impl IncentiveTable {
    pub fn new(local_role: RoleType, device: &Arc<DeviceLocal>, remote_entity: &EntityRemote) -> Result<Self> {
        let feature = FeatureImpl::new(FeatureType::IncentiveTable, local_role, device, remote_entity)?;
        Ok(Self { feature })
    }

    pub fn feature(&self) -> &FeatureImpl {
        &self.feature
    }

    pub fn request_description(&self) -> Result<ReplyHandle> {
        self.feature.request(FunctionType::IncentiveTableDescriptionData)
    }

    pub fn request_constraints(&self) -> Result<ReplyHandle> {
        self.feature.request(FunctionType::IncentiveTableConstraintsData)
    }

    pub fn request_values(&self) -> Result<ReplyHandle> {
        self.feature.request(FunctionType::IncentiveTableData)
    }

    pub fn get_description(&self) -> Result<Vec<IncentiveTableDescription>> {
        let data = self.feature.remote_data(FunctionType::IncentiveTableDescriptionData)?;
        Ok(expect_data!(data, IncentiveTableDescriptionData)?.incentive_table_description)
    }

    pub fn get_constraints(&self) -> Result<Vec<IncentiveTableConstraints>> {
        let data = self.feature.remote_data(FunctionType::IncentiveTableConstraintsData)?;
        Ok(expect_data!(data, IncentiveTableConstraintsData)?.incentive_table_constraints)
    }

    pub fn get_values(&self) -> Result<Vec<Tariff>> {
        let data = self.feature.remote_data(FunctionType::IncentiveTableData)?;
        Ok(expect_data!(data, IncentiveTableData)?.incentive_table)
    }

    /// Replace the slots of one tariff on the remote server
    pub fn write_values(&self, table: Tariff) -> Result<ReplyHandle> {
        let mut cmd = Cmd::data(FunctionData::IncentiveTableData(IncentiveTableData {
            incentive_table: vec![table.clone()],
        }));
        if let Some(tariff_id) = table.tariff_id {
            cmd = cmd.with_partial(Filter::with_selectors(Selectors::IncentiveTableDataSelectors(
                IncentiveTableDataSelectors {
                    tariff_id: Some(tariff_id),
                },
            )));
        }
        self.feature.write(cmd)
    }
}
