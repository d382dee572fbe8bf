//! Core SPINE types: roles, feature and function types, addresses

use serde::{Deserialize, Serialize};

/// Correlation id carried in every datagram header
pub type MsgCounter = u64;

/// Role a feature plays towards its peers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleType {
    Client,
    Server,
}

impl RoleType {
    /// The role a peer must have to pair with this one
    pub fn counterpart(self) -> Self {
        match self {
            RoleType::Client => RoleType::Server,
            RoleType::Server => RoleType::Client,
        }
    }
}

impl std::fmt::Display for RoleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoleType::Client => write!(f, "client"),
            RoleType::Server => write!(f, "server"),
        }
    }
}

/// Functional block type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureType {
    DeviceClassification,
    DeviceDiagnosis,
    IncentiveTable,
    LoadControl,
    NodeManagement,
}

impl std::fmt::Display for FeatureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Data item a feature can serve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FunctionType {
    DeviceClassificationManufacturerData,
    DeviceDiagnosisStateData,
    DeviceDiagnosisHeartbeatData,
    IncentiveTableDescriptionData,
    IncentiveTableConstraintsData,
    IncentiveTableData,
    LoadControlLimitDescriptionListData,
    LoadControlLimitListData,
    NodeManagementSubscriptionRequestCall,
    NodeManagementSubscriptionDeleteCall,
    ResultData,
}

impl FunctionType {
    /// Feature type that serves this function
    pub fn feature_type(self) -> FeatureType {
        match self {
            FunctionType::DeviceClassificationManufacturerData => FeatureType::DeviceClassification,
            FunctionType::DeviceDiagnosisStateData | FunctionType::DeviceDiagnosisHeartbeatData => {
                FeatureType::DeviceDiagnosis
            }
            FunctionType::IncentiveTableDescriptionData
            | FunctionType::IncentiveTableConstraintsData
            | FunctionType::IncentiveTableData => FeatureType::IncentiveTable,
            FunctionType::LoadControlLimitDescriptionListData
            | FunctionType::LoadControlLimitListData => FeatureType::LoadControl,
            FunctionType::NodeManagementSubscriptionRequestCall
            | FunctionType::NodeManagementSubscriptionDeleteCall
            | FunctionType::ResultData => FeatureType::NodeManagement,
        }
    }

    /// Whether the function carries a keyed record list
    pub fn is_list(self) -> bool {
        matches!(
            self,
            FunctionType::IncentiveTableDescriptionData
                | FunctionType::IncentiveTableConstraintsData
                | FunctionType::IncentiveTableData
                | FunctionType::LoadControlLimitDescriptionListData
                | FunctionType::LoadControlLimitListData
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FunctionType::DeviceClassificationManufacturerData => "deviceClassificationManufacturerData",
            FunctionType::DeviceDiagnosisStateData => "deviceDiagnosisStateData",
            FunctionType::DeviceDiagnosisHeartbeatData => "deviceDiagnosisHeartbeatData",
            FunctionType::IncentiveTableDescriptionData => "incentiveTableDescriptionData",
            FunctionType::IncentiveTableConstraintsData => "incentiveTableConstraintsData",
            FunctionType::IncentiveTableData => "incentiveTableData",
            FunctionType::LoadControlLimitDescriptionListData => "loadControlLimitDescriptionListData",
            FunctionType::LoadControlLimitListData => "loadControlLimitListData",
            FunctionType::NodeManagementSubscriptionRequestCall => "nodeManagementSubscriptionRequestCall",
            FunctionType::NodeManagementSubscriptionDeleteCall => "nodeManagementSubscriptionDeleteCall",
            FunctionType::ResultData => "resultData",
        }
    }
}

impl std::fmt::Display for FunctionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address of an entity: device plus entity path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityAddress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    pub entity: Vec<u32>,
}

impl EntityAddress {
    pub fn new(device: impl Into<String>, entity: Vec<u32>) -> Self {
        Self {
            device: Some(device.into()),
            entity,
        }
    }

    /// Address of feature `feature` on this entity
    pub fn feature(&self, feature: u32) -> FeatureAddress {
        FeatureAddress {
            device: self.device.clone(),
            entity: self.entity.clone(),
            feature,
        }
    }
}

impl std::fmt::Display for EntityAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entity: Vec<String> = self.entity.iter().map(|e| e.to_string()).collect();
        write!(
            f,
            "{}:{}",
            self.device.as_deref().unwrap_or("?"),
            entity.join(".")
        )
    }
}

/// Composite (device, entity, feature) address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureAddress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    pub entity: Vec<u32>,
    pub feature: u32,
}

impl FeatureAddress {
    pub fn new(device: impl Into<String>, entity: Vec<u32>, feature: u32) -> Self {
        Self {
            device: Some(device.into()),
            entity,
            feature,
        }
    }

    pub fn entity_address(&self) -> EntityAddress {
        EntityAddress {
            device: self.device.clone(),
            entity: self.entity.clone(),
        }
    }
}

impl std::fmt::Display for FeatureAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.entity_address(), self.feature)
    }
}

/// Entity kinds used in discovery data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityType {
    DeviceInformation,
    CEM,
    EVSE,
    EV,
    HeatPumpAppliance,
}

/// Device kinds used in discovery data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceType {
    EnergyManagementSystem,
    ChargingStation,
    ElectricitySupplySystem,
    HeatPump,
    Generic,
}

/// Actor a use case is implemented for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UseCaseActor {
    CEM,
    EVSE,
    EV,
}

/// Use case names known to this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UseCaseName {
    EvseCommissioningAndConfiguration,
    EvCommissioningAndConfiguration,
    OverloadProtectionByEvChargingCurrentCurtailment,
    CoordinatedEvCharging,
}

/// Scaled decimal: `number * 10^scale`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScaledNumber {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<i8>,
}

impl ScaledNumber {
    /// Maximum number of decimal places kept when converting from `f64`
    const MAX_SCALE: i8 = 6;

    pub fn new(value: f64) -> Self {
        let mut scale = 0i8;
        let mut scaled = value;
        while scale < Self::MAX_SCALE && (scaled - scaled.round()).abs() > 1e-9 {
            scaled *= 10.0;
            scale += 1;
        }

        Self {
            number: Some(scaled.round() as i64),
            scale: if scale == 0 { None } else { Some(-scale) },
        }
    }

    pub fn value(&self) -> f64 {
        let number = self.number.unwrap_or(0) as f64;
        number * 10f64.powi(self.scale.unwrap_or(0) as i32)
    }
}

/// Marker for a named element in a delete filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElementTag {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_number() {
        let n = ScaledNumber::new(16.0);
        assert_eq!(n.number, Some(16));
        assert_eq!(n.scale, None);

        let n = ScaledNumber::new(10.5);
        assert_eq!(n.number, Some(105));
        assert_eq!(n.scale, Some(-1));
        assert!((n.value() - 10.5).abs() < 1e-9);
    }

    #[test]
    fn test_function_feature_mapping() {
        assert_eq!(
            FunctionType::IncentiveTableConstraintsData.feature_type(),
            FeatureType::IncentiveTable
        );
        assert_eq!(
            FunctionType::DeviceDiagnosisStateData.feature_type(),
            FeatureType::DeviceDiagnosis
        );
        assert!(FunctionType::IncentiveTableData.is_list());
        assert!(!FunctionType::DeviceDiagnosisStateData.is_list());
        assert_eq!(
            serde_json::to_string(&FunctionType::LoadControlLimitListData).unwrap(),
            "\"loadControlLimitListData\""
        );
    }

    #[test]
    fn test_address_display() {
        let addr = FeatureAddress::new("d:_i:1234", vec![1, 2], 3);
        assert_eq!(addr.to_string(), "d:_i:1234:1.2:3");
        assert_eq!(addr.entity_address().feature(3), addr);
        assert_eq!(RoleType::Client.counterpart(), RoleType::Server);
    }
}
