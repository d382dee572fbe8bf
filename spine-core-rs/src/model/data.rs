//! Function data records
//!
//! One record type per SPINE function. List functions wrap a `Vec` of
//! records that each declare their identifier through [`UpdateItem`].
//! [`FunctionData`] is the tagged union carried in datagrams and cached by
//! features.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::types::*;
use super::update::{
    remove_element_from_item, update_list, Clearable, FieldMask, Merge, Selector, UpdateItem,
};
use crate::error::{Result, SpineError};
use crate::merge_present;

// ============================================================================
// Device classification
// ============================================================================

/// Manufacturer details of a device
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceClassificationManufacturerData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub software_revision: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hardware_revision: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer_node_identification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer_description: Option<String>,
}

impl Merge for DeviceClassificationManufacturerData {
    fn merge_from(&mut self, incoming: &Self) {
        merge_present!(self, incoming;
            device_name, device_code, serial_number, software_revision,
            hardware_revision, vendor_name, vendor_code, brand_name, power_source,
            manufacturer_node_identification, manufacturer_label, manufacturer_description,
        );
    }
}

// ============================================================================
// Device diagnosis
// ============================================================================

/// Operating state reported by device diagnosis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperatingState {
    NormalOperation,
    Standby,
    Failure,
    ServiceNeeded,
    OverrideDetected,
    InAlarm,
    NotReachable,
    Finished,
    Temporarilynotready,
    Off,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDiagnosisStateData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating_state: Option<OperatingState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_state_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub up_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_up_time: Option<String>,
}

impl Merge for DeviceDiagnosisStateData {
    fn merge_from(&mut self, incoming: &Self) {
        merge_present!(self, incoming;
            timestamp, operating_state, vendor_state_code, last_error_code, up_time, total_up_time,
        );
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDiagnosisHeartbeatData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heartbeat_counter: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heartbeat_timeout: Option<String>,
}

impl Merge for DeviceDiagnosisHeartbeatData {
    fn merge_from(&mut self, incoming: &Self) {
        merge_present!(self, incoming; timestamp, heartbeat_counter, heartbeat_timeout);
    }
}

// ============================================================================
// Load control
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LimitType {
    MinValueLimit,
    MaxValueLimit,
    SignDependentAbsValueLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LimitCategory {
    Obligation,
    Recommendation,
    Optimization,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EnergyDirection {
    Consume,
    Produce,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimePeriod {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

/// Description of one load control limit
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadControlLimitDescriptionData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_type: Option<LimitType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_category: Option<LimitCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_direction: Option<EnergyDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurement_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Merge for LoadControlLimitDescriptionData {
    fn merge_from(&mut self, incoming: &Self) {
        merge_present!(self, incoming;
            limit_id, limit_type, limit_category, limit_direction, measurement_id,
            unit, scope_type, label, description,
        );
    }
}

impl UpdateItem for LoadControlLimitDescriptionData {
    type Key = u32;

    fn key(&self) -> Option<u32> {
        self.limit_id
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadControlLimitDescriptionListData {
    #[serde(default)]
    pub load_control_limit_description_data: Vec<LoadControlLimitDescriptionData>,
}

/// Current value of one load control limit
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadControlLimitData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_limit_changeable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_limit_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_period: Option<TimePeriod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<ScaledNumber>,
}

impl Merge for LoadControlLimitData {
    fn merge_from(&mut self, incoming: &Self) {
        merge_present!(self, incoming;
            limit_id, is_limit_changeable, is_limit_active, time_period, value,
        );
    }
}

impl UpdateItem for LoadControlLimitData {
    type Key = u32;

    fn key(&self) -> Option<u32> {
        self.limit_id
    }
}

/// Clearable fields of [`LoadControlLimitData`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoadControlLimitField {
    IsLimitChangeable,
    IsLimitActive,
    TimePeriod,
    Value,
}

impl Clearable for LoadControlLimitData {
    type Field = LoadControlLimitField;

    fn clear_field(&mut self, field: LoadControlLimitField) {
        match field {
            LoadControlLimitField::IsLimitChangeable => self.is_limit_changeable = None,
            LoadControlLimitField::IsLimitActive => self.is_limit_active = None,
            LoadControlLimitField::TimePeriod => self.time_period = None,
            LoadControlLimitField::Value => self.value = None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadControlLimitListData {
    #[serde(default)]
    pub load_control_limit_data: Vec<LoadControlLimitData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaledNumberElements {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<ElementTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<ElementTag>,
}

/// Wire form of a field mask over [`LoadControlLimitData`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadControlLimitDataElements {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_limit_changeable: Option<ElementTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_limit_active: Option<ElementTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_period: Option<ElementTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<ScaledNumberElements>,
}

impl From<&LoadControlLimitDataElements> for FieldMask<LoadControlLimitField> {
    fn from(elements: &LoadControlLimitDataElements) -> Self {
        let mut mask = FieldMask::new();
        if elements.is_limit_changeable.is_some() {
            mask.insert(LoadControlLimitField::IsLimitChangeable);
        }
        if elements.is_limit_active.is_some() {
            mask.insert(LoadControlLimitField::IsLimitActive);
        }
        if elements.time_period.is_some() {
            mask.insert(LoadControlLimitField::TimePeriod);
        }
        if elements.value.is_some() {
            mask.insert(LoadControlLimitField::Value);
        }
        mask
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadControlLimitListDataSelectors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_id: Option<u32>,
}

impl Selector<LoadControlLimitData> for LoadControlLimitListDataSelectors {
    fn matches(&self, item: &LoadControlLimitData) -> bool {
        self.limit_id.map_or(true, |id| item.limit_id == Some(id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadControlLimitDescriptionListDataSelectors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurement_id: Option<u32>,
}

impl Selector<LoadControlLimitDescriptionData> for LoadControlLimitDescriptionListDataSelectors {
    fn matches(&self, item: &LoadControlLimitDescriptionData) -> bool {
        self.limit_id.map_or(true, |id| item.limit_id == Some(id))
            && self
                .measurement_id
                .map_or(true, |id| item.measurement_id == Some(id))
    }
}

// ============================================================================
// Incentive table
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncentiveTableDescription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tariff_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurement_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tariff_writeable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Merge for IncentiveTableDescription {
    fn merge_from(&mut self, incoming: &Self) {
        merge_present!(self, incoming;
            tariff_id, measurement_id, tariff_writeable, update_required, scope_type, label, description,
        );
    }
}

impl UpdateItem for IncentiveTableDescription {
    type Key = u32;

    fn key(&self) -> Option<u32> {
        self.tariff_id
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncentiveTableDescriptionData {
    #[serde(default)]
    pub incentive_table_description: Vec<IncentiveTableDescription>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncentiveTableConstraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tariff_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tiers_per_tariff: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_boundaries_per_tier: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_incentives_per_tier: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_slot_count: Option<u32>,
}

impl Merge for IncentiveTableConstraints {
    fn merge_from(&mut self, incoming: &Self) {
        merge_present!(self, incoming;
            tariff_id, max_tiers_per_tariff, max_boundaries_per_tier, max_incentives_per_tier, max_slot_count,
        );
    }
}

impl UpdateItem for IncentiveTableConstraints {
    type Key = u32;

    fn key(&self) -> Option<u32> {
        self.tariff_id
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncentiveTableConstraintsData {
    #[serde(default)]
    pub incentive_table_constraints: Vec<IncentiveTableConstraints>,
}

/// One time slot of a tariff
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncentiveSlot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<ScaledNumber>,
}

/// Slots of one tariff; the slot list is replaced as a whole
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncentiveTable {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tariff_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incentive_slot: Option<Vec<IncentiveSlot>>,
}

impl Merge for IncentiveTable {
    fn merge_from(&mut self, incoming: &Self) {
        merge_present!(self, incoming; tariff_id, incentive_slot);
    }
}

impl UpdateItem for IncentiveTable {
    type Key = u32;

    fn key(&self) -> Option<u32> {
        self.tariff_id
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncentiveTableData {
    #[serde(default)]
    pub incentive_table: Vec<IncentiveTable>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncentiveTableDataSelectors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tariff_id: Option<u32>,
}

impl Selector<IncentiveTable> for IncentiveTableDataSelectors {
    fn matches(&self, item: &IncentiveTable) -> bool {
        self.tariff_id.map_or(true, |id| item.tariff_id == Some(id))
    }
}

// ============================================================================
// Node management
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRequest {
    pub client_address: FeatureAddress,
    pub server_address: FeatureAddress,
    pub server_feature_type: FeatureType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionDelete {
    pub client_address: FeatureAddress,
    pub server_address: FeatureAddress,
}

/// Outcome of a call or acknowledged write; error number 0 means success
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ResultData {
    pub const GENERAL_ERROR: u32 = 1;
    pub const DESTINATION_UNKNOWN: u32 = 4;
    pub const COMMAND_NOT_SUPPORTED: u32 = 6;
    pub const COMMAND_REJECTED: u32 = 7;

    pub fn success() -> Self {
        Self {
            error_number: Some(0),
            description: None,
        }
    }

    pub fn error(error_number: u32, description: impl Into<String>) -> Self {
        Self {
            error_number: Some(error_number),
            description: Some(description.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error_number.unwrap_or(0) == 0
    }
}

// ============================================================================
// Filters
// ============================================================================

/// Selectors keyed by the list they apply to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Selectors {
    LoadControlLimitListDataSelectors(LoadControlLimitListDataSelectors),
    LoadControlLimitDescriptionListDataSelectors(LoadControlLimitDescriptionListDataSelectors),
    IncentiveTableDataSelectors(IncentiveTableDataSelectors),
}

impl Selectors {
    /// Function whose records these selectors address
    pub fn function(&self) -> FunctionType {
        match self {
            Selectors::LoadControlLimitListDataSelectors(_) => FunctionType::LoadControlLimitListData,
            Selectors::LoadControlLimitDescriptionListDataSelectors(_) => {
                FunctionType::LoadControlLimitDescriptionListData
            }
            Selectors::IncentiveTableDataSelectors(_) => FunctionType::IncentiveTableData,
        }
    }
}

/// Field masks keyed by the record they apply to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Elements {
    LoadControlLimitDataElements(LoadControlLimitDataElements),
}

/// Partial or delete filter attached to a command
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selectors: Option<Selectors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elements: Option<Elements>,
}

impl Filter {
    pub fn with_selectors(selectors: Selectors) -> Self {
        Self {
            selectors: Some(selectors),
            elements: None,
        }
    }

    pub fn with_elements(mut self, elements: Elements) -> Self {
        self.elements = Some(elements);
        self
    }
}

// ============================================================================
// Function data
// ============================================================================

/// Cached or transmitted value of one function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FunctionData {
    DeviceClassificationManufacturerData(DeviceClassificationManufacturerData),
    DeviceDiagnosisStateData(DeviceDiagnosisStateData),
    DeviceDiagnosisHeartbeatData(DeviceDiagnosisHeartbeatData),
    IncentiveTableDescriptionData(IncentiveTableDescriptionData),
    IncentiveTableConstraintsData(IncentiveTableConstraintsData),
    IncentiveTableData(IncentiveTableData),
    LoadControlLimitDescriptionListData(LoadControlLimitDescriptionListData),
    LoadControlLimitListData(LoadControlLimitListData),
    NodeManagementSubscriptionRequestCall(SubscriptionRequest),
    NodeManagementSubscriptionDeleteCall(SubscriptionDelete),
    ResultData(ResultData),
}

impl FunctionData {
    pub fn function_type(&self) -> FunctionType {
        match self {
            FunctionData::DeviceClassificationManufacturerData(_) => {
                FunctionType::DeviceClassificationManufacturerData
            }
            FunctionData::DeviceDiagnosisStateData(_) => FunctionType::DeviceDiagnosisStateData,
            FunctionData::DeviceDiagnosisHeartbeatData(_) => FunctionType::DeviceDiagnosisHeartbeatData,
            FunctionData::IncentiveTableDescriptionData(_) => FunctionType::IncentiveTableDescriptionData,
            FunctionData::IncentiveTableConstraintsData(_) => FunctionType::IncentiveTableConstraintsData,
            FunctionData::IncentiveTableData(_) => FunctionType::IncentiveTableData,
            FunctionData::LoadControlLimitDescriptionListData(_) => {
                FunctionType::LoadControlLimitDescriptionListData
            }
            FunctionData::LoadControlLimitListData(_) => FunctionType::LoadControlLimitListData,
            FunctionData::NodeManagementSubscriptionRequestCall(_) => {
                FunctionType::NodeManagementSubscriptionRequestCall
            }
            FunctionData::NodeManagementSubscriptionDeleteCall(_) => {
                FunctionType::NodeManagementSubscriptionDeleteCall
            }
            FunctionData::ResultData(_) => FunctionType::ResultData,
        }
    }

    /// Empty value for a cacheable function, `None` for calls and results
    pub fn empty(function: FunctionType) -> Option<Self> {
        let data = match function {
            FunctionType::DeviceClassificationManufacturerData => {
                FunctionData::DeviceClassificationManufacturerData(Default::default())
            }
            FunctionType::DeviceDiagnosisStateData => FunctionData::DeviceDiagnosisStateData(Default::default()),
            FunctionType::DeviceDiagnosisHeartbeatData => {
                FunctionData::DeviceDiagnosisHeartbeatData(Default::default())
            }
            FunctionType::IncentiveTableDescriptionData => {
                FunctionData::IncentiveTableDescriptionData(Default::default())
            }
            FunctionType::IncentiveTableConstraintsData => {
                FunctionData::IncentiveTableConstraintsData(Default::default())
            }
            FunctionType::IncentiveTableData => FunctionData::IncentiveTableData(Default::default()),
            FunctionType::LoadControlLimitDescriptionListData => {
                FunctionData::LoadControlLimitDescriptionListData(Default::default())
            }
            FunctionType::LoadControlLimitListData => FunctionData::LoadControlLimitListData(Default::default()),
            FunctionType::NodeManagementSubscriptionRequestCall
            | FunctionType::NodeManagementSubscriptionDeleteCall
            | FunctionType::ResultData => return None,
        };
        Some(data)
    }

    /// Merge `incoming` into this value; `partial` may restrict which list
    /// records are touched
    pub fn merge(&mut self, incoming: &FunctionData, partial: Option<&Filter>) -> Result<()> {
        let function = self.function_type();
        if incoming.function_type() != function {
            return Err(SpineError::FunctionTypeMismatch {
                expected: function,
                actual: incoming.function_type(),
            });
        }

        let selectors = partial.and_then(|f| f.selectors.as_ref());
        if let Some(foreign) = selectors.filter(|s| s.function() != function) {
            warn!("Ignoring partial update of {} selected by {}", function, foreign.function());
            return Ok(());
        }

        match (self, incoming) {
            (FunctionData::DeviceClassificationManufacturerData(cur), FunctionData::DeviceClassificationManufacturerData(new)) => {
                cur.merge_from(new)
            }
            (FunctionData::DeviceDiagnosisStateData(cur), FunctionData::DeviceDiagnosisStateData(new)) => {
                cur.merge_from(new)
            }
            (FunctionData::DeviceDiagnosisHeartbeatData(cur), FunctionData::DeviceDiagnosisHeartbeatData(new)) => {
                cur.merge_from(new)
            }
            (FunctionData::IncentiveTableDescriptionData(cur), FunctionData::IncentiveTableDescriptionData(new)) => {
                cur.incentive_table_description =
                    update_list(&cur.incentive_table_description, &new.incentive_table_description, None, None);
            }
            (FunctionData::IncentiveTableConstraintsData(cur), FunctionData::IncentiveTableConstraintsData(new)) => {
                cur.incentive_table_constraints =
                    update_list(&cur.incentive_table_constraints, &new.incentive_table_constraints, None, None);
            }
            (FunctionData::IncentiveTableData(cur), FunctionData::IncentiveTableData(new)) => {
                let selector = match selectors {
                    Some(Selectors::IncentiveTableDataSelectors(s)) => Some(s as &dyn Selector<IncentiveTable>),
                    _ => None,
                };
                cur.incentive_table = update_list(&cur.incentive_table, &new.incentive_table, selector, None);
            }
            (FunctionData::LoadControlLimitDescriptionListData(cur), FunctionData::LoadControlLimitDescriptionListData(new)) => {
                let selector = match selectors {
                    Some(Selectors::LoadControlLimitDescriptionListDataSelectors(s)) => {
                        Some(s as &dyn Selector<LoadControlLimitDescriptionData>)
                    }
                    _ => None,
                };
                cur.load_control_limit_description_data = update_list(
                    &cur.load_control_limit_description_data,
                    &new.load_control_limit_description_data,
                    selector,
                    None,
                );
            }
            (FunctionData::LoadControlLimitListData(cur), FunctionData::LoadControlLimitListData(new)) => {
                let selector = match selectors {
                    Some(Selectors::LoadControlLimitListDataSelectors(s)) => Some(s as &dyn Selector<LoadControlLimitData>),
                    _ => None,
                };
                cur.load_control_limit_data =
                    update_list(&cur.load_control_limit_data, &new.load_control_limit_data, selector, None);
            }
            (cur, new) => {
                return Err(SpineError::FunctionTypeMismatch {
                    expected: cur.function_type(),
                    actual: new.function_type(),
                })
            }
        }

        Ok(())
    }

    /// Apply a delete filter.
    ///
    /// Without elements, the selected records are removed (all of them when
    /// there are no selectors). With elements, only the named fields of the
    /// selected records are cleared. Selectors of another function select
    /// nothing.
    pub fn apply_delete(&mut self, filter: &Filter) {
        let function = self.function_type();
        if let Some(foreign) = filter.selectors.as_ref().filter(|s| s.function() != function) {
            warn!("Ignoring delete filter on {} selected by {}", function, foreign.function());
            return;
        }

        match (self, &filter.selectors, &filter.elements) {
            (FunctionData::LoadControlLimitListData(cur), selectors, Some(Elements::LoadControlLimitDataElements(elements))) => {
                let selector = match selectors {
                    Some(Selectors::LoadControlLimitListDataSelectors(s)) => Some(s),
                    _ => None,
                };
                let mask = FieldMask::from(elements);
                for item in cur
                    .load_control_limit_data
                    .iter_mut()
                    .filter(|item| selector.map_or(true, |s| s.matches(&**item)))
                {
                    remove_element_from_item(item, &mask);
                }
            }
            (FunctionData::LoadControlLimitListData(cur), Some(Selectors::LoadControlLimitListDataSelectors(s)), None) => {
                cur.load_control_limit_data = update_list(
                    &cur.load_control_limit_data,
                    &[],
                    None,
                    Some(s as &dyn Selector<LoadControlLimitData>),
                );
            }
            (FunctionData::LoadControlLimitDescriptionListData(cur), Some(Selectors::LoadControlLimitDescriptionListDataSelectors(s)), None) => {
                cur.load_control_limit_description_data =
                    update_list(
                    &cur.load_control_limit_description_data,
                    &[],
                    None,
                    Some(s as &dyn Selector<LoadControlLimitDescriptionData>),
                );
            }
            (FunctionData::IncentiveTableData(cur), Some(Selectors::IncentiveTableDataSelectors(s)), None) => {
                cur.incentive_table =
                    update_list(&cur.incentive_table, &[], None, Some(s as &dyn Selector<IncentiveTable>));
            }
            (cur, None, None) => {
                if let Some(empty) = FunctionData::empty(function) {
                    *cur = empty;
                }
            }
            _ => {
                warn!("Ignoring delete filter that does not apply to {}", function);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limit(id: u32, value: f64) -> LoadControlLimitData {
        LoadControlLimitData {
            limit_id: Some(id),
            is_limit_changeable: Some(true),
            is_limit_active: Some(true),
            time_period: None,
            value: Some(ScaledNumber::new(value)),
        }
    }

    #[test]
    fn test_remove_value_from_limit() {
        let mut items = LoadControlLimitListData {
            load_control_limit_data: vec![limit(1, 16.0)],
        };
        let elements = LoadControlLimitDataElements {
            value: Some(ScaledNumberElements::default()),
            ..Default::default()
        };

        remove_element_from_item(&mut items.load_control_limit_data[0], &FieldMask::from(&elements));

        assert_eq!(items.load_control_limit_data[0].value, None);
        assert_eq!(items.load_control_limit_data[0].is_limit_active, Some(true));
    }

    #[test]
    fn test_merge_limits_with_selector() {
        let mut data = FunctionData::LoadControlLimitListData(LoadControlLimitListData {
            load_control_limit_data: vec![limit(1, 16.0), limit(2, 32.0)],
        });
        let incoming = FunctionData::LoadControlLimitListData(LoadControlLimitListData {
            load_control_limit_data: vec![LoadControlLimitData {
                is_limit_active: Some(false),
                ..Default::default()
            }],
        });
        let partial = Filter::with_selectors(Selectors::LoadControlLimitListDataSelectors(
            LoadControlLimitListDataSelectors { limit_id: Some(2) },
        ));

        data.merge(&incoming, Some(&partial)).unwrap();

        let FunctionData::LoadControlLimitListData(list) = data else {
            panic!("Expected limit list");
        };
        assert_eq!(list.load_control_limit_data[0].is_limit_active, Some(true));
        assert_eq!(list.load_control_limit_data[1].is_limit_active, Some(false));
    }

    #[test]
    fn test_delete_filter_clears_selected_fields() {
        let mut data = FunctionData::LoadControlLimitListData(LoadControlLimitListData {
            load_control_limit_data: vec![limit(1, 16.0), limit(2, 32.0)],
        });
        let filter = Filter::with_selectors(Selectors::LoadControlLimitListDataSelectors(
            LoadControlLimitListDataSelectors { limit_id: Some(1) },
        ))
        .with_elements(Elements::LoadControlLimitDataElements(LoadControlLimitDataElements {
            value: Some(ScaledNumberElements::default()),
            ..Default::default()
        }));

        data.apply_delete(&filter);

        let FunctionData::LoadControlLimitListData(list) = data else {
            panic!("Expected limit list");
        };
        assert_eq!(list.load_control_limit_data.len(), 2);
        assert_eq!(list.load_control_limit_data[0].value, None);
        assert_eq!(list.load_control_limit_data[1].value, Some(ScaledNumber::new(32.0)));
    }

    #[test]
    fn test_delete_filter_removes_records() {
        let mut data = FunctionData::LoadControlLimitListData(LoadControlLimitListData {
            load_control_limit_data: vec![limit(1, 16.0), limit(2, 32.0)],
        });
        let filter = Filter::with_selectors(Selectors::LoadControlLimitListDataSelectors(
            LoadControlLimitListDataSelectors { limit_id: Some(1) },
        ));

        data.apply_delete(&filter);

        assert_eq!(
            data,
            FunctionData::LoadControlLimitListData(LoadControlLimitListData {
                load_control_limit_data: vec![limit(2, 32.0)],
            })
        );
    }

    #[test]
    fn test_delete_filter_with_foreign_selector_is_ignored() {
        let original = FunctionData::LoadControlLimitListData(LoadControlLimitListData {
            load_control_limit_data: vec![limit(1, 16.0), limit(2, 32.0)],
        });
        let mut data = original.clone();
        let filter = Filter::with_selectors(Selectors::LoadControlLimitDescriptionListDataSelectors(
            LoadControlLimitDescriptionListDataSelectors {
                limit_id: Some(1),
                ..Default::default()
            },
        ))
        .with_elements(Elements::LoadControlLimitDataElements(LoadControlLimitDataElements {
            value: Some(ScaledNumberElements::default()),
            ..Default::default()
        }));

        data.apply_delete(&filter);
        assert_eq!(data, original);

        // without elements it would otherwise reset the list
        data.apply_delete(&Filter::with_selectors(Selectors::IncentiveTableDataSelectors(
            IncentiveTableDataSelectors { tariff_id: Some(1) },
        )));
        assert_eq!(data, original);
    }

    #[test]
    fn test_merge_with_foreign_selector_is_ignored() {
        let original = FunctionData::LoadControlLimitListData(LoadControlLimitListData {
            load_control_limit_data: vec![limit(1, 16.0), limit(2, 32.0)],
        });
        let mut data = original.clone();
        let incoming = FunctionData::LoadControlLimitListData(LoadControlLimitListData {
            load_control_limit_data: vec![LoadControlLimitData {
                value: Some(ScaledNumber::new(0.0)),
                ..Default::default()
            }],
        });
        let partial = Filter::with_selectors(Selectors::IncentiveTableDataSelectors(IncentiveTableDataSelectors {
            tariff_id: Some(1),
        }));

        data.merge(&incoming, Some(&partial)).unwrap();
        assert_eq!(data, original);
    }

    #[test]
    fn test_merge_mismatched_function() {
        let mut data = FunctionData::DeviceDiagnosisStateData(Default::default());
        let incoming = FunctionData::IncentiveTableData(Default::default());

        assert!(matches!(
            data.merge(&incoming, None),
            Err(SpineError::FunctionTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_function_data_wire_shape() {
        let data = FunctionData::DeviceDiagnosisStateData(DeviceDiagnosisStateData {
            operating_state: Some(OperatingState::Failure),
            last_error_code: Some("E42".to_string()),
            ..Default::default()
        });

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "deviceDiagnosisStateData": {
                    "operatingState": "failure",
                    "lastErrorCode": "E42"
                }
            })
        );
    }
}
