//! Entities: addressed containers of features

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::feature::{FeatureLocal, FeatureRemote};
use crate::model::{EntityAddress, EntityType, FeatureAddress, FeatureType, FunctionType, RoleType};
use crate::sender::Sender;

/// Entity of the local device
#[derive(Debug)]
pub struct EntityLocal {
    address: EntityAddress,
    entity_type: EntityType,
    features: RwLock<Vec<Arc<FeatureLocal>>>,
}

impl EntityLocal {
    pub fn new(address: EntityAddress, entity_type: EntityType) -> Self {
        Self {
            address,
            entity_type,
            features: RwLock::new(Vec::new()),
        }
    }

    pub fn address(&self) -> &EntityAddress {
        &self.address
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    pub fn features(&self) -> Vec<Arc<FeatureLocal>> {
        self.features.read().clone()
    }

    pub fn feature(&self, address: &FeatureAddress) -> Option<Arc<FeatureLocal>> {
        self.features
            .read()
            .iter()
            .find(|f| f.address().feature == address.feature)
            .cloned()
    }

    pub fn feature_by_type_and_role(&self, feature_type: FeatureType, role: RoleType) -> Option<Arc<FeatureLocal>> {
        self.features
            .read()
            .iter()
            .find(|f| f.feature_type() == feature_type && f.role() == role)
            .cloned()
    }

    /// Return the feature of this type and role, adding it if missing.
    ///
    /// Feature ids start at 1 and grow by one per added feature.
    pub fn get_or_add_feature(&self, feature_type: FeatureType, role: RoleType) -> Arc<FeatureLocal> {
        let mut features = self.features.write();
        if let Some(feature) = features
            .iter()
            .find(|f| f.feature_type() == feature_type && f.role() == role)
        {
            return feature.clone();
        }

        let id = features.iter().map(|f| f.address().feature).max().unwrap_or(0) + 1;
        let feature = Arc::new(FeatureLocal::new(self.address.feature(id), feature_type, role));
        features.push(feature.clone());
        feature
    }
}

/// Announced shape of a remote feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureDescription {
    pub feature: u32,
    pub feature_type: FeatureType,
    pub role: RoleType,
    #[serde(default)]
    pub functions: Vec<FunctionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FeatureDescription {
    pub fn new(feature: u32, feature_type: FeatureType, role: RoleType, functions: Vec<FunctionType>) -> Self {
        Self {
            feature,
            feature_type,
            role,
            functions,
            description: None,
        }
    }
}

/// Announced shape of a remote entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDescription {
    pub entity: Vec<u32>,
    pub entity_type: EntityType,
    #[serde(default)]
    pub features: Vec<FeatureDescription>,
}

/// Entity announced by a remote device
#[derive(Debug)]
pub struct EntityRemote {
    address: EntityAddress,
    entity_type: EntityType,
    features: Vec<Arc<FeatureRemote>>,
}

impl EntityRemote {
    pub fn new(device: &str, description: &EntityDescription, sender: &Arc<Sender>) -> Self {
        let address = EntityAddress::new(device, description.entity.clone());
        let features = description
            .features
            .iter()
            .map(|f| {
                Arc::new(
                    FeatureRemote::new(
                        address.feature(f.feature),
                        f.feature_type,
                        f.role,
                        f.functions.clone(),
                        sender.clone(),
                    )
                    .with_description(f.description.clone()),
                )
            })
            .collect();

        Self {
            address,
            entity_type: description.entity_type,
            features,
        }
    }

    pub fn address(&self) -> &EntityAddress {
        &self.address
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    pub fn features(&self) -> &[Arc<FeatureRemote>] {
        &self.features
    }

    pub fn feature(&self, feature: u32) -> Option<Arc<FeatureRemote>> {
        self.features.iter().find(|f| f.address().feature == feature).cloned()
    }

    pub fn feature_by_type_and_role(&self, feature_type: FeatureType, role: RoleType) -> Option<Arc<FeatureRemote>> {
        self.features
            .iter()
            .find(|f| f.feature_type() == feature_type && f.role() == role)
            .cloned()
    }
}
