//! Standing notify interest between a client and a server feature

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::model::{FeatureAddress, FeatureType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub id: u64,
    pub client_address: FeatureAddress,
    pub server_address: FeatureAddress,
    pub server_feature_type: FeatureType,
}

/// Table of subscriptions, both those we hold on remotes and those remotes
/// hold on us
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    entries: RwLock<Vec<Subscription>>,
    next_id: AtomicU64,
}

impl SubscriptionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a subscription; returns false if the pair is already subscribed
    pub fn add(&self, client: &FeatureAddress, server: &FeatureAddress, feature_type: FeatureType) -> bool {
        let mut entries = self.entries.write();
        if entries
            .iter()
            .any(|s| &s.client_address == client && &s.server_address == server)
        {
            return false;
        }

        entries.push(Subscription {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            client_address: client.clone(),
            server_address: server.clone(),
            server_feature_type: feature_type,
        });
        true
    }

    pub fn remove(&self, client: &FeatureAddress, server: &FeatureAddress) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|s| !(&s.client_address == client && &s.server_address == server));
        before != entries.len()
    }

    /// Subscriptions on the server feature at `server`
    pub fn for_server(&self, server: &FeatureAddress) -> Vec<Subscription> {
        self.entries
            .read()
            .iter()
            .filter(|s| &s.server_address == server)
            .cloned()
            .collect()
    }

    /// Drop everything involving `device` on either side
    pub fn remove_device(&self, device: &str) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|s| {
            s.client_address.device.as_deref() != Some(device) && s.server_address.device.as_deref() != Some(device)
        });
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
