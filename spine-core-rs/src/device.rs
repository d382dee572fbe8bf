//! Local and remote devices
//!
//! [`DeviceLocal`] is the root of everything this process exposes: its
//! entities and features, the use cases it supports, the remote devices it is
//! connected to, and the shared pending-request and subscription tables. It
//! is also where inbound datagrams enter, via [`DeviceLocal::handle_message`].
//!
//! Locks are only held while reading or updating tables. Sends and event
//! publishing always happen after the guards are dropped.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::entity::{EntityDescription, EntityLocal, EntityRemote, FeatureDescription};
use crate::error::{Result, SpineError};
use crate::events::{ElementChange, EventBus, EventPayload, EventType};
use crate::feature::{FeatureLocal, FeatureRemote};
use crate::message::{CmdClassifier, Datagram};
use crate::model::{
    DeviceType, EntityAddress, EntityType, FeatureAddress, FeatureType, FunctionData, FunctionType, MsgCounter,
    ResultData, RoleType, SubscriptionDelete, SubscriptionRequest, UseCaseActor, UseCaseName,
};
use crate::pending::{PendingRequests, ReplyHandle};
use crate::sender::{Sender, TransportSink};
use crate::subscription::SubscriptionManager;

/// Address of the node management feature of `device`
pub fn node_management_address(device: &str) -> FeatureAddress {
    FeatureAddress::new(device, vec![0], 0)
}

/// Announced shape of a remote device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDeviceDescription {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<DeviceType>,
    #[serde(default)]
    pub entities: Vec<EntityDescription>,
}

/// Device on the other end of a connection, keyed by its SKI
pub struct DeviceRemote {
    ski: String,
    address: String,
    device_type: Option<DeviceType>,
    entities: RwLock<Vec<Arc<EntityRemote>>>,
    sender: Arc<Sender>,
}

impl DeviceRemote {
    pub fn new(ski: impl Into<String>, description: &RemoteDeviceDescription, sender: Arc<Sender>) -> Self {
        let entities = description
            .entities
            .iter()
            .map(|e| Arc::new(EntityRemote::new(&description.address, e, &sender)))
            .collect();

        Self {
            ski: ski.into(),
            address: description.address.clone(),
            device_type: description.device_type,
            entities: RwLock::new(entities),
            sender,
        }
    }

    pub fn ski(&self) -> &str {
        &self.ski
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn device_type(&self) -> Option<DeviceType> {
        self.device_type
    }

    pub fn sender(&self) -> &Arc<Sender> {
        &self.sender
    }

    pub fn entities(&self) -> Vec<Arc<EntityRemote>> {
        self.entities.read().clone()
    }

    pub fn entity(&self, entity: &[u32]) -> Option<Arc<EntityRemote>> {
        self.entities
            .read()
            .iter()
            .find(|e| e.address().entity == entity)
            .cloned()
    }

    fn add_entity(&self, description: &EntityDescription) -> Arc<EntityRemote> {
        let entity = Arc::new(EntityRemote::new(&self.address, description, &self.sender));
        let mut entities = self.entities.write();
        entities.retain(|e| e.address().entity != description.entity);
        entities.push(entity.clone());
        entity
    }

    fn remove_entity(&self, entity: &[u32]) -> Option<Arc<EntityRemote>> {
        let mut entities = self.entities.write();
        let index = entities.iter().position(|e| e.address().entity == entity)?;
        Some(entities.remove(index))
    }

    pub fn feature_by_address(&self, address: &FeatureAddress) -> Option<Arc<FeatureRemote>> {
        if address.device.as_deref().is_some_and(|d| d != self.address) {
            return None;
        }
        self.entity(&address.entity)?.feature(address.feature)
    }

    /// First feature of this type and role across all entities
    pub fn feature_by_type_and_role(&self, feature_type: FeatureType, role: RoleType) -> Option<Arc<FeatureRemote>> {
        self.entities
            .read()
            .iter()
            .find_map(|e| e.feature_by_type_and_role(feature_type, role))
    }
}

impl std::fmt::Debug for DeviceRemote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceRemote")
            .field("ski", &self.ski)
            .field("address", &self.address)
            .field("entities", &self.entities.read().len())
            .finish()
    }
}

/// Use case advertised by the local device
#[derive(Debug, Clone, PartialEq)]
pub struct UseCaseSupport {
    pub entity: EntityAddress,
    pub actor: UseCaseActor,
    pub name: UseCaseName,
    pub version: String,
    pub scenarios: Vec<u32>,
    pub available: bool,
}

/// The device this process represents
pub struct DeviceLocal {
    address: String,
    device_type: DeviceType,
    entities: RwLock<Vec<Arc<EntityLocal>>>,
    remotes: RwLock<HashMap<String, Arc<DeviceRemote>>>,
    use_cases: RwLock<Vec<UseCaseSupport>>,
    subscriptions: SubscriptionManager,
    pending: Arc<PendingRequests>,
    bus: Arc<EventBus>,
}

impl DeviceLocal {
    pub fn new(
        address: impl Into<String>,
        device_type: DeviceType,
        bus: Arc<EventBus>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            address: address.into(),
            device_type,
            entities: RwLock::new(Vec::new()),
            remotes: RwLock::new(HashMap::new()),
            use_cases: RwLock::new(Vec::new()),
            subscriptions: SubscriptionManager::new(),
            pending: PendingRequests::new(request_timeout),
            bus,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn device_type(&self) -> DeviceType {
        self.device_type
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn pending(&self) -> &Arc<PendingRequests> {
        &self.pending
    }

    pub fn subscriptions(&self) -> &SubscriptionManager {
        &self.subscriptions
    }

    // ------------------------------------------------------------------------
    // Local entities and features
    // ------------------------------------------------------------------------

    /// Add a top-level entity; ids start at 1
    pub fn add_entity(&self, entity_type: EntityType) -> Arc<EntityLocal> {
        let mut entities = self.entities.write();
        let id = entities
            .iter()
            .filter_map(|e| e.address().entity.first().copied())
            .max()
            .unwrap_or(0)
            + 1;

        let entity = Arc::new(EntityLocal::new(EntityAddress::new(&self.address, vec![id]), entity_type));
        entities.push(entity.clone());
        debug!("Added entity {} ({:?})", entity.address(), entity_type);
        entity
    }

    pub fn entities(&self) -> Vec<Arc<EntityLocal>> {
        self.entities.read().clone()
    }

    pub fn entity(&self, entity: &[u32]) -> Option<Arc<EntityLocal>> {
        self.entities
            .read()
            .iter()
            .find(|e| e.address().entity == entity)
            .cloned()
    }

    pub fn feature(&self, address: &FeatureAddress) -> Option<Arc<FeatureLocal>> {
        if address.device.as_deref().is_some_and(|d| d != self.address) {
            return None;
        }
        self.entity(&address.entity)?.feature(address)
    }

    pub fn feature_by_type_and_role(&self, feature_type: FeatureType, role: RoleType) -> Option<Arc<FeatureLocal>> {
        self.entities
            .read()
            .iter()
            .find_map(|e| e.feature_by_type_and_role(feature_type, role))
    }

    /// Shape of this device as announced to peers
    pub fn description(&self) -> RemoteDeviceDescription {
        let entities = self
            .entities()
            .iter()
            .map(|entity| EntityDescription {
                entity: entity.address().entity.clone(),
                entity_type: entity.entity_type(),
                features: entity
                    .features()
                    .iter()
                    .map(|f| FeatureDescription {
                        feature: f.address().feature,
                        feature_type: f.feature_type(),
                        role: f.role(),
                        functions: f.functions(),
                        description: f.description(),
                    })
                    .collect(),
            })
            .collect();

        RemoteDeviceDescription {
            address: self.address.clone(),
            device_type: Some(self.device_type),
            entities,
        }
    }

    // ------------------------------------------------------------------------
    // Use case registry
    // ------------------------------------------------------------------------

    /// Advertise a use case on `entity`, replacing an earlier registration
    pub fn register_use_case(
        &self,
        entity: &EntityLocal,
        actor: UseCaseActor,
        name: UseCaseName,
        version: impl Into<String>,
        scenarios: Vec<u32>,
    ) -> UseCaseSupport {
        let support = UseCaseSupport {
            entity: entity.address().clone(),
            actor,
            name,
            version: version.into(),
            scenarios,
            available: true,
        };

        let mut use_cases = self.use_cases.write();
        use_cases.retain(|u| !(u.entity == support.entity && u.actor == actor && u.name == name));
        use_cases.push(support.clone());

        info!("Registered use case {:?} as {:?} on {}", name, actor, support.entity);
        support
    }

    pub fn set_use_case_available(&self, name: UseCaseName, available: bool) -> bool {
        let mut found = false;
        for use_case in self.use_cases.write().iter_mut().filter(|u| u.name == name) {
            use_case.available = available;
            found = true;
        }
        found
    }

    pub fn use_cases(&self) -> Vec<UseCaseSupport> {
        self.use_cases.read().clone()
    }

    // ------------------------------------------------------------------------
    // Remote devices
    // ------------------------------------------------------------------------

    /// Attach a connected remote device and announce it on the bus
    pub fn add_remote_device(
        &self,
        ski: &str,
        description: &RemoteDeviceDescription,
        sink: Arc<dyn TransportSink>,
    ) -> Arc<DeviceRemote> {
        if self.remotes.read().contains_key(ski) {
            self.remove_remote_device(ski);
        }

        let sender = Arc::new(Sender::new(ski, sink, self.pending.clone()));
        let remote = Arc::new(DeviceRemote::new(ski, description, sender));
        self.remotes.write().insert(ski.to_string(), remote.clone());

        info!("Remote device {} connected as {}", ski, remote.address());
        self.bus.publish(
            EventPayload::new(ski, EventType::DeviceChange, ElementChange::Add).with_device(remote.clone()),
        );
        remote
    }

    /// Detach a remote device, cancelling its requests and subscriptions
    pub fn remove_remote_device(&self, ski: &str) -> Option<Arc<DeviceRemote>> {
        let remote = self.remotes.write().remove(ski)?;

        let cancelled = self.pending.cancel_device(ski);
        let unsubscribed = self.subscriptions.remove_device(remote.address());
        info!(
            "Remote device {} disconnected ({} requests cancelled, {} subscriptions dropped)",
            ski, cancelled, unsubscribed
        );

        self.bus.publish(
            EventPayload::new(ski, EventType::DeviceChange, ElementChange::Remove).with_device(remote.clone()),
        );
        Some(remote)
    }

    pub fn remote_device(&self, ski: &str) -> Option<Arc<DeviceRemote>> {
        self.remotes.read().get(ski).cloned()
    }

    pub fn remote_device_by_address(&self, address: &str) -> Option<Arc<DeviceRemote>> {
        self.remotes.read().values().find(|r| r.address() == address).cloned()
    }

    pub fn remote_devices(&self) -> Vec<Arc<DeviceRemote>> {
        let mut remotes: Vec<Arc<DeviceRemote>> = self.remotes.read().values().cloned().collect();
        remotes.sort_by(|a, b| a.ski().cmp(b.ski()));
        remotes
    }

    /// Feature of any connected remote device
    pub fn remote_feature(&self, address: &FeatureAddress) -> Option<Arc<FeatureRemote>> {
        let device = address.device.as_deref()?;
        self.remote_device_by_address(device)?.feature_by_address(address)
    }

    pub fn add_remote_entity(&self, ski: &str, description: &EntityDescription) -> Result<Arc<EntityRemote>> {
        let remote = self
            .remote_device(ski)
            .ok_or_else(|| SpineError::DeviceNotFound(ski.to_string()))?;
        let entity = remote.add_entity(description);

        self.bus.publish(EventPayload {
            entity: Some(entity.address().clone()),
            ..EventPayload::new(ski, EventType::EntityChange, ElementChange::Add).with_device(remote)
        });
        Ok(entity)
    }

    pub fn remove_remote_entity(&self, ski: &str, entity: &[u32]) -> Result<Option<Arc<EntityRemote>>> {
        let remote = self
            .remote_device(ski)
            .ok_or_else(|| SpineError::DeviceNotFound(ski.to_string()))?;
        let Some(removed) = remote.remove_entity(entity) else {
            return Ok(None);
        };

        self.bus.publish(EventPayload {
            entity: Some(removed.address().clone()),
            ..EventPayload::new(ski, EventType::EntityChange, ElementChange::Remove).with_device(remote)
        });
        Ok(Some(removed))
    }

    // ------------------------------------------------------------------------
    // Subscriptions
    // ------------------------------------------------------------------------

    /// Ask the server at `remote` to notify `local` about changes
    pub fn subscribe(
        &self,
        local: &FeatureAddress,
        remote: &FeatureAddress,
        feature_type: FeatureType,
    ) -> Result<ReplyHandle> {
        let device = self.remote_device_for(remote)?;

        if !self.subscriptions.add(local, remote, feature_type) {
            debug!("{} already subscribed to {}", local, remote);
        }

        let call = FunctionData::NodeManagementSubscriptionRequestCall(SubscriptionRequest {
            client_address: local.clone(),
            server_address: remote.clone(),
            server_feature_type: feature_type,
        });

        device
            .sender()
            .call(call, &node_management_address(&self.address), &node_management_address(device.address()))
            .map_err(|e| {
                self.subscriptions.remove(local, remote);
                e
            })
    }

    pub fn unsubscribe(&self, local: &FeatureAddress, remote: &FeatureAddress) -> Result<ReplyHandle> {
        let device = self.remote_device_for(remote)?;
        self.subscriptions.remove(local, remote);

        let call = FunctionData::NodeManagementSubscriptionDeleteCall(SubscriptionDelete {
            client_address: local.clone(),
            server_address: remote.clone(),
        });

        device
            .sender()
            .call(call, &node_management_address(&self.address), &node_management_address(device.address()))
    }

    /// Notify every client subscribed to `feature`.
    ///
    /// Each subscriber gets its own outcome; one failing does not stop the
    /// rest.
    pub fn notify_subscribers(
        &self,
        feature: &FeatureLocal,
        function: FunctionType,
    ) -> Vec<(FeatureAddress, Result<MsgCounter>)> {
        self.subscriptions
            .for_server(feature.address())
            .into_iter()
            .map(|subscription| {
                let client = subscription.client_address;
                let outcome = match self.remote_feature(&client) {
                    Some(remote) => feature.notify_data(function, &remote),
                    None => Err(SpineError::FeatureNotFound(client.to_string())),
                };
                if let Err(e) = &outcome {
                    warn!("Notify {} to {} failed: {}", function, client, e);
                }
                (client, outcome)
            })
            .collect()
    }

    /// Fail pending requests that are past their deadline
    pub fn expire_pending(&self) -> usize {
        self.pending.expire_overdue()
    }

    fn remote_device_for(&self, address: &FeatureAddress) -> Result<Arc<DeviceRemote>> {
        let device = address
            .device
            .as_deref()
            .ok_or_else(|| SpineError::FeatureNotFound(address.to_string()))?;
        self.remote_device_by_address(device)
            .ok_or_else(|| SpineError::DeviceNotFound(device.to_string()))
    }

    // ------------------------------------------------------------------------
    // Inbound datagrams
    // ------------------------------------------------------------------------

    /// Process one datagram received from the device with `ski`
    pub fn handle_message(&self, ski: &str, bytes: &[u8]) -> Result<()> {
        let datagram = Datagram::from_bytes(bytes)?;
        let remote = self
            .remote_device(ski)
            .ok_or_else(|| SpineError::DeviceNotFound(ski.to_string()))?;

        debug!(
            "Received {} {} #{} from {}",
            datagram.header.cmd_classifier, datagram.cmd.function, datagram.header.msg_counter, ski
        );

        match datagram.header.cmd_classifier {
            CmdClassifier::Read => self.handle_read(&remote, &datagram),
            CmdClassifier::Reply => self.handle_reply(&remote, &datagram),
            CmdClassifier::Notify => self.handle_notify(&remote, &datagram),
            CmdClassifier::Write => self.handle_write(&remote, &datagram),
            CmdClassifier::Call => self.handle_call(&remote, &datagram),
            CmdClassifier::Result => self.handle_result(&remote, &datagram),
        }
    }

    fn handle_read(&self, remote: &Arc<DeviceRemote>, datagram: &Datagram) -> Result<()> {
        let header = &datagram.header;
        let function = datagram.cmd.function;

        let outcome = match self.feature(&header.address_destination) {
            None => Err(ResultData::error(
                ResultData::DESTINATION_UNKNOWN,
                format!("no feature at {}", header.address_destination),
            )),
            Some(feature) if feature.role() != RoleType::Server || !feature.supports(function) => Err(
                ResultData::error(ResultData::COMMAND_NOT_SUPPORTED, format!("{} is not served", function)),
            ),
            Some(feature) => feature
                .get_data(function)
                .map_err(|e| ResultData::error(ResultData::COMMAND_REJECTED, e.to_string())),
        };

        let sender = remote.sender();
        match outcome {
            Ok(data) => sender.reply(data, &header.address_destination, &header.address_source, header.msg_counter)?,
            Err(result) => {
                debug!("Rejecting read of {} from {}", function, remote.ski());
                sender.result(result, &header.address_destination, &header.address_source, header.msg_counter)?
            }
        };
        Ok(())
    }

    fn handle_reply(&self, remote: &Arc<DeviceRemote>, datagram: &Datagram) -> Result<()> {
        let header = &datagram.header;
        let cmd = &datagram.cmd;
        let reference = header
            .msg_counter_reference
            .ok_or_else(|| SpineError::InvalidFormat("reply without msg counter reference".to_string()))?;

        let Some(entry) = self.pending.take_for(reference, remote.ski(), &header.address_source) else {
            warn!(
                "Dropping reply to unknown request {} from {} at {}",
                reference,
                header.address_source,
                remote.ski()
            );
            return Ok(());
        };

        if entry.function != cmd.function {
            let (expected, actual) = (entry.function, cmd.function);
            entry.fulfill(Err(SpineError::FunctionTypeMismatch { expected, actual }));
            return Err(SpineError::FunctionTypeMismatch { expected, actual });
        }

        let Some(feature) = remote.feature_by_address(&header.address_source) else {
            let source = header.address_source.to_string();
            entry.fulfill(Err(SpineError::FeatureNotFound(source.clone())));
            return Err(SpineError::FeatureNotFound(source));
        };

        match feature.update_data(
            cmd.function,
            cmd.data.as_ref(),
            cmd.filter_partial.as_ref(),
            cmd.filter_delete.as_ref(),
        ) {
            Ok(merged) => {
                entry.fulfill(Ok(Some(merged.clone())));
                self.publish_data_change(remote, feature.address(), cmd.function, merged);
                Ok(())
            }
            Err(e) => {
                entry.fulfill(Err(SpineError::InvalidFormat(e.to_string())));
                Err(e)
            }
        }
    }

    fn handle_notify(&self, remote: &Arc<DeviceRemote>, datagram: &Datagram) -> Result<()> {
        let header = &datagram.header;
        let cmd = &datagram.cmd;

        let feature = remote
            .feature_by_address(&header.address_source)
            .ok_or_else(|| SpineError::FeatureNotFound(header.address_source.to_string()))?;

        // only servers notify, and only their clients listen
        let client = self.feature(&header.address_destination);
        let accepted = feature.role() == RoleType::Server
            && client.as_ref().is_some_and(|client| {
                client.role() == RoleType::Client && client.feature_type() == feature.feature_type()
            });
        if !accepted {
            warn!(
                "Dropping notify of {} from {} to {}",
                cmd.function, header.address_source, header.address_destination
            );
            return Ok(());
        }

        let merged = feature.update_data(
            cmd.function,
            cmd.data.as_ref(),
            cmd.filter_partial.as_ref(),
            cmd.filter_delete.as_ref(),
        )?;

        self.publish_data_change(remote, feature.address(), cmd.function, merged);
        Ok(())
    }

    fn handle_write(&self, remote: &Arc<DeviceRemote>, datagram: &Datagram) -> Result<()> {
        let header = &datagram.header;
        let cmd = &datagram.cmd;

        let outcome = match self.feature(&header.address_destination) {
            None => Err(SpineError::FeatureNotFound(header.address_destination.to_string())),
            Some(feature) if feature.role() != RoleType::Server => Err(SpineError::RoleMismatch {
                local: feature.role(),
                remote: RoleType::Client,
            }),
            Some(feature) => feature
                .update_data(
                    cmd.function,
                    cmd.data.as_ref(),
                    cmd.filter_partial.as_ref(),
                    cmd.filter_delete.as_ref(),
                )
                .map(|merged| (feature, merged)),
        };

        if header.ack_request == Some(true) {
            let result = match &outcome {
                Ok(_) => ResultData::success(),
                Err(e) => ResultData::error(ResultData::COMMAND_REJECTED, e.to_string()),
            };
            remote
                .sender()
                .result(result, &header.address_destination, &header.address_source, header.msg_counter)?;
        }

        let (feature, merged) = outcome?;
        self.publish_data_change(remote, feature.address(), cmd.function, merged);
        self.notify_subscribers(&feature, cmd.function);
        Ok(())
    }

    fn handle_call(&self, remote: &Arc<DeviceRemote>, datagram: &Datagram) -> Result<()> {
        let header = &datagram.header;

        let (result, event) = match &datagram.cmd.data {
            Some(FunctionData::NodeManagementSubscriptionRequestCall(request)) => {
                match self.feature(&request.server_address) {
                    Some(feature) if feature.role() == RoleType::Server => {
                        self.subscriptions.add(
                            &request.client_address,
                            &request.server_address,
                            request.server_feature_type,
                        );
                        (
                            ResultData::success(),
                            Some((ElementChange::Add, request.server_address.clone())),
                        )
                    }
                    _ => (
                        ResultData::error(
                            ResultData::DESTINATION_UNKNOWN,
                            format!("no server feature at {}", request.server_address),
                        ),
                        None,
                    ),
                }
            }
            Some(FunctionData::NodeManagementSubscriptionDeleteCall(delete)) => {
                self.subscriptions.remove(&delete.client_address, &delete.server_address);
                (
                    ResultData::success(),
                    Some((ElementChange::Remove, delete.server_address.clone())),
                )
            }
            _ => (
                ResultData::error(
                    ResultData::COMMAND_NOT_SUPPORTED,
                    format!("{} is not a supported call", datagram.cmd.function),
                ),
                None,
            ),
        };

        remote
            .sender()
            .result(result, &header.address_destination, &header.address_source, header.msg_counter)?;

        if let Some((change, server)) = event {
            self.bus.publish(
                EventPayload::new(remote.ski(), EventType::SubscriptionChange, change)
                    .with_device(remote.clone())
                    .with_feature(server),
            );
        }
        Ok(())
    }

    fn handle_result(&self, remote: &Arc<DeviceRemote>, datagram: &Datagram) -> Result<()> {
        let Some(reference) = datagram.header.msg_counter_reference else {
            debug!("Result without reference from {}", remote.ski());
            return Ok(());
        };
        let Some(entry) = self
            .pending
            .take_for(reference, remote.ski(), &datagram.header.address_source)
        else {
            debug!("Result for unknown request {} from {}", reference, remote.ski());
            return Ok(());
        };

        match &datagram.cmd.data {
            Some(FunctionData::ResultData(result)) if !result.is_success() => {
                entry.fulfill(Err(SpineError::RemoteError {
                    error_number: result.error_number.unwrap_or(ResultData::GENERAL_ERROR),
                    description: result.description.clone().unwrap_or_default(),
                }));
            }
            _ => entry.fulfill(Ok(None)),
        }
        Ok(())
    }

    fn publish_data_change(
        &self,
        remote: &Arc<DeviceRemote>,
        feature: &FeatureAddress,
        function: FunctionType,
        data: FunctionData,
    ) {
        self.bus.publish(
            EventPayload::new(remote.ski(), EventType::DataChange, ElementChange::Update)
                .with_device(remote.clone())
                .with_feature(feature.clone())
                .with_data(function, Some(data)),
        );
    }
}

impl std::fmt::Debug for DeviceLocal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceLocal")
            .field("address", &self.address)
            .field("device_type", &self.device_type)
            .field("entities", &self.entities.read().len())
            .field("remotes", &self.remotes.read().len())
            .finish()
    }
}
