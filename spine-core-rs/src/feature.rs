//! Local and remote features
//!
//! A feature is one functional block of an entity in a client or server
//! role. Each feature keeps a cache of the function data it has set or
//! received, guarded by one lock per feature. Cached values only change
//! through [`FunctionData::merge`] and delete filters.
//!
//! Role rules:
//! - a local client requests from a remote server of the same type
//! - a local server notifies a remote client of the same type

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::error::{Result, SpineError};
use crate::message::Cmd;
use crate::model::{FeatureAddress, FeatureType, Filter, FunctionData, FunctionType, MsgCounter, RoleType};
use crate::pending::ReplyHandle;
use crate::sender::Sender;

/// Per-feature cache of function data
#[derive(Debug, Default)]
pub struct FeatureData {
    cache: Mutex<HashMap<FunctionType, FunctionData>>,
}

impl FeatureData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value of `function`
    pub fn get(&self, function: FunctionType) -> Result<FunctionData> {
        self.cache
            .lock()
            .get(&function)
            .cloned()
            .ok_or(SpineError::NotFound(function))
    }

    pub fn contains(&self, function: FunctionType) -> bool {
        self.cache.lock().contains_key(&function)
    }

    /// Apply an incoming update and return the merged value.
    ///
    /// The delete filter runs first, then `data` is merged restricted by the
    /// partial filter. The cell is created on first use.
    pub fn update(
        &self,
        function: FunctionType,
        data: Option<&FunctionData>,
        partial: Option<&Filter>,
        delete: Option<&Filter>,
    ) -> Result<FunctionData> {
        if let Some(data) = data {
            if data.function_type() != function {
                return Err(SpineError::FunctionTypeMismatch {
                    expected: function,
                    actual: data.function_type(),
                });
            }
        }

        let mut cache = self.cache.lock();
        if !cache.contains_key(&function) {
            let empty = FunctionData::empty(function)
                .ok_or_else(|| SpineError::InvalidFormat(format!("{} cannot be cached", function)))?;
            cache.insert(function, empty);
        }
        let current = cache.get_mut(&function).ok_or(SpineError::NotFound(function))?;

        if let Some(delete) = delete {
            current.apply_delete(delete);
        }
        if let Some(data) = data {
            current.merge(data, partial)?;
        }

        Ok(current.clone())
    }
}

/// Feature owned by the local device
#[derive(Debug)]
pub struct FeatureLocal {
    address: FeatureAddress,
    feature_type: FeatureType,
    role: RoleType,
    description: RwLock<Option<String>>,
    functions: RwLock<Vec<FunctionType>>,
    data: FeatureData,
}

impl FeatureLocal {
    pub fn new(address: FeatureAddress, feature_type: FeatureType, role: RoleType) -> Self {
        Self {
            address,
            feature_type,
            role,
            description: RwLock::new(None),
            functions: RwLock::new(Vec::new()),
            data: FeatureData::new(),
        }
    }

    pub fn address(&self) -> &FeatureAddress {
        &self.address
    }

    pub fn feature_type(&self) -> FeatureType {
        self.feature_type
    }

    pub fn role(&self) -> RoleType {
        self.role
    }

    pub fn description(&self) -> Option<String> {
        self.description.read().clone()
    }

    pub fn set_description(&self, description: impl Into<String>) {
        *self.description.write() = Some(description.into());
    }

    /// Advertise `function` on this feature
    pub fn add_function(&self, function: FunctionType) {
        let mut functions = self.functions.write();
        if !functions.contains(&function) {
            functions.push(function);
        }
    }

    pub fn functions(&self) -> Vec<FunctionType> {
        self.functions.read().clone()
    }

    pub fn supports(&self, function: FunctionType) -> bool {
        self.functions.read().contains(&function)
    }

    /// Ask a remote server for `function`.
    ///
    /// Returns as soon as the read is sent; the handle resolves when the
    /// reply has been merged into the remote feature's cache.
    pub fn request_data(&self, function: FunctionType, remote: &FeatureRemote) -> Result<ReplyHandle> {
        self.check_pairing(RoleType::Client, remote)?;
        remote.check_function(function)?;

        remote
            .sender()
            .request(Cmd::read(function), &self.address, remote.address())
    }

    /// Merge `data` into the local cache
    pub fn set_data(&self, data: FunctionData) -> Result<()> {
        let function = data.function_type();
        self.check_function(function)?;
        self.data.update(function, Some(&data), None, None)?;
        debug!("{}: set {}", self.address, function);
        Ok(())
    }

    /// Apply a filtered update to the local cache, used for inbound writes
    pub fn update_data(
        &self,
        function: FunctionType,
        data: Option<&FunctionData>,
        partial: Option<&Filter>,
        delete: Option<&Filter>,
    ) -> Result<FunctionData> {
        self.check_function(function)?;
        self.data.update(function, data, partial, delete)
    }

    pub fn get_data(&self, function: FunctionType) -> Result<FunctionData> {
        self.data.get(function)
    }

    /// Push the cached value of `function` to a remote client
    pub fn notify_data(&self, function: FunctionType, remote: &FeatureRemote) -> Result<MsgCounter> {
        self.check_pairing(RoleType::Server, remote)?;
        let data = self.data.get(function)?;

        // single records travel whole and replace the peer's copy
        let cmd = if function.is_list() {
            Cmd::data(data)
        } else {
            Cmd::data(data).with_delete(Filter::default())
        };
        remote.sender().notify(cmd, &self.address, remote.address())
    }

    /// Write `cmd` to a remote server; the handle resolves on its result
    pub fn write_data(&self, cmd: Cmd, remote: &FeatureRemote) -> Result<ReplyHandle> {
        self.check_pairing(RoleType::Client, remote)?;
        remote.check_function(cmd.function)?;

        remote.sender().write(cmd, &self.address, remote.address())
    }

    fn check_function(&self, function: FunctionType) -> Result<()> {
        if self.supports(function) {
            Ok(())
        } else {
            Err(SpineError::FeatureNotFound(format!("{} does not support {}", self.address, function)))
        }
    }

    fn check_pairing(&self, required: RoleType, remote: &FeatureRemote) -> Result<()> {
        if self.role != required || remote.role() != required.counterpart() {
            return Err(SpineError::RoleMismatch {
                local: self.role,
                remote: remote.role(),
            });
        }
        if self.feature_type != remote.feature_type() {
            return Err(SpineError::FeatureNotFound(format!(
                "{} is {}, not {}",
                remote.address(),
                remote.feature_type(),
                self.feature_type
            )));
        }
        Ok(())
    }
}

/// Feature announced by a remote device
#[derive(Debug)]
pub struct FeatureRemote {
    address: FeatureAddress,
    feature_type: FeatureType,
    role: RoleType,
    description: Option<String>,
    functions: Vec<FunctionType>,
    data: FeatureData,
    sender: Arc<Sender>,
}

impl FeatureRemote {
    pub fn new(
        address: FeatureAddress,
        feature_type: FeatureType,
        role: RoleType,
        functions: Vec<FunctionType>,
        sender: Arc<Sender>,
    ) -> Self {
        Self {
            address,
            feature_type,
            role,
            description: None,
            functions,
            data: FeatureData::new(),
            sender,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn address(&self) -> &FeatureAddress {
        &self.address
    }

    pub fn feature_type(&self) -> FeatureType {
        self.feature_type
    }

    pub fn role(&self) -> RoleType {
        self.role
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn functions(&self) -> &[FunctionType] {
        &self.functions
    }

    pub fn supports(&self, function: FunctionType) -> bool {
        self.functions.contains(&function)
    }

    pub fn sender(&self) -> &Arc<Sender> {
        &self.sender
    }

    /// Last known value of `function` on the remote side
    pub fn get_data(&self, function: FunctionType) -> Result<FunctionData> {
        self.data.get(function)
    }

    /// Merge received data into the cache
    pub fn update_data(
        &self,
        function: FunctionType,
        data: Option<&FunctionData>,
        partial: Option<&Filter>,
        delete: Option<&Filter>,
    ) -> Result<FunctionData> {
        self.data.update(function, data, partial, delete)
    }

    fn check_function(&self, function: FunctionType) -> Result<()> {
        if self.supports(function) {
            Ok(())
        } else {
            Err(SpineError::FeatureNotFound(format!("{} does not offer {}", self.address, function)))
        }
    }
}
