//! Outbound datagrams towards one remote device
//!
//! The transport itself (framing, TLS, websocket session) lives outside this
//! crate. Everything that leaves a device goes through a [`TransportSink`].

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::error::Result;
use crate::message::{Cmd, CmdClassifier, Datagram, Header};
use crate::model::{FeatureAddress, FunctionData, MsgCounter, ResultData};
use crate::pending::{PendingRequests, ReplyHandle};

/// Outbound byte sink of one remote connection
pub trait TransportSink: Send + Sync {
    fn send(&self, bytes: Vec<u8>) -> Result<()>;
}

/// Builds datagrams for one remote device and hands them to its sink
pub struct Sender {
    ski: String,
    sink: Arc<dyn TransportSink>,
    pending: Arc<PendingRequests>,
}

impl Sender {
    pub fn new(ski: impl Into<String>, sink: Arc<dyn TransportSink>, pending: Arc<PendingRequests>) -> Self {
        Self {
            ski: ski.into(),
            sink,
            pending,
        }
    }

    pub fn ski(&self) -> &str {
        &self.ski
    }

    /// Send a read and register for its reply
    pub fn request(&self, cmd: Cmd, src: &FeatureAddress, dst: &FeatureAddress) -> Result<ReplyHandle> {
        self.send_tracked(CmdClassifier::Read, src, dst, cmd)
    }

    /// Send a write with ack request; the handle resolves on the result
    pub fn write(&self, cmd: Cmd, src: &FeatureAddress, dst: &FeatureAddress) -> Result<ReplyHandle> {
        self.send_tracked(CmdClassifier::Write, src, dst, cmd)
    }

    /// Send a call; the handle resolves on the result
    pub fn call(&self, data: FunctionData, src: &FeatureAddress, dst: &FeatureAddress) -> Result<ReplyHandle> {
        self.send_tracked(CmdClassifier::Call, src, dst, Cmd::data(data))
    }

    pub fn notify(&self, cmd: Cmd, src: &FeatureAddress, dst: &FeatureAddress) -> Result<MsgCounter> {
        let msg_counter = self.pending.next_msg_counter();
        self.send(CmdClassifier::Notify, src, dst, msg_counter, None, cmd)?;
        Ok(msg_counter)
    }

    pub fn reply(
        &self,
        data: FunctionData,
        src: &FeatureAddress,
        dst: &FeatureAddress,
        reference: MsgCounter,
    ) -> Result<MsgCounter> {
        let msg_counter = self.pending.next_msg_counter();
        self.send(CmdClassifier::Reply, src, dst, msg_counter, Some(reference), Cmd::data(data))?;
        Ok(msg_counter)
    }

    pub fn result(
        &self,
        result: ResultData,
        src: &FeatureAddress,
        dst: &FeatureAddress,
        reference: MsgCounter,
    ) -> Result<MsgCounter> {
        let msg_counter = self.pending.next_msg_counter();
        self.send(
            CmdClassifier::Result,
            src,
            dst,
            msg_counter,
            Some(reference),
            Cmd::data(FunctionData::ResultData(result)),
        )?;
        Ok(msg_counter)
    }

    fn send_tracked(
        &self,
        classifier: CmdClassifier,
        src: &FeatureAddress,
        dst: &FeatureAddress,
        cmd: Cmd,
    ) -> Result<ReplyHandle> {
        let handle = self.pending.register(&self.ski, cmd.function, dst);
        let msg_counter = handle.msg_counter();

        if let Err(e) = self.send(classifier, src, dst, msg_counter, None, cmd) {
            self.pending.remove(msg_counter);
            return Err(e);
        }

        Ok(handle)
    }

    fn send(
        &self,
        classifier: CmdClassifier,
        src: &FeatureAddress,
        dst: &FeatureAddress,
        msg_counter: MsgCounter,
        reference: Option<MsgCounter>,
        cmd: Cmd,
    ) -> Result<()> {
        let ack_request = matches!(classifier, CmdClassifier::Write | CmdClassifier::Call).then_some(true);
        let function = cmd.function;
        let datagram = Datagram {
            header: Header {
                address_source: src.clone(),
                address_destination: dst.clone(),
                msg_counter,
                msg_counter_reference: reference,
                cmd_classifier: classifier,
                ack_request,
                timestamp: Utc::now(),
            },
            cmd,
        };

        let bytes = datagram.to_bytes()?;
        debug!("Send {} {} #{} {} -> {}", classifier, function, msg_counter, src, dst);

        self.sink.send(bytes).map_err(|e| {
            warn!("Send to {} failed: {}", self.ski, e);
            e
        })
    }
}

impl std::fmt::Debug for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sender").field("ski", &self.ski).finish()
    }
}
