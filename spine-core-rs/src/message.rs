//! Logical SPINE datagram
//!
//! Every datagram is a header plus one command:
//! - header: source/destination feature, msg counter, optional reference to
//!   the counter being answered, command classifier, ack request, timestamp
//! - cmd: function type, optional data, optional partial and delete filters
//!
//! JSON is used as the byte representation; framing and encryption belong to
//! the transport.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpineError};
use crate::model::{FeatureAddress, Filter, FunctionData, FunctionType, MsgCounter};

/// Command classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CmdClassifier {
    Read,
    Reply,
    Notify,
    Write,
    Call,
    Result,
}

impl std::fmt::Display for CmdClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    pub address_source: FeatureAddress,
    pub address_destination: FeatureAddress,
    pub msg_counter: MsgCounter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_counter_reference: Option<MsgCounter>,
    pub cmd_classifier: CmdClassifier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ack_request: Option<bool>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cmd {
    pub function: FunctionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<FunctionData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_partial: Option<Filter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_delete: Option<Filter>,
}

impl Cmd {
    /// Command without payload, used for reads
    pub fn read(function: FunctionType) -> Self {
        Self {
            function,
            data: None,
            filter_partial: None,
            filter_delete: None,
        }
    }

    /// Command carrying `data`
    pub fn data(data: FunctionData) -> Self {
        Self {
            function: data.function_type(),
            data: Some(data),
            filter_partial: None,
            filter_delete: None,
        }
    }

    pub fn with_partial(mut self, filter: Filter) -> Self {
        self.filter_partial = Some(filter);
        self
    }

    pub fn with_delete(mut self, filter: Filter) -> Self {
        self.filter_delete = Some(filter);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datagram {
    pub header: Header,
    pub cmd: Cmd,
}

impl Datagram {
    /// Serialize to JSON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parse and validate a datagram from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let datagram: Datagram = serde_json::from_slice(bytes)?;

        if let Some(data) = &datagram.cmd.data {
            if data.function_type() != datagram.cmd.function {
                return Err(SpineError::InvalidFormat(format!(
                    "cmd function {} carries {} data",
                    datagram.cmd.function,
                    data.function_type()
                )));
            }
        }

        if datagram.header.cmd_classifier == CmdClassifier::Reply
            && datagram.header.msg_counter_reference.is_none()
        {
            return Err(SpineError::InvalidFormat(
                "reply without msg counter reference".to_string(),
            ));
        }

        Ok(datagram)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeviceDiagnosisStateData, OperatingState};

    fn header(classifier: CmdClassifier, reference: Option<MsgCounter>) -> Header {
        Header {
            address_source: FeatureAddress::new("d:_i:evse", vec![1], 1),
            address_destination: FeatureAddress::new("d:_i:cem", vec![1], 2),
            msg_counter: 7,
            msg_counter_reference: reference,
            cmd_classifier: classifier,
            ack_request: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_datagram_parsing() {
        let datagram = Datagram {
            header: header(CmdClassifier::Reply, Some(3)),
            cmd: Cmd::data(FunctionData::DeviceDiagnosisStateData(DeviceDiagnosisStateData {
                operating_state: Some(OperatingState::NormalOperation),
                ..Default::default()
            })),
        };

        let bytes = datagram.to_bytes().unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.contains("\"cmdClassifier\":\"reply\""));
        assert!(text.contains("\"msgCounterReference\":3"));

        let parsed = Datagram::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, datagram);
    }

    #[test]
    fn test_reply_requires_reference() {
        let datagram = Datagram {
            header: header(CmdClassifier::Reply, None),
            cmd: Cmd::read(FunctionType::DeviceDiagnosisStateData),
        };

        let bytes = datagram.to_bytes().unwrap();
        assert!(matches!(
            Datagram::from_bytes(&bytes),
            Err(SpineError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_function_data_mismatch_rejected() {
        let mut datagram = Datagram {
            header: header(CmdClassifier::Notify, None),
            cmd: Cmd::data(FunctionData::DeviceDiagnosisStateData(Default::default())),
        };
        datagram.cmd.function = FunctionType::IncentiveTableData;

        let bytes = datagram.to_bytes().unwrap();
        assert!(Datagram::from_bytes(&bytes).is_err());
        assert!(Datagram::from_bytes(b"[2, \"x\"]").is_err());
    }
}
