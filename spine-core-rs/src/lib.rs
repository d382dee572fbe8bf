//! # SPINE Core
//!
//! Data exchange core of the SPINE home energy protocol.
//!
//! Devices expose typed features (device classification, device diagnosis,
//! incentive tables, load control) in a client or server role. This crate
//! caches and merges their function data, correlates requests with replies,
//! and fans change events out to use cases.
//!
//! ## Architecture
//!
//! ```text
//!   Use cases (spine-usecase)
//!       │ subscribe            ▲ DataChange / DeviceChange
//!       ▼                      │
//! ┌──────────────────────────────────────────┐
//! │ DeviceLocal                              │
//! │  entities ─ FeatureLocal ─ FeatureData   │
//! │  remotes  ─ FeatureRemote ─ FeatureData  │
//! │  PendingRequests │ Subscriptions │ Bus   │
//! └──────────────┬───────────────────────────┘
//!                │ Datagram (JSON)
//!                ▼
//!          TransportSink (external)
//! ```
//!
//! Incoming data is always merged through [`update_list`] and
//! [`remove_element_from_item`]; absent fields never erase cached values.

pub mod device;
pub mod entity;
pub mod error;
pub mod events;
pub mod feature;
pub mod message;
pub mod model;
pub mod pending;
pub mod sender;
pub mod subscription;

pub use device::{node_management_address, DeviceLocal, DeviceRemote, RemoteDeviceDescription, UseCaseSupport};
pub use entity::{EntityDescription, EntityLocal, EntityRemote, FeatureDescription};
pub use error::{Result, SpineError};
pub use events::{ElementChange, EventBus, EventHandler, EventPayload, EventType, HandlerId};
pub use feature::{FeatureData, FeatureLocal, FeatureRemote};
pub use message::{Cmd, CmdClassifier, Datagram, Header};
pub use model::*;
pub use pending::{PendingRequests, ReplyHandle, ReplyResult, DEFAULT_REQUEST_TIMEOUT};
pub use sender::{Sender, TransportSink};
pub use subscription::{Subscription, SubscriptionManager};
