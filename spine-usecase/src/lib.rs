//! # SPINE Use Cases
//!
//! Service wrapper, typed feature helpers and use cases on top of
//! `spine-core`.
//!
//! ## Architecture
//!
//! ```text
//!  Application ◄── EvseCCDelegate
//!       │
//! ┌─────┴──────────────────────────────┐
//! │  spine-usecase                      │
//! │  EvseCC ─ UseCaseImpl               │
//! │  DeviceClassification │ LoadControl │
//! │  DeviceDiagnosis │ IncentiveTable   │
//! │  Service (config, housekeeping)     │
//! └─────┬──────────────────────────────┘
//!       │ DeviceLocal, EventBus
//!       ▼
//! ┌────────────────────────────────────┐
//! │  spine-core                         │
//! └────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use spine_core::{DeviceType, UseCaseActor};
//! use spine_usecase::{EvseCC, EvseCCDelegate, Service, ServiceConfig};
//!
//! struct Log;
//!
//! impl EvseCCDelegate for Log {
//!     fn handle_device_state(&self, ski: &str, failure: bool, error_code: &str) {
//!         println!("{ski}: failure={failure} code={error_code}");
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServiceConfig::new("EK", "EK3-CEM", "0001", DeviceType::EnergyManagementSystem);
//!     let service = Service::new(config)?;
//!
//!     let evse_cc = EvseCC::register(&service, UseCaseActor::CEM)?;
//!     evse_cc.set_delegate(Arc::new(Log));
//!     service.start();
//!
//!     // connect remotes with `service.connect(..)` and feed their bytes to
//!     // `service.handle_message(..)`
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod features;
pub mod service;
pub mod usecase;

pub use config::{DeviceConfig, ServiceConfig};
pub use error::ServiceError;
pub use features::{DeviceClassification, DeviceDiagnosis, FeatureImpl, IncentiveTable, LoadControl};
pub use service::Service;
pub use usecase::{EvseCC, EvseCCDelegate, UseCaseImpl};
