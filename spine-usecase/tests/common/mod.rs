//! Two services joined by an in-memory wire
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use spine_core::{DeviceType, EntityRemote, Result, TransportSink};
use spine_usecase::{Service, ServiceConfig};

pub const CEM_SKI: &str = "ski-cem";
pub const EVSE_SKI: &str = "ski-evse";

#[derive(Default)]
pub struct Wire {
    queue: Mutex<VecDeque<Vec<u8>>>,
}

impl Wire {
    fn pop(&self) -> Option<Vec<u8>> {
        self.queue.lock().pop_front()
    }
}

impl TransportSink for Wire {
    fn send(&self, bytes: Vec<u8>) -> Result<()> {
        self.queue.lock().push_back(bytes);
        Ok(())
    }
}

pub fn cem_service() -> Service {
    Service::new(ServiceConfig::new("EK", "EK3-CEM", "0001", DeviceType::EnergyManagementSystem)).unwrap()
}

pub fn evse_service() -> Service {
    let config = ServiceConfig::new("EK", "EK3-EVSE", "0042", DeviceType::ChargingStation)
        .with_vendor("Elektrokombinacija", "EK Charge")
        .with_device_code("EK3-22")
        .with_entity_type(spine_core::EntityType::EVSE);
    Service::new(config).unwrap()
}

pub struct Pair {
    pub cem: Service,
    pub evse: Service,
    to_cem: Arc<Wire>,
    to_evse: Arc<Wire>,
}

impl Pair {
    /// Connect both services to each other; nothing is delivered until
    /// [`Pair::pump`]
    pub fn connect(cem: Service, evse: Service) -> Self {
        let to_cem = Arc::new(Wire::default());
        let to_evse = Arc::new(Wire::default());

        let cem_description = cem.description();
        let evse_description = evse.description();
        cem.connect(EVSE_SKI, &evse_description, to_evse.clone());
        evse.connect(CEM_SKI, &cem_description, to_cem.clone());

        Self {
            cem,
            evse,
            to_cem,
            to_evse,
        }
    }

    /// Deliver queued datagrams both ways until the wire is idle
    pub fn pump(&self) -> usize {
        let mut delivered = 0;
        loop {
            let to_evse = self.to_evse.pop();
            if let Some(bytes) = &to_evse {
                self.evse.handle_message(CEM_SKI, bytes).unwrap();
                delivered += 1;
            }
            let to_cem = self.to_cem.pop();
            if let Some(bytes) = &to_cem {
                self.cem.handle_message(EVSE_SKI, bytes).unwrap();
                delivered += 1;
            }
            if to_evse.is_none() && to_cem.is_none() {
                return delivered;
            }
        }
    }

    /// The EVSE's use-case entity as seen by the CEM
    pub fn evse_entity(&self) -> Arc<EntityRemote> {
        let entity = self.evse.local_entity().address().entity.clone();
        self.cem
            .device()
            .remote_device(EVSE_SKI)
            .unwrap()
            .entity(&entity)
            .unwrap()
    }

    /// The CEM's use-case entity as seen by the EVSE
    pub fn cem_entity(&self) -> Arc<EntityRemote> {
        let entity = self.cem.local_entity().address().entity.clone();
        self.evse
            .device()
            .remote_device(CEM_SKI)
            .unwrap()
            .entity(&entity)
            .unwrap()
    }
}
