use std::sync::Arc;

use anyhow::Context;
use shelf_core::{Effect, EventBus, InstalledLookup, StoreEvent};
use shelf_engine::{CatalogClient, EngineEvent, EngineHandle};
use shelf_logging::{shelf_debug, shelf_info};

/// Executes core effects against the engine and the event bus.
pub(crate) struct EffectRunner {
    engine: EngineHandle,
    bus: EventBus,
}

impl EffectRunner {
    pub fn new(
        client: Arc<dyn CatalogClient>,
        installed: Arc<dyn InstalledLookup + Send + Sync>,
        bus: EventBus,
    ) -> anyhow::Result<Self> {
        let engine = EngineHandle::new(client, installed).context("starting search engine")?;
        Ok(Self { engine, bus })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::RunQuery { query } => {
                    shelf_info!("RunQuery query_len={} query={:?}", query.len(), query);
                    self.engine.query(query);
                }
                Effect::BroadcastRemoval { id } => {
                    let delivered = self.bus.publish(&StoreEvent::SnapRemoved { id: id.clone() });
                    shelf_debug!("Removal of {} delivered to {} listener(s)", id, delivered);
                }
            }
        }
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.engine.try_recv()
    }

    pub fn engine(&self) -> &EngineHandle {
        &self.engine
    }
}
