use std::io;
use std::sync::{mpsc, Arc};
use std::thread;

use shelf_core::InstalledLookup;
use tokio::runtime::{Handle, Runtime};

use crate::coordinator::{FetchCoordinator, PresentationSink};
use crate::{CatalogClient, EngineEvent, PresentationRequest};

enum EngineCommand {
    Query { query: String },
}

/// Background runner for searches. Commands go in through [`EngineHandle::query`];
/// outcomes come back as [`EngineEvent`]s.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    runtime: Handle,
}

impl EngineHandle {
    pub fn new(
        client: Arc<dyn CatalogClient>,
        installed: Arc<dyn InstalledLookup + Send + Sync>,
    ) -> io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = Runtime::new()?;
        let handle = runtime.handle().clone();
        let coordinator = FetchCoordinator::new(client, installed);

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let coordinator = coordinator.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(&coordinator, command, event_tx).await;
                });
            }
        });

        Ok(Self {
            cmd_tx,
            event_rx,
            runtime: handle,
        })
    }

    /// Fire-and-forget: the outcome arrives later through [`EngineHandle::try_recv`].
    pub fn query(&self, query: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Query {
            query: query.into(),
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Runtime the engine runs on, for attaching continuations to pending sections.
    pub fn runtime(&self) -> &Handle {
        &self.runtime
    }
}

struct ChannelPresentationSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl PresentationSink for ChannelPresentationSink {
    fn present(&self, request: PresentationRequest) {
        let _ = self.tx.send(EngineEvent::Presented(request));
    }
}

async fn handle_command(
    coordinator: &FetchCoordinator,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Query { query } => {
            let sink = ChannelPresentationSink {
                tx: event_tx.clone(),
            };
            if let Err(error) = coordinator.query(&query, &sink).await {
                let _ = event_tx.send(EngineEvent::QueryFailed { query, error });
            }
        }
    }
}
