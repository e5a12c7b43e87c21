//! Snapshelf engine: catalog I/O and search orchestration.
mod client;
mod coordinator;
mod engine;
mod request;
mod types;

pub use client::{CatalogClient, ClientSettings, ReqwestCatalogClient};
pub use coordinator::{FetchCoordinator, PresentationSink};
pub use engine::EngineHandle;
pub use request::{PresentationRequest, SectionsHandle};
pub use types::{EngineEvent, FailureKind, FetchError, Section, SectionList};
