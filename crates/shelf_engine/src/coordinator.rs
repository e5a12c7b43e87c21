use std::sync::Arc;

use shelf_core::{merge_install_state, InstalledLookup, ResultSet};
use shelf_logging::{shelf_info, shelf_warn};

use crate::{CatalogClient, FetchError, PresentationRequest, SectionsHandle};

/// Receives finished presentations; the render-installation side of a query.
pub trait PresentationSink: Send + Sync {
    fn present(&self, request: PresentationRequest);
}

/// Runs one search: starts both retrievals, and on the result retrieval's
/// success merges install state and hands exactly one presentation to the sink.
#[derive(Clone)]
pub struct FetchCoordinator {
    client: Arc<dyn CatalogClient>,
    installed: Arc<dyn InstalledLookup + Send + Sync>,
}

impl FetchCoordinator {
    pub fn new(
        client: Arc<dyn CatalogClient>,
        installed: Arc<dyn InstalledLookup + Send + Sync>,
    ) -> Self {
        Self { client, installed }
    }

    /// Must be called from within a tokio runtime; the section retrieval is
    /// spawned onto it.
    ///
    /// Handoff waits only for the result retrieval. On failure nothing is
    /// handed off and the error is returned; the section task keeps running
    /// and its outcome is discarded.
    pub async fn query(&self, query: &str, sink: &dyn PresentationSink) -> Result<(), FetchError> {
        let sections = SectionsHandle::spawn(Arc::clone(&self.client));

        shelf_info!("Searching catalog query_len={} query={:?}", query.len(), query);
        let fetched = self.client.search(query).await.inspect_err(|err| {
            shelf_warn!("Search for {:?} failed: {}", query, err);
        })?;

        let fetched_count = fetched.len();
        let results = ResultSet::from_records(fetched);
        if results.len() != fetched_count {
            shelf_warn!(
                "Dropped {} record(s) with missing or duplicate ids for query {:?}",
                fetched_count - results.len(),
                query
            );
        }

        let results = merge_install_state(results, self.installed.as_ref());
        shelf_info!("Presenting {} result(s) for {:?}", results.len(), query);
        sink.present(PresentationRequest::for_search(
            query.to_string(),
            sections,
            results,
        ));
        Ok(())
    }
}
