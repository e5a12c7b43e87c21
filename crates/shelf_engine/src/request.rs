use std::fmt;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use shelf_core::{search_title, DisplayFlags, ResultSet};
use shelf_logging::shelf_warn;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::{CatalogClient, FailureKind, FetchError, SectionList};

type SectionsFuture = Shared<BoxFuture<'static, Result<SectionList, FetchError>>>;

/// The section retrieval, possibly still in flight.
///
/// The retrieval runs as its own task from the moment it is started, whether
/// or not anyone awaits the handle. Clones share the single outcome.
#[derive(Clone)]
pub struct SectionsHandle {
    inner: SectionsFuture,
}

impl SectionsHandle {
    /// Starts the retrieval on the current tokio runtime without waiting for it.
    pub fn spawn(client: Arc<dyn CatalogClient>) -> Self {
        let task = tokio::spawn(async move { client.fetch_sections().await });
        let inner = async move {
            match task.await {
                Ok(result) => result,
                Err(err) => Err(FetchError::new(FailureKind::Cancelled, err.to_string())),
            }
        }
        .boxed()
        .shared();
        Self { inner }
    }

    /// Handle that is already settled with `result`.
    pub fn ready(result: Result<SectionList, FetchError>) -> Self {
        Self {
            inner: futures_util::future::ready(result).boxed().shared(),
        }
    }

    pub async fn resolve(&self) -> Result<SectionList, FetchError> {
        self.inner.clone().await
    }

    /// Settled sections, with a failed retrieval read as "no sections".
    pub async fn resolve_or_empty(&self) -> SectionList {
        match self.resolve().await {
            Ok(sections) => sections,
            Err(err) => {
                shelf_warn!("Section retrieval failed, showing no sections: {}", err);
                SectionList::new()
            }
        }
    }

    /// Runs `continuation` on `runtime` once the sections settle.
    pub fn on_settled<F>(&self, runtime: &Handle, continuation: F) -> JoinHandle<()>
    where
        F: FnOnce(SectionList) + Send + 'static,
    {
        let handle = self.clone();
        runtime.spawn(async move {
            continuation(handle.resolve_or_empty().await);
        })
    }
}

impl fmt::Debug for SectionsHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.inner.peek() {
            Some(Ok(sections)) => format!("ready({} sections)", sections.len()),
            Some(Err(err)) => format!("failed({err})"),
            None => "pending".to_string(),
        };
        f.debug_struct("SectionsHandle").field("state", &state).finish()
    }
}

/// Everything the render layer needs to mount one search page.
///
/// Built once per successful query and not modified afterwards. The result
/// set leaves the bundle by value through [`PresentationRequest::into_results`]
/// so the mounted view owns that very collection.
#[derive(Debug)]
pub struct PresentationRequest {
    query: String,
    title: String,
    flags: DisplayFlags,
    sections: SectionsHandle,
    results: ResultSet,
}

impl PresentationRequest {
    pub(crate) fn for_search(query: String, sections: SectionsHandle, results: ResultSet) -> Self {
        Self {
            title: search_title(&query),
            query,
            flags: DisplayFlags::SEARCH,
            sections,
            results,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn flags(&self) -> DisplayFlags {
        self.flags
    }

    pub fn sections(&self) -> &SectionsHandle {
        &self.sections
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    pub fn into_results(self) -> ResultSet {
        self.results
    }
}

#[cfg(test)]
mod tests {
    use super::SectionsHandle;
    use crate::{FailureKind, FetchError, Section};

    #[tokio::test]
    async fn failed_sections_read_as_empty() {
        let handle = SectionsHandle::ready(Err(FetchError::new(FailureKind::Network, "down")));
        assert!(handle.resolve().await.is_err());
        assert!(handle.resolve_or_empty().await.is_empty());
    }

    #[tokio::test]
    async fn clones_share_one_outcome() {
        let handle = SectionsHandle::ready(Ok(vec![Section("games".to_string())]));
        let other = handle.clone();
        assert_eq!(handle.resolve().await, other.resolve().await);
        assert!(format!("{other:?}").contains("ready(1 sections)"));
    }
}
