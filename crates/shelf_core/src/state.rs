use crate::view_model::ShellViewModel;

/// Page-shell state around the search view: what is in flight and what is
/// mounted. The grid itself lives in [`crate::ResultGridView`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShellState {
    pending_query: Option<String>,
    mounted: Option<(String, usize)>,
    last_failure: Option<String>,
    queries_issued: u64,
    dirty: bool,
}

impl ShellState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> ShellViewModel {
        ShellViewModel {
            pending_query: self.pending_query.clone(),
            mounted_query: self.mounted.as_ref().map(|(query, _)| query.clone()),
            mounted_count: self.mounted.as_ref().map_or(0, |(_, count)| *count),
            last_failure: self.last_failure.clone(),
            queries_issued: self.queries_issued,
            dirty: self.dirty,
        }
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn begin_query(&mut self, query: &str) {
        self.pending_query = Some(query.to_string());
        self.queries_issued += 1;
        self.dirty = true;
    }

    pub(crate) fn mount(&mut self, query: String, result_count: usize) {
        if self.pending_query.as_deref() == Some(query.as_str()) {
            self.pending_query = None;
        }
        self.last_failure = None;
        self.mounted = Some((query, result_count));
        self.dirty = true;
    }

    pub(crate) fn fail(&mut self, query: &str, reason: String) {
        if self.pending_query.as_deref() == Some(query) {
            self.pending_query = None;
        }
        self.last_failure = Some(reason);
        self.dirty = true;
    }
}
