#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User submitted a search term. Passed through untouched.
    QuerySubmitted(String),
    /// A presentation for `query` was mounted into the page.
    ResultsMounted { query: String, result_count: usize },
    /// The result retrieval for `query` failed; nothing was mounted.
    QueryFailed { query: String, reason: String },
    /// Something outside the page removed a catalog entry.
    SnapRemoved { id: String },
    /// Loop tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
