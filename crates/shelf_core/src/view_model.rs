#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShellViewModel {
    pub pending_query: Option<String>,
    pub mounted_query: Option<String>,
    pub mounted_count: usize,
    pub last_failure: Option<String>,
    pub queries_issued: u64,
    pub dirty: bool,
}
