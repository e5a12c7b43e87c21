#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    RunQuery { query: String },
    BroadcastRemoval { id: String },
}
