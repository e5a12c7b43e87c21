//! Snapshelf core: pure catalog model, grid view-model, event bus and the
//! page-shell state machine. Nothing in here performs I/O.
mod annotate;
mod bus;
mod effect;
mod grid;
mod merge;
mod msg;
mod presentation;
mod record;
mod state;
mod sync;
mod update;
mod view_model;

pub use annotate::{annotate, annotate_all, DetailUriBuilder, DetailUriTemplate};
pub use bus::{EventBus, EventName, StoreEvent, Subscription};
pub use effect::Effect;
pub use grid::{
    is_last_in_row, CellView, GridOptions, GridRender, ResultGridView, DEFAULT_ROW_WIDTH,
    EMPTY_STATE_MESSAGE,
};
pub use merge::merge_install_state;
pub use msg::Msg;
pub use presentation::{search_title, DisplayFlags};
pub use record::{InstallState, InstalledLookup, Record, ResultSet};
pub use state::ShellState;
pub use sync::{LiveRemovalSync, SharedGrid};
pub use update::update;
pub use view_model::ShellViewModel;
