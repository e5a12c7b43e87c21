use crate::annotate::{annotate_all, DetailUriBuilder};
use crate::{InstallState, ResultSet};

pub const DEFAULT_ROW_WIDTH: usize = 4;
pub const EMPTY_STATE_MESSAGE: &str = "No snaps found";

/// Per-cell rendering options for a [`ResultGridView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridOptions {
    pub row_width: usize,
    /// Caps the number of cells drawn. Applied at render time only; the query
    /// itself is never limited.
    pub display_limit: Option<usize>,
    /// When false an empty result set renders nothing at all.
    pub show_empty_state: bool,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            row_width: DEFAULT_ROW_WIDTH,
            display_limit: None,
            show_empty_state: true,
        }
    }
}

/// Row-break hint for the cell at zero-based `index`.
///
/// Index 0 is never flagged, even with a row width of 1. This mirrors the
/// storefront's historical layout and is kept as is.
pub fn is_last_in_row(index: usize, row_width: usize) -> bool {
    if row_width == 0 {
        return false;
    }
    index != 0 && (index + 1) % row_width == 0
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellView {
    pub index: usize,
    pub id: String,
    pub name: String,
    pub install_state: InstallState,
    pub detail_uri: Option<String>,
    pub is_last_in_row: bool,
}

/// Output of one grid render. Cells and the empty state are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridRender {
    Cells(Vec<CellView>),
    Empty { message: &'static str },
    /// Empty result set with the empty state suppressed.
    Nothing,
}

impl GridRender {
    pub fn cells(&self) -> &[CellView] {
        match self {
            GridRender::Cells(cells) => cells,
            GridRender::Empty { .. } | GridRender::Nothing => &[],
        }
    }

    pub fn is_empty_state(&self) -> bool {
        matches!(self, GridRender::Empty { .. })
    }
}

/// Composite view over one query's result set.
///
/// Owns the collection for its lifetime; the only mutation it accepts is
/// removal by id, which marks the view dirty so the owner re-renders it.
#[derive(Debug)]
pub struct ResultGridView {
    results: ResultSet,
    options: GridOptions,
    dirty: bool,
}

impl ResultGridView {
    pub fn new(mut results: ResultSet, options: GridOptions, uris: &dyn DetailUriBuilder) -> Self {
        annotate_all(&mut results, uris);
        Self {
            results,
            options,
            dirty: true,
        }
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    /// Full render; cells are never patched individually.
    pub fn render(&self) -> GridRender {
        if self.results.is_empty() {
            return if self.options.show_empty_state {
                GridRender::Empty {
                    message: EMPTY_STATE_MESSAGE,
                }
            } else {
                GridRender::Nothing
            };
        }

        let limit = self.options.display_limit.unwrap_or(usize::MAX);
        let cells = self
            .results
            .iter()
            .take(limit)
            .enumerate()
            .map(|(index, record)| CellView {
                index,
                id: record.id().to_string(),
                name: record.name().to_string(),
                install_state: record.install_state(),
                detail_uri: record.detail_uri().map(ToOwned::to_owned),
                is_last_in_row: is_last_in_row(index, self.options.row_width),
            })
            .collect();
        GridRender::Cells(cells)
    }

    /// Removes the record with `id` if present. Returns whether anything changed.
    pub fn remove(&mut self, id: &str) -> bool {
        let removed = self.results.remove(id).is_some();
        if removed {
            self.dirty = true;
        }
        removed
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
