use shelf_core::{CellView, GridRender, InstallState, ShellViewModel};
use shelf_engine::Section;

/// Page header: title plus the section line once sections have settled.
pub(crate) fn render_header(title: &str, sections: Option<&[Section]>) -> Vec<String> {
    let mut lines = vec![title.to_string(), "=".repeat(title.chars().count())];
    match sections {
        None => lines.push("Sections: loading…".to_string()),
        Some([]) => {}
        Some(sections) => {
            let names: Vec<&str> = sections.iter().map(Section::name).collect();
            lines.push(format!("Sections: {}", names.join(" | ")));
        }
    }
    lines
}

/// One text line per grid row; a row ends after a cell flagged last-in-row.
pub(crate) fn render_grid(render: &GridRender) -> Vec<String> {
    match render {
        GridRender::Nothing => Vec::new(),
        GridRender::Empty { message } => vec![format!("  {message}")],
        GridRender::Cells(cells) => {
            let mut lines = Vec::new();
            let mut row: Vec<String> = Vec::new();
            for cell in cells {
                row.push(format_cell(cell));
                if cell.is_last_in_row {
                    lines.push(row.join("  "));
                    row.clear();
                }
            }
            if !row.is_empty() {
                lines.push(row.join("  "));
            }
            lines
        }
    }
}

pub(crate) fn render_status(view: &ShellViewModel) -> String {
    let mut parts = Vec::new();
    if let Some(query) = &view.pending_query {
        parts.push(format!("Searching {query:?}…"));
    }
    if let Some(query) = &view.mounted_query {
        parts.push(format!("Showing {query:?} ({} results)", view.mounted_count));
    }
    if let Some(reason) = &view.last_failure {
        parts.push(format!("Last search failed: {reason}"));
    }
    if parts.is_empty() {
        "Type a search term, `:remove <id>` or `:quit`".to_string()
    } else {
        parts.join(" | ")
    }
}

fn format_cell(cell: &CellView) -> String {
    let mark = match cell.install_state {
        InstallState::Installed => "[x]",
        InstallState::NotInstalled => "[ ]",
    };
    match &cell.detail_uri {
        Some(uri) => format!("{mark} {} <{uri}>", cell.name),
        None => format!("{mark} {}", cell.name),
    }
}
