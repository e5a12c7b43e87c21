/// Opaque display switches consumed only by the render layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayFlags {
    pub is_grid: bool,
    pub is_alpha: bool,
    pub can_sort: bool,
    pub can_style: bool,
    pub is_home_active: bool,
}

impl DisplayFlags {
    /// Flags used for a search results page.
    pub const SEARCH: DisplayFlags = DisplayFlags {
        is_grid: true,
        is_alpha: true,
        can_sort: false,
        can_style: true,
        is_home_active: false,
    };
}

pub fn search_title(query: &str) -> String {
    format!("Search results for \"{query}\"")
}
