use serde::Deserialize;

/// Defaults applied when a list request omits `page` or `perPage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaginationConfig {
    pub default_page: u64,
    pub default_per_page: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 0,
            default_per_page: 20,
        }
    }
}
