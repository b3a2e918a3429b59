use serde::{Deserialize, Serialize};

/// Default page size for expense listings.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Largest page size a listing may request.
pub const MAX_PAGE_SIZE: usize = 100;

/// User-configurable display settings, stored under the `settings` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// ISO 4217 code used for display (e.g., "USD", "EUR", "PLN").
    pub currency: String,

    /// BCP 47 locale tag driving number formatting (e.g., "en-US").
    pub locale: String,

    pub page_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            locale: "en-US".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Settings {
    /// Page size clamped to `1..=MAX_PAGE_SIZE`.
    #[must_use]
    pub fn effective_page_size(&self) -> usize {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}
